// ── Runtime configuration ──
//
// These types describe how to reach the network service and how the
// orchestrator shapes what it builds. They never touch disk; the CLI
// (via netbind-config) constructs them and hands them in.

use std::time::Duration;

use url::Url;

pub use netbind_api::{AdminCredentials, AuthStrategy, TlsMode};

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:9696";
pub const DEFAULT_AUTH_URL: &str = "http://localhost:5000/v2.0";
pub const DEFAULT_INTEGRATION_BRIDGE: &str = "br-int";
pub const DEFAULT_FLOATING_POOL: &str = "nova";
pub const DEFAULT_EXTENSION_SYNC_INTERVAL: Duration = Duration::from_secs(600);

/// How to authenticate against the network service.
#[derive(Debug, Clone)]
pub enum ServiceAuth {
    /// Identity-service tokens. Tenant calls reuse the caller's token;
    /// administrative calls use a token issued for `admin`.
    Keystone { admin: AdminCredentials },
    /// Service deployed with authentication disabled.
    NoAuth,
}

impl ServiceAuth {
    pub fn strategy(&self) -> AuthStrategy {
        match self {
            Self::Keystone { .. } => AuthStrategy::Keystone,
            Self::NoAuth => AuthStrategy::NoAuth,
        }
    }
}

/// Where the network service lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub url: Url,
    pub auth: ServiceAuth,
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl ServiceConfig {
    pub fn transport(&self) -> netbind_api::TransportConfig {
        netbind_api::TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }
}

/// Knobs that shape allocation and network-info output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Bridge reported for `ovs` attachments.
    pub integration_bridge: String,
    /// Value of `injected` on every network view.
    pub flat_injected: bool,
    /// Maximum age of the extension cache before it is re-queried.
    pub extension_sync_interval: Duration,
    /// Pool used by `allocate_floating_ip` when the caller names none.
    pub default_floating_pool: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            integration_bridge: DEFAULT_INTEGRATION_BRIDGE.into(),
            flat_injected: false,
            extension_sync_interval: DEFAULT_EXTENSION_SYNC_INTERVAL,
            default_floating_pool: DEFAULT_FLOATING_POOL.into(),
        }
    }
}
