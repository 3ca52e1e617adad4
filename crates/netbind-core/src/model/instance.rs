// ── Lifecycle-facing inputs ──
//
// What the instance lifecycle hands the orchestrator: the instance itself,
// the caller's request context, and the shape of an allocation request.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

fn default_zone() -> String {
    "nova".into()
}

/// A security group as recorded on the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSecurityGroup {
    pub id: String,
    pub name: String,
}

/// The orchestrator's view of a compute instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub uuid: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_zone")]
    pub availability_zone: String,
    /// Compute host the instance runs on (target of host binding).
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub security_groups: Vec<InstanceSecurityGroup>,
    /// Bandwidth factor from the instance's flavor.
    #[serde(default)]
    pub rxtx_factor: Option<f64>,
}

impl Instance {
    /// The `device_owner` tag stamped on this instance's ports.
    pub fn device_owner(&self) -> String {
        format!("compute:{}", self.availability_zone)
    }

    /// Name used in log lines and error messages.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.uuid
        } else {
            &self.display_name
        }
    }

    pub fn security_group_ids(&self) -> Vec<String> {
        self.security_groups.iter().map(|g| g.id.clone()).collect()
    }
}

/// One entry of a caller's network request.
///
/// A `port_id` wins over everything else: the port's own network is used.
/// A `fixed_ip` only applies together with a `network_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedNetwork {
    #[serde(default)]
    pub network_id: Option<String>,
    #[serde(default)]
    pub fixed_ip: Option<String>,
    #[serde(default)]
    pub port_id: Option<String>,
}

impl RequestedNetwork {
    pub fn network(id: impl Into<String>) -> Self {
        Self {
            network_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn network_with_ip(id: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            network_id: Some(id.into()),
            fixed_ip: Some(ip.into()),
            port_id: None,
        }
    }

    pub fn port(id: impl Into<String>) -> Self {
        Self {
            port_id: Some(id.into()),
            ..Self::default()
        }
    }
}

/// Arguments of `allocate_for_instance`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocateRequest {
    /// Empty means "every network available to the tenant".
    pub requested_networks: Vec<RequestedNetwork>,
    /// Hypervisor-supplied MAC addresses the instance must use, if any.
    pub macs: Option<Vec<String>>,
    /// Security group names or ids.
    pub security_groups: Vec<String>,
}

/// Who is asking: the caller's tenant and token.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: Option<String>,
    pub project_id: String,
    pub auth_token: Option<SecretString>,
    pub is_admin: bool,
}

impl RequestContext {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            user_id: None,
            project_id: project_id.into(),
            auth_token: None,
            is_admin: false,
        }
    }

    pub fn with_token(mut self, token: SecretString) -> Self {
        self.auth_token = Some(token);
        self
    }
}
