//! Instance network provisioning on top of `netbind-api`.
//!
//! - **[`Orchestrator`]**: facade used by the instance lifecycle. Attaches
//!   instances to networks ([`allocate_for_instance`](Orchestrator::allocate_for_instance)),
//!   tears attachments down, and rebuilds the instance's [`NetworkInfo`].
//!
//! - **Allocation** ([`allocator`]): per-network bind-or-create with a
//!   ledger of mutated ports, rolled back by [`allocator::compensate`] when
//!   an attempt fails partway.
//!
//! - **Network info** ([`nw_info`]): reconciles ports, subnets and floating
//!   IPs into an ordered snapshot, persisted through an [`InstanceStore`].
//!
//! - **Seams**: [`NetworkService`] (the remote service), [`ClientProvider`]
//!   (tenant vs. admin clients), [`InstanceStore`] and
//!   [`SecurityGroupNotifier`] (platform collaborators).

pub mod allocator;
pub mod collab;
pub mod config;
pub mod error;
pub mod extensions;
pub mod floating_ips;
pub mod model;
pub mod nw_info;
pub mod orchestrator;
pub mod remote;
pub mod security_groups;
pub mod selector;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use collab::{InstanceStore, LoggingNotifier, SecurityGroupNotifier};
pub use config::{OrchestratorConfig, ServiceAuth, ServiceConfig};
pub use error::{CoreError, ErrorKind};
pub use extensions::{Clock, ExtensionCache, SystemClock};
pub use orchestrator::{Collaborators, Orchestrator};
pub use remote::{ApiResult, NetworkService};
pub use session::{ClientProvider, SessionProvider};

pub use model::{
    AgentStatus, AllocateRequest, FloatingIpInfo, FloatingIpPool, Instance,
    InstanceSecurityGroup, NetworkInfo, RequestContext, RequestedNetwork, Vif,
};
