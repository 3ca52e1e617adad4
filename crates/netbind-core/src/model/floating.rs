// Floating IP and agent views returned by the query operations.

use serde::{Deserialize, Serialize};

/// A floating IP joined with its pool and (if bound) the owning instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingIpInfo {
    pub id: String,
    pub address: String,
    /// Pool (external network) name, or its id when unnamed.
    pub pool: String,
    pub project_id: Option<String>,
    /// The bound port. There is no separate fixed-IP identity.
    pub fixed_ip_id: Option<String>,
    pub fixed_ip_address: Option<String>,
    pub instance_uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingIpPool {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub agent_type: String,
    pub alive: bool,
}
