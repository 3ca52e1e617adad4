// ── Domain model ──
//
// Inputs from the instance lifecycle and the views the orchestrator
// builds. Remote resource records (ports, networks, ...) are the
// `netbind-api` models, re-exported here.

pub mod floating;
pub mod instance;
pub mod network_info;

pub use floating::{AgentStatus, FloatingIpInfo, FloatingIpPool};
pub use instance::{
    AllocateRequest, Instance, InstanceSecurityGroup, RequestContext, RequestedNetwork,
};
pub use netbind_api::models::{
    Agent, Extension, FixedIpRef, FixedIpRequest, FloatingIp, Network, Port, SecurityGroup,
    Subnet,
};
pub use network_info::{
    FixedIp, NIC_NAME_LEN, NetworkInfo, NetworkView, SubnetView, VIF_TYPE_BRIDGE, VIF_TYPE_OVS,
    Vif,
};
