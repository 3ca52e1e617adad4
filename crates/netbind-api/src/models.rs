//! Resource types for the network service's v2.0 API.
//!
//! Responses wrap every resource in a keyed envelope (`{"port": {...}}`,
//! `{"ports": [...]}`); the client strips the envelope, so these types
//! model only the inner objects. Extension-provided attributes keep their
//! namespaced wire names (`binding:host_id`, `router:external`).

use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

// ── Networks ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub shared: bool,
    /// Subnet ids.
    #[serde(default)]
    pub subnets: Vec<String>,
    /// Only present when the port-security capability is loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_security_enabled: Option<bool>,
    #[serde(
        rename = "router:external",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub router_external: Option<bool>,
}

// ── Subnets ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub network_id: String,
    #[serde(default)]
    pub name: String,
    pub cidr: String,
    #[serde(default)]
    pub gateway_ip: Option<String>,
    #[serde(default)]
    pub dns_nameservers: Vec<String>,
}

// ── Ports ────────────────────────────────────────────────────────────

/// A fixed address as reported on a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedIpRef {
    pub subnet_id: String,
    pub ip_address: String,
}

/// A fixed address as requested on create/update. Either half may be
/// omitted: an address alone picks its subnet, a subnet alone lets the
/// service pick the address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FixedIpRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

impl FixedIpRequest {
    pub fn address(ip_address: impl Into<String>) -> Self {
        Self {
            subnet_id: None,
            ip_address: Some(ip_address.into()),
        }
    }

    pub fn on_subnet(subnet_id: impl Into<String>) -> Self {
        Self {
            subnet_id: Some(subnet_id.into()),
            ip_address: None,
        }
    }
}

impl From<&FixedIpRef> for FixedIpRequest {
    fn from(ip: &FixedIpRef) -> Self {
        Self {
            subnet_id: Some(ip.subnet_id.clone()),
            ip_address: Some(ip.ip_address.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub network_id: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Owning device (instance uuid). The service reports `""` when unbound.
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub device_owner: Option<String>,
    pub mac_address: String,
    #[serde(default)]
    pub fixed_ips: Vec<FixedIpRef>,
    #[serde(default)]
    pub security_groups: Vec<String>,
    #[serde(default = "default_true")]
    pub admin_state_up: bool,
    #[serde(rename = "binding:host_id", default)]
    pub binding_host_id: Option<String>,
    #[serde(rename = "binding:vif_type", default)]
    pub binding_vif_type: Option<String>,
}

impl Port {
    /// The device this port is bound to, treating `""` as unbound.
    pub fn bound_device(&self) -> Option<&str> {
        self.device_id.as_deref().filter(|d| !d.is_empty())
    }

    /// Whether any fixed address on this port equals `address`.
    pub fn has_fixed_address(&self, address: &str) -> bool {
        self.fixed_ips.iter().any(|ip| ip.ip_address == address)
    }
}

/// Body of `POST /v2.0/ports`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PortCreate {
    pub network_id: String,
    pub tenant_id: String,
    pub device_id: String,
    pub device_owner: String,
    pub admin_state_up: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fixed_ips: Vec<FixedIpRequest>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(rename = "binding:host_id", skip_serializing_if = "Option::is_none")]
    pub binding_host_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rxtx_factor: Option<f64>,
}

/// Body of `PUT /v2.0/ports/{id}`.
///
/// Outer `None` leaves a field untouched; `Some(None)` sends `null`, which
/// clears it on the service side.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PortUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_owner: Option<String>,
    #[serde(rename = "binding:host_id", skip_serializing_if = "Option::is_none")]
    pub binding_host_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rxtx_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ips: Option<Vec<FixedIpRequest>>,
}

// ── Floating IPs ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingIp {
    pub id: String,
    pub floating_ip_address: String,
    pub floating_network_id: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub port_id: Option<String>,
    #[serde(default)]
    pub fixed_ip_address: Option<String>,
}

/// Body of `POST /v2.0/floatingips`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloatingIpCreate {
    pub floating_network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// Body of `PUT /v2.0/floatingips/{id}`. `port_id: None` disassociates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloatingIpUpdate {
    pub port_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ip_address: Option<String>,
}

// ── Security groups ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub description: String,
}

// ── Extensions & agents ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub host: String,
    pub agent_type: String,
    pub alive: bool,
    #[serde(default)]
    pub binary: Option<String>,
}

// ── List filters ─────────────────────────────────────────────────────

/// Query filters for `GET /v2.0/networks`. Multiple ids are sent as
/// repeated `id=` parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkFilter {
    pub tenant_id: Option<String>,
    pub shared: Option<bool>,
    pub ids: Vec<String>,
    pub name: Option<String>,
    pub router_external: Option<bool>,
}

impl NetworkFilter {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(ref t) = self.tenant_id {
            q.push(("tenant_id", t.clone()));
        }
        if let Some(shared) = self.shared {
            q.push(("shared", shared.to_string()));
        }
        for id in &self.ids {
            q.push(("id", id.clone()));
        }
        if let Some(ref n) = self.name {
            q.push(("name", n.clone()));
        }
        if let Some(ext) = self.router_external {
            q.push(("router:external", ext.to_string()));
        }
        q
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortFilter {
    pub device_id: Option<String>,
    pub device_owner: Option<String>,
    pub tenant_id: Option<String>,
    pub network_id: Option<String>,
    /// Matches ports carrying this fixed address (`fixed_ips=ip_address=...`).
    pub fixed_ip_address: Option<String>,
}

impl PortFilter {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(ref d) = self.device_id {
            q.push(("device_id", d.clone()));
        }
        if let Some(ref o) = self.device_owner {
            q.push(("device_owner", o.clone()));
        }
        if let Some(ref t) = self.tenant_id {
            q.push(("tenant_id", t.clone()));
        }
        if let Some(ref n) = self.network_id {
            q.push(("network_id", n.clone()));
        }
        if let Some(ref ip) = self.fixed_ip_address {
            q.push(("fixed_ips", format!("ip_address={ip}")));
        }
        q
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubnetFilter {
    pub ids: Vec<String>,
    pub network_id: Option<String>,
}

impl SubnetFilter {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q: Vec<(&'static str, String)> =
            self.ids.iter().map(|id| ("id", id.clone())).collect();
        if let Some(ref n) = self.network_id {
            q.push(("network_id", n.clone()));
        }
        q
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FloatingIpFilter {
    pub floating_ip_address: Option<String>,
    pub fixed_ip_address: Option<String>,
    pub port_id: Option<String>,
    pub tenant_id: Option<String>,
}

impl FloatingIpFilter {
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(ref a) = self.floating_ip_address {
            q.push(("floating_ip_address", a.clone()));
        }
        if let Some(ref a) = self.fixed_ip_address {
            q.push(("fixed_ip_address", a.clone()));
        }
        if let Some(ref p) = self.port_id {
            q.push(("port_id", p.clone()));
        }
        if let Some(ref t) = self.tenant_id {
            q.push(("tenant_id", t.clone()));
        }
        q
    }
}
