//! The attachment snapshot handed back to the instance lifecycle.
//!
//! A [`NetworkInfo`] is an ordered list of [`Vif`]s, one per attached port,
//! in the instance's preferred network order. It is built once by the
//! network-info builder and never mutated afterwards; the instance store
//! persists it as JSON.

use std::net::IpAddr;

use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};

/// Maximum length of a host-side interface or bridge name.
pub const NIC_NAME_LEN: usize = 14;

pub const VIF_TYPE_OVS: &str = "ovs";
pub const VIF_TYPE_BRIDGE: &str = "bridge";

/// Truncate an interface name to [`NIC_NAME_LEN`] characters.
pub fn nic_name(name: &str) -> String {
    name.chars().take(NIC_NAME_LEN).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedIp {
    pub address: String,
    #[serde(default)]
    pub floating_ips: Vec<String>,
}

impl FixedIp {
    /// Whether this address falls inside `cidr`. Unparseable input is
    /// never "inside".
    pub fn is_in_subnet(&self, cidr: &str) -> bool {
        let (Ok(net), Ok(addr)) = (cidr.parse::<IpNetwork>(), self.address.parse::<IpAddr>())
        else {
            return false;
        };
        net.contains(addr)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetView {
    pub cidr: String,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub dhcp_server: Option<String>,
    #[serde(default)]
    pub dns: Vec<String>,
    #[serde(default)]
    pub ips: Vec<FixedIp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkView {
    pub id: String,
    #[serde(default)]
    pub bridge: Option<String>,
    #[serde(default)]
    pub injected: bool,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub subnets: Vec<SubnetView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_create_bridge: Option<bool>,
}

/// One virtual interface: a port as seen from the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vif {
    /// Port id.
    pub id: String,
    /// MAC address.
    pub address: String,
    pub network: NetworkView,
    #[serde(rename = "type", default)]
    pub vif_type: Option<String>,
    #[serde(default)]
    pub ovs_interfaceid: Option<String>,
    #[serde(default)]
    pub devname: Option<String>,
}

impl Vif {
    pub fn fixed_ips(&self) -> impl Iterator<Item = &FixedIp> {
        self.network.subnets.iter().flat_map(|s| s.ips.iter())
    }
}

/// Ordered, immutable attachment snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkInfo(Vec<Vif>);

impl NetworkInfo {
    pub fn new(vifs: Vec<Vif>) -> Self {
        Self(vifs)
    }

    pub fn vifs(&self) -> &[Vif] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Network ids in attachment order (duplicates preserved).
    pub fn network_ids(&self) -> Vec<String> {
        self.0.iter().map(|v| v.network.id.clone()).collect()
    }

    /// A new snapshot holding only the VIFs whose port id is in `port_ids`.
    pub fn only_ports(&self, port_ids: &[String]) -> Self {
        Self(
            self.0
                .iter()
                .filter(|v| port_ids.contains(&v.id))
                .cloned()
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a NetworkInfo {
    type Item = &'a Vif;
    type IntoIter = std::slice::Iter<'a, Vif>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nic_names_are_truncated() {
        assert_eq!(nic_name("tapabcdef01-2345-6789"), "tapabcdef01-23");
        assert_eq!(nic_name("br-int"), "br-int");
    }

    #[test]
    fn fixed_ip_subnet_membership() {
        let ip = FixedIp {
            address: "10.0.0.5".into(),
            floating_ips: vec![],
        };
        assert!(ip.is_in_subnet("10.0.0.0/24"));
        assert!(!ip.is_in_subnet("10.0.1.0/24"));
        assert!(!ip.is_in_subnet("fd00::/64"));
        assert!(!ip.is_in_subnet("not-a-cidr"));
    }

    #[test]
    fn snapshot_serializes_as_plain_list() {
        let info = NetworkInfo::new(vec![Vif {
            id: "port-1".into(),
            address: "fa:16:3e:00:00:01".into(),
            network: NetworkView {
                id: "net-a".into(),
                bridge: Some("br-int".into()),
                injected: false,
                label: "private".into(),
                tenant_id: Some("t1".into()),
                subnets: vec![],
                should_create_bridge: None,
            },
            vif_type: Some(VIF_TYPE_OVS.into()),
            ovs_interfaceid: Some("port-1".into()),
            devname: Some("tapport-1".into()),
        }]);

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value[0]["type"], json!("ovs"));
        assert!(value[0]["network"].get("should_create_bridge").is_none());

        let back: NetworkInfo = serde_json::from_value(value).unwrap();
        assert_eq!(back.network_ids(), vec!["net-a".to_string()]);
    }
}
