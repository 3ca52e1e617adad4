// ── Network info builder ──
//
// Reconciles the ports, subnets and floating IPs the service reports for
// an instance into one ordered `NetworkInfo` snapshot.

use tracing::{debug, warn};

use netbind_api::{FloatingIpFilter, PortFilter, SubnetFilter};

use crate::config::OrchestratorConfig;
use crate::error::CoreError;
use crate::model::network_info::nic_name;
use crate::model::{
    FixedIp, Instance, Network, NetworkInfo, NetworkView, Port, SubnetView, VIF_TYPE_BRIDGE,
    VIF_TYPE_OVS, Vif,
};
use crate::remote::NetworkService;
use crate::selector::{available_networks, ensure_requested_ordering};

const DHCP_DEVICE_OWNER: &str = "network:dhcp";

pub struct NetworkInfoBuilder<'a> {
    pub tenant: &'a dyn NetworkService,
    pub admin: &'a dyn NetworkService,
    pub config: &'a OrchestratorConfig,
}

impl NetworkInfoBuilder<'_> {
    /// Build the snapshot for `instance`.
    ///
    /// Without `networks`, the preferred order comes from `cached` and the
    /// candidate networks are everything available to the tenant. With
    /// `networks` (an attach), the cached VIFs are carried over untouched
    /// and only ports on `networks` are added after them.
    pub async fn build(
        &self,
        instance: &Instance,
        networks: Option<&[Network]>,
        cached: Option<&NetworkInfo>,
    ) -> Result<NetworkInfo, CoreError> {
        let filter = PortFilter {
            tenant_id: Some(instance.project_id.clone()),
            device_id: Some(instance.uuid.clone()),
            ..PortFilter::default()
        };
        let mut ports = self.admin.list_ports(&filter).await?;

        let mut vifs: Vec<Vif> = Vec::new();
        let available;
        let (networks, net_ids): (&[Network], Vec<String>) = match networks {
            None => {
                available =
                    available_networks(self.tenant, &instance.project_id, &[]).await?;
                let mut ids = cached.map(NetworkInfo::network_ids).unwrap_or_default();
                if ids.is_empty() {
                    ids = available.iter().map(|n| n.id.clone()).collect();
                }
                (&available, ids)
            }
            Some(nets) => {
                if let Some(cached) = cached {
                    vifs.extend(cached.vifs().iter().cloned());
                }
                (nets, nets.iter().map(|n| n.id.clone()).collect())
            }
        };

        ports.retain(|p| net_ids.contains(&p.network_id));
        ensure_requested_ordering(&mut ports, &net_ids, |p| p.network_id.as_str());

        for port in &ports {
            let Some(net) = networks.iter().find(|n| n.id == port.network_id) else {
                warn!(port_id = %port.id, network_id = %port.network_id, "port network no longer available, skipping");
                continue;
            };
            vifs.push(self.build_vif(port, net).await?);
        }

        debug!(instance = %instance.uuid, vifs = vifs.len(), "built network info");
        Ok(NetworkInfo::new(vifs))
    }

    async fn build_vif(&self, port: &Port, net: &Network) -> Result<Vif, CoreError> {
        let mut fixed_ips = Vec::with_capacity(port.fixed_ips.len());
        for ip in &port.fixed_ips {
            let floating_ips = self
                .floating_ips_for(&ip.ip_address, &port.id)
                .await?;
            fixed_ips.push(FixedIp {
                address: ip.ip_address.clone(),
                floating_ips,
            });
        }

        let mut subnets = self.subnets_for_port(port).await?;
        for subnet in &mut subnets {
            subnet.ips = fixed_ips
                .iter()
                .filter(|ip| ip.is_in_subnet(&subnet.cidr))
                .cloned()
                .collect();
        }

        let vif_type = port.binding_vif_type.clone();
        let mut bridge = None;
        let mut ovs_interfaceid = None;
        let mut should_create_bridge = None;
        match vif_type.as_deref() {
            Some(VIF_TYPE_OVS) => {
                bridge = Some(nic_name(&self.config.integration_bridge));
                ovs_interfaceid = Some(port.id.clone());
            }
            Some(VIF_TYPE_BRIDGE) => {
                bridge = Some(nic_name(&format!("brq{}", port.network_id)));
                should_create_bridge = Some(true);
            }
            _ => {}
        }

        Ok(Vif {
            id: port.id.clone(),
            address: port.mac_address.clone(),
            network: NetworkView {
                id: port.network_id.clone(),
                bridge,
                injected: self.config.flat_injected,
                label: net.name.clone(),
                tenant_id: net.tenant_id.clone(),
                subnets,
                should_create_bridge,
            },
            vif_type,
            ovs_interfaceid,
            devname: Some(nic_name(&format!("tap{}", port.id))),
        })
    }

    /// Floating addresses bound to (`fixed_address`, `port_id`). A service
    /// without the L3 API answers 404, which means "none".
    async fn floating_ips_for(
        &self,
        fixed_address: &str,
        port_id: &str,
    ) -> Result<Vec<String>, CoreError> {
        let filter = FloatingIpFilter {
            fixed_ip_address: Some(fixed_address.to_owned()),
            port_id: Some(port_id.to_owned()),
            ..FloatingIpFilter::default()
        };
        match self.admin.list_floating_ips(&filter).await {
            Ok(fips) => Ok(fips.into_iter().map(|f| f.floating_ip_address).collect()),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn subnets_for_port(&self, port: &Port) -> Result<Vec<SubnetView>, CoreError> {
        // Listing subnets with an empty id filter would return every
        // subnet the tenant can see.
        if port.fixed_ips.is_empty() {
            return Ok(Vec::new());
        }

        let filter = SubnetFilter {
            ids: port.fixed_ips.iter().map(|ip| ip.subnet_id.clone()).collect(),
            network_id: None,
        };
        let subnets = self.tenant.list_subnets(&filter).await?;

        let mut views = Vec::with_capacity(subnets.len());
        for subnet in subnets {
            let dhcp_filter = PortFilter {
                network_id: Some(subnet.network_id.clone()),
                device_owner: Some(DHCP_DEVICE_OWNER.to_owned()),
                ..PortFilter::default()
            };
            let dhcp_ports = self.tenant.list_ports(&dhcp_filter).await?;
            let dhcp_server = dhcp_ports
                .iter()
                .flat_map(|p| p.fixed_ips.iter())
                .find(|ip| ip.subnet_id == subnet.id)
                .map(|ip| ip.ip_address.clone());

            views.push(SubnetView {
                cidr: subnet.cidr,
                gateway: subnet.gateway_ip,
                dhcp_server,
                dns: subnet.dns_nameservers,
                ips: Vec::new(),
            });
        }
        Ok(views)
    }
}
