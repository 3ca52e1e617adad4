// ── Floating IP manager ──
//
// Allocation, release, association and lookup of floating addresses.
// Pools are external networks; a pool may be named by id or by name.

use std::collections::HashMap;

use tracing::{debug, info};
use uuid::Uuid;

use netbind_api::{FloatingIpCreate, FloatingIpFilter, FloatingIpUpdate, NetworkFilter, PortFilter};

use crate::error::CoreError;
use crate::model::{FloatingIp, FloatingIpInfo, FloatingIpPool, Instance, Network, Port};
use crate::remote::NetworkService;

pub struct FloatingIpManager<'a> {
    api: &'a dyn NetworkService,
}

impl<'a> FloatingIpManager<'a> {
    pub fn new(api: &'a dyn NetworkService) -> Self {
        Self { api }
    }

    // ── Lookups ──────────────────────────────────────────────────────

    /// The single floating IP with `address`.
    pub async fn by_address(&self, address: &str) -> Result<FloatingIp, CoreError> {
        let filter = FloatingIpFilter {
            floating_ip_address: Some(address.to_owned()),
            ..FloatingIpFilter::default()
        };
        let mut fips = self.api.list_floating_ips(&filter).await?;
        match fips.len() {
            0 => Err(CoreError::FloatingIpNotFoundForAddress {
                address: address.to_owned(),
            }),
            1 => Ok(fips.remove(0)),
            _ => Err(CoreError::FloatingIpMultipleFoundForAddress {
                address: address.to_owned(),
            }),
        }
    }

    /// Resolve a pool name or id to the external network's id.
    pub async fn pool_id(&self, name_or_id: &str) -> Result<String, CoreError> {
        let mut filter = NetworkFilter {
            router_external: Some(true),
            ..NetworkFilter::default()
        };
        if Uuid::parse_str(name_or_id).is_ok() {
            filter.ids = vec![name_or_id.to_owned()];
        } else {
            filter.name = Some(name_or_id.to_owned());
        }

        let mut nets = self.api.list_networks(&filter).await?;
        match nets.len() {
            0 => Err(CoreError::FloatingIpPoolNotFound {
                pool: name_or_id.to_owned(),
            }),
            1 => Ok(nets.remove(0).id),
            _ => Err(CoreError::NoUniqueMatch {
                message: format!("Multiple floating IP pools matches found for name '{name_or_id}'"),
            }),
        }
    }

    /// External networks usable as pools.
    pub async fn pool_networks(&self) -> Result<Vec<Network>, CoreError> {
        let filter = NetworkFilter {
            router_external: Some(true),
            ..NetworkFilter::default()
        };
        Ok(self.api.list_networks(&filter).await?)
    }

    /// Pool names (the network id stands in for an unnamed pool).
    pub async fn pools(&self) -> Result<Vec<FloatingIpPool>, CoreError> {
        Ok(self
            .pool_networks()
            .await?
            .into_iter()
            .map(|n| FloatingIpPool {
                name: pool_label(&n),
            })
            .collect())
    }

    /// The instance's single port carrying fixed address `address`.
    async fn port_for_fixed_address(
        &self,
        instance: &Instance,
        address: &str,
    ) -> Result<String, CoreError> {
        let filter = PortFilter {
            device_id: Some(instance.uuid.clone()),
            device_owner: Some(instance.device_owner()),
            ..PortFilter::default()
        };
        let mut matching: Vec<Port> = self
            .api
            .list_ports(&filter)
            .await?
            .into_iter()
            .filter(|p| p.has_fixed_address(address))
            .collect();
        match matching.len() {
            0 => Err(CoreError::FixedIpNotFoundForAddress {
                address: address.to_owned(),
            }),
            1 => Ok(matching.remove(0).id),
            _ => Err(CoreError::FixedIpMultipleFoundForAddress {
                instance_uuid: instance.uuid.clone(),
                address: address.to_owned(),
            }),
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Bind `floating_address` to the instance's port holding `fixed_address`.
    pub async fn associate(
        &self,
        instance: &Instance,
        floating_address: &str,
        fixed_address: &str,
    ) -> Result<(), CoreError> {
        let port_id = self.port_for_fixed_address(instance, fixed_address).await?;
        let fip = self.by_address(floating_address).await?;
        let update = FloatingIpUpdate {
            port_id: Some(port_id.clone()),
            fixed_ip_address: Some(fixed_address.to_owned()),
        };
        self.api.update_floating_ip(&fip.id, &update).await?;
        info!(floating = floating_address, port_id = %port_id, "associated floating IP");
        Ok(())
    }

    pub async fn disassociate(&self, floating_address: &str) -> Result<(), CoreError> {
        let fip = self.by_address(floating_address).await?;
        let update = FloatingIpUpdate {
            port_id: None,
            fixed_ip_address: None,
        };
        self.api.update_floating_ip(&fip.id, &update).await?;
        info!(floating = floating_address, "disassociated floating IP");
        Ok(())
    }

    /// Allocate a new floating IP from `pool`; returns its address.
    pub async fn allocate(&self, pool: &str) -> Result<String, CoreError> {
        let pool_id = self.pool_id(pool).await?;
        let fip = self
            .api
            .create_floating_ip(&FloatingIpCreate {
                floating_network_id: pool_id,
                tenant_id: None,
            })
            .await?;
        info!(address = %fip.floating_ip_address, pool, "allocated floating IP");
        Ok(fip.floating_ip_address)
    }

    /// Delete an unbound floating IP. A bound one is refused and left as is.
    pub async fn release(&self, address: &str) -> Result<(), CoreError> {
        let fip = self.by_address(address).await?;
        if fip.port_id.is_some() {
            return Err(CoreError::FloatingIpAssociated {
                address: address.to_owned(),
            });
        }
        self.api.delete_floating_ip(&fip.id).await?;
        info!(address, "released floating IP");
        Ok(())
    }

    // ── Views ────────────────────────────────────────────────────────

    pub async fn get(&self, floating_ip_id: &str) -> Result<FloatingIpInfo, CoreError> {
        let fip = self.api.show_floating_ip(floating_ip_id).await?;
        self.describe(fip).await
    }

    pub async fn get_by_address(&self, address: &str) -> Result<FloatingIpInfo, CoreError> {
        let fip = self.by_address(address).await?;
        self.describe(fip).await
    }

    /// All floating IPs of `project_id`, joined with pools and ports.
    pub async fn by_project(&self, project_id: &str) -> Result<Vec<FloatingIpInfo>, CoreError> {
        let fips = self
            .api
            .list_floating_ips(&FloatingIpFilter {
                tenant_id: Some(project_id.to_owned()),
                ..FloatingIpFilter::default()
            })
            .await?;

        let pools: HashMap<String, Network> = self
            .pool_networks()
            .await?
            .into_iter()
            .map(|n| (n.id.clone(), n))
            .collect();
        let ports: HashMap<String, Port> = self
            .api
            .list_ports(&PortFilter {
                tenant_id: Some(project_id.to_owned()),
                ..PortFilter::default()
            })
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        debug!(project_id, count = fips.len(), "listing project floating IPs");

        fips.into_iter()
            .map(|fip| format_floating_ip(fip, &pools, &ports))
            .collect()
    }

    /// Device id of the port `address` is bound to, if any.
    pub async fn instance_for_address(&self, address: &str) -> Result<Option<String>, CoreError> {
        let fip = self.by_address(address).await?;
        let Some(port_id) = fip.port_id else {
            return Ok(None);
        };
        let port = self.api.show_port(&port_id).await?;
        Ok(port.bound_device().map(str::to_owned))
    }

    async fn describe(&self, fip: FloatingIp) -> Result<FloatingIpInfo, CoreError> {
        let pool = self.api.show_network(&fip.floating_network_id).await?;
        let pools = HashMap::from([(pool.id.clone(), pool)]);
        let mut ports = HashMap::new();
        if let Some(port_id) = &fip.port_id {
            let port = self.api.show_port(port_id).await?;
            ports.insert(port.id.clone(), port);
        }
        format_floating_ip(fip, &pools, &ports)
    }
}

fn pool_label(net: &Network) -> String {
    if net.name.is_empty() {
        net.id.clone()
    } else {
        net.name.clone()
    }
}

fn format_floating_ip(
    fip: FloatingIp,
    pools: &HashMap<String, Network>,
    ports: &HashMap<String, Port>,
) -> Result<FloatingIpInfo, CoreError> {
    let pool = pools
        .get(&fip.floating_network_id)
        .map(pool_label)
        .ok_or_else(|| CoreError::FloatingIpPoolNotFound {
            pool: fip.floating_network_id.clone(),
        })?;
    let instance_uuid = fip
        .port_id
        .as_ref()
        .and_then(|id| ports.get(id))
        .and_then(Port::bound_device)
        .map(str::to_owned);

    Ok(FloatingIpInfo {
        id: fip.id,
        address: fip.floating_ip_address,
        pool,
        project_id: fip.tenant_id,
        fixed_ip_id: fip.port_id,
        fixed_ip_address: fip.fixed_ip_address,
        instance_uuid,
    })
}
