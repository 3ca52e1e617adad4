// ── Orchestrator facade ──
//
// Entry point for the instance lifecycle. Owns the extension cache and
// the collaborators, and wires the selector, allocator, builder and
// floating IP manager together. Every remote call is awaited in order;
// concurrent calls for the same instance must be serialized by the caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use netbind_api::{NetworkFilter, PortFilter, PortUpdate, SubnetFilter};

use crate::allocator::{self, BindPlan, Capabilities, MacPool};
use crate::collab::{InstanceStore, SecurityGroupNotifier};
use crate::config::OrchestratorConfig;
use crate::error::CoreError;
use crate::extensions::{Clock, ExtensionCache, PORT_BINDING_EXT, QOS_EXT};
use crate::floating_ips::FloatingIpManager;
use crate::model::{
    AgentStatus, AllocateRequest, FixedIpRequest, FloatingIpInfo, FloatingIpPool, Instance,
    Network, NetworkInfo, Port, RequestContext, RequestedNetwork,
};
use crate::nw_info::NetworkInfoBuilder;
use crate::remote::NetworkService;
use crate::security_groups;
use crate::selector::{self, available_networks};
use crate::session::ClientProvider;

/// The platform services the orchestrator depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub clients: Arc<dyn ClientProvider>,
    pub store: Arc<dyn InstanceStore>,
    pub notifier: Arc<dyn SecurityGroupNotifier>,
}

// ── Orchestrator ─────────────────────────────────────────────────────

/// Cheaply cloneable via `Arc<OrchestratorInner>`.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<OrchestratorInner>,
}

struct OrchestratorInner {
    config: OrchestratorConfig,
    clients: Arc<dyn ClientProvider>,
    store: Arc<dyn InstanceStore>,
    notifier: Arc<dyn SecurityGroupNotifier>,
    extensions: ExtensionCache,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig, collaborators: Collaborators) -> Self {
        let extensions = ExtensionCache::new(config.extension_sync_interval);
        Self::assemble(config, collaborators, extensions)
    }

    /// Like [`new`](Self::new), with an injected clock for the extension cache.
    pub fn with_clock(
        config: OrchestratorConfig,
        collaborators: Collaborators,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let extensions = ExtensionCache::with_clock(config.extension_sync_interval, clock);
        Self::assemble(config, collaborators, extensions)
    }

    fn assemble(
        config: OrchestratorConfig,
        collaborators: Collaborators,
        extensions: ExtensionCache,
    ) -> Self {
        Self {
            inner: Arc::new(OrchestratorInner {
                config,
                clients: collaborators.clients,
                store: collaborators.store,
                notifier: collaborators.notifier,
                extensions,
            }),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    pub fn extensions(&self) -> &ExtensionCache {
        &self.inner.extensions
    }

    // ── Allocation ───────────────────────────────────────────────────

    /// Attach the instance to the requested (or all available) networks.
    ///
    /// Returns only the VIFs of ports bound or created by this call. Every
    /// requested network must resolve before any port is touched. On
    /// failure every port mutated so far is rolled back and the original
    /// error is returned.
    ///
    /// # Cancellation
    ///
    /// The future must be driven to completion once started. Rollback runs
    /// inside it, so dropping it while ports are being bound leaves those
    /// ports attached to the instance.
    pub async fn allocate_for_instance(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
        request: &AllocateRequest,
    ) -> Result<NetworkInfo, CoreError> {
        debug!(instance = %instance.label(), "allocate_for_instance()");
        if instance.project_id.is_empty() {
            return Err(CoreError::InvalidInput {
                reason: format!("empty project id for instance {}", instance.label()),
            });
        }

        let tenant = self.inner.clients.tenant(ctx).await?;
        let mut macs = MacPool::new(request.macs.as_deref());
        let parsed = allocator::parse_request(
            tenant.as_ref(),
            instance,
            &request.requested_networks,
            &mut macs,
        )
        .await?;

        let nets =
            available_networks(tenant.as_ref(), &instance.project_id, &parsed.network_ids).await?;
        selector::ensure_all_found(&parsed.network_ids, &nets)?;

        let security_group_ids = if request.security_groups.is_empty() {
            Vec::new()
        } else {
            let groups = tenant
                .list_security_groups(Some(&instance.project_id))
                .await?;
            security_groups::resolve(&request.security_groups, &groups)?
        };
        allocator::check_security_group_policy(&nets, !request.security_groups.is_empty())?;

        let admin = self.inner.clients.admin().await?;
        let capabilities = self.capabilities(admin.as_ref()).await?;
        let port_client = if capabilities.port_binding {
            admin.as_ref()
        } else {
            tenant.as_ref()
        };

        let plan = BindPlan {
            instance,
            request: &parsed,
            security_group_ids: &security_group_ids,
            capabilities,
        };
        let ledger = match allocator::bind_ports(port_client, &nets, &plan, &mut macs).await {
            Ok(ledger) => ledger,
            Err(failure) => {
                warn!(instance = %instance.uuid, error = %failure.error, "allocation failed");
                allocator::compensate(
                    tenant.as_ref(),
                    admin.as_ref(),
                    &failure.ledger,
                    capabilities.port_binding,
                )
                .await;
                return Err(failure.error);
            }
        };
        info!(
            instance = %instance.uuid,
            touched = ledger.touched.len(),
            created = ledger.created.len(),
            "allocated ports"
        );

        self.notify_membership(instance, true).await;

        let info = self
            .refresh_nw_info(tenant.as_ref(), admin.as_ref(), instance, Some(&nets))
            .await?;
        Ok(info.only_ports(&ledger.port_ids()))
    }

    /// Attach one port or network (interface attach).
    pub async fn allocate_port_for_instance(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
        port_id: Option<&str>,
        network_id: Option<&str>,
        requested_ip: Option<&str>,
    ) -> Result<NetworkInfo, CoreError> {
        let request = AllocateRequest {
            requested_networks: vec![RequestedNetwork {
                network_id: network_id.map(str::to_owned),
                fixed_ip: requested_ip.map(str::to_owned),
                port_id: port_id.map(str::to_owned),
            }],
            ..AllocateRequest::default()
        };
        self.allocate_for_instance(ctx, instance, &request).await
    }

    /// Delete every port owned by the instance. Individual delete failures
    /// are logged and skipped.
    pub async fn deallocate_for_instance(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
    ) -> Result<(), CoreError> {
        debug!(instance = %instance.label(), "deallocate_for_instance()");
        let tenant = self.inner.clients.tenant(ctx).await?;
        let ports = tenant
            .list_ports(&PortFilter {
                device_id: Some(instance.uuid.clone()),
                ..PortFilter::default()
            })
            .await?;

        for port in &ports {
            if let Err(e) = tenant.delete_port(&port.id).await {
                error!(port_id = %port.id, error = %e, "failed to delete port");
            }
        }

        self.notify_membership(instance, false).await;
        self.inner
            .store
            .save_network_info(&instance.uuid, &NetworkInfo::default())
            .await?;
        info!(instance = %instance.uuid, ports = ports.len(), "deallocated instance");
        Ok(())
    }

    /// Detach one port and return the instance's rebuilt network info.
    pub async fn deallocate_port_for_instance(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
        port_id: &str,
    ) -> Result<NetworkInfo, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        if let Err(e) = tenant.delete_port(port_id).await {
            error!(port_id, error = %e, "failed to delete port");
        }
        self.notify_membership(instance, false).await;
        self.get_instance_nw_info(ctx, instance).await
    }

    // ── Network info ─────────────────────────────────────────────────

    /// Rebuild the instance's network info and write it back to the store.
    pub async fn get_instance_nw_info(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
    ) -> Result<NetworkInfo, CoreError> {
        debug!(instance = %instance.label(), "get_instance_nw_info()");
        let tenant = self.inner.clients.tenant(ctx).await?;
        let admin = self.inner.clients.admin().await?;
        self.refresh_nw_info(tenant.as_ref(), admin.as_ref(), instance, None)
            .await
    }

    async fn refresh_nw_info(
        &self,
        tenant: &dyn NetworkService,
        admin: &dyn NetworkService,
        instance: &Instance,
        networks: Option<&[Network]>,
    ) -> Result<NetworkInfo, CoreError> {
        let cached = self.inner.store.load_network_info(&instance.uuid).await?;
        let builder = NetworkInfoBuilder {
            tenant,
            admin,
            config: &self.inner.config,
        };
        let info = builder.build(instance, networks, cached.as_ref()).await?;
        self.inner
            .store
            .save_network_info(&instance.uuid, &info)
            .await?;
        Ok(info)
    }

    // ── Fixed IPs ────────────────────────────────────────────────────

    /// Add a fixed IP on `network_id` to the first of the instance's ports
    /// on that network that accepts one.
    pub async fn add_fixed_ip_to_instance(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
        network_id: &str,
    ) -> Result<NetworkInfo, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        let not_found = || CoreError::NetworkNotFoundForInstance {
            instance_uuid: instance.uuid.clone(),
        };

        let subnets = tenant
            .list_subnets(&SubnetFilter {
                network_id: Some(network_id.to_owned()),
                ..SubnetFilter::default()
            })
            .await?;
        if subnets.is_empty() {
            return Err(not_found());
        }

        let ports = tenant
            .list_ports(&PortFilter {
                device_id: Some(instance.uuid.clone()),
                device_owner: Some(instance.device_owner()),
                network_id: Some(network_id.to_owned()),
                ..PortFilter::default()
            })
            .await?;

        for port in &ports {
            for subnet in &subnets {
                let mut fixed_ips: Vec<FixedIpRequest> =
                    port.fixed_ips.iter().map(FixedIpRequest::from).collect();
                fixed_ips.push(FixedIpRequest::on_subnet(subnet.id.clone()));
                let update = PortUpdate {
                    fixed_ips: Some(fixed_ips),
                    ..PortUpdate::default()
                };
                match tenant.update_port(&port.id, &update).await {
                    Ok(_) => {
                        info!(port_id = %port.id, subnet_id = %subnet.id, "added fixed IP");
                        return self.get_instance_nw_info(ctx, instance).await;
                    }
                    Err(e) => {
                        debug!(port_id = %port.id, subnet_id = %subnet.id, error = %e,
                            "unable to add fixed IP on subnet");
                    }
                }
            }
        }

        Err(not_found())
    }

    /// Remove `address` from the first of the instance's ports carrying it.
    pub async fn remove_fixed_ip_from_instance(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
        address: &str,
    ) -> Result<NetworkInfo, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        let ports = tenant
            .list_ports(&PortFilter {
                device_id: Some(instance.uuid.clone()),
                device_owner: Some(instance.device_owner()),
                fixed_ip_address: Some(address.to_owned()),
                ..PortFilter::default()
            })
            .await?;

        let Some(port) = ports.first() else {
            return Err(CoreError::FixedIpNotFoundForInstance {
                instance_uuid: instance.uuid.clone(),
                address: address.to_owned(),
            });
        };

        let remaining = port
            .fixed_ips
            .iter()
            .filter(|ip| ip.ip_address != address)
            .map(FixedIpRequest::from)
            .collect();
        let update = PortUpdate {
            fixed_ips: Some(remaining),
            ..PortUpdate::default()
        };
        if let Err(e) = tenant.update_port(&port.id, &update).await {
            warn!(port_id = %port.id, error = %e, "unable to remove fixed IP");
        }
        self.get_instance_nw_info(ctx, instance).await
    }

    /// Instance uuid owning fixed address `address`.
    pub async fn get_fixed_ip_by_address(
        &self,
        ctx: &RequestContext,
        address: &str,
    ) -> Result<String, CoreError> {
        let mut uuids = self.instance_uuids_by_ip(ctx, address).await?;
        match uuids.len() {
            0 => Err(CoreError::FixedIpNotFoundForAddress {
                address: address.to_owned(),
            }),
            1 => Ok(uuids.remove(0)),
            _ => Err(CoreError::FixedIpAssociatedWithMultipleInstances {
                address: address.to_owned(),
            }),
        }
    }

    /// Instance uuids matching an anchored, dot-escaped IP filter such as
    /// `^10\.0\.0\.5$`.
    pub async fn get_instance_uuids_by_ip_filter(
        &self,
        ctx: &RequestContext,
        ip_filter: &str,
    ) -> Result<Vec<String>, CoreError> {
        let ip = ip_filter.strip_prefix('^').unwrap_or(ip_filter);
        let ip = ip.strip_suffix('$').unwrap_or(ip);
        let ip = ip.replace("\\.", ".");
        self.instance_uuids_by_ip(ctx, &ip).await
    }

    async fn instance_uuids_by_ip(
        &self,
        ctx: &RequestContext,
        address: &str,
    ) -> Result<Vec<String>, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        let ports = tenant
            .list_ports(&PortFilter {
                fixed_ip_address: Some(address.to_owned()),
                ..PortFilter::default()
            })
            .await?;
        Ok(ports
            .iter()
            .filter_map(Port::bound_device)
            .map(str::to_owned)
            .collect())
    }

    // ── Validation ───────────────────────────────────────────────────

    /// Check that the tenant may use `requested` before scheduling.
    pub async fn validate_networks(
        &self,
        ctx: &RequestContext,
        requested: &[RequestedNetwork],
    ) -> Result<(), CoreError> {
        debug!(?requested, "validate_networks()");
        if requested.is_empty() {
            return Ok(());
        }
        let tenant = self.inner.clients.tenant(ctx).await?;

        let mut net_ids: Vec<String> = Vec::new();
        for req in requested {
            let mut net_id = req.network_id.clone();
            if let Some(port_id) = &req.port_id {
                let port = match tenant.show_port(port_id).await {
                    Ok(port) => port,
                    Err(e) if e.is_not_found() => {
                        return Err(CoreError::PortNotFound {
                            port_id: port_id.clone(),
                        });
                    }
                    Err(e) => return Err(e.into()),
                };
                if port.bound_device().is_some() {
                    return Err(CoreError::PortInUse {
                        port_id: port_id.clone(),
                    });
                }
                net_id = Some(port.network_id);
            }
            let Some(net_id) = net_id else {
                return Err(CoreError::InvalidInput {
                    reason: "requested network entry names neither a network nor a port".into(),
                });
            };
            if net_ids.contains(&net_id) {
                return Err(CoreError::NetworkDuplicated { network_id: net_id });
            }
            net_ids.push(net_id);
        }

        let nets = available_networks(tenant.as_ref(), &ctx.project_id, &net_ids).await?;
        selector::ensure_all_found(&net_ids, &nets)
    }

    // ── Floating IPs ─────────────────────────────────────────────────

    pub async fn associate_floating_ip(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
        floating_address: &str,
        fixed_address: &str,
    ) -> Result<NetworkInfo, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        FloatingIpManager::new(tenant.as_ref())
            .associate(instance, floating_address, fixed_address)
            .await?;
        self.get_instance_nw_info(ctx, instance).await
    }

    pub async fn disassociate_floating_ip(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
        address: &str,
    ) -> Result<NetworkInfo, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        FloatingIpManager::new(tenant.as_ref())
            .disassociate(address)
            .await?;
        self.get_instance_nw_info(ctx, instance).await
    }

    /// Allocate from `pool`, or from the configured default pool.
    pub async fn allocate_floating_ip(
        &self,
        ctx: &RequestContext,
        pool: Option<&str>,
    ) -> Result<String, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        let pool = pool.unwrap_or(&self.inner.config.default_floating_pool);
        FloatingIpManager::new(tenant.as_ref()).allocate(pool).await
    }

    pub async fn release_floating_ip(
        &self,
        ctx: &RequestContext,
        address: &str,
    ) -> Result<(), CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        FloatingIpManager::new(tenant.as_ref()).release(address).await
    }

    pub async fn get_floating_ip(
        &self,
        ctx: &RequestContext,
        floating_ip_id: &str,
    ) -> Result<FloatingIpInfo, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        FloatingIpManager::new(tenant.as_ref())
            .get(floating_ip_id)
            .await
    }

    pub async fn get_floating_ip_by_address(
        &self,
        ctx: &RequestContext,
        address: &str,
    ) -> Result<FloatingIpInfo, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        FloatingIpManager::new(tenant.as_ref())
            .get_by_address(address)
            .await
    }

    pub async fn get_floating_ips_by_project(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<FloatingIpInfo>, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        FloatingIpManager::new(tenant.as_ref())
            .by_project(&ctx.project_id)
            .await
    }

    pub async fn get_floating_ip_pools(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<FloatingIpPool>, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        FloatingIpManager::new(tenant.as_ref()).pools().await
    }

    /// Instance uuid the floating `address` is bound to, if any.
    pub async fn get_instance_id_by_floating_address(
        &self,
        ctx: &RequestContext,
        address: &str,
    ) -> Result<Option<String>, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        FloatingIpManager::new(tenant.as_ref())
            .instance_for_address(address)
            .await
    }

    // ── Pass-through queries ─────────────────────────────────────────

    /// Every network visible to the caller.
    pub async fn list_networks(&self, ctx: &RequestContext) -> Result<Vec<Network>, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        Ok(tenant.list_networks(&NetworkFilter::default()).await?)
    }

    pub async fn get_network(
        &self,
        ctx: &RequestContext,
        network_id: &str,
    ) -> Result<Network, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        match tenant.show_network(network_id).await {
            Ok(net) => Ok(net),
            Err(e) if e.is_not_found() => Err(CoreError::NetworkNotFound {
                ids: network_id.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a network name (or id) to a unique network id.
    pub async fn get_network_id_by_name(
        &self,
        ctx: &RequestContext,
        name_or_id: &str,
    ) -> Result<String, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        let mut by_name = tenant
            .list_networks(&NetworkFilter {
                name: Some(name_or_id.to_owned()),
                ..NetworkFilter::default()
            })
            .await?
            .into_iter();
        match (by_name.next(), by_name.next()) {
            (Some(net), None) => return Ok(net.id),
            (None, _) => {}
            (Some(_), Some(_)) => {
                return Err(CoreError::NoUniqueMatch {
                    message: format!(
                        "Multiple networks match name '{name_or_id}'. Use an ID to be more specific."
                    ),
                });
            }
        }

        let by_id = tenant
            .list_networks(&NetworkFilter {
                ids: vec![name_or_id.to_owned()],
                ..NetworkFilter::default()
            })
            .await?;
        by_id
            .into_iter()
            .next()
            .map(|n| n.id)
            .ok_or_else(|| CoreError::NetworkNotFound {
                ids: name_or_id.to_owned(),
            })
    }

    pub async fn list_ports(
        &self,
        ctx: &RequestContext,
        filter: &PortFilter,
    ) -> Result<Vec<Port>, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        Ok(tenant.list_ports(filter).await?)
    }

    pub async fn show_port(&self, ctx: &RequestContext, port_id: &str) -> Result<Port, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        match tenant.show_port(port_id).await {
            Ok(port) => Ok(port),
            Err(e) if e.is_not_found() => Err(CoreError::PortNotFound {
                port_id: port_id.to_owned(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Agent liveness grouped by host.
    pub async fn get_agents_status(
        &self,
        ctx: &RequestContext,
    ) -> Result<BTreeMap<String, Vec<AgentStatus>>, CoreError> {
        let tenant = self.inner.clients.tenant(ctx).await?;
        let mut by_host: BTreeMap<String, Vec<AgentStatus>> = BTreeMap::new();
        for agent in tenant.list_agents().await? {
            by_host.entry(agent.host).or_default().push(AgentStatus {
                agent_type: agent.agent_type,
                alive: agent.alive,
            });
        }
        Ok(by_host)
    }

    // ── Migration / host setup ───────────────────────────────────────

    pub async fn migrate_instance_start(
        &self,
        _ctx: &RequestContext,
        instance: &Instance,
    ) -> Result<(), CoreError> {
        debug!(instance = %instance.uuid, "migrate_instance_start()");
        Ok(())
    }

    /// Point every port of the instance at its new host. A no-op when the
    /// service has no port-binding capability.
    pub async fn migrate_instance_finish(
        &self,
        ctx: &RequestContext,
        instance: &Instance,
    ) -> Result<(), CoreError> {
        let admin = self.inner.clients.admin().await?;
        self.inner.extensions.refresh(admin.as_ref()).await?;
        if !self.inner.extensions.has(PORT_BINDING_EXT) {
            debug!(instance = %instance.uuid, "no port binding, nothing to migrate");
            return Ok(());
        }

        let ports = admin
            .list_ports(&PortFilter {
                device_id: Some(instance.uuid.clone()),
                tenant_id: Some(instance.project_id.clone()),
                ..PortFilter::default()
            })
            .await?;
        info!(instance = %instance.uuid, host = ?instance.host, ports = ports.len(), "rebinding ports to host");

        for port in &ports {
            let update = PortUpdate {
                binding_host_id: Some(instance.host.clone()),
                ..PortUpdate::default()
            };
            if let Err(e) = admin.update_port(&port.id, &update).await {
                error!(port_id = %port.id, error = %e, "unable to update host of port");
                return Err(e.into());
            }
        }

        let tenant = self.inner.clients.tenant(ctx).await?;
        self.refresh_nw_info(tenant.as_ref(), admin.as_ref(), instance, None)
            .await?;
        Ok(())
    }

    /// Host-side network setup is done by the service's agents.
    pub async fn setup_networks_on_host(
        &self,
        _ctx: &RequestContext,
        instance: &Instance,
        host: Option<&str>,
        teardown: bool,
    ) -> Result<(), CoreError> {
        debug!(instance = %instance.uuid, ?host, teardown, "setup_networks_on_host()");
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn capabilities(&self, admin: &dyn NetworkService) -> Result<Capabilities, CoreError> {
        let cache = &self.inner.extensions;
        cache.ensure_fresh(admin).await?;
        Ok(Capabilities {
            port_binding: cache.has(PORT_BINDING_EXT),
            qos: cache.has(QOS_EXT),
        })
    }

    /// Security-group notifications are best effort.
    async fn notify_membership(&self, instance: &Instance, added: bool) {
        let notifier = &self.inner.notifier;
        if let Err(e) = notifier
            .refresh_members(&instance.security_group_ids())
            .await
        {
            warn!(instance = %instance.uuid, error = %e, "security group member refresh failed");
        }
        for group in &instance.security_groups {
            let result = if added {
                notifier.instance_added(instance, &group.name).await
            } else {
                notifier.instance_removed(instance, &group.name).await
            };
            if let Err(e) = result {
                warn!(instance = %instance.uuid, group = %group.name, error = %e,
                    "security group notification failed");
            }
        }
    }
}
