//! Port allocation for one instance, with an explicit rollback ledger.
//!
//! An allocation attempt runs in three phases:
//!
//! 1. [`parse_request`] fetches pre-created ports named in the request,
//!    checks them against the hypervisor MAC set, and collects the
//!    requested network ids in order.
//! 2. [`check_security_group_policy`] rejects the whole request before any
//!    port is touched if a security group cannot be applied on one of the
//!    resolved networks.
//! 3. [`bind_ports`] walks the resolved networks in order, binding a
//!    pre-created port or creating a new one on each. Every mutated port
//!    is recorded in a [`Ledger`]; on failure the ledger travels back with
//!    the error as an [`AllocationFailure`] so the caller can run
//!    [`compensate`].

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, error, info};

use netbind_api::{FixedIpRequest, PortCreate, PortUpdate};

use crate::error::CoreError;
use crate::model::{Instance, Network, Port, RequestedNetwork};
use crate::remote::NetworkService;

// ── MAC pool ─────────────────────────────────────────────────────────

/// Hypervisor-supplied MAC addresses still free for newly created ports.
///
/// Owned by a single allocation attempt. An unconstrained pool lets the
/// service pick MACs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacPool {
    hypervisor: Option<BTreeSet<String>>,
    available: BTreeSet<String>,
}

impl MacPool {
    pub fn new(macs: Option<&[String]>) -> Self {
        match macs {
            None => Self::default(),
            Some(macs) => {
                let set: BTreeSet<String> = macs.iter().cloned().collect();
                Self {
                    available: set.clone(),
                    hypervisor: Some(set),
                }
            }
        }
    }

    pub fn is_constrained(&self) -> bool {
        self.hypervisor.is_some()
    }

    /// Whether a pre-created port with `mac` may be used by this instance.
    pub fn permits(&self, mac: &str) -> bool {
        self.hypervisor.as_ref().is_none_or(|set| set.contains(mac))
    }

    /// Stop offering `mac` for new ports. Several pre-created ports may
    /// share a MAC, so this never fails.
    pub fn discard(&mut self, mac: &str) {
        self.available.remove(mac);
    }

    /// Take a free MAC for a new port.
    pub fn take(&mut self) -> Option<String> {
        self.available.pop_first()
    }

    pub fn remaining(&self) -> usize {
        self.available.len()
    }
}

// ── Ledger ───────────────────────────────────────────────────────────

/// Ports mutated by one allocation attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    /// Pre-existing ports whose device binding was set.
    pub touched: Vec<String>,
    /// Ports created by this attempt.
    pub created: Vec<String>,
}

impl Ledger {
    pub fn is_empty(&self) -> bool {
        self.touched.is_empty() && self.created.is_empty()
    }

    /// Touched then created port ids.
    pub fn port_ids(&self) -> Vec<String> {
        self.touched
            .iter()
            .chain(self.created.iter())
            .cloned()
            .collect()
    }
}

/// A failed allocation together with what it already changed remotely.
#[derive(Debug)]
pub struct AllocationFailure {
    pub error: CoreError,
    pub ledger: Ledger,
}

// ── Request parsing ──────────────────────────────────────────────────

/// The caller's request, resolved against the service.
#[derive(Debug, Clone, Default)]
pub struct ParsedRequest {
    /// Pre-created port to reuse, keyed by its network id.
    pub ports: HashMap<String, Port>,
    /// Desired fixed address, keyed by network id.
    pub fixed_ips: HashMap<String, String>,
    /// Every referenced network id, in request order.
    pub network_ids: Vec<String>,
}

pub async fn parse_request(
    api: &dyn NetworkService,
    instance: &Instance,
    requested: &[RequestedNetwork],
    macs: &mut MacPool,
) -> Result<ParsedRequest, CoreError> {
    let mut parsed = ParsedRequest::default();

    for req in requested {
        let mut network_id = req.network_id.clone();

        if let Some(port_id) = &req.port_id {
            let port = api.show_port(port_id).await?;
            if !macs.permits(&port.mac_address) {
                return Err(CoreError::PortNotUsable {
                    port_id: port_id.clone(),
                    instance: instance.label().to_owned(),
                });
            }
            macs.discard(&port.mac_address);
            network_id = Some(port.network_id.clone());
            parsed.ports.insert(port.network_id.clone(), port);
        } else if let (Some(ip), Some(net)) = (&req.fixed_ip, &req.network_id) {
            parsed.fixed_ips.insert(net.clone(), ip.clone());
        }

        if let Some(net) = network_id {
            parsed.network_ids.push(net);
        }
    }

    Ok(parsed)
}

// ── Policy ───────────────────────────────────────────────────────────

/// Security groups need a subnet, and port security must not be
/// explicitly disabled. An absent `port_security_enabled` counts as
/// enabled.
pub fn check_security_group_policy(
    networks: &[Network],
    security_groups_requested: bool,
) -> Result<(), CoreError> {
    if !security_groups_requested {
        return Ok(());
    }
    for net in networks {
        if net.subnets.is_empty() || net.port_security_enabled == Some(false) {
            debug!(network_id = %net.id, "security groups cannot be applied");
            return Err(CoreError::SecurityGroupCannotBeApplied);
        }
    }
    Ok(())
}

// ── Binding ──────────────────────────────────────────────────────────

/// Optional service capabilities that change what goes into a port body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub port_binding: bool,
    pub qos: bool,
}

/// Everything `bind_ports` needs besides the networks.
pub struct BindPlan<'a> {
    pub instance: &'a Instance,
    pub request: &'a ParsedRequest,
    pub security_group_ids: &'a [String],
    pub capabilities: Capabilities,
}

/// Bind or create one port per network, in order.
///
/// `port_client` performs every write; it must be the administrative
/// client when the port-binding capability is present.
pub async fn bind_ports(
    port_client: &dyn NetworkService,
    networks: &[Network],
    plan: &BindPlan<'_>,
    macs: &mut MacPool,
) -> Result<Ledger, AllocationFailure> {
    let mut ledger = Ledger::default();

    for net in networks {
        if let Err(error) = bind_one(port_client, net, plan, macs, &mut ledger).await {
            return Err(AllocationFailure { error, ledger });
        }
    }

    Ok(ledger)
}

async fn bind_one(
    port_client: &dyn NetworkService,
    net: &Network,
    plan: &BindPlan<'_>,
    macs: &mut MacPool,
    ledger: &mut Ledger,
) -> Result<(), CoreError> {
    let instance = plan.instance;
    let caps = plan.capabilities;
    let host_binding = caps.port_binding.then(|| instance.host.clone());
    let rxtx_factor = if caps.qos { instance.rxtx_factor } else { None };

    if let Some(port) = plan.request.ports.get(&net.id) {
        let update = PortUpdate {
            device_id: Some(Some(instance.uuid.clone())),
            device_owner: Some(instance.device_owner()),
            binding_host_id: host_binding,
            rxtx_factor,
            fixed_ips: None,
        };
        port_client.update_port(&port.id, &update).await?;
        debug!(port_id = %port.id, network_id = %net.id, "bound existing port");
        ledger.touched.push(port.id.clone());
        return Ok(());
    }

    let mac_address = if macs.is_constrained() {
        Some(macs.take().ok_or_else(|| CoreError::PortNotFree {
            instance: instance.label().to_owned(),
        })?)
    } else {
        None
    };

    let body = PortCreate {
        network_id: net.id.clone(),
        tenant_id: instance.project_id.clone(),
        device_id: instance.uuid.clone(),
        device_owner: instance.device_owner(),
        admin_state_up: true,
        fixed_ips: plan
            .request
            .fixed_ips
            .get(&net.id)
            .map(|ip| vec![FixedIpRequest::address(ip.clone())])
            .unwrap_or_default(),
        security_groups: plan.security_group_ids.to_vec(),
        mac_address,
        binding_host_id: host_binding.flatten(),
        rxtx_factor,
    };
    let port = port_client.create_port(&body).await?;
    debug!(port_id = %port.id, network_id = %net.id, "created port");
    ledger.created.push(port.id);
    Ok(())
}

// ── Compensation ─────────────────────────────────────────────────────

/// Undo a failed attempt: unbind touched ports and delete created ones.
///
/// Every step is attempted; individual failures are logged and dropped so
/// the caller can return the original error.
pub async fn compensate(
    tenant: &dyn NetworkService,
    admin: &dyn NetworkService,
    ledger: &Ledger,
    port_binding: bool,
) {
    if ledger.is_empty() {
        return;
    }
    info!(
        touched = ledger.touched.len(),
        created = ledger.created.len(),
        "rolling back partial allocation"
    );

    for port_id in &ledger.touched {
        let update = PortUpdate {
            device_id: Some(None),
            binding_host_id: port_binding.then_some(None),
            ..PortUpdate::default()
        };
        let client = if port_binding { admin } else { tenant };
        if let Err(e) = client.update_port(port_id, &update).await {
            error!(port_id = %port_id, error = %e, "failed to unbind port during rollback");
        }
    }

    for port_id in &ledger.created {
        if let Err(e) = tenant.delete_port(port_id).await {
            error!(port_id = %port_id, error = %e, "failed to delete port during rollback");
        }
    }
}
