// Shared fixtures for netbind-core integration tests: an in-memory network
// service, a client provider handing it out, an in-memory instance store,
// and a notifier that records what it was told.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ipnetwork::IpNetwork;

use netbind_api::{
    Agent, Extension, FixedIpRef, FixedIpRequest, FloatingIp, FloatingIpCreate, FloatingIpFilter,
    FloatingIpUpdate, Network, NetworkFilter, Port, PortCreate, PortFilter, PortUpdate,
    SecurityGroup, Subnet, SubnetFilter,
};
use netbind_core::{
    ApiResult, ClientProvider, Clock, Collaborators, CoreError, Instance, InstanceSecurityGroup,
    InstanceStore, NetworkInfo, NetworkService, Orchestrator, OrchestratorConfig, RequestContext,
    SecurityGroupNotifier,
};

pub const TENANT: &str = "tenant-1";
pub const INSTANCE_UUID: &str = "inst-1";

// ── Fake network service ────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct FakeState {
    pub networks: Vec<Network>,
    pub subnets: Vec<Subnet>,
    pub ports: Vec<Port>,
    pub floating_ips: Vec<FloatingIp>,
    pub security_groups: Vec<SecurityGroup>,
    pub extensions: Vec<Extension>,
    pub agents: Vec<Agent>,

    /// Every mutating call plus `list_extensions`, in order.
    pub calls: Vec<String>,
    pub created_bodies: Vec<PortCreate>,

    pub fail_create_on_network: Option<String>,
    pub fail_update_ports: HashSet<String>,
    pub fail_delete_ports: HashSet<String>,
    pub fail_extensions: bool,
    /// Simulate a service without the L3 API.
    pub floating_ips_unsupported: bool,

    next_id: u32,
}

#[derive(Debug, Default)]
pub struct FakeNetworkService {
    state: Mutex<FakeState>,
}

pub fn not_found(what: &str) -> netbind_api::Error {
    netbind_api::Error::Api {
        status: 404,
        kind: Some("NotFound".into()),
        message: format!("{what} could not be found"),
    }
}

pub fn server_error(what: &str) -> netbind_api::Error {
    netbind_api::Error::Api {
        status: 500,
        kind: None,
        message: format!("{what} failed"),
    }
}

impl FakeNetworkService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, f: impl FnOnce(&mut FakeState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn ports(&self) -> Vec<Port> {
        self.state().ports.clone()
    }

    pub fn port(&self, id: &str) -> Option<Port> {
        self.state().ports.iter().find(|p| p.id == id).cloned()
    }
}

impl FakeState {
    fn next(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    /// Pick the subnet for an address on `network_id`.
    fn subnet_for(&self, network_id: &str, address: Option<&str>) -> Option<Subnet> {
        let on_net = self.subnets.iter().filter(|s| s.network_id == network_id);
        match address.and_then(|a| a.parse::<IpAddr>().ok()) {
            Some(addr) => on_net
                .clone()
                .find(|s| {
                    s.cidr
                        .parse::<IpNetwork>()
                        .is_ok_and(|net| net.contains(addr))
                })
                .or_else(|| on_net.clone().next())
                .cloned(),
            None => on_net.clone().next().cloned(),
        }
    }

    fn auto_address(&mut self, subnet: &Subnet) -> String {
        self.next_id += 1;
        let network = subnet.cidr.split('/').next().unwrap_or("10.0.0.0");
        let base = network.rsplit_once('.').map_or("10.0.0", |(b, _)| b);
        format!("{base}.{}", 100 + self.next_id)
    }

    fn fixed_ip(&mut self, network_id: &str, req: &FixedIpRequest) -> FixedIpRef {
        let subnet = match &req.subnet_id {
            Some(id) => self.subnets.iter().find(|s| &s.id == id).cloned(),
            None => self.subnet_for(network_id, req.ip_address.as_deref()),
        };
        let ip_address = match (&req.ip_address, &subnet) {
            (Some(ip), _) => ip.clone(),
            (None, Some(s)) => self.auto_address(s),
            (None, None) => "0.0.0.0".into(),
        };
        FixedIpRef {
            subnet_id: subnet.map(|s| s.id).unwrap_or_default(),
            ip_address,
        }
    }
}

fn port_matches(p: &Port, f: &PortFilter) -> bool {
    f.device_id
        .as_ref()
        .is_none_or(|d| p.device_id.as_deref() == Some(d.as_str()))
        && f.device_owner
            .as_ref()
            .is_none_or(|o| p.device_owner.as_deref() == Some(o.as_str()))
        && f.tenant_id
            .as_ref()
            .is_none_or(|t| p.tenant_id.as_deref() == Some(t.as_str()))
        && f.network_id.as_ref().is_none_or(|n| &p.network_id == n)
        && f.fixed_ip_address
            .as_ref()
            .is_none_or(|ip| p.has_fixed_address(ip))
}

fn network_matches(n: &Network, f: &NetworkFilter) -> bool {
    f.tenant_id
        .as_ref()
        .is_none_or(|t| n.tenant_id.as_deref() == Some(t.as_str()))
        && f.shared.is_none_or(|s| n.shared == s)
        && (f.ids.is_empty() || f.ids.contains(&n.id))
        && f.name.as_ref().is_none_or(|name| &n.name == name)
        && f.router_external
            .is_none_or(|ext| n.router_external.unwrap_or(false) == ext)
}

#[async_trait]
impl NetworkService for FakeNetworkService {
    async fn list_networks(&self, filter: &NetworkFilter) -> ApiResult<Vec<Network>> {
        let st = self.state();
        Ok(st
            .networks
            .iter()
            .filter(|n| network_matches(n, filter))
            .cloned()
            .collect())
    }

    async fn show_network(&self, network_id: &str) -> ApiResult<Network> {
        let st = self.state();
        st.networks
            .iter()
            .find(|n| n.id == network_id)
            .cloned()
            .ok_or_else(|| not_found(network_id))
    }

    async fn list_subnets(&self, filter: &SubnetFilter) -> ApiResult<Vec<Subnet>> {
        let st = self.state();
        Ok(st
            .subnets
            .iter()
            .filter(|s| filter.ids.is_empty() || filter.ids.contains(&s.id))
            .filter(|s| filter.network_id.as_ref().is_none_or(|n| &s.network_id == n))
            .cloned()
            .collect())
    }

    async fn list_ports(&self, filter: &PortFilter) -> ApiResult<Vec<Port>> {
        let st = self.state();
        Ok(st
            .ports
            .iter()
            .filter(|p| port_matches(p, filter))
            .cloned()
            .collect())
    }

    async fn show_port(&self, port_id: &str) -> ApiResult<Port> {
        let st = self.state();
        st.ports
            .iter()
            .find(|p| p.id == port_id)
            .cloned()
            .ok_or_else(|| not_found(port_id))
    }

    async fn create_port(&self, body: &PortCreate) -> ApiResult<Port> {
        let mut st = self.state();
        st.calls.push(format!("create_port:{}", body.network_id));
        st.created_bodies.push(body.clone());
        if st.fail_create_on_network.as_deref() == Some(body.network_id.as_str()) {
            return Err(server_error("create_port"));
        }

        let id = st.next("port");
        let requests = if body.fixed_ips.is_empty() {
            vec![FixedIpRequest::default()]
        } else {
            body.fixed_ips.clone()
        };
        let fixed_ips = requests
            .iter()
            .map(|r| st.fixed_ip(&body.network_id, r))
            .filter(|ip| !ip.subnet_id.is_empty())
            .collect();
        let mac_address = body.mac_address.clone().unwrap_or_else(|| {
            let n = st.next_id;
            format!("fa:16:3e:00:00:{n:02x}")
        });

        let port = Port {
            id,
            network_id: body.network_id.clone(),
            tenant_id: Some(body.tenant_id.clone()),
            device_id: Some(body.device_id.clone()),
            device_owner: Some(body.device_owner.clone()),
            mac_address,
            fixed_ips,
            security_groups: body.security_groups.clone(),
            admin_state_up: body.admin_state_up,
            binding_host_id: body.binding_host_id.clone(),
            binding_vif_type: Some("ovs".into()),
        };
        st.ports.push(port.clone());
        Ok(port)
    }

    async fn update_port(&self, port_id: &str, body: &PortUpdate) -> ApiResult<Port> {
        let mut st = self.state();
        st.calls.push(format!("update_port:{port_id}"));
        if st.fail_update_ports.contains(port_id) {
            return Err(server_error("update_port"));
        }
        let Some(idx) = st.ports.iter().position(|p| p.id == port_id) else {
            return Err(not_found(port_id));
        };

        if let Some(fixed) = &body.fixed_ips {
            let network_id = st.ports[idx].network_id.clone();
            let refs = fixed.iter().map(|r| st.fixed_ip(&network_id, r)).collect();
            st.ports[idx].fixed_ips = refs;
        }
        let port = &mut st.ports[idx];
        if let Some(device_id) = &body.device_id {
            port.device_id.clone_from(device_id);
        }
        if let Some(owner) = &body.device_owner {
            port.device_owner = Some(owner.clone());
        }
        if let Some(host) = &body.binding_host_id {
            port.binding_host_id.clone_from(host);
        }
        Ok(port.clone())
    }

    async fn delete_port(&self, port_id: &str) -> ApiResult<()> {
        let mut st = self.state();
        st.calls.push(format!("delete_port:{port_id}"));
        if st.fail_delete_ports.contains(port_id) {
            return Err(server_error("delete_port"));
        }
        let before = st.ports.len();
        st.ports.retain(|p| p.id != port_id);
        if st.ports.len() == before {
            return Err(not_found(port_id));
        }
        Ok(())
    }

    async fn list_floating_ips(&self, filter: &FloatingIpFilter) -> ApiResult<Vec<FloatingIp>> {
        let st = self.state();
        if st.floating_ips_unsupported {
            return Err(not_found("floatingips"));
        }
        Ok(st
            .floating_ips
            .iter()
            .filter(|f| {
                filter
                    .floating_ip_address
                    .as_ref()
                    .is_none_or(|a| &f.floating_ip_address == a)
                    && filter
                        .fixed_ip_address
                        .as_ref()
                        .is_none_or(|a| f.fixed_ip_address.as_ref() == Some(a))
                    && filter
                        .port_id
                        .as_ref()
                        .is_none_or(|p| f.port_id.as_ref() == Some(p))
                    && filter
                        .tenant_id
                        .as_ref()
                        .is_none_or(|t| f.tenant_id.as_ref() == Some(t))
            })
            .cloned()
            .collect())
    }

    async fn show_floating_ip(&self, floating_ip_id: &str) -> ApiResult<FloatingIp> {
        let st = self.state();
        st.floating_ips
            .iter()
            .find(|f| f.id == floating_ip_id)
            .cloned()
            .ok_or_else(|| not_found(floating_ip_id))
    }

    async fn create_floating_ip(&self, body: &FloatingIpCreate) -> ApiResult<FloatingIp> {
        let mut st = self.state();
        st.calls.push(format!("create_floating_ip:{}", body.floating_network_id));
        let id = st.next("fip");
        let n = st.next_id;
        let fip = FloatingIp {
            id,
            floating_ip_address: format!("172.24.4.{n}"),
            floating_network_id: body.floating_network_id.clone(),
            tenant_id: Some(body.tenant_id.clone().unwrap_or_else(|| TENANT.into())),
            port_id: None,
            fixed_ip_address: None,
        };
        st.floating_ips.push(fip.clone());
        Ok(fip)
    }

    async fn update_floating_ip(
        &self,
        floating_ip_id: &str,
        body: &FloatingIpUpdate,
    ) -> ApiResult<FloatingIp> {
        let mut st = self.state();
        st.calls.push(format!("update_floating_ip:{floating_ip_id}"));
        let fip = st
            .floating_ips
            .iter_mut()
            .find(|f| f.id == floating_ip_id)
            .ok_or_else(|| not_found(floating_ip_id))?;
        fip.port_id.clone_from(&body.port_id);
        fip.fixed_ip_address.clone_from(&body.fixed_ip_address);
        Ok(fip.clone())
    }

    async fn delete_floating_ip(&self, floating_ip_id: &str) -> ApiResult<()> {
        let mut st = self.state();
        st.calls.push(format!("delete_floating_ip:{floating_ip_id}"));
        st.floating_ips.retain(|f| f.id != floating_ip_id);
        Ok(())
    }

    async fn list_security_groups(
        &self,
        tenant_id: Option<&str>,
    ) -> ApiResult<Vec<SecurityGroup>> {
        let st = self.state();
        Ok(st
            .security_groups
            .iter()
            .filter(|g| tenant_id.is_none_or(|t| g.tenant_id.as_deref() == Some(t)))
            .cloned()
            .collect())
    }

    async fn list_extensions(&self) -> ApiResult<Vec<Extension>> {
        let mut st = self.state();
        st.calls.push("list_extensions".into());
        if st.fail_extensions {
            return Err(server_error("list_extensions"));
        }
        Ok(st.extensions.clone())
    }

    async fn list_agents(&self) -> ApiResult<Vec<Agent>> {
        Ok(self.state().agents.clone())
    }
}

// ── Collaborators ───────────────────────────────────────────────────

/// Hands out the same fake for tenant and admin calls.
pub struct FakeProvider {
    pub service: Arc<FakeNetworkService>,
}

#[async_trait]
impl ClientProvider for FakeProvider {
    async fn tenant(&self, _ctx: &RequestContext) -> Result<Arc<dyn NetworkService>, CoreError> {
        Ok(self.service.clone())
    }

    async fn admin(&self) -> Result<Arc<dyn NetworkService>, CoreError> {
        Ok(self.service.clone())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, NetworkInfo>>,
}

impl MemoryStore {
    pub fn get(&self, uuid: &str) -> Option<NetworkInfo> {
        self.entries.lock().unwrap().get(uuid).cloned()
    }

    pub fn put(&self, uuid: &str, info: NetworkInfo) {
        self.entries.lock().unwrap().insert(uuid.into(), info);
    }
}

#[async_trait]
impl InstanceStore for MemoryStore {
    async fn load_network_info(
        &self,
        instance_uuid: &str,
    ) -> Result<Option<NetworkInfo>, CoreError> {
        Ok(self.get(instance_uuid))
    }

    async fn save_network_info(
        &self,
        instance_uuid: &str,
        info: &NetworkInfo,
    ) -> Result<(), CoreError> {
        self.put(instance_uuid, info.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecurityGroupNotifier for RecordingNotifier {
    async fn refresh_members(&self, group_ids: &[String]) -> Result<(), CoreError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("refresh:{}", group_ids.join(",")));
        Ok(())
    }

    async fn instance_added(&self, instance: &Instance, group_name: &str) -> Result<(), CoreError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("add:{}:{group_name}", instance.uuid));
        Ok(())
    }

    async fn instance_removed(
        &self,
        instance: &Instance,
        group_name: &str,
    ) -> Result<(), CoreError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("remove:{}:{group_name}", instance.uuid));
        Ok(())
    }
}

/// Manually advanced clock.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset_secs: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_secs: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_secs.fetch_add(by.as_secs(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_secs(self.offset_secs.load(Ordering::SeqCst))
    }
}

// ── Harness ─────────────────────────────────────────────────────────

pub struct Harness {
    pub service: Arc<FakeNetworkService>,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
    pub orchestrator: Orchestrator,
}

pub fn harness(service: FakeNetworkService) -> Harness {
    harness_with_config(service, OrchestratorConfig::default())
}

pub fn harness_with_config(service: FakeNetworkService, config: OrchestratorConfig) -> Harness {
    let service = Arc::new(service);
    let store = Arc::new(MemoryStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let clock = Arc::new(ManualClock::new());
    let orchestrator = Orchestrator::with_clock(
        config,
        Collaborators {
            clients: Arc::new(FakeProvider {
                service: service.clone(),
            }),
            store: store.clone(),
            notifier: notifier.clone(),
        },
        clock.clone(),
    );
    Harness {
        service,
        store,
        notifier,
        clock,
        orchestrator,
    }
}

// ── Fixture builders ────────────────────────────────────────────────

pub fn ctx() -> RequestContext {
    RequestContext::new(TENANT)
}

pub fn instance() -> Instance {
    Instance {
        uuid: INSTANCE_UUID.into(),
        display_name: "vm-1".into(),
        project_id: TENANT.into(),
        availability_zone: "nova".into(),
        host: Some("compute-1".into()),
        security_groups: vec![InstanceSecurityGroup {
            id: "sg-default".into(),
            name: "default".into(),
        }],
        rxtx_factor: Some(2.0),
    }
}

pub fn network(id: &str, subnets: &[&str]) -> Network {
    Network {
        id: id.into(),
        name: format!("{id}-name"),
        tenant_id: Some(TENANT.into()),
        shared: false,
        subnets: subnets.iter().map(|s| (*s).to_string()).collect(),
        port_security_enabled: None,
        router_external: None,
    }
}

pub fn shared_network(id: &str, subnets: &[&str]) -> Network {
    Network {
        tenant_id: Some("admin-tenant".into()),
        shared: true,
        ..network(id, subnets)
    }
}

pub fn external_network(id: &str, name: &str) -> Network {
    Network {
        name: name.into(),
        tenant_id: Some("admin-tenant".into()),
        router_external: Some(true),
        ..network(id, &[])
    }
}

pub fn subnet(id: &str, network_id: &str, cidr: &str) -> Subnet {
    let gateway = cidr
        .split('/')
        .next()
        .and_then(|n| n.rsplit_once('.'))
        .map(|(base, _)| format!("{base}.1"));
    Subnet {
        id: id.into(),
        network_id: network_id.into(),
        name: id.into(),
        cidr: cidr.into(),
        gateway_ip: gateway,
        dns_nameservers: vec!["8.8.8.8".into()],
    }
}

pub fn port(id: &str, network_id: &str, mac: &str, device_id: Option<&str>) -> Port {
    Port {
        id: id.into(),
        network_id: network_id.into(),
        tenant_id: Some(TENANT.into()),
        device_id: device_id.map(str::to_owned),
        device_owner: device_id.map(|_| "compute:nova".to_owned()),
        mac_address: mac.into(),
        fixed_ips: vec![],
        security_groups: vec![],
        admin_state_up: true,
        binding_host_id: None,
        binding_vif_type: Some("ovs".into()),
    }
}

pub fn security_group(id: &str, name: &str) -> SecurityGroup {
    SecurityGroup {
        id: id.into(),
        name: name.into(),
        tenant_id: Some(TENANT.into()),
        description: String::new(),
    }
}

pub fn extension(name: &str, alias: &str) -> Extension {
    Extension {
        name: name.into(),
        alias: alias.into(),
        description: String::new(),
        updated: None,
    }
}

pub fn floating_ip(id: &str, address: &str, network_id: &str, port_id: Option<&str>) -> FloatingIp {
    FloatingIp {
        id: id.into(),
        floating_ip_address: address.into(),
        floating_network_id: network_id.into(),
        tenant_id: Some(TENANT.into()),
        port_id: port_id.map(str::to_owned),
        fixed_ip_address: None,
    }
}

/// Two private networks with one subnet each:
/// `net-a` (10.0.1.0/24) and `net-b` (10.0.0.0/24).
pub fn two_networks() -> FakeNetworkService {
    FakeNetworkService::new().with(|st| {
        st.networks = vec![network("net-a", &["sub-a"]), network("net-b", &["sub-b"])];
        st.subnets = vec![
            subnet("sub-a", "net-a", "10.0.1.0/24"),
            subnet("sub-b", "net-b", "10.0.0.0/24"),
        ];
    })
}
