// ── Remote network service seam ──
//
// Everything the orchestrator needs from the network-management service,
// as one object-safe trait. `netbind_api::NetworkClient` is the production
// implementation; tests substitute an in-memory fake.

use async_trait::async_trait;
use netbind_api::{
    Agent, Extension, FloatingIp, FloatingIpCreate, FloatingIpFilter, FloatingIpUpdate, Network,
    NetworkClient, NetworkFilter, Port, PortCreate, PortFilter, PortUpdate, SecurityGroup, Subnet,
    SubnetFilter,
};

/// Result of a single remote call. Errors keep their HTTP status so
/// callers can treat a 404 as "absent" where that is meaningful.
pub type ApiResult<T> = Result<T, netbind_api::Error>;

#[async_trait]
pub trait NetworkService: Send + Sync {
    async fn list_networks(&self, filter: &NetworkFilter) -> ApiResult<Vec<Network>>;
    async fn show_network(&self, network_id: &str) -> ApiResult<Network>;
    async fn list_subnets(&self, filter: &SubnetFilter) -> ApiResult<Vec<Subnet>>;

    async fn list_ports(&self, filter: &PortFilter) -> ApiResult<Vec<Port>>;
    async fn show_port(&self, port_id: &str) -> ApiResult<Port>;
    async fn create_port(&self, body: &PortCreate) -> ApiResult<Port>;
    async fn update_port(&self, port_id: &str, body: &PortUpdate) -> ApiResult<Port>;
    async fn delete_port(&self, port_id: &str) -> ApiResult<()>;

    async fn list_floating_ips(&self, filter: &FloatingIpFilter) -> ApiResult<Vec<FloatingIp>>;
    async fn show_floating_ip(&self, floating_ip_id: &str) -> ApiResult<FloatingIp>;
    async fn create_floating_ip(&self, body: &FloatingIpCreate) -> ApiResult<FloatingIp>;
    async fn update_floating_ip(
        &self,
        floating_ip_id: &str,
        body: &FloatingIpUpdate,
    ) -> ApiResult<FloatingIp>;
    async fn delete_floating_ip(&self, floating_ip_id: &str) -> ApiResult<()>;

    async fn list_security_groups(&self, tenant_id: Option<&str>)
    -> ApiResult<Vec<SecurityGroup>>;
    async fn list_extensions(&self) -> ApiResult<Vec<Extension>>;
    async fn list_agents(&self) -> ApiResult<Vec<Agent>>;
}

#[async_trait]
impl NetworkService for NetworkClient {
    async fn list_networks(&self, filter: &NetworkFilter) -> ApiResult<Vec<Network>> {
        NetworkClient::list_networks(self, filter).await
    }

    async fn show_network(&self, network_id: &str) -> ApiResult<Network> {
        NetworkClient::show_network(self, network_id).await
    }

    async fn list_subnets(&self, filter: &SubnetFilter) -> ApiResult<Vec<Subnet>> {
        NetworkClient::list_subnets(self, filter).await
    }

    async fn list_ports(&self, filter: &PortFilter) -> ApiResult<Vec<Port>> {
        NetworkClient::list_ports(self, filter).await
    }

    async fn show_port(&self, port_id: &str) -> ApiResult<Port> {
        NetworkClient::show_port(self, port_id).await
    }

    async fn create_port(&self, body: &PortCreate) -> ApiResult<Port> {
        NetworkClient::create_port(self, body).await
    }

    async fn update_port(&self, port_id: &str, body: &PortUpdate) -> ApiResult<Port> {
        NetworkClient::update_port(self, port_id, body).await
    }

    async fn delete_port(&self, port_id: &str) -> ApiResult<()> {
        NetworkClient::delete_port(self, port_id).await
    }

    async fn list_floating_ips(&self, filter: &FloatingIpFilter) -> ApiResult<Vec<FloatingIp>> {
        NetworkClient::list_floating_ips(self, filter).await
    }

    async fn show_floating_ip(&self, floating_ip_id: &str) -> ApiResult<FloatingIp> {
        NetworkClient::show_floating_ip(self, floating_ip_id).await
    }

    async fn create_floating_ip(&self, body: &FloatingIpCreate) -> ApiResult<FloatingIp> {
        NetworkClient::create_floating_ip(self, body).await
    }

    async fn update_floating_ip(
        &self,
        floating_ip_id: &str,
        body: &FloatingIpUpdate,
    ) -> ApiResult<FloatingIp> {
        NetworkClient::update_floating_ip(self, floating_ip_id, body).await
    }

    async fn delete_floating_ip(&self, floating_ip_id: &str) -> ApiResult<()> {
        NetworkClient::delete_floating_ip(self, floating_ip_id).await
    }

    async fn list_security_groups(
        &self,
        tenant_id: Option<&str>,
    ) -> ApiResult<Vec<SecurityGroup>> {
        NetworkClient::list_security_groups(self, tenant_id).await
    }

    async fn list_extensions(&self) -> ApiResult<Vec<Extension>> {
        NetworkClient::list_extensions(self).await
    }

    async fn list_agents(&self) -> ApiResult<Vec<Agent>> {
        NetworkClient::list_agents(self).await
    }
}
