// Floating IP endpoints
//
// Served by the L3 capability. Deployments without it answer 404 on the
// collection; callers decide whether that is an error.

use tracing::debug;

use crate::client::NetworkClient;
use crate::error::Error;
use crate::models::{FloatingIp, FloatingIpCreate, FloatingIpFilter, FloatingIpUpdate};

impl NetworkClient {
    /// `GET /v2.0/floatingips`
    pub async fn list_floating_ips(
        &self,
        filter: &FloatingIpFilter,
    ) -> Result<Vec<FloatingIp>, Error> {
        let url = self.api_url("floatingips")?;
        debug!(?filter, "listing floating ips");
        self.get(url, &filter.to_query(), "floatingips").await
    }

    /// `GET /v2.0/floatingips/{id}`
    pub async fn show_floating_ip(&self, floating_ip_id: &str) -> Result<FloatingIp, Error> {
        let url = self.api_url(&format!("floatingips/{floating_ip_id}"))?;
        self.get(url, &[], "floatingip").await
    }

    /// `POST /v2.0/floatingips`
    pub async fn create_floating_ip(&self, body: &FloatingIpCreate) -> Result<FloatingIp, Error> {
        let url = self.api_url("floatingips")?;
        debug!(pool = %body.floating_network_id, "creating floating ip");
        self.post(url, "floatingip", body).await
    }

    /// `PUT /v2.0/floatingips/{id}`
    pub async fn update_floating_ip(
        &self,
        floating_ip_id: &str,
        body: &FloatingIpUpdate,
    ) -> Result<FloatingIp, Error> {
        let url = self.api_url(&format!("floatingips/{floating_ip_id}"))?;
        debug!(floating_ip_id, port_id = ?body.port_id, "updating floating ip");
        self.put(url, "floatingip", body).await
    }

    /// `DELETE /v2.0/floatingips/{id}`
    pub async fn delete_floating_ip(&self, floating_ip_id: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("floatingips/{floating_ip_id}"))?;
        debug!(floating_ip_id, "deleting floating ip");
        self.delete(url).await
    }
}
