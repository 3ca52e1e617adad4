// Port endpoints
//
// Ports are the only resource the allocator creates and deletes; binding
// updates (device id, host binding) go through `update_port`.

use tracing::debug;

use crate::client::NetworkClient;
use crate::error::Error;
use crate::models::{Port, PortCreate, PortFilter, PortUpdate};

impl NetworkClient {
    /// `GET /v2.0/ports`
    pub async fn list_ports(&self, filter: &PortFilter) -> Result<Vec<Port>, Error> {
        let url = self.api_url("ports")?;
        debug!(?filter, "listing ports");
        self.get(url, &filter.to_query(), "ports").await
    }

    /// `GET /v2.0/ports/{id}`
    pub async fn show_port(&self, port_id: &str) -> Result<Port, Error> {
        let url = self.api_url(&format!("ports/{port_id}"))?;
        self.get(url, &[], "port").await
    }

    /// `POST /v2.0/ports`
    pub async fn create_port(&self, body: &PortCreate) -> Result<Port, Error> {
        let url = self.api_url("ports")?;
        debug!(network_id = %body.network_id, device_id = %body.device_id, "creating port");
        self.post(url, "port", body).await
    }

    /// `PUT /v2.0/ports/{id}`
    pub async fn update_port(&self, port_id: &str, body: &PortUpdate) -> Result<Port, Error> {
        let url = self.api_url(&format!("ports/{port_id}"))?;
        debug!(port_id, "updating port");
        self.put(url, "port", body).await
    }

    /// `DELETE /v2.0/ports/{id}`
    pub async fn delete_port(&self, port_id: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("ports/{port_id}"))?;
        debug!(port_id, "deleting port");
        self.delete(url).await
    }
}
