// Network and subnet endpoints
//
// Both are read-only from the orchestrator's point of view: networks and
// subnets are created by operators, we only resolve and describe them.

use tracing::debug;

use crate::client::NetworkClient;
use crate::error::Error;
use crate::models::{Network, NetworkFilter, Subnet, SubnetFilter};

impl NetworkClient {
    /// List networks matching `filter`.
    ///
    /// `GET /v2.0/networks`
    pub async fn list_networks(&self, filter: &NetworkFilter) -> Result<Vec<Network>, Error> {
        let url = self.api_url("networks")?;
        debug!(?filter, "listing networks");
        self.get(url, &filter.to_query(), "networks").await
    }

    /// `GET /v2.0/networks/{id}`
    pub async fn show_network(&self, network_id: &str) -> Result<Network, Error> {
        let url = self.api_url(&format!("networks/{network_id}"))?;
        self.get(url, &[], "network").await
    }

    /// List subnets matching `filter`.
    ///
    /// `GET /v2.0/subnets`. Note that an empty filter returns every subnet
    /// visible to the caller.
    pub async fn list_subnets(&self, filter: &SubnetFilter) -> Result<Vec<Subnet>, Error> {
        let url = self.api_url("subnets")?;
        debug!(?filter, "listing subnets");
        self.get(url, &filter.to_query(), "subnets").await
    }
}
