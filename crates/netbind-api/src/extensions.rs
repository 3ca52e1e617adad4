// Service metadata endpoints: loaded extensions and agents.

use tracing::debug;

use crate::client::NetworkClient;
use crate::error::Error;
use crate::models::{Agent, Extension};

impl NetworkClient {
    /// `GET /v2.0/extensions`
    pub async fn list_extensions(&self) -> Result<Vec<Extension>, Error> {
        let url = self.api_url("extensions")?;
        debug!("listing extensions");
        self.get(url, &[], "extensions").await
    }

    /// `GET /v2.0/agents`
    pub async fn list_agents(&self) -> Result<Vec<Agent>, Error> {
        let url = self.api_url("agents")?;
        debug!("listing agents");
        self.get(url, &[], "agents").await
    }
}
