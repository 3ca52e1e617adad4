// Security group endpoints

use tracing::debug;

use crate::client::NetworkClient;
use crate::error::Error;
use crate::models::SecurityGroup;

impl NetworkClient {
    /// List security groups, optionally restricted to one tenant.
    ///
    /// `GET /v2.0/security-groups`
    pub async fn list_security_groups(
        &self,
        tenant_id: Option<&str>,
    ) -> Result<Vec<SecurityGroup>, Error> {
        let url = self.api_url("security-groups")?;
        let query: Vec<(&str, String)> = tenant_id
            .map(|t| vec![("tenant_id", t.to_owned())])
            .unwrap_or_default();
        debug!(tenant_id, "listing security groups");
        self.get(url, &query, "security_groups").await
    }
}
