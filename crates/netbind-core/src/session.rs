// ── Client acquisition ──
//
// Produces a `NetworkService` scoped either to the calling tenant or to
// the administrative identity. Setting host bindings and listing an
// instance's ports across tenants need the latter.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use netbind_api::{IdentityClient, NetworkClient, TransportConfig};

use crate::config::{ServiceAuth, ServiceConfig};
use crate::error::CoreError;
use crate::model::RequestContext;
use crate::remote::NetworkService;

#[async_trait]
pub trait ClientProvider: Send + Sync {
    /// A client acting as the caller in `ctx`.
    async fn tenant(&self, ctx: &RequestContext) -> Result<Arc<dyn NetworkService>, CoreError>;

    /// A client acting as the administrative identity.
    async fn admin(&self) -> Result<Arc<dyn NetworkService>, CoreError>;
}

/// Builds HTTP clients from a [`ServiceConfig`].
///
/// Tenant clients reuse the caller's token. Admin clients get a fresh
/// token from the identity service on every call.
pub struct SessionProvider {
    config: ServiceConfig,
    transport: TransportConfig,
    identity: IdentityClient,
}

impl SessionProvider {
    pub fn new(config: ServiceConfig) -> Result<Self, CoreError> {
        let transport = config.transport();
        let identity = IdentityClient::new(&transport)?;
        Ok(Self {
            config,
            transport,
            identity,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[async_trait]
impl ClientProvider for SessionProvider {
    async fn tenant(&self, ctx: &RequestContext) -> Result<Arc<dyn NetworkService>, CoreError> {
        let token = match &self.config.auth {
            ServiceAuth::NoAuth => None,
            ServiceAuth::Keystone { .. } => Some(ctx.auth_token.as_ref().ok_or_else(|| {
                CoreError::AuthenticationFailed {
                    message: format!("no token in request context for tenant {}", ctx.project_id),
                }
            })?),
        };
        let client = NetworkClient::new(self.config.url.clone(), token, &self.transport)?;
        Ok(Arc::new(client))
    }

    async fn admin(&self) -> Result<Arc<dyn NetworkService>, CoreError> {
        let token = match &self.config.auth {
            ServiceAuth::NoAuth => None,
            ServiceAuth::Keystone { admin } => {
                debug!(user = %admin.username, "acquiring admin token");
                Some(self.identity.issue_token(admin).await?.id)
            }
        };
        let client = NetworkClient::new(self.config.url.clone(), token.as_ref(), &self.transport)?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn noauth_config() -> ServiceConfig {
        ServiceConfig {
            url: "http://127.0.0.1:9696".parse().unwrap(),
            auth: ServiceAuth::NoAuth,
            tls: netbind_api::TlsMode::System,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn noauth_builds_clients_without_tokens() {
        let provider = SessionProvider::new(noauth_config()).unwrap();
        let ctx = RequestContext::new("tenant-1");
        assert!(provider.tenant(&ctx).await.is_ok());
        assert!(provider.admin().await.is_ok());
    }

    #[tokio::test]
    async fn keystone_tenant_client_requires_token() {
        let mut config = noauth_config();
        config.auth = ServiceAuth::Keystone {
            admin: netbind_api::AdminCredentials {
                username: "admin".into(),
                password: secrecy::SecretString::from("pw".to_string()),
                tenant_name: "service".into(),
                auth_url: "http://localhost:5000/v2.0".parse().unwrap(),
                region: None,
            },
        };
        let provider = SessionProvider::new(config).unwrap();
        let result = provider.tenant(&RequestContext::new("tenant-1")).await;
        assert!(matches!(
            result,
            Err(CoreError::AuthenticationFailed { .. })
        ));
    }
}
