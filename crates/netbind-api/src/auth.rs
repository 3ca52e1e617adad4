// Identity (token) authentication
//
// The network service trusts tokens issued by a separate identity service.
// Tenant-scoped calls reuse the caller's own token; administrative calls
// need a token issued for the configured admin user.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use strum::{Display, EnumString};
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// How clients authenticate against the network service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum AuthStrategy {
    /// Tokens from the identity service, sent as `X-Auth-Token`.
    #[default]
    Keystone,
    /// No authentication (service deployed with auth disabled).
    NoAuth,
}

/// Password credentials for the administrative identity.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: SecretString,
    pub tenant_name: String,
    pub auth_url: Url,
    pub region: Option<String>,
}

/// An issued token.
#[derive(Debug, Clone)]
pub struct Token {
    pub id: SecretString,
    pub tenant_id: Option<String>,
}

#[derive(Deserialize)]
struct AccessEnvelope {
    access: Access,
}

#[derive(Deserialize)]
struct Access {
    token: TokenBody,
}

#[derive(Deserialize)]
struct TokenBody {
    id: String,
    #[serde(default)]
    tenant: Option<TenantRef>,
}

#[derive(Deserialize)]
struct TenantRef {
    id: String,
}

/// Minimal client for the identity service's `POST /tokens` endpoint.
pub struct IdentityClient {
    http: reqwest::Client,
}

impl IdentityClient {
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Issue a tenant-scoped token for `creds`.
    pub async fn issue_token(&self, creds: &AdminCredentials) -> Result<Token, Error> {
        let url = Url::parse(&format!(
            "{}/tokens",
            creds.auth_url.as_str().trim_end_matches('/')
        ))?;
        debug!(user = %creds.username, tenant = %creds.tenant_name, "requesting token");

        let body = json!({
            "auth": {
                "tenantName": creds.tenant_name,
                "passwordCredentials": {
                    "username": creds.username,
                    "password": creds.password.expose_secret(),
                },
            }
        });

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Authentication {
                message: format!("identity service rejected user '{}'", creds.username),
            });
        }

        let text = resp.text().await.map_err(Error::Transport)?;
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("token request failed (HTTP {}): {text}", status.as_u16()),
            });
        }

        let envelope: AccessEnvelope =
            serde_json::from_str(&text).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: text.clone(),
            })?;

        Ok(Token {
            id: SecretString::from(envelope.access.token.id),
            tenant_id: envelope.access.token.tenant.map(|t| t.id),
        })
    }
}
