// Network service HTTP client
//
// Wraps `reqwest::Client` with `/v2.0/` URL construction, token injection,
// and keyed-envelope unwrapping. Resource endpoints (networks, ports, etc.)
// are implemented as inherent methods in separate files to keep this
// module focused on transport mechanics.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const API_VERSION_PREFIX: &str = "v2.0";
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Raw HTTP client for the network service's v2.0 API.
///
/// Every request carries the token it was built with, so one client is
/// scoped to exactly one identity (a tenant or the administrative user).
/// All methods return unwrapped resources -- the `{"port": ...}` envelope
/// is stripped before the caller sees it.
#[derive(Debug, Clone)]
pub struct NetworkClient {
    http: reqwest::Client,
    base_url: Url,
}

impl NetworkClient {
    /// Create a client that authenticates every call with `token`.
    ///
    /// `token: None` is for services deployed without an identity service
    /// (`noauth` strategy).
    pub fn new(
        base_url: Url,
        token: Option<&SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(token.expose_secret())
                .map_err(|e| Error::Authentication {
                    message: format!("token is not a valid header value: {e}"),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTH_TOKEN_HEADER, value);
        }
        let http = transport.build_client_with_headers(headers)?;
        Ok(Self { http, base_url })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/v2.0/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/{API_VERSION_PREFIX}/{path}",
            self.base_url.as_str().trim_end_matches('/')
        );
        Ok(Url::parse(&full)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET and unwrap the resource stored under `key`.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        key: &str,
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_envelope(resp, key).await
    }

    /// POST `{key: body}` and unwrap the created resource.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        key: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(&wrap(key, body)?)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_envelope(resp, key).await
    }

    /// PUT `{key: body}` and unwrap the updated resource.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        key: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(&wrap(key, body)?)
            .send()
            .await
            .map_err(Error::Transport)?;

        self.parse_envelope(resp, key).await
    }

    /// DELETE; the service answers `204 No Content` on success.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);

        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.map_err(Error::Transport)?;
        Err(api_error(status, &body))
    }

    /// Check the status, then pull the resource stored under `key`.
    async fn parse_envelope<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
        key: &str,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let mut envelope: Value =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        let inner = envelope
            .get_mut(key)
            .map(Value::take)
            .ok_or_else(|| Error::Deserialization {
                message: format!("response has no '{key}' member"),
                body: body.clone(),
            })?;

        serde_json::from_value(inner).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

fn wrap(key: &str, body: &impl Serialize) -> Result<Value, Error> {
    let inner = serde_json::to_value(body).map_err(|e| Error::Deserialization {
        message: format!("failed to encode request: {e}"),
        body: String::new(),
    })?;
    let mut map = serde_json::Map::new();
    map.insert(key.to_owned(), inner);
    Ok(Value::Object(map))
}

/// Build an `Error::Api` from a failed response body.
///
/// The service reports failures as
/// `{"NeutronError": {"type": ..., "message": ..., "detail": ...}}`;
/// older deployments send a bare `{"message": ...}` or plain text.
fn api_error(status: reqwest::StatusCode, body: &str) -> Error {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let detail = parsed
        .as_ref()
        .and_then(|v| v.get("NeutronError").or(Some(v)));

    let kind = detail
        .and_then(|d| d.get("type"))
        .and_then(Value::as_str)
        .map(str::to_owned);
    let message = detail
        .and_then(|d| d.get("message"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_owned()
            } else {
                body.trim().to_owned()
            }
        });

    Error::Api {
        status: status.as_u16(),
        kind,
        message,
    }
}
