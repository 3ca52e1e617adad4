//! Profile configuration for netbind.
//!
//! TOML profiles, admin credential resolution (env + keyring + plaintext),
//! and translation to `netbind_core::ServiceConfig` / `OrchestratorConfig`.
//! The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use netbind_core::config::{
    AdminCredentials, AuthStrategy, DEFAULT_AUTH_URL, DEFAULT_EXTENSION_SYNC_INTERVAL,
    DEFAULT_FLOATING_POOL, DEFAULT_INTEGRATION_BRIDGE, DEFAULT_SERVICE_URL, TlsMode,
};
use netbind_core::{OrchestratorConfig, ServiceAuth, ServiceConfig};

const KEYRING_SERVICE: &str = "netbind";
const PASSWORD_ENV: &str = "NETBIND_ADMIN_PASSWORD";
const USERNAME_ENV: &str = "NETBIND_ADMIN_USERNAME";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no admin credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named service profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named network-service profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Network service endpoint (e.g., "http://127.0.0.1:9696").
    #[serde(default = "default_url")]
    pub url: String,

    /// "keystone" or "noauth".
    #[serde(default = "default_auth_strategy")]
    pub auth_strategy: String,

    /// Identity service endpoint used to issue admin tokens.
    pub auth_url: Option<String>,

    pub admin_username: Option<String>,

    /// Admin password (plaintext, prefer keyring or env var).
    pub admin_password: Option<String>,

    /// Environment variable name containing the admin password.
    pub admin_password_env: Option<String>,

    pub admin_tenant_name: Option<String>,

    pub region: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    pub integration_bridge: Option<String>,

    pub flat_injected: Option<bool>,

    /// Extension cache lifetime in seconds.
    pub extension_sync_interval: Option<u64>,

    pub default_floating_pool: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            url: default_url(),
            auth_strategy: default_auth_strategy(),
            auth_url: None,
            admin_username: None,
            admin_password: None,
            admin_password_env: None,
            admin_tenant_name: None,
            region: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            integration_bridge: None,
            flat_injected: None,
            extension_sync_interval: None,
            default_floating_pool: None,
        }
    }
}

fn default_url() -> String {
    DEFAULT_SERVICE_URL.into()
}
fn default_auth_strategy() -> String {
    AuthStrategy::Keystone.to_string()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "netbind", "netbind")
}

fn home_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("netbind");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory for per-instance cached network info.
pub fn cache_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".cache"),
        |dirs| dirs.cache_dir().to_path_buf(),
    )
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, layered over defaults and under `NETBIND_` env vars.
///
/// Nested keys use a double underscore: `NETBIND_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETBIND_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the admin password: profile env var, `NETBIND_ADMIN_PASSWORD`,
/// system keyring, then plaintext in the profile.
pub fn resolve_admin_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.admin_password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name)) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    if let Some(ref pw) = profile.admin_password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store the admin password for `profile_name` in the system keyring.
pub fn store_admin_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/admin-password")
}

/// Resolve the admin identity for a keystone profile.
pub fn resolve_admin_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<AdminCredentials, ConfigError> {
    let username = profile
        .admin_username
        .clone()
        .or_else(|| std::env::var(USERNAME_ENV).ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    let password = resolve_admin_password(profile, profile_name)?;

    let auth_url_str = profile.auth_url.as_deref().unwrap_or(DEFAULT_AUTH_URL);
    let auth_url = parse_url("auth_url", auth_url_str)?;

    Ok(AdminCredentials {
        username,
        password,
        tenant_name: profile.admin_tenant_name.clone().unwrap_or_default(),
        auth_url,
        region: profile.region.clone(),
    })
}

/// Resolve `ServiceAuth` from a profile's `auth_strategy` field.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<ServiceAuth, ConfigError> {
    let strategy: AuthStrategy =
        profile
            .auth_strategy
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "auth_strategy".into(),
                reason: format!(
                    "expected 'keystone' or 'noauth', got '{}'",
                    profile.auth_strategy
                ),
            })?;
    match strategy {
        AuthStrategy::Keystone => Ok(ServiceAuth::Keystone {
            admin: resolve_admin_credentials(profile, profile_name)?,
        }),
        AuthStrategy::NoAuth => Ok(ServiceAuth::NoAuth),
    }
}

// ── Translation to core config ──────────────────────────────────────

fn parse_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// TLS mode from the profile, falling back to the global default.
pub fn tls_mode(profile: &Profile, defaults: &Defaults) -> TlsMode {
    if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    }
}

/// Build a `ServiceConfig` from a profile, without CLI overrides.
pub fn profile_to_service_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ServiceConfig, ConfigError> {
    Ok(ServiceConfig {
        url: parse_url("url", &profile.url)?,
        auth: resolve_auth(profile, profile_name)?,
        tls: tls_mode(profile, defaults),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
    })
}

/// Orchestrator knobs, with unset fields at their built-in defaults.
pub fn profile_to_orchestrator_config(profile: &Profile) -> OrchestratorConfig {
    OrchestratorConfig {
        integration_bridge: profile
            .integration_bridge
            .clone()
            .unwrap_or_else(|| DEFAULT_INTEGRATION_BRIDGE.into()),
        flat_injected: profile.flat_injected.unwrap_or(false),
        extension_sync_interval: profile
            .extension_sync_interval
            .map_or(DEFAULT_EXTENSION_SYNC_INTERVAL, Duration::from_secs),
        default_floating_pool: profile
            .default_floating_pool
            .clone()
            .unwrap_or_else(|| DEFAULT_FLOATING_POOL.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn profiles_load_from_toml() {
        let (_dir, path) = write_config(
            r#"
default_profile = "lab"

[defaults]
timeout = 45

[profiles.lab]
url = "http://neutron.lab:9696"
auth_strategy = "noauth"
integration_bridge = "br-lab"
extension_sync_interval = 60

[profiles.prod]
auth_url = "http://keystone.prod:5000/v2.0"
admin_username = "neutron"
admin_password = "s3cret"
admin_tenant_name = "service"
region = "RegionOne"
"#,
        );

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
        assert_eq!(cfg.defaults.timeout, 45);

        let lab = &cfg.profiles["lab"];
        let service = profile_to_service_config(lab, "lab", &cfg.defaults).unwrap();
        assert_eq!(service.url.as_str(), "http://neutron.lab:9696/");
        assert!(matches!(service.auth, ServiceAuth::NoAuth));
        assert_eq!(service.timeout, Duration::from_secs(45));

        let orch = profile_to_orchestrator_config(lab);
        assert_eq!(orch.integration_bridge, "br-lab");
        assert_eq!(orch.extension_sync_interval, Duration::from_secs(60));
        assert_eq!(orch.default_floating_pool, "nova");

        let prod = &cfg.profiles["prod"];
        assert_eq!(prod.url, DEFAULT_SERVICE_URL);
        let admin = resolve_admin_credentials(prod, "netbind-test-prod").unwrap();
        assert_eq!(admin.username, "neutron");
        assert_eq!(admin.tenant_name, "service");
        assert_eq!(admin.region.as_deref(), Some("RegionOne"));
        assert_eq!(admin.auth_url.as_str(), "http://keystone.prod:5000/v2.0");
    }

    #[test]
    fn plaintext_password_is_last_resort() {
        let profile = Profile {
            admin_password: Some("plain".into()),
            admin_password_env: Some("NETBIND_TEST_UNSET_PASSWORD_VAR".into()),
            ..Profile::default()
        };
        let pw = resolve_admin_password(&profile, "netbind-test-plaintext").unwrap();
        assert_eq!(pw.expose_secret(), "plain");
    }

    #[test]
    fn keystone_without_username_has_no_credentials() {
        let profile = Profile {
            auth_strategy: "keystone".into(),
            ..Profile::default()
        };
        if std::env::var(USERNAME_ENV).is_ok() {
            return;
        }
        let err = resolve_auth(&profile, "netbind-test-nouser").unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn unknown_auth_strategy_is_rejected() {
        let profile = Profile {
            auth_strategy: "oauth".into(),
            ..Profile::default()
        };
        let err = resolve_auth(&profile, "x").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "auth_strategy"));
    }

    #[test]
    fn tls_mode_precedence() {
        let defaults = Defaults::default();
        let mut profile = Profile {
            ca_cert: Some("/etc/ssl/ca.pem".into()),
            ..Profile::default()
        };
        assert!(matches!(tls_mode(&profile, &defaults), TlsMode::CustomCa(_)));

        profile.insecure = Some(true);
        assert!(matches!(
            tls_mode(&profile, &defaults),
            TlsMode::DangerAcceptInvalid
        ));

        let plain = Profile::default();
        assert!(matches!(tls_mode(&plain, &defaults), TlsMode::System));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                url: "http://10.0.0.5:9696".into(),
                auth_strategy: "noauth".into(),
                ..Profile::default()
            },
        );

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.profiles["lab"].url, "http://10.0.0.5:9696");
        assert_eq!(loaded.profiles["lab"].auth_strategy, "noauth");
    }
}
