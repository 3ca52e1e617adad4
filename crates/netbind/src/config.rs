//! CLI configuration: thin wrapper around `netbind_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--url,
//! --auth-strategy, --insecure, --timeout).

use std::time::Duration;

use netbind_config::{Config, Profile};
use netbind_core::config::{AuthStrategy, TlsMode};
use netbind_core::{OrchestratorConfig, ServiceAuth, ServiceConfig};

use crate::cli::{AuthStrategyArg, GlobalOpts};
use crate::error::CliError;

pub use netbind_config::{cache_dir, config_path, load_config_or_default};

/// Everything needed to build an orchestrator.
pub struct Resolved {
    pub service: ServiceConfig,
    pub orchestrator: OrchestratorConfig,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build service and orchestrator config from the config file, the active
/// profile, and CLI overrides.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        // An explicitly requested profile must exist.
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available.join(", "),
                path: config_path().display().to_string(),
            });
        }
        // No profile: flags alone must name the service.
        None => {
            if global.url.is_none() {
                return Err(CliError::NoConfig {
                    path: config_path().display().to_string(),
                });
            }
            Profile::default()
        }
    };

    let service = resolve_service(&profile, &profile_name, global, cfg)?;
    let orchestrator = netbind_config::profile_to_orchestrator_config(&profile);
    Ok(Resolved {
        service,
        orchestrator,
    })
}

fn resolve_service(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<ServiceConfig, CliError> {
    // 1. URL (flag > env > profile)
    let url_str = global.url.as_deref().unwrap_or(&profile.url);
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // 2. Auth strategy (flag > profile)
    let auth = match global.auth_strategy {
        Some(AuthStrategyArg::Noauth) => ServiceAuth::NoAuth,
        Some(AuthStrategyArg::Keystone) => ServiceAuth::Keystone {
            admin: netbind_config::resolve_admin_credentials(profile, profile_name)?,
        },
        None => netbind_config::resolve_auth(profile, profile_name)?,
    };
    if auth.strategy() == AuthStrategy::Keystone && global.token.is_none() {
        tracing::debug!("no caller token given; tenant calls will be rejected");
    }

    // 3. TLS
    let tls = if global.insecure {
        TlsMode::DangerAcceptInvalid
    } else {
        netbind_config::tls_mode(profile, &cfg.defaults)
    };

    // 4. Timeout (flag > profile > defaults)
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(cfg.defaults.timeout);

    Ok(ServiceConfig {
        url,
        auth,
        tls,
        timeout: Duration::from_secs(timeout),
    })
}
