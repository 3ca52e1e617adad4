//! Shared helpers for command handlers.

use std::path::Path;

use secrecy::SecretString;

use netbind_core::{Instance, RequestContext, RequestedNetwork};

use crate::cli::{GlobalOpts, RequestArgs};
use crate::error::CliError;

/// Read and parse the instance description file.
pub fn read_instance(path: &Path) -> Result<Instance, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "instance".into(),
        reason: format!("invalid instance JSON in {}: {e}", path.display()),
    })
}

/// Caller context: `--project` wins over the instance's own project.
pub fn context(global: &GlobalOpts, instance: Option<&Instance>) -> RequestContext {
    let project = global
        .project
        .clone()
        .or_else(|| instance.map(|i| i.project_id.clone()))
        .unwrap_or_default();
    let ctx = RequestContext::new(project);
    match &global.token {
        Some(token) => ctx.with_token(SecretString::from(token.clone())),
        None => ctx,
    }
}

/// Like [`context`], for commands that only make sense within a project.
pub fn project_context(global: &GlobalOpts) -> Result<RequestContext, CliError> {
    let ctx = context(global, None);
    if ctx.project_id.is_empty() {
        return Err(CliError::Validation {
            field: "project".into(),
            reason: "pass --project or set NETBIND_PROJECT".into(),
        });
    }
    Ok(ctx)
}

/// Parse one `NET[=IP]` argument.
pub fn parse_network_arg(raw: &str) -> Result<RequestedNetwork, CliError> {
    let invalid = || CliError::Validation {
        field: "network".into(),
        reason: format!("expected NET or NET=IP, got '{raw}'"),
    };
    match raw.split_once('=') {
        None if !raw.is_empty() => Ok(RequestedNetwork::network(raw)),
        Some((net, ip)) if !net.is_empty() && !ip.is_empty() => {
            Ok(RequestedNetwork::network_with_ip(net, ip))
        }
        _ => Err(invalid()),
    }
}

/// Requested networks in command-line order: `--network` entries, then `--port`.
pub fn requested_networks(args: &RequestArgs) -> Result<Vec<RequestedNetwork>, CliError> {
    let mut requested = args
        .networks
        .iter()
        .map(|raw| parse_network_arg(raw))
        .collect::<Result<Vec<_>, _>>()?;
    requested.extend(args.ports.iter().map(RequestedNetwork::port));
    Ok(requested)
}
