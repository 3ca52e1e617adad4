// ── Core error types ──
//
// Allocation-level failures surfaced to lifecycle callers. Transport and
// HTTP details from `netbind-api` are folded into these variants by the
// `From<netbind_api::Error>` impl; callers match on `kind()` rather than
// on status codes.

use strum::Display;
use thiserror::Error;

/// Coarse classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Ambiguous,
    Exhausted,
    PolicyViolation,
    InvalidInput,
    Remote,
    Config,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Not found ────────────────────────────────────────────────────
    #[error("Network(s) {ids} could not be found")]
    NetworkNotFound { ids: String },

    #[error("Port {port_id} could not be found")]
    PortNotFound { port_id: String },

    #[error("Floating IP not found for address {address}")]
    FloatingIpNotFoundForAddress { address: String },

    #[error("Fixed IP not found for address {address}")]
    FixedIpNotFoundForAddress { address: String },

    #[error("Instance {instance_uuid} does not have fixed IP '{address}'")]
    FixedIpNotFoundForInstance {
        instance_uuid: String,
        address: String,
    },

    #[error("Network could not be found for instance {instance_uuid}")]
    NetworkNotFoundForInstance { instance_uuid: String },

    #[error("Floating IP pool not found: {pool}")]
    FloatingIpPoolNotFound { pool: String },

    #[error("Security group {group} not found")]
    SecurityGroupNotFound { group: String },

    // ── Conflicts ────────────────────────────────────────────────────
    #[error("Port {port_id} is still in use")]
    PortInUse { port_id: String },

    #[error("Floating IP {address} is associated")]
    FloatingIpAssociated { address: String },

    #[error("Network {network_id} is duplicated in the request")]
    NetworkDuplicated { network_id: String },

    // ── Ambiguity ────────────────────────────────────────────────────
    #[error("{message}")]
    NoUniqueMatch { message: String },

    #[error("Multiple floating IPs are found for address {address}")]
    FloatingIpMultipleFoundForAddress { address: String },

    #[error("Fixed IP address {address} is in use by multiple instances")]
    FixedIpAssociatedWithMultipleInstances { address: String },

    #[error("Multiple ports of instance {instance_uuid} carry fixed IP {address}")]
    FixedIpMultipleFoundForAddress {
        instance_uuid: String,
        address: String,
    },

    // ── Exhaustion ───────────────────────────────────────────────────
    #[error("Port {port_id} is not usable for instance {instance}")]
    PortNotUsable { port_id: String, instance: String },

    #[error("No free port available for instance {instance}")]
    PortNotFree { instance: String },

    // ── Policy ───────────────────────────────────────────────────────
    #[error("Network requires port_security_enabled and subnet associated in order to apply security groups")]
    SecurityGroupCannotBeApplied,

    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    // ── Remote failures ──────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot connect to network service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Network service request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Resource not found: {message}")]
    RemoteNotFound { message: String },

    #[error("Conflict reported by network service: {message}")]
    RemoteConflict { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// The service's own error type name (e.g. `IpAddressInUse`).
        code: Option<String>,
        status: Option<u16>,
    },

    // ── Configuration / internal ─────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkNotFound { .. }
            | Self::PortNotFound { .. }
            | Self::FloatingIpNotFoundForAddress { .. }
            | Self::FixedIpNotFoundForAddress { .. }
            | Self::FixedIpNotFoundForInstance { .. }
            | Self::NetworkNotFoundForInstance { .. }
            | Self::FloatingIpPoolNotFound { .. }
            | Self::SecurityGroupNotFound { .. }
            | Self::RemoteNotFound { .. } => ErrorKind::NotFound,

            Self::PortInUse { .. }
            | Self::FloatingIpAssociated { .. }
            | Self::NetworkDuplicated { .. }
            | Self::RemoteConflict { .. } => ErrorKind::Conflict,

            Self::NoUniqueMatch { .. }
            | Self::FloatingIpMultipleFoundForAddress { .. }
            | Self::FixedIpAssociatedWithMultipleInstances { .. }
            | Self::FixedIpMultipleFoundForAddress { .. } => ErrorKind::Ambiguous,

            Self::PortNotUsable { .. } | Self::PortNotFree { .. } => ErrorKind::Exhausted,

            Self::SecurityGroupCannotBeApplied => ErrorKind::PolicyViolation,

            Self::InvalidInput { .. } => ErrorKind::InvalidInput,

            Self::AuthenticationFailed { .. }
            | Self::ConnectionFailed { .. }
            | Self::Timeout { .. }
            | Self::Api { .. }
            | Self::Internal(_) => ErrorKind::Remote,

            Self::Config { .. } => ErrorKind::Config,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netbind_api::Error> for CoreError {
    fn from(err: netbind_api::Error) -> Self {
        if err.is_not_found() {
            return CoreError::RemoteNotFound {
                message: err.to_string(),
            };
        }
        if err.is_conflict() {
            return CoreError::RemoteConflict {
                message: err.to_string(),
            };
        }

        match err {
            netbind_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            netbind_api::Error::Unauthorized => CoreError::AuthenticationFailed {
                message: "token rejected by the network service".into(),
            },
            netbind_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            netbind_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            netbind_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            netbind_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            netbind_api::Error::Api {
                status,
                kind,
                message,
            } => CoreError::Api {
                message,
                code: kind,
                status: Some(status),
            },
            netbind_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("unexpected response: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_status_maps_to_not_found_kind() {
        let err: CoreError = netbind_api::Error::Api {
            status: 404,
            kind: Some("PortNotFound".into()),
            message: "gone".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn conflict_status_maps_to_conflict_kind() {
        let err: CoreError = netbind_api::Error::Api {
            status: 409,
            kind: None,
            message: "in use".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn service_error_keeps_its_type_name() {
        let err: CoreError = netbind_api::Error::Api {
            status: 400,
            kind: Some("IpAddressInUse".into()),
            message: "address taken".into(),
        }
        .into();
        match err {
            CoreError::Api { code, status, .. } => {
                assert_eq!(code.as_deref(), Some("IpAddressInUse"));
                assert_eq!(status, Some(400));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn unauthorized_is_authentication_failure() {
        let err: CoreError = netbind_api::Error::Unauthorized.into();
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
        assert_eq!(err.kind(), ErrorKind::Remote);
    }

    #[test]
    fn kinds_cover_allocation_failures() {
        assert_eq!(
            CoreError::PortNotFree {
                instance: "vm".into()
            }
            .kind(),
            ErrorKind::Exhausted
        );
        assert_eq!(
            CoreError::SecurityGroupCannotBeApplied.kind(),
            ErrorKind::PolicyViolation
        );
        assert_eq!(ErrorKind::PolicyViolation.to_string(), "policy_violation");
    }
}
