//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use netbind_config::ConfigError;
use netbind_core::{CoreError, ErrorKind};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const POLICY: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const EXHAUSTED: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the network service at {url}")]
    #[diagnostic(
        code(netbind::connection_failed),
        help(
            "Check that the service is running and accessible.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(netbind::timeout),
        help("Increase timeout with --timeout or check service responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(netbind::auth_failed),
        help(
            "Pass a token with --token (or NETBIND_TOKEN) and check the\n\
             admin credentials of the active profile."
        )
    )]
    AuthFailed { message: String },

    #[error("No admin credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(netbind::no_credentials),
        help(
            "Set admin_username and admin_password in the profile,\n\
             or export NETBIND_ADMIN_USERNAME / NETBIND_ADMIN_PASSWORD.\n\
             Use --auth-strategy noauth for services without authentication."
        )
    )]
    NoCredentials { profile: String },

    // ── Domain ───────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(netbind::not_found), help("{hint}"))]
    NotFound { message: String, hint: String },

    #[error("{message}")]
    #[diagnostic(code(netbind::conflict))]
    Conflict { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(netbind::ambiguous),
        help("Use an id instead of a name to be more specific.")
    )]
    Ambiguous { message: String },

    #[error("{message}")]
    #[diagnostic(code(netbind::exhausted))]
    Exhausted { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(netbind::policy),
        help("Security groups need subnets and port security on every network.")
    )]
    PolicyViolation { message: String },

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(netbind::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netbind::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(netbind::profile_not_found),
        help("Available profiles: {available}\nConfig file: {path}")
    )]
    ProfileNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error("No service configured")]
    #[diagnostic(
        code(netbind::no_config),
        help(
            "Pass --url (or NETBIND_URL), or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(netbind::config))]
    Config(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(netbind::io))]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(netbind::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::Ambiguous { .. } => exit_code::CONFLICT,
            Self::Exhausted { .. } => exit_code::EXHAUSTED,
            Self::PolicyViolation { .. } => exit_code::POLICY,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

fn not_found_hint(err: &CoreError) -> String {
    match err {
        CoreError::NetworkNotFound { .. } => "Run: netbind networks list".into(),
        CoreError::PortNotFound { .. } => "Run: netbind ports list".into(),
        CoreError::FloatingIpNotFoundForAddress { .. } => "Run: netbind floating-ips list".into(),
        CoreError::FloatingIpPoolNotFound { .. } => "Run: netbind floating-ips pools".into(),
        _ => "Check the identifier and try again.".into(),
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Api {
                message,
                code,
                status,
            } => Self::ApiError {
                code: code
                    .or_else(|| status.map(|s| s.to_string()))
                    .unwrap_or_default(),
                message,
            },
            CoreError::Config { message } => Self::Config(message),
            CoreError::InvalidInput { reason } => Self::Validation {
                field: "request".into(),
                reason,
            },
            other => {
                let message = other.to_string();
                match other.kind() {
                    ErrorKind::NotFound => Self::NotFound {
                        hint: not_found_hint(&other),
                        message,
                    },
                    ErrorKind::Conflict => Self::Conflict { message },
                    ErrorKind::Ambiguous => Self::Ambiguous { message },
                    ErrorKind::Exhausted => Self::Exhausted { message },
                    ErrorKind::PolicyViolation => Self::PolicyViolation { message },
                    ErrorKind::InvalidInput => Self::Validation {
                        field: "request".into(),
                        reason: message,
                    },
                    ErrorKind::Config => Self::Config(message),
                    ErrorKind::Remote => Self::ApiError {
                        code: "remote".into(),
                        message,
                    },
                }
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other.to_string()),
        }
    }
}
