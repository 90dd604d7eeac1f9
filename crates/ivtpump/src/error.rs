//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use ivtpump_config::ConfigError;
use ivtpump_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {url}")]
    #[diagnostic(
        code(ivtpump::connection_failed),
        help("Check your network connection. The K30 gateway must be online and paired.")
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(ivtpump::timeout),
        help("Raise `timeout` in the [defaults] section of your config.")
    )]
    Timeout,

    #[error("Device {device} did not answer the probe")]
    #[diagnostic(
        code(ivtpump::probe_failed),
        help("Check the device id. Run with -vv to see the gateway responses.")
    )]
    ProbeFailed { device: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(ivtpump::auth_failed),
        help(
            "Log in again:\n  \
             ivtpump auth url\n  \
             ivtpump auth exchange '<redirect url>' --device <id>"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(ivtpump::no_credentials),
        help("Run: ivtpump auth url, then ivtpump auth exchange --profile {profile} ...")
    )]
    NoCredentials { profile: String },

    #[error("Could not save refreshed tokens: {message}")]
    #[diagnostic(
        code(ivtpump::persistence),
        help("Check that the config file is writable, or switch token_storage.")
    )]
    Persistence { message: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("Device rejected the write to {path}")]
    #[diagnostic(
        code(ivtpump::write_rejected),
        help("Check the path and that the value is in range. Run with -vv for the response body.")
    )]
    WriteRejected { path: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ivtpump::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ivtpump::profile_not_found),
        help(
            "Create one with: ivtpump auth exchange '<redirect url>' --device <id>\n\
             Config file: {path}"
        )
    )]
    ProfileNotFound { name: String, path: String },

    #[error(transparent)]
    #[diagnostic(code(ivtpump::config))]
    Config(Box<ConfigError>),

    #[error("Internal error: {0}")]
    #[diagnostic(code(ivtpump::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::ProbeFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout => CliError::Timeout,
            CoreError::RefreshFailed { source, .. } => CliError::from(*source),
            CoreError::Persistence { message } => CliError::Persistence { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

impl From<ivtpump_api::Error> for CliError {
    fn from(err: ivtpump_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}
