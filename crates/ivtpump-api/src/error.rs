use thiserror::Error;

/// Top-level error type for the `ivtpump-api` crate.
///
/// Only credential-lifecycle failures escape ordinary reads and writes:
/// the gateway downgrades per-request transport and status failures to
/// an absent value (or `false` for writes) and logs them instead.
/// `ivtpump-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The credential cannot be used or renewed (e.g. no refresh token).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The token endpoint answered a refresh or code exchange with a non-200 status.
    #[error("Token endpoint rejected the request (HTTP {status}): {body}")]
    TokenRejected { status: u16, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Host collaborators ──────────────────────────────────────────
    /// The token sink failed to persist a refreshed credential.
    #[error("Failed to persist refreshed credential: {message}")]
    Persistence { message: String },
}

impl Error {
    /// Returns `true` for errors that mean the credential is unusable and
    /// the user has to re-authenticate.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::TokenRejected { .. })
    }

    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Connection(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::TokenRejected { status, .. } => Some(*status),
            Self::Connection(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
