// ── Core error types ──
//
// User-facing errors from ivtpump-core. Consumers never see raw HTTP
// status codes here; the `From<ivtpump_api::Error>` impl translates
// transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Poll errors ──────────────────────────────────────────────────
    /// A whole poll cycle failed; the previous snapshot stays live.
    #[error("Poll cycle {cycle} failed: {source}")]
    RefreshFailed {
        cycle: u64,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Could not persist refreshed credential: {message}")]
    Persistence { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `true` if the credential is unusable and the user must log in again.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::AuthenticationFailed { .. } => true,
            Self::RefreshFailed { source, .. } => source.is_auth_error(),
            _ => false,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ivtpump_api::Error> for CoreError {
    fn from(err: ivtpump_api::Error) -> Self {
        match err {
            ivtpump_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            ivtpump_api::Error::TokenRejected { status, body } => {
                CoreError::AuthenticationFailed {
                    message: format!("token endpoint returned HTTP {status}: {body}"),
                }
            }
            ivtpump_api::Error::Connection(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            ivtpump_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ivtpump_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ivtpump_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            ivtpump_api::Error::Persistence { message } => CoreError::Persistence { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_refresh_is_auth_error() {
        let err = CoreError::from(ivtpump_api::Error::TokenRejected {
            status: 400,
            body: "invalid_grant".into(),
        });
        assert!(err.is_auth_error());
        assert!(err.to_string().contains("HTTP 400"));
    }

    #[test]
    fn failed_cycle_keeps_cause_class() {
        let err = CoreError::RefreshFailed {
            cycle: 3,
            source: Box::new(CoreError::AuthenticationFailed {
                message: "no refresh token".into(),
            }),
        };
        assert!(err.is_auth_error());
        assert_eq!(
            err.to_string(),
            "Poll cycle 3 failed: Authentication failed: no refresh token"
        );
    }
}
