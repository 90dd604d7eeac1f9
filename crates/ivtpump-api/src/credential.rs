// OAuth2 bearer credential held by a single client instance.
//
// Pure data plus the validity check. Only `TokenManager` replaces it.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;

/// Tokens are renewed this many seconds before they actually expire.
pub const REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Token lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// The access/refresh token pair and the access token's expiry.
///
/// A credential without a refresh token can never be renewed: once it is
/// stale, the next request fails with an authentication error instead of
/// attempting a refresh exchange.
#[derive(Debug, Clone)]
pub struct Credential {
    access_token: SecretString,
    refresh_token: Option<SecretString>,
    expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(
        access_token: SecretString,
        refresh_token: Option<SecretString>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at,
        }
    }

    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&SecretString> {
        self.refresh_token.as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether a refresh exchange is possible at all.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    /// Whether the access token must be renewed before the next request.
    ///
    /// - Known expiry: stale once `now` is within [`REFRESH_MARGIN_SECS`]
    ///   of it.
    /// - Unknown expiry: stale only if a refresh token exists; a bare
    ///   access token with no expiry is trusted indefinitely.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at - TimeDelta::seconds(REFRESH_MARGIN_SECS),
            None => self.refresh_token.is_some(),
        }
    }

    /// Build the successor credential from a token endpoint response.
    ///
    /// Refresh tokens are not always rotated, so the previous one is kept
    /// when the response carries none.
    pub(crate) fn renewed(
        &self,
        access_token: SecretString,
        refresh_token: Option<SecretString>,
        expires_in_secs: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token,
            refresh_token: refresh_token.or_else(|| self.refresh_token.clone()),
            expires_at: Some(
                now + TimeDelta::seconds(expires_in_secs.unwrap_or(DEFAULT_EXPIRES_IN_SECS)),
            ),
        }
    }
}
