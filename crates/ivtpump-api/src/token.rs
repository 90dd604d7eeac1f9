// Token lifecycle management
//
// Keeps the bearer credential valid ahead of every request. The credential
// mutex is held across the staleness check *and* the refresh exchange, so
// concurrent callers queue behind a single in-flight refresh and then
// observe its result instead of starting their own.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::BoxFuture;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::credential::Credential;
use crate::error::Error;
use crate::oauth::{self, OAuthConfig};

/// Port through which refreshed credentials leave the client.
///
/// The host persists the triple so a restart can resume with the rotated
/// refresh token. The returned future is awaited before the triggering
/// request proceeds; an `Err` aborts that request with
/// [`Error::Persistence`].
pub trait TokenSink: Send + Sync {
    fn persist<'a>(&'a self, credential: &'a Credential) -> BoxFuture<'a, Result<(), Error>>;
}

/// Ensures a valid access token exists before any request.
pub struct TokenManager {
    http: reqwest::Client,
    oauth: OAuthConfig,
    credential: Mutex<Credential>,
    sink: Option<Arc<dyn TokenSink>>,
}

impl TokenManager {
    pub fn new(
        http: reqwest::Client,
        oauth: OAuthConfig,
        credential: Credential,
        sink: Option<Arc<dyn TokenSink>>,
    ) -> Self {
        Self {
            http,
            oauth,
            credential: Mutex::new(credential),
            sink,
        }
    }

    /// A copy of the current credential.
    pub async fn credential(&self) -> Credential {
        self.credential.lock().await.clone()
    }

    /// Return a usable access token, refreshing it first if it is stale.
    ///
    /// Fails with [`Error::Authentication`] without touching the network
    /// when a refresh is needed but no refresh token exists.
    pub async fn ensure_valid(&self) -> Result<SecretString, Error> {
        let mut current = self.credential.lock().await;

        if !current.needs_refresh(Utc::now()) {
            return Ok(current.access_token().clone());
        }

        let Some(refresh_token) = current.refresh_token().cloned() else {
            return Err(Error::Authentication {
                message: "access token expired and no refresh token available".into(),
            });
        };

        debug!("access token stale, refreshing");

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose_secret()),
            ("client_id", self.oauth.client_id.as_str()),
        ];
        let resp = oauth::request_token(&self.http, &self.oauth.token_url, &form).await?;

        let access_token = resp.access_token.ok_or_else(|| Error::Authentication {
            message: "refresh response carried no access_token".into(),
        })?;

        let rotated = resp.refresh_token.is_some();
        let renewed = current.renewed(
            SecretString::from(access_token),
            resp.refresh_token.map(SecretString::from),
            resp.expires_in,
            Utc::now(),
        );
        *current = renewed;

        info!(
            expires_at = ?current.expires_at(),
            rotated, "access token refreshed"
        );

        // Still holding the lock: waiters must not proceed until the
        // host has seen the new credential.
        if let Some(sink) = &self.sink {
            sink.persist(&current).await?;
            debug!("refreshed credential persisted");
        }

        Ok(current.access_token().clone())
    }
}
