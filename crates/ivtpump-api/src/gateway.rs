// PoinTT device gateway client
//
// Authenticated GET/PUT against `{base}/{device}/resource{path}`. The K30
// misbehaves under concurrent requests, so every wire exchange is
// serialized through one mutex per gateway. Per-request failures are
// logged and downgraded to `Absent`/`false`; only credential failures
// from `TokenManager` propagate to the caller.

use std::sync::Arc;

use indexmap::IndexMap;
use secrecy::ExposeSecret;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::Error;
use crate::response::RawResponse;
use crate::token::TokenManager;

pub const POINTT_BASE_URL: &str =
    "https://pointt-api.bosch-thermotechnology.com/pointt-api/api/v1/gateways/";

/// Resource answered by every K30; used to validate a credential.
pub const PROBE_PATH: &str = "/gateway/versionFirmware";

/// Longest response-body excerpt carried into log lines.
const LOG_BODY_LIMIT: usize = 200;

/// Body of a resource write.
#[derive(Serialize)]
struct PutBody<'a, V: ?Sized> {
    value: &'a V,
}

/// Serialized HTTP access to one device's resource tree.
pub struct Gateway {
    http: reqwest::Client,
    resource_base: String,
    device_id: String,
    tokens: Arc<TokenManager>,
    /// Held for the duration of each wire exchange.
    wire: Mutex<()>,
}

impl Gateway {
    /// Create a gateway for `device_id` under `base_url`
    /// (e.g. [`POINTT_BASE_URL`]).
    pub fn new(
        http: reqwest::Client,
        base_url: &Url,
        device_id: &str,
        tokens: Arc<TokenManager>,
    ) -> Result<Self, Error> {
        let base = base_url.as_str().trim_end_matches('/');
        let resource_base = format!("{base}/{device_id}/resource");
        // Validate once so per-request URL building cannot fail on the base.
        Url::parse(&resource_base)?;

        Ok(Self {
            http,
            resource_base,
            device_id: device_id.to_owned(),
            tokens,
            wire: Mutex::new(()),
        })
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// `{base}/{device}/resource{path}`
    pub(crate) fn resource_url(&self, path: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!("{}{path}", self.resource_base))?)
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Read one resource.
    ///
    /// 200 yields the classified body; 404, any other status, transport
    /// failures, and timeouts yield [`RawResponse::Absent`]. Only a failure
    /// to obtain a valid token is returned as `Err`.
    pub async fn get(&self, path: &str) -> Result<RawResponse, Error> {
        let token = self.tokens.ensure_valid().await?;
        let url = match self.resource_url(path) {
            Ok(url) => url,
            Err(e) => {
                warn!(path, error = %e, "GET: invalid resource path");
                return Ok(RawResponse::Absent);
            }
        };

        let _wire = self.wire.lock().await;
        debug!("GET {url}");

        let resp = match self
            .http
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!(path, error = %e, "GET: connection error");
                return Ok(RawResponse::Absent);
            }
        };

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(path, "GET: not found");
            return Ok(RawResponse::Absent);
        }
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                path,
                status = status.as_u16(),
                body = %excerpt(&body),
                "GET: unexpected status"
            );
            return Ok(RawResponse::Absent);
        }

        match resp.json::<serde_json::Value>().await {
            Ok(body) => Ok(RawResponse::from(body)),
            Err(e) => {
                warn!(path, error = %e, "GET: unreadable body");
                Ok(RawResponse::Absent)
            }
        }
    }

    /// Write one resource with body `{"value": value}`.
    ///
    /// Returns `true` on 200/204, `false` on any other status or transport
    /// failure.
    pub async fn put<V>(&self, path: &str, value: &V) -> Result<bool, Error>
    where
        V: Serialize + std::fmt::Debug + Sync + ?Sized,
    {
        let token = self.tokens.ensure_valid().await?;
        let url = match self.resource_url(path) {
            Ok(url) => url,
            Err(e) => {
                error!(path, error = %e, "PUT: invalid resource path");
                return Ok(false);
            }
        };

        let _wire = self.wire.lock().await;
        debug!("PUT {url}");

        let resp = match self
            .http
            .put(url)
            .bearer_auth(token.expose_secret())
            .json(&PutBody { value })
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!(path, error = %e, "PUT: connection error");
                return Ok(false);
            }
        };

        let status = resp.status();
        if matches!(
            status,
            reqwest::StatusCode::OK | reqwest::StatusCode::NO_CONTENT
        ) {
            info!(path, ?value, "PUT: ok");
            return Ok(true);
        }

        let body = resp.text().await.unwrap_or_default();
        error!(
            path,
            ?value,
            status = status.as_u16(),
            body = %excerpt(&body),
            "PUT: rejected"
        );
        Ok(false)
    }

    /// Read several resources one after another, in order.
    ///
    /// Every requested path appears in the result; failed reads are
    /// present as [`RawResponse::Absent`]. Stops at the first credential
    /// failure.
    pub async fn get_many<S: AsRef<str> + Sync>(
        &self,
        paths: &[S],
    ) -> Result<IndexMap<String, RawResponse>, Error> {
        let mut results = IndexMap::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let resp = self.get(path).await?;
            results.insert(path.to_owned(), resp);
        }
        Ok(results)
    }

    /// Check that the device answers with a readable firmware version.
    pub async fn probe(&self) -> Result<bool, Error> {
        let resp = self.get(PROBE_PATH).await?;
        Ok(resp.value().is_some())
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}
