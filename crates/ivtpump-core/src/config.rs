// ── Runtime poller configuration ──
//
// Everything a `Poller` needs, built by the host. Core never reads config
// files; the CLI converts a profile into a `PumpConfig` and hands it in.

use std::time::Duration;

use ivtpump_api::{Credential, OAuthConfig, POINTT_BASE_URL, TlsMode, TransportConfig};
use url::Url;

use crate::plan::PollPlan;
use crate::sentinel::Sentinels;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_SLOW_TIER_EVERY: u32 = 5;
/// Shortest period the poll loop runs at; shorter intervals are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for polling a single device.
#[derive(Debug, Clone)]
pub struct PumpConfig {
    /// Gateway device id (the K30's serial, e.g. `101234567`).
    pub device_id: String,
    /// Gateway API root; the device id is appended to it.
    pub base_url: Url,
    pub oauth: OAuthConfig,
    /// Initial credential, typically restored from persisted state.
    pub credential: Credential,
    pub tls: TlsMode,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Time between scheduled poll cycles.
    pub poll_interval: Duration,
    /// The Slow tier is fetched every this many cycles.
    pub slow_tier_every: u32,
    pub sentinels: Sentinels,
    pub plan: PollPlan,
}

impl PumpConfig {
    /// Defaults for everything but the device and its credential.
    pub fn new(device_id: impl Into<String>, credential: Credential) -> Self {
        let transport = TransportConfig::default();
        Self {
            device_id: device_id.into(),
            base_url: Url::parse(POINTT_BASE_URL).expect("valid gateway URL constant"),
            oauth: OAuthConfig::default(),
            credential,
            tls: transport.tls,
            timeout: transport.timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            slow_tier_every: DEFAULT_SLOW_TIER_EVERY,
            sentinels: Sentinels::default(),
            plan: PollPlan::k30(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }
}
