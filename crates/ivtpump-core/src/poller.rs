// ── Tiered poll coordinator ──
//
// Drives one sequential poll loop per device. Each cycle reads the Fast
// tier, reads the Slow tier when it is due (otherwise copies it from the
// previous snapshot), and publishes the merged result as a new immutable
// `Snapshot`. A cycle that fails as a whole publishes nothing.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ivtpump_api::{Gateway, RawResponse, TokenManager, TokenSink};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{MIN_POLL_INTERVAL, PumpConfig};
use crate::device::DeviceInfo;
use crate::error::CoreError;
use crate::plan::PollPlan;
use crate::sentinel::Sentinels;
use crate::snapshot::Snapshot;

/// Outcome history of the poll loop, published after every cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollHealth {
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    /// Cycles attempted, successful or not.
    pub cycles: u64,
}

/// Cycle bookkeeping, guarded by the cycle lock.
#[derive(Debug, Default)]
struct CycleState {
    /// Cycles since the Slow tier was last committed.
    slow_counter: u32,
    seq: u64,
}

/// Polls one device and serves the latest snapshot.
///
/// Cheaply cloneable via `Arc<PollerInner>`. Readers never block on the
/// poll loop: they load the currently published snapshot.
#[derive(Clone)]
pub struct Poller {
    inner: Arc<PollerInner>,
}

struct PollerInner {
    gateway: Arc<Gateway>,
    plan: PollPlan,
    slow_tier_every: u32,
    poll_interval: Duration,
    sentinels: Arc<Sentinels>,
    snapshot: ArcSwap<Snapshot>,
    /// Held for a whole cycle; cycles never overlap.
    cycle: Mutex<CycleState>,
    health: watch::Sender<PollHealth>,
    refresh_tx: mpsc::Sender<()>,
    refresh_rx: Mutex<Option<mpsc::Receiver<()>>>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    /// Build the HTTP client, token manager and gateway for `config`.
    ///
    /// `sink` receives every refreshed credential. Does not touch the
    /// network; call [`start()`](Self::start) or [`refresh()`](Self::refresh).
    pub fn new(config: PumpConfig, sink: Option<Arc<dyn TokenSink>>) -> Result<Self, CoreError> {
        let http = config.transport().build_client()?;
        let tokens = Arc::new(TokenManager::new(
            http.clone(),
            config.oauth.clone(),
            config.credential.clone(),
            sink,
        ));
        let gateway = Gateway::new(http, &config.base_url, &config.device_id, tokens)?;
        Ok(Self::with_gateway(Arc::new(gateway), &config))
    }

    /// Poll through an existing gateway, using the polling settings of
    /// `config`.
    pub fn with_gateway(gateway: Arc<Gateway>, config: &PumpConfig) -> Self {
        let sentinels = Arc::new(config.sentinels.clone());
        let (health, _) = watch::channel(PollHealth::default());
        let (refresh_tx, refresh_rx) = mpsc::channel(1);

        Self {
            inner: Arc::new(PollerInner {
                gateway,
                plan: config.plan.clone(),
                slow_tier_every: config.slow_tier_every.max(1),
                poll_interval: config.poll_interval.max(MIN_POLL_INTERVAL),
                snapshot: ArcSwap::from_pointee(Snapshot::empty(Arc::clone(&sentinels))),
                sentinels,
                cycle: Mutex::new(CycleState::default()),
                health,
                refresh_tx,
                refresh_rx: Mutex::new(Some(refresh_rx)),
                cancel: CancellationToken::new(),
                task: Mutex::new(None),
            }),
        }
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.inner.gateway
    }

    pub fn plan(&self) -> &PollPlan {
        &self.inner.plan
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run the first cycle, then spawn the periodic poll loop.
    ///
    /// A failing first cycle is returned and no loop is spawned. Calling
    /// `start` on a running poller is a no-op.
    pub async fn start(&self) -> Result<(), CoreError> {
        let mut task = self.inner.task.lock().await;
        if task.is_some() {
            return Ok(());
        }

        self.refresh().await?;

        let Some(refresh_rx) = self.inner.refresh_rx.lock().await.take() else {
            return Err(CoreError::Internal("poll loop already consumed".into()));
        };
        let period = self.inner.poll_interval;
        info!(
            device = self.inner.gateway.device_id(),
            interval_secs = period.as_secs(),
            "poll loop started"
        );
        *task = Some(tokio::spawn(poll_task(
            self.clone(),
            period,
            refresh_rx,
            self.inner.cancel.clone(),
        )));
        Ok(())
    }

    /// Stop the poll loop and wait for it to finish. The last snapshot
    /// stays readable.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let handle = self.inner.task.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "poll task did not shut down cleanly");
            }
        }
        debug!("poller shut down");
    }

    // ── Cycles ───────────────────────────────────────────────────────

    /// Run one poll cycle now, queueing behind a cycle already in flight.
    ///
    /// Returns the newly published snapshot, or the whole-cycle failure
    /// (the previous snapshot then stays live).
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let mut state = self.inner.cycle.lock().await;
        state.seq += 1;
        state.slow_counter = state.slow_counter.saturating_add(1);
        let cycle = state.seq;
        let slow_due = state.slow_counter >= self.inner.slow_tier_every;
        debug!(cycle, slow_due, "poll cycle starting");

        match self.fetch(cycle, slow_due).await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.inner.snapshot.store(Arc::clone(&snapshot));
                if slow_due {
                    state.slow_counter = 0;
                }
                self.inner.health.send_modify(|h| {
                    h.cycles = cycle;
                    h.last_success = snapshot.fetched_at();
                    h.last_error = None;
                    h.consecutive_failures = 0;
                });
                debug!(cycle, entries = snapshot.len(), "poll cycle committed");
                Ok(snapshot)
            }
            Err(e) => {
                warn!(cycle, error = %e, "poll cycle failed, keeping previous snapshot");
                self.inner.health.send_modify(|h| {
                    h.cycles = cycle;
                    h.last_error = Some(e.to_string());
                    h.consecutive_failures = h.consecutive_failures.saturating_add(1);
                });
                Err(CoreError::RefreshFailed {
                    cycle,
                    source: Box::new(e),
                })
            }
        }
    }

    /// Ask the poll loop for an extra cycle soon.
    ///
    /// Requests coalesce: while one is already queued, further requests are
    /// dropped. A queued request runs after any cycle in flight, never
    /// alongside it.
    pub fn request_refresh(&self) {
        match self.inner.refresh_tx.try_send(()) {
            Ok(()) => debug!("refresh requested"),
            Err(mpsc::error::TrySendError::Full(())) => {
                debug!("refresh already queued, coalescing");
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                debug!("poll loop gone, refresh request dropped");
            }
        }
    }

    async fn fetch(&self, cycle: u64, slow_due: bool) -> Result<Snapshot, CoreError> {
        let gateway = &self.inner.gateway;
        let plan = &self.inner.plan;

        let mut entries: IndexMap<String, RawResponse> = gateway.get_many(plan.fast()).await?;

        if slow_due {
            entries.extend(gateway.get_many(plan.slow()).await?);
        } else {
            let previous = self.inner.snapshot.load();
            for path in plan.slow() {
                if let Some(raw) = previous.raw(path) {
                    entries.insert(path.clone(), raw.clone());
                }
            }
        }

        let absent = entries.values().filter(|r| r.is_absent()).count();
        if absent > 0 {
            debug!(cycle, absent, "some paths could not be read");
        }

        Ok(Snapshot::new(
            entries,
            Arc::clone(&self.inner.sentinels),
            cycle,
            Utc::now(),
        ))
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Write `value` to `path`, then request a refresh if the device
    /// accepted it. The current snapshot is never patched locally.
    pub async fn write<V>(&self, path: &str, value: &V) -> Result<bool, CoreError>
    where
        V: Serialize + std::fmt::Debug + Sync + ?Sized,
    {
        let accepted = self.inner.gateway.put(path, value).await?;
        if accepted {
            self.request_refresh();
        }
        Ok(accepted)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot.load_full()
    }

    pub fn value(&self, path: &str) -> Option<Value> {
        self.inner.snapshot.load().value(path).cloned()
    }

    pub fn entry(&self, path: &str) -> Option<RawResponse> {
        self.inner.snapshot.load().entry(path).cloned()
    }

    pub fn values_list(&self, path: &str) -> Option<Vec<Value>> {
        self.inner
            .snapshot
            .load()
            .values_list(path)
            .map(<[Value]>::to_vec)
    }

    pub fn emon_value(&self, path: &str, key: &str) -> Option<Value> {
        self.inner.snapshot.load().emon_value(path, key).cloned()
    }

    pub fn energy_value(&self, path: &str) -> Option<f64> {
        self.inner.snapshot.load().energy_value(path)
    }

    pub fn is_available(&self, path: &str) -> bool {
        self.inner.snapshot.load().is_available(path)
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo::from_snapshot(self.inner.gateway.device_id(), &self.snapshot())
    }

    /// Subscribe to poll health updates.
    pub fn health(&self) -> watch::Receiver<PollHealth> {
        self.inner.health.subscribe()
    }
}

/// Periodic and on-demand poll cycles until cancelled.
async fn poll_task(
    poller: Poller,
    period: Duration,
    mut refresh_rx: mpsc::Receiver<()>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            Some(()) = refresh_rx.recv() => {
                debug!("running requested refresh");
                // Failures are logged and published to health by `refresh`.
                let _ = poller.refresh().await;
            }
            _ = interval.tick() => {
                let _ = poller.refresh().await;
            }
        }
    }
}
