//! Polling and snapshot cache between `ivtpump-api` and its consumers.
//!
//! - **[`Poller`]**: drives the poll loop for one device. Each cycle reads
//!   the Fast tier of its [`PollPlan`], reads the Slow tier every Nth
//!   cycle (carrying it forward in between), and atomically publishes the
//!   result as a new [`Snapshot`]. Failed cycles leave the previous
//!   snapshot live and are reported through [`PollHealth`].
//!
//! - **[`Snapshot`]**: immutable, path-keyed result of one cycle, with
//!   typed readers (`value`, `values_list`, `emon_value`, `energy_value`)
//!   that filter the device's "no reading" [`Sentinels`].
//!
//! - **[`paths`]**: the K30 resource catalogue behind [`PollPlan::k30`].

pub mod config;
pub mod device;
pub mod error;
pub mod paths;
pub mod plan;
pub mod poller;
pub mod sentinel;
pub mod snapshot;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::PumpConfig;
pub use device::{DEVICE_INFO_PATHS, DeviceInfo};
pub use error::CoreError;
pub use plan::{PollPlan, Tier};
pub use poller::{PollHealth, Poller};
pub use sentinel::Sentinels;
pub use snapshot::Snapshot;
