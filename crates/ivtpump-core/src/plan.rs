// ── Poll plan ──
//
// Which paths a poller reads, and how often. Fast paths are read every
// cycle; Slow paths every Nth cycle and carried forward in between.

use serde::Serialize;
use strum::{Display, EnumString};

use crate::paths;

/// Polling cadence class of a resource path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Fast,
    Slow,
}

/// Ordered Fast and Slow path lists.
///
/// A path listed in both tiers is polled as Fast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollPlan {
    fast: Vec<String>,
    slow: Vec<String>,
}

impl PollPlan {
    pub fn new<F, S>(fast: F, slow: S) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        let mut fast_paths: Vec<String> = Vec::new();
        for path in fast.into_iter().map(Into::into) {
            if !fast_paths.contains(&path) {
                fast_paths.push(path);
            }
        }

        let mut slow_paths: Vec<String> = Vec::new();
        for path in slow.into_iter().map(Into::into) {
            if !fast_paths.contains(&path) && !slow_paths.contains(&path) {
                slow_paths.push(path);
            }
        }

        Self {
            fast: fast_paths,
            slow: slow_paths,
        }
    }

    /// Default K30 plan: every live reading is Fast, the energy
    /// recordings are Slow.
    pub fn k30() -> Self {
        Self::new(
            paths::LIVE.iter().copied(),
            paths::ENERGY.iter().copied(),
        )
    }

    pub fn fast(&self) -> &[String] {
        &self.fast
    }

    pub fn slow(&self) -> &[String] {
        &self.slow
    }

    pub fn tier_of(&self, path: &str) -> Option<Tier> {
        if self.fast.iter().any(|p| p == path) {
            Some(Tier::Fast)
        } else if self.slow.iter().any(|p| p == path) {
            Some(Tier::Slow)
        } else {
            None
        }
    }

    /// Every path in polling order, Fast first.
    pub fn paths(&self) -> impl Iterator<Item = (&str, Tier)> {
        self.fast
            .iter()
            .map(|p| (p.as_str(), Tier::Fast))
            .chain(self.slow.iter().map(|p| (p.as_str(), Tier::Slow)))
    }
}
