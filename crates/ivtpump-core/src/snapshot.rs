// ── Snapshot ──
//
// The result of one committed poll cycle. Built once, published behind an
// `Arc`, never mutated; the next cycle replaces the reference.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ivtpump_api::RawResponse;
use serde_json::Value;

use crate::sentinel::Sentinels;

/// Path-keyed view of the device as of the last committed cycle.
///
/// Paths that were requested but could not be read are present as
/// [`RawResponse::Absent`]. All readers are pure lookups and never fail;
/// the worst case is `None`.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entries: IndexMap<String, RawResponse>,
    sentinels: Arc<Sentinels>,
    cycle: u64,
    fetched_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new(
        entries: IndexMap<String, RawResponse>,
        sentinels: Arc<Sentinels>,
        cycle: u64,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entries,
            sentinels,
            cycle,
            fetched_at: Some(fetched_at),
        }
    }

    /// An empty snapshot, as held before the first successful cycle.
    pub fn empty(sentinels: Arc<Sentinels>) -> Self {
        Self {
            sentinels,
            ..Self::default()
        }
    }

    /// Build a snapshot directly from response bodies.
    pub fn from_bodies<I, K>(bodies: I, sentinels: Arc<Sentinels>) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let entries = bodies
            .into_iter()
            .map(|(path, body)| (path.into(), RawResponse::from(body)))
            .collect();
        Self::new(entries, sentinels, 0, Utc::now())
    }

    /// Sequence number of the cycle that produced this snapshot (0 = none).
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every stored entry in polling order, including absent ones.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &RawResponse)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The stored entry for `path`, including an [`RawResponse::Absent`]
    /// marker. `None` only if the path was never polled.
    pub fn raw(&self, path: &str) -> Option<&RawResponse> {
        self.entries.get(path)
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The full response for `path`, if it was read successfully.
    pub fn entry(&self, path: &str) -> Option<&RawResponse> {
        self.raw(path).filter(|r| !r.is_absent())
    }

    /// The `value` field for `path`, with sentinels filtered out.
    pub fn value(&self, path: &str) -> Option<&Value> {
        self.sentinels
            .filter(self.entry(path).and_then(RawResponse::value))
    }

    /// `value` as a number.
    pub fn number(&self, path: &str) -> Option<f64> {
        self.value(path).and_then(Value::as_f64)
    }

    /// `value` as a string.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.value(path).and_then(Value::as_str)
    }

    /// The tagged `values` list for `path`.
    pub fn values_list(&self, path: &str) -> Option<&[Value]> {
        self.entry(path).and_then(RawResponse::values)
    }

    /// First element of the `values` list of `path` that carries `key`,
    /// e.g. `{"dhw": 519}` for key `dhw`.
    pub fn emon_value(&self, path: &str, key: &str) -> Option<&Value> {
        self.values_list(path)?
            .iter()
            .find_map(|item| item.as_object().and_then(|obj| obj.get(key)))
    }

    /// Most recent cumulative reading of a recording path.
    pub fn energy_value(&self, path: &str) -> Option<f64> {
        self.sentinels
            .filter(self.entry(path).and_then(RawResponse::latest_recording))
            .and_then(Value::as_f64)
    }

    /// A value is present and is not a sentinel.
    pub fn is_available(&self, path: &str) -> bool {
        self.value(path).is_some()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn snap(bodies: Vec<(&str, Value)>) -> Snapshot {
        Snapshot::from_bodies(bodies, Arc::new(Sentinels::default()))
    }

    #[test]
    fn scalar_value() {
        let s = snap(vec![("/a", json!({"value": 21.5}))]);
        assert_eq!(s.value("/a"), Some(&json!(21.5)));
        assert_eq!(s.number("/a"), Some(21.5));
        assert!(s.is_available("/a"));
    }

    #[test]
    fn energy_reads_last_recording_point() {
        let s = snap(vec![(
            "/a",
            json!({"recording": [{"y": 1.0}, {"y": 7.3}]}),
        )]);
        assert_eq!(s.energy_value("/a"), Some(7.3));
    }

    #[test]
    fn sentinel_is_unavailable() {
        let s = snap(vec![
            ("/hi", json!({"value": 32767.0})),
            ("/lo", json!({"value": -32768})),
            ("/ok", json!({"value": 32766})),
        ]);
        assert_eq!(s.value("/hi"), None);
        assert!(!s.is_available("/lo"));
        // The raw entry is still there for callers that want it.
        assert!(s.entry("/hi").is_some());
        assert_eq!(s.value("/ok"), Some(&json!(32766)));
    }

    #[test]
    fn emon_value_finds_first_matching_key() {
        let s = snap(vec![(
            "/heatSources/hs1/numberOfStarts",
            json!({"values": [{"ch": 4052}, {"dhw": 519}, {"dhw": 1}, {"total": 4571}]}),
        )]);
        assert_eq!(
            s.emon_value("/heatSources/hs1/numberOfStarts", "dhw"),
            Some(&json!(519))
        );
        assert_eq!(s.emon_value("/heatSources/hs1/numberOfStarts", "cooling"), None);
        assert_eq!(s.emon_value("/missing", "dhw"), None);
    }

    #[test]
    fn absent_entry_reads_as_missing() {
        let mut entries = IndexMap::new();
        entries.insert("/gone".to_owned(), RawResponse::Absent);
        let s = Snapshot::new(entries, Arc::default(), 1, Utc::now());

        assert!(s.raw("/gone").is_some());
        assert!(s.entry("/gone").is_none());
        assert_eq!(s.value("/gone"), None);
        assert_eq!(s.values_list("/gone"), None);
    }

    #[test]
    fn string_values() {
        let s = snap(vec![("/mode", json!({"value": "eco"}))]);
        assert_eq!(s.text("/mode"), Some("eco"));
        assert_eq!(s.number("/mode"), None);
    }
}
