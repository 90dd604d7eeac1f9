// ── Sentinel filtering ──
//
// The K30 reports "no reading" as a magic number instead of omitting the
// value. Any numeric scalar equal to a sentinel is unavailable.

use serde_json::Value;

/// Default "no reading" markers.
pub const DEFAULT_SENTINELS: [f64; 2] = [32767.0, -32768.0];

/// Set of numeric values that mean "unavailable".
#[derive(Debug, Clone, PartialEq)]
pub struct Sentinels(Vec<f64>);

impl Sentinels {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self(values.into_iter().collect())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// `true` if `value` is a number equal to one of the sentinels.
    ///
    /// Comparison is numeric, so `32767` and `32767.0` both match.
    /// Strings and booleans never match.
    #[allow(clippy::float_cmp)]
    pub fn matches(&self, value: &Value) -> bool {
        value
            .as_f64()
            .is_some_and(|v| self.0.iter().any(|s| *s == v))
    }

    /// `value` unless it is a sentinel.
    pub fn filter<'a>(&self, value: Option<&'a Value>) -> Option<&'a Value> {
        value.filter(|v| !self.matches(v))
    }
}

impl Default for Sentinels {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINELS)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_sentinels_match_integer_and_float_forms() {
        let s = Sentinels::default();
        assert!(s.matches(&json!(32767)));
        assert!(s.matches(&json!(32767.0)));
        assert!(s.matches(&json!(-32768)));
        assert!(s.matches(&json!(-32768.0)));
    }

    #[test]
    fn other_values_pass_through() {
        let s = Sentinels::default();
        assert!(!s.matches(&json!(32766)));
        assert!(!s.matches(&json!(0)));
        assert!(!s.matches(&json!("32767")));
        assert!(!s.matches(&json!(true)));
        assert_eq!(s.filter(Some(&json!(21.5))), Some(&json!(21.5)));
        assert_eq!(s.filter(Some(&json!(-32768.0))), None);
    }

    #[test]
    fn custom_set() {
        let s = Sentinels::new([-1.0]);
        assert!(s.matches(&json!(-1)));
        assert!(!s.matches(&json!(32767)));
    }
}
