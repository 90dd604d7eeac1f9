// Resource response shapes
//
// The gateway serves three JSON shapes. They are classified once, when the
// body is parsed, so readers match on a variant instead of probing keys.

use serde_json::{Map, Value};

/// One resource as returned by `GET /resource{path}`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// `{"value": <scalar>, "unitOfMeasure": "C", ...}`.
    ///
    /// `value` is `None` for records that carry metadata only.
    Scalar {
        value: Option<Value>,
        unit_of_measure: Option<String>,
    },
    /// `{"values": [{"ch": 4052}, {"dhw": 519}, ...]}`: energy-monitor
    /// counters and notification lists.
    TaggedList { values: Vec<Value> },
    /// `{"recording": [{"d": ..., "y": 123.4}, ...]}`: cumulative
    /// recordings. A plain `value` is kept as a fallback.
    TimeSeries {
        recording: Vec<Value>,
        value: Option<Value>,
    },
    /// The device has no such resource (404) or the request failed.
    Absent,
}

impl RawResponse {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The raw `value` field, if this shape carries one.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Scalar { value, .. } | Self::TimeSeries { value, .. } => value.as_ref(),
            Self::TaggedList { .. } | Self::Absent => None,
        }
    }

    pub fn unit_of_measure(&self) -> Option<&str> {
        match self {
            Self::Scalar {
                unit_of_measure, ..
            } => unit_of_measure.as_deref(),
            _ => None,
        }
    }

    /// The `values` list of a tagged-list response.
    pub fn values(&self) -> Option<&[Value]> {
        match self {
            Self::TaggedList { values } => Some(values),
            _ => None,
        }
    }

    /// The `y` field of the last recording point, falling back to a plain
    /// `value` when there are no recording points or the last one is not
    /// an object.
    pub fn latest_recording(&self) -> Option<&Value> {
        match self {
            Self::TimeSeries { recording, value } => match recording.last() {
                Some(last) if last.is_object() => last.get("y"),
                _ => value.as_ref(),
            },
            Self::Scalar { value, .. } => value.as_ref(),
            Self::TaggedList { .. } | Self::Absent => None,
        }
    }
}

impl From<Value> for RawResponse {
    fn from(body: Value) -> Self {
        let mut obj = match body {
            Value::Object(obj) => obj,
            Value::Null => return Self::Absent,
            // A bare scalar body: treat it as the value itself.
            other => {
                return Self::Scalar {
                    value: Some(other),
                    unit_of_measure: None,
                };
            }
        };

        if let Some(Value::Array(recording)) = obj.remove("recording") {
            return Self::TimeSeries {
                recording,
                value: obj.remove("value"),
            };
        }

        if let Some(Value::Array(values)) = obj.remove("values") {
            return Self::TaggedList { values };
        }

        Self::Scalar {
            value: obj.remove("value"),
            unit_of_measure: unit_from(&obj),
        }
    }
}

fn unit_from(obj: &Map<String, Value>) -> Option<String> {
    obj.get("unitOfMeasure")
        .and_then(Value::as_str)
        .map(str::to_owned)
}
