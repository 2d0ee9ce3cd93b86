use serde::Deserialize;
use serde_json::{Map, Value};

/// Rule set applied to each normalised record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validator {
    /// Business records: owner id required, `total` must be positive when numeric.
    #[default]
    Generic,
    /// Location samples: ids, a real coordinate fix and a start time required.
    Geolocation,
}

impl Validator {
    pub fn as_str(self) -> &'static str {
        match self {
            Validator::Generic => "generic",
            Validator::Geolocation => "geolocation",
        }
    }

    /// `true` when the record may be forwarded.
    pub fn check(self, record: &Map<String, Value>) -> bool {
        match self {
            Validator::Generic => check_generic(record),
            Validator::Geolocation => check_geolocation(record),
        }
    }
}

fn check_generic(record: &Map<String, Value>) -> bool {
    if !is_present(record.get("userId")) {
        return false;
    }
    if let Some(total) = record.get("total").and_then(Value::as_f64) {
        if total <= 0.0 {
            return false;
        }
    }
    true
}

fn check_geolocation(record: &Map<String, Value>) -> bool {
    if !is_present(record.get("id")) || !is_present(record.get("locationId")) {
        return false;
    }

    let (Some(lat), Some(lng)) = (
        record.get("latitude").and_then(Value::as_f64),
        record.get("longitude").and_then(Value::as_f64),
    ) else {
        return false;
    };
    // 0,0 is what trackers report without a fix.
    if lat == 0.0 && lng == 0.0 {
        return false;
    }

    is_present(record.get("startTime"))
}

/// Missing, null, false, 0 and "" count as absent.
fn is_present(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
