//! Near-Earth-object feed payloads and the flattening used for charting.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Raw NeoWs feed response, or an error-flagged stand-in when the fetch failed.
///
/// The payload is kept as received; nothing is validated until [`shape`] runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedPayload(pub Value);

impl FeedPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// An error-flagged payload: `{"error": "<message>"}`.
    pub fn error(message: impl Into<String>) -> Self {
        Self(json!({ "error": message.into() }))
    }

    /// The error indicator, if this payload carries one.
    pub fn error_message(&self) -> Option<&str> {
        let error = self.0.get("error")?;
        Some(error.as_str().unwrap_or("unknown error"))
    }

    pub fn has_near_earth_objects(&self) -> bool {
        self.0.get("near_earth_objects").is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asteroid {
    pub name: String,
    pub diameter_km: f64,
}

/// Flattens every date bucket into `(name, max diameter km)` pairs.
///
/// Order follows the payload: date buckets as they appear in the object, then
/// objects within each bucket. Error payloads, payloads without
/// `near_earth_objects`, and records lacking a name or diameter contribute
/// nothing.
pub fn shape(payload: &FeedPayload) -> Vec<Asteroid> {
    if payload.error_message().is_some() {
        return Vec::new();
    }
    let Some(buckets) = payload.0.get("near_earth_objects").and_then(Value::as_object) else {
        return Vec::new();
    };

    buckets
        .values()
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(asteroid_from_record)
        .collect()
}

fn asteroid_from_record(record: &Value) -> Option<Asteroid> {
    let name = record.get("name")?.as_str()?;
    let diameter_km = record
        .pointer("/estimated_diameter/kilometers/estimated_diameter_max")?
        .as_f64()?;
    Some(Asteroid {
        name: name.to_string(),
        diameter_km,
    })
}
