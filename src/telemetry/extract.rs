use std::collections::HashMap;

use serde_json::Value;

use crate::telemetry::model::{
    EnduranceTelemetry, ExerciseSet, GpsPoint, SetKind, StrengthWorkout, TelemetrySample,
};

// Descriptor keys in the provider's per-sample detail payload.
const KEY_TIMESTAMP: &str = "directTimestamp";
const KEY_LATITUDE: &str = "directLatitude";
const KEY_LONGITUDE: &str = "directLongitude";
const KEY_SPEED: &str = "directSpeed";
const KEY_HEART_RATE: &str = "directHeartRate";
const KEY_ELEVATION: &str = "directElevation";
const KEY_CADENCE: &str = "directDoubleCadence";
const KEY_POWER: &str = "directPower";

/// Decode a provider "details" payload into aligned telemetry samples.
///
/// The payload pairs a list of metric descriptors (`key` -> array index)
/// with a list of per-sample numeric arrays. The index map is built once;
/// any descriptor key the payload lacks simply yields `None` for that field
/// on every sample. Samples with a missing or negative elapsed time are
/// dropped.
pub fn extract_endurance(details: &Value) -> EnduranceTelemetry {
    let index = descriptor_index(details);
    let metrics = details
        .get("activityDetailMetrics")
        .and_then(Value::as_array);

    let Some(rows) = metrics else {
        return EnduranceTelemetry::default();
    };

    let mut samples = Vec::with_capacity(rows.len());
    let mut first_ts: Option<f64> = None;

    for row in rows {
        let row = match row.get("metrics").and_then(Value::as_array) {
            Some(arr) => arr,
            None => continue,
        };
        let field = |key: &str| -> Option<f64> {
            let idx = *index.get(key)?;
            row.get(idx).and_then(Value::as_f64)
        };

        let Some(ts) = field(KEY_TIMESTAMP) else {
            continue;
        };
        let first = *first_ts.get_or_insert(ts);
        // Provider timestamps are epoch milliseconds.
        let elapsed_sec = (ts - first) / 1000.0;
        if elapsed_sec < 0.0 {
            continue;
        }

        samples.push(TelemetrySample {
            elapsed_sec,
            lat: field(KEY_LATITUDE),
            lng: field(KEY_LONGITUDE),
            speed: field(KEY_SPEED),
            heart_rate: field(KEY_HEART_RATE),
            elevation: field(KEY_ELEVATION),
            cadence: field(KEY_CADENCE),
            power: field(KEY_POWER),
        });
    }

    let gps = gps_points(&samples);
    EnduranceTelemetry { samples, gps }
}

/// GPS subset: both coordinates present and non-zero.
pub fn gps_points(samples: &[TelemetrySample]) -> Vec<GpsPoint> {
    samples
        .iter()
        .filter_map(|s| match (s.lat, s.lng) {
            (Some(lat), Some(lng)) if lat != 0.0 && lng != 0.0 => Some(GpsPoint {
                lat,
                lng,
                speed: s.speed,
            }),
            _ => None,
        })
        .collect()
}

/// Decode a strength workout payload (`exercises[].sets[]`) into an ordered
/// flat set list. Set order follows the payload: all sets of the first
/// exercise, then the second, and so on.
pub fn extract_strength(workout: &Value) -> StrengthWorkout {
    let title = workout
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("Workout")
        .to_string();

    let mut sets = Vec::new();
    let exercises = workout
        .get("exercises")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    for ex in exercises {
        let Some(name) = ex.get("title").and_then(Value::as_str) else {
            continue;
        };
        let ex_sets = ex
            .get("sets")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for set in ex_sets {
            let set_kind = match set.get("type").and_then(Value::as_str) {
                Some("warmup") => SetKind::Warmup,
                _ => SetKind::Normal,
            };
            sets.push(ExerciseSet {
                exercise_name: name.to_string(),
                set_kind,
                weight_kg: set.get("weight_kg").and_then(Value::as_f64).unwrap_or(0.0),
                reps: set
                    .get("reps")
                    .and_then(Value::as_u64)
                    .and_then(|r| u32::try_from(r).ok())
                    .unwrap_or(0),
            });
        }
    }

    StrengthWorkout {
        title,
        sets,
        enrichment: None,
    }
}

fn descriptor_index(details: &Value) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    let Some(descriptors) = details.get("metricDescriptors").and_then(Value::as_array) else {
        return index;
    };
    for d in descriptors {
        let key = d.get("key").and_then(Value::as_str);
        let idx = d
            .get("metricsIndex")
            .and_then(Value::as_u64)
            .and_then(|i| usize::try_from(i).ok());
        if let (Some(key), Some(idx)) = (key, idx) {
            index.insert(key.to_string(), idx);
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn details_payload() -> Value {
        json!({
            "metricDescriptors": [
                {"metricsIndex": 0, "key": "directTimestamp"},
                {"metricsIndex": 1, "key": "directLatitude"},
                {"metricsIndex": 2, "key": "directLongitude"},
                {"metricsIndex": 3, "key": "directHeartRate"},
            ],
            "activityDetailMetrics": [
                {"metrics": [1000.0, 59.91, 10.75, 120.0]},
                {"metrics": [3000.0, 59.92, 10.76, 131.0]},
                {"metrics": [5000.0, 0.0, 0.0, 140.0]},
                {"metrics": [null, 59.93, 10.77, 150.0]},
            ]
        })
    }

    #[test]
    fn elapsed_is_relative_to_first_timestamp() {
        let t = extract_endurance(&details_payload());
        assert_eq!(t.samples.len(), 3);
        assert_eq!(t.samples[0].elapsed_sec, 0.0);
        assert_eq!(t.samples[1].elapsed_sec, 2.0);
        assert_eq!(t.samples[1].heart_rate, Some(131.0));
    }

    #[test]
    fn zero_coordinates_are_not_gps_points() {
        let t = extract_endurance(&details_payload());
        assert_eq!(t.gps.len(), 2);
        assert_eq!(t.gps[1].lat, 59.92);
    }

    #[test]
    fn missing_descriptor_yields_none_not_error() {
        let t = extract_endurance(&details_payload());
        // No speed/elevation descriptor in the payload.
        assert!(t.samples.iter().all(|s| s.speed.is_none()));
        assert!(t.samples.iter().all(|s| s.elevation.is_none()));
    }

    #[test]
    fn malformed_payload_is_empty_not_fatal() {
        assert_eq!(extract_endurance(&json!({})), EnduranceTelemetry::default());
        assert_eq!(
            extract_endurance(&json!({"metricDescriptors": "nope"})),
            EnduranceTelemetry::default()
        );
    }

    #[test]
    fn strength_sets_flatten_in_payload_order() {
        let w = extract_strength(&json!({
            "title": "Push Day",
            "exercises": [
                {"title": "Bench Press (Barbell)", "sets": [
                    {"type": "warmup", "weight_kg": 60.0, "reps": 10},
                    {"type": "normal", "weight_kg": 100.0, "reps": 5},
                ]},
                {"title": "Triceps Pushdown", "sets": [
                    {"type": "normal", "weight_kg": 30.0, "reps": 12},
                ]},
            ]
        }));
        assert_eq!(w.title, "Push Day");
        assert_eq!(w.sets.len(), 3);
        assert_eq!(w.sets[0].set_kind, SetKind::Warmup);
        assert_eq!(w.sets[2].exercise_name, "Triceps Pushdown");
        assert_eq!(w.working_set_count(), 2);
        assert_eq!(w.total_volume_kg(), 860.0);
    }

    #[test]
    fn strength_missing_fields_default_to_zero() {
        let w = extract_strength(&json!({
            "exercises": [{"title": "Plank", "sets": [{"type": "normal"}]}]
        }));
        assert_eq!(w.title, "Workout");
        assert_eq!(w.sets[0].weight_kg, 0.0);
        assert_eq!(w.sets[0].reps, 0);
        assert!(!w.sets[0].is_working());
    }
}
