/// One decoded telemetry sample, aligned across all metric arrays.
///
/// Every field except `elapsed_sec` is optional: providers omit whole
/// metrics, and individual samples carry nulls.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TelemetrySample {
    pub elapsed_sec: f64,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Meters per second.
    pub speed: Option<f64>,
    pub heart_rate: Option<f64>,
    /// Meters.
    pub elevation: Option<f64>,
    /// Steps (or revolutions) per minute.
    pub cadence: Option<f64>,
    /// Watts.
    pub power: Option<f64>,
}

/// Subset of samples with a usable GPS fix (lat and lng both non-zero).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GpsPoint {
    pub lat: f64,
    pub lng: f64,
    pub speed: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetKind {
    Normal,
    Warmup,
}

/// One logged strength set as recorded by the workout provider.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExerciseSet {
    pub exercise_name: String,
    pub set_kind: SetKind,
    pub weight_kg: f64,
    pub reps: u32,
}

impl ExerciseSet {
    /// Working sets are the only ones counted toward training volume.
    pub fn is_working(&self) -> bool {
        self.set_kind == SetKind::Normal && self.weight_kg > 0.0 && self.reps > 0
    }

    pub fn volume_kg(&self) -> f64 {
        if self.is_working() {
            self.weight_kg * f64::from(self.reps)
        } else {
            0.0
        }
    }
}

/// Secondary enrichment record for strength workouts: coarse heart-rate
/// samples plus the true total duration that the per-set data lacks.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    #[serde(default)]
    pub avg_hr: Option<f64>,
    #[serde(default)]
    pub max_hr: Option<f64>,
    #[serde(default)]
    pub calories: Option<f64>,
    pub duration_sec: f64,
    /// Evenly spaced over `[0, duration_sec]`; may be empty.
    #[serde(default)]
    pub hr_samples: Vec<f64>,
}

/// Normalized endurance telemetry: aligned samples plus the GPS track.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnduranceTelemetry {
    pub samples: Vec<TelemetrySample>,
    pub gps: Vec<GpsPoint>,
}

impl EnduranceTelemetry {
    pub fn duration_sec(&self) -> f64 {
        self.samples.last().map(|s| s.elapsed_sec).unwrap_or(0.0)
    }

    /// Total track distance in meters (haversine over the GPS trace).
    pub fn distance_m(&self) -> f64 {
        self.gps
            .windows(2)
            .map(|w| haversine_m(w[0].lat, w[0].lng, w[1].lat, w[1].lng))
            .sum()
    }
}

/// Normalized strength workout: ordered sets plus the enrichment record.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrengthWorkout {
    pub title: String,
    pub sets: Vec<ExerciseSet>,
    pub enrichment: Option<Enrichment>,
}

impl StrengthWorkout {
    pub fn working_set_count(&self) -> usize {
        self.sets.iter().filter(|s| s.is_working()).count()
    }

    pub fn total_volume_kg(&self) -> f64 {
        self.sets.iter().map(ExerciseSet::volume_kg).sum()
    }
}

const EARTH_RADIUS_M: f64 = 6_371_000.0;

pub fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let (p1, p2) = (lat1.to_radians(), lat2.to_radians());
    let dp = (lat2 - lat1).to_radians();
    let dl = (lng2 - lng1).to_radians();
    let a = (dp / 2.0).sin().powi(2) + p1.cos() * p2.cos() * (dl / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_set_requires_normal_weight_and_reps() {
        let working = ExerciseSet {
            exercise_name: "Bench Press (Barbell)".into(),
            set_kind: SetKind::Normal,
            weight_kg: 100.0,
            reps: 5,
        };
        assert!(working.is_working());
        assert_eq!(working.volume_kg(), 500.0);

        let warmup = ExerciseSet {
            set_kind: SetKind::Warmup,
            ..working.clone()
        };
        assert!(!warmup.is_working());
        assert_eq!(warmup.volume_kg(), 0.0);

        let bodyweight = ExerciseSet {
            weight_kg: 0.0,
            ..working
        };
        assert!(!bodyweight.is_working());
    }

    #[test]
    fn haversine_matches_known_distance() {
        // Roughly 111.2 km per degree of latitude at the equator.
        let d = haversine_m(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn enrichment_deserializes_camel_case() {
        let e: Enrichment = serde_json::from_str(
            r#"{"avgHr":132.0,"maxHr":171.0,"calories":250.0,"durationSec":2400.0,"hrSamples":[120.0,140.0]}"#,
        )
        .unwrap();
        assert_eq!(e.max_hr, Some(171.0));
        assert_eq!(e.hr_samples.len(), 2);
    }
}
