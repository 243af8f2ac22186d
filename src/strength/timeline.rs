use crate::foundation::math::lerp;
use crate::telemetry::model::{Enrichment, ExerciseSet, SetKind};

/// Nominal per-set timing used to reconstruct a workout timeline.
///
/// These are heuristic tuning values; the scaling pass below makes the
/// reconstructed timeline sum to the workout's true duration regardless.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct TimelineConfig {
    pub set_duration_sec: f64,
    pub same_exercise_rest_sec: f64,
    pub exercise_change_rest_sec: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            set_duration_sec: 40.0,
            same_exercise_rest_sec: 25.0,
            exercise_change_rest_sec: 60.0,
        }
    }
}

/// A set with synthesized timing and interpolated heart rate. Derived per
/// render, never persisted.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SynthSet {
    pub exercise_name: String,
    pub start_sec: f64,
    pub duration_sec: f64,
    pub reps: u32,
    pub weight_kg: f64,
    pub set_kind: SetKind,
    pub avg_hr: Option<f64>,
}

/// Reconstruct per-set timing for a workout that has only start/end time
/// and per-set rep/weight data.
///
/// Nominal durations (fixed seconds per set, a short rest between sets of
/// the same exercise, a longer rest on exercise change) are summed into a
/// raw estimate, then every interval is scaled by `true_duration / raw` so
/// the synthetic timeline spans the real workout exactly. A zero raw
/// estimate leaves the scale at 1. Heart rate is interpolated from the
/// enrichment's coarse sample array at each set's midpoint.
pub fn synthesize_timeline(
    sets: &[ExerciseSet],
    true_duration_sec: f64,
    enrichment: Option<&Enrichment>,
    cfg: &TimelineConfig,
) -> Vec<SynthSet> {
    let raw: f64 = sets.len() as f64 * cfg.set_duration_sec
        + sets
            .windows(2)
            .map(|w| rest_between(&w[0], &w[1], cfg))
            .sum::<f64>();
    let scale = if raw > 0.0 { true_duration_sec / raw } else { 1.0 };

    let mut out = Vec::with_capacity(sets.len());
    let mut cursor = 0.0;
    for (i, set) in sets.iter().enumerate() {
        if i > 0 {
            cursor += rest_between(&sets[i - 1], set, cfg) * scale;
        }
        let duration_sec = cfg.set_duration_sec * scale;
        let midpoint = cursor + duration_sec / 2.0;
        out.push(SynthSet {
            exercise_name: set.exercise_name.clone(),
            start_sec: cursor,
            duration_sec,
            reps: set.reps,
            weight_kg: set.weight_kg,
            set_kind: set.set_kind,
            avg_hr: enrichment.and_then(|e| interpolate_hr(&e.hr_samples, e.duration_sec, midpoint)),
        });
        cursor += duration_sec;
    }
    out
}

fn rest_between(prev: &ExerciseSet, next: &ExerciseSet, cfg: &TimelineConfig) -> f64 {
    if prev.exercise_name == next.exercise_name {
        cfg.same_exercise_rest_sec
    } else {
        cfg.exercise_change_rest_sec
    }
}

/// Linear interpolation over a coarse heart-rate timeline whose samples are
/// evenly spaced across `[0, duration_sec]`.
///
/// Timestamps before the first or after the last sample clamp to that
/// endpoint's value; a timestamp landing exactly on a sample returns that
/// sample unmodified.
pub fn interpolate_hr(samples: &[f64], duration_sec: f64, t_sec: f64) -> Option<f64> {
    match samples.len() {
        0 => None,
        1 => Some(samples[0]),
        n => {
            if duration_sec <= 0.0 {
                return Some(samples[0]);
            }
            let spacing = duration_sec / (n - 1) as f64;
            let pos = t_sec / spacing;
            if pos <= 0.0 {
                return Some(samples[0]);
            }
            if pos >= (n - 1) as f64 {
                return Some(samples[n - 1]);
            }
            let lo = pos.floor() as usize;
            let frac = pos - lo as f64;
            Some(lerp(samples[lo], samples[lo + 1], frac))
        }
    }
}
