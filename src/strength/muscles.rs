use std::collections::BTreeMap;

use crate::telemetry::model::ExerciseSet;

/// Anatomical muscle groups distinguished by the body heatmap.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Lats,
    UpperBack,
    LowerBack,
    Traps,
    Shoulders,
    Biceps,
    Triceps,
    Forearms,
    Abs,
    Obliques,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
}

impl MuscleGroup {
    pub fn label(self) -> &'static str {
        match self {
            Self::Chest => "Chest",
            Self::Lats => "Lats",
            Self::UpperBack => "Upper back",
            Self::LowerBack => "Lower back",
            Self::Traps => "Traps",
            Self::Shoulders => "Shoulders",
            Self::Biceps => "Biceps",
            Self::Triceps => "Triceps",
            Self::Forearms => "Forearms",
            Self::Abs => "Abs",
            Self::Obliques => "Obliques",
            Self::Quads => "Quads",
            Self::Hamstrings => "Hamstrings",
            Self::Glutes => "Glutes",
            Self::Calves => "Calves",
        }
    }
}

/// Primary and secondary target groups for one exercise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MuscleTargets {
    pub primary: &'static [MuscleGroup],
    pub secondary: &'static [MuscleGroup],
}

use MuscleGroup::*;

/// Exact-name lookup, checked before the substring fallback rules.
static EXACT_TARGETS: &[(&str, MuscleTargets)] = &[
    ("Bench Press", t(&[Chest], &[Triceps, Shoulders])),
    ("Bench Press (Barbell)", t(&[Chest], &[Triceps, Shoulders])),
    ("Bench Press (Dumbbell)", t(&[Chest], &[Triceps, Shoulders])),
    ("Incline Bench Press (Barbell)", t(&[Chest], &[Triceps, Shoulders])),
    ("Incline Bench Press (Dumbbell)", t(&[Chest], &[Triceps, Shoulders])),
    ("Chest Fly (Dumbbell)", t(&[Chest], &[Shoulders])),
    ("Push Up", t(&[Chest], &[Triceps, Shoulders])),
    ("Chest Dip", t(&[Chest], &[Triceps])),
    ("Overhead Press (Barbell)", t(&[Shoulders], &[Triceps])),
    ("Overhead Press (Dumbbell)", t(&[Shoulders], &[Triceps])),
    ("Lateral Raise (Dumbbell)", t(&[Shoulders], &[])),
    ("Lateral Raise (Cable)", t(&[Shoulders], &[])),
    ("Rear Delt Reverse Fly (Dumbbell)", t(&[Shoulders], &[UpperBack])),
    ("Shrug (Dumbbell)", t(&[Traps], &[])),
    ("Shrug (Barbell)", t(&[Traps], &[])),
    ("Pull Up", t(&[Lats], &[Biceps, UpperBack])),
    ("Chin Up", t(&[Lats], &[Biceps])),
    ("Lat Pulldown (Cable)", t(&[Lats], &[Biceps])),
    ("Bent Over Row (Barbell)", t(&[UpperBack], &[Lats, Biceps])),
    ("Dumbbell Row", t(&[UpperBack], &[Lats, Biceps])),
    ("Seated Cable Row - Bar Grip", t(&[UpperBack], &[Lats, Biceps])),
    ("Face Pull", t(&[UpperBack], &[Shoulders])),
    ("Deadlift (Barbell)", t(&[Hamstrings, LowerBack], &[Glutes, Traps])),
    ("Romanian Deadlift (Barbell)", t(&[Hamstrings], &[Glutes, LowerBack])),
    ("Back Extension (Hyperextension)", t(&[LowerBack], &[Glutes, Hamstrings])),
    ("Squat (Barbell)", t(&[Quads], &[Glutes, Hamstrings])),
    ("Front Squat", t(&[Quads], &[Glutes, Abs])),
    ("Leg Press (Machine)", t(&[Quads], &[Glutes])),
    ("Goblet Squat", t(&[Quads], &[Glutes])),
    ("Bulgarian Split Squat", t(&[Quads], &[Glutes, Hamstrings])),
    ("Lunge (Dumbbell)", t(&[Quads], &[Glutes, Hamstrings])),
    ("Leg Extension (Machine)", t(&[Quads], &[])),
    ("Lying Leg Curl (Machine)", t(&[Hamstrings], &[])),
    ("Seated Leg Curl (Machine)", t(&[Hamstrings], &[])),
    ("Hip Thrust (Barbell)", t(&[Glutes], &[Hamstrings])),
    ("Glute Bridge", t(&[Glutes], &[Hamstrings])),
    ("Standing Calf Raise", t(&[Calves], &[])),
    ("Seated Calf Raise", t(&[Calves], &[])),
    ("Bicep Curl (Barbell)", t(&[Biceps], &[Forearms])),
    ("Bicep Curl (Dumbbell)", t(&[Biceps], &[Forearms])),
    ("Hammer Curl (Dumbbell)", t(&[Biceps], &[Forearms])),
    ("Preacher Curl (Barbell)", t(&[Biceps], &[])),
    ("Triceps Pushdown", t(&[Triceps], &[])),
    ("Skullcrusher (Barbell)", t(&[Triceps], &[])),
    ("Triceps Extension (Cable)", t(&[Triceps], &[])),
    ("Triceps Dip", t(&[Triceps], &[Chest])),
    ("Crunch", t(&[Abs], &[])),
    ("Sit Up", t(&[Abs], &[])),
    ("Plank", t(&[Abs], &[Obliques])),
    ("Hanging Leg Raise", t(&[Abs], &[])),
    ("Russian Twist (Weighted)", t(&[Obliques], &[Abs])),
    ("Farmers Walk", t(&[Forearms], &[Traps, Abs])),
];

/// Ordered substring fallback for names the exact table does not know.
/// More specific patterns come first; matching is case-insensitive.
static FALLBACK_RULES: &[(&str, MuscleTargets)] = &[
    ("bench press", t(&[Chest], &[Triceps, Shoulders])),
    ("chest press", t(&[Chest], &[Triceps, Shoulders])),
    ("chest fly", t(&[Chest], &[Shoulders])),
    ("push up", t(&[Chest], &[Triceps, Shoulders])),
    ("pushup", t(&[Chest], &[Triceps, Shoulders])),
    ("leg curl", t(&[Hamstrings], &[])),
    ("leg extension", t(&[Quads], &[])),
    ("leg press", t(&[Quads], &[Glutes])),
    ("calf raise", t(&[Calves], &[])),
    ("calf press", t(&[Calves], &[])),
    ("lateral raise", t(&[Shoulders], &[])),
    ("front raise", t(&[Shoulders], &[])),
    ("shrug", t(&[Traps], &[])),
    ("upright row", t(&[Traps], &[Shoulders])),
    ("face pull", t(&[UpperBack], &[Shoulders])),
    ("pulldown", t(&[Lats], &[Biceps])),
    ("pull up", t(&[Lats], &[Biceps, UpperBack])),
    ("chin up", t(&[Lats], &[Biceps])),
    ("pullover", t(&[Lats], &[Chest])),
    ("romanian deadlift", t(&[Hamstrings], &[Glutes, LowerBack])),
    ("deadlift", t(&[Hamstrings, LowerBack], &[Glutes, Traps])),
    ("good morning", t(&[Hamstrings], &[LowerBack])),
    ("hip thrust", t(&[Glutes], &[Hamstrings])),
    ("glute", t(&[Glutes], &[Hamstrings])),
    ("lunge", t(&[Quads], &[Glutes, Hamstrings])),
    ("split squat", t(&[Quads], &[Glutes, Hamstrings])),
    ("squat", t(&[Quads], &[Glutes, Hamstrings])),
    ("hyperextension", t(&[LowerBack], &[Glutes, Hamstrings])),
    ("back extension", t(&[LowerBack], &[Glutes, Hamstrings])),
    ("row", t(&[UpperBack], &[Lats, Biceps])),
    ("curl", t(&[Biceps], &[Forearms])),
    ("skullcrusher", t(&[Triceps], &[])),
    ("pushdown", t(&[Triceps], &[])),
    ("pressdown", t(&[Triceps], &[])),
    ("triceps", t(&[Triceps], &[])),
    ("dip", t(&[Triceps], &[Chest])),
    ("overhead press", t(&[Shoulders], &[Triceps])),
    ("shoulder press", t(&[Shoulders], &[Triceps])),
    ("press", t(&[Shoulders], &[Triceps])),
    ("crunch", t(&[Abs], &[])),
    ("sit up", t(&[Abs], &[])),
    ("plank", t(&[Abs], &[Obliques])),
    ("leg raise", t(&[Abs], &[])),
    ("twist", t(&[Obliques], &[Abs])),
    ("fly", t(&[Chest], &[Shoulders])),
];

const fn t(primary: &'static [MuscleGroup], secondary: &'static [MuscleGroup]) -> MuscleTargets {
    MuscleTargets { primary, secondary }
}

/// Resolve an exercise name to its target muscle groups: exact-name table
/// first, then the ordered substring rules. Unknown names resolve to
/// nothing and contribute no volume.
pub fn resolve_targets(exercise_name: &str) -> Option<MuscleTargets> {
    if let Some((_, targets)) = EXACT_TARGETS.iter().find(|(n, _)| *n == exercise_name) {
        return Some(*targets);
    }
    let lower = exercise_name.to_lowercase();
    FALLBACK_RULES
        .iter()
        .find(|(pat, _)| lower.contains(pat))
        .map(|(_, targets)| *targets)
}

/// Share of a set's volume credited to each secondary muscle group.
pub const SECONDARY_WEIGHT: f64 = 0.33;

/// Accumulated training volume for one muscle group.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MuscleVolume {
    pub primary_volume: f64,
    pub secondary_volume: f64,
}

impl MuscleVolume {
    pub fn total(self) -> f64 {
        self.primary_volume + self.secondary_volume
    }
}

/// Per-group volume totals for a whole workout.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MuscleVolumes(pub BTreeMap<MuscleGroup, MuscleVolume>);

impl MuscleVolumes {
    pub fn total_for(&self, group: MuscleGroup) -> f64 {
        self.0.get(&group).copied().unwrap_or_default().total()
    }

    pub fn max_total(&self) -> f64 {
        self.0.values().map(|v| v.total()).fold(0.0, f64::max)
    }
}

/// Accumulate weight x reps across all working sets: full credit to every
/// primary group, `SECONDARY_WEIGHT` to every secondary group. Warm-up and
/// zero-weight/zero-rep sets contribute nothing.
pub fn aggregate_volumes(sets: &[ExerciseSet]) -> MuscleVolumes {
    let mut volumes = MuscleVolumes::default();
    for set in sets {
        if !set.is_working() {
            continue;
        }
        let Some(targets) = resolve_targets(&set.exercise_name) else {
            continue;
        };
        let volume = set.volume_kg();
        for &group in targets.primary {
            volumes.0.entry(group).or_default().primary_volume += volume;
        }
        for &group in targets.secondary {
            volumes.0.entry(group).or_default().secondary_volume += volume * SECONDARY_WEIGHT;
        }
    }
    volumes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::model::SetKind;

    fn set(name: &str, kind: SetKind, weight_kg: f64, reps: u32) -> ExerciseSet {
        ExerciseSet {
            exercise_name: name.to_string(),
            set_kind: kind,
            weight_kg,
            reps,
        }
    }

    #[test]
    fn bench_press_splits_primary_and_secondary() {
        let sets = vec![set("Bench Press", SetKind::Normal, 100.0, 5)];
        let v = aggregate_volumes(&sets);
        assert_eq!(v.total_for(MuscleGroup::Chest), 500.0);
        assert_eq!(v.total_for(MuscleGroup::Triceps), 165.0);
        assert_eq!(v.total_for(MuscleGroup::Shoulders), 165.0);
        assert_eq!(v.total_for(MuscleGroup::Quads), 0.0);
    }

    #[test]
    fn warmup_sets_contribute_nothing() {
        let sets = vec![
            set("Bench Press", SetKind::Warmup, 60.0, 10),
            set("Bench Press", SetKind::Normal, 0.0, 5),
            set("Bench Press", SetKind::Normal, 100.0, 0),
        ];
        let v = aggregate_volumes(&sets);
        assert_eq!(v.max_total(), 0.0);
    }

    #[test]
    fn exact_match_wins_over_fallback() {
        // "Triceps Dip" would hit the "triceps" fallback anyway, but exact
        // entries must short-circuit the rule scan.
        let targets = resolve_targets("Triceps Dip").unwrap();
        assert_eq!(targets.primary, &[MuscleGroup::Triceps]);
        assert_eq!(targets.secondary, &[MuscleGroup::Chest]);
    }

    #[test]
    fn unknown_names_fall_back_by_substring() {
        let targets = resolve_targets("Banded Zottman Curl Thing").unwrap();
        assert_eq!(targets.primary, &[MuscleGroup::Biceps]);

        let targets = resolve_targets("Machine Chest Press Ultra").unwrap();
        assert_eq!(targets.primary, &[MuscleGroup::Chest]);
    }

    #[test]
    fn rule_order_prefers_specific_patterns() {
        // "Leg Curl" must not match the generic "curl" (biceps) rule.
        let targets = resolve_targets("Standing Leg Curls Deluxe").unwrap();
        assert_eq!(targets.primary, &[MuscleGroup::Hamstrings]);
        // "Incline Bench Press" must not hit the bare "press" rule.
        let targets = resolve_targets("Paused Incline Bench Press").unwrap();
        assert_eq!(targets.primary, &[MuscleGroup::Chest]);
    }

    #[test]
    fn totally_unknown_exercise_is_ignored() {
        assert!(resolve_targets("Underwater Basket Weaving").is_none());
        let sets = vec![set("Underwater Basket Weaving", SetKind::Normal, 50.0, 10)];
        assert_eq!(aggregate_volumes(&sets).max_total(), 0.0);
    }

    #[test]
    fn volumes_accumulate_across_exercises() {
        let sets = vec![
            set("Squat (Barbell)", SetKind::Normal, 120.0, 5),
            set("Squat (Barbell)", SetKind::Normal, 120.0, 5),
            set("Romanian Deadlift (Barbell)", SetKind::Normal, 80.0, 8),
        ];
        let v = aggregate_volumes(&sets);
        assert_eq!(v.total_for(MuscleGroup::Quads), 1200.0);
        // RDL: 640 primary hamstrings; squats add 2*600*0.33 secondary.
        let ham = v.total_for(MuscleGroup::Hamstrings);
        assert!((ham - (640.0 + 1200.0 * 0.33)).abs() < 1e-9);
        assert!(v.max_total() >= ham);
    }
}
