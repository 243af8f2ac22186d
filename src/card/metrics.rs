use crate::foundation::color::Rgba8;
use crate::foundation::svg::{SvgFragment, TextAnchor};
use crate::telemetry::model::{EnduranceTelemetry, ExerciseSet, StrengthWorkout};

/// `h:mm:ss` above an hour, `m:ss` below.
pub fn format_duration(sec: f64) -> String {
    let total = sec.round().max(0.0) as i64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}

pub fn format_distance_km(meters: f64) -> String {
    format!("{:.2} km", meters / 1000.0)
}

/// `m:ss /km` from a pace in minutes per kilometer.
pub fn format_pace(min_per_km: f64) -> String {
    let total_sec = (min_per_km * 60.0).round().max(0.0) as i64;
    format!("{}:{:02} /km", total_sec / 60, total_sec % 60)
}

/// One labelled headline number on the card.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricTile {
    pub label: String,
    pub value: String,
}

impl MetricTile {
    fn new(label: &str, value: String) -> Self {
        Self { label: label.to_string(), value }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        sum += v;
        n += 1;
    }
    (n > 0).then(|| sum / n as f64)
}

/// Sum of positive elevation deltas across the sample stream.
pub fn elevation_gain_m(telemetry: &EnduranceTelemetry) -> f64 {
    let heights: Vec<f64> = telemetry.samples.iter().filter_map(|s| s.elevation).collect();
    heights
        .windows(2)
        .map(|w| (w[1] - w[0]).max(0.0))
        .sum()
}

/// Headline tiles for an endurance activity. Tiles whose source metric is
/// absent are skipped rather than rendered blank.
pub fn endurance_metrics(telemetry: &EnduranceTelemetry) -> Vec<MetricTile> {
    let mut tiles = Vec::new();
    let distance_m = telemetry.distance_m();
    let duration = telemetry.duration_sec();
    tiles.push(MetricTile::new("DISTANCE", format_distance_km(distance_m)));
    tiles.push(MetricTile::new("TIME", format_duration(duration)));
    if distance_m > 0.0 && duration > 0.0 {
        let pace = (duration / 60.0) / (distance_m / 1000.0);
        tiles.push(MetricTile::new("AVG PACE", format_pace(pace)));
    }
    if let Some(hr) = mean(telemetry.samples.iter().filter_map(|s| s.heart_rate)) {
        tiles.push(MetricTile::new("AVG HR", format!("{} bpm", hr.round() as i64)));
    }
    let gain = elevation_gain_m(telemetry);
    if gain > 0.0 {
        tiles.push(MetricTile::new("ELEV GAIN", format!("{} m", gain.round() as i64)));
    }
    if let Some(cad) = mean(telemetry.samples.iter().filter_map(|s| s.cadence)) {
        tiles.push(MetricTile::new("CADENCE", format!("{} spm", cad.round() as i64)));
    }
    tiles
}

/// Headline tiles for a strength workout.
pub fn strength_metrics(workout: &StrengthWorkout) -> Vec<MetricTile> {
    let mut tiles = Vec::new();
    tiles.push(MetricTile::new(
        "VOLUME",
        format!("{} kg", workout.total_volume_kg().round() as i64),
    ));
    tiles.push(MetricTile::new("SETS", workout.working_set_count().to_string()));
    if let Some(e) = &workout.enrichment {
        if e.duration_sec > 0.0 {
            tiles.push(MetricTile::new("TIME", format_duration(e.duration_sec)));
        }
        if let Some(hr) = e.avg_hr {
            tiles.push(MetricTile::new("AVG HR", format!("{} bpm", hr.round() as i64)));
        }
        if let Some(hr) = e.max_hr {
            tiles.push(MetricTile::new("MAX HR", format!("{} bpm", hr.round() as i64)));
        }
        if let Some(kcal) = e.calories {
            tiles.push(MetricTile::new("CALORIES", format!("{}", kcal.round() as i64)));
        }
    }
    tiles
}

#[derive(Clone, Debug)]
pub struct TileStyle {
    pub label: Rgba8,
    pub value: Rgba8,
    pub label_size: f64,
    pub value_size: f64,
    pub row_height: f64,
}

impl Default for TileStyle {
    fn default() -> Self {
        Self {
            label: Rgba8::rgb(148, 163, 184),
            value: Rgba8::rgb(241, 245, 249),
            label_size: 17.0,
            value_size: 40.0,
            row_height: 96.0,
        }
    }
}

/// Lay tiles out in a fixed-column grid: small label over a large value.
pub fn render_metric_tiles(
    tiles: &[MetricTile],
    x: f64,
    y: f64,
    w: f64,
    columns: usize,
    style: &TileStyle,
) -> SvgFragment {
    let mut frag = SvgFragment::new();
    if tiles.is_empty() || columns == 0 {
        return frag;
    }
    let col_w = w / columns as f64;
    for (i, tile) in tiles.iter().enumerate() {
        let cx = x + (i % columns) as f64 * col_w;
        let cy = y + (i / columns) as f64 * style.row_height;
        frag.text(
            cx,
            cy + style.label_size,
            style.label_size,
            600,
            TextAnchor::Start,
            style.label,
            &tile.label,
        );
        frag.text(
            cx,
            cy + style.label_size + style.value_size + 8.0,
            style.value_size,
            700,
            TextAnchor::Start,
            style.value,
            &tile.value,
        );
    }
    frag
}

/// Height consumed by a tile grid with the given tile count.
pub fn metric_tiles_height(count: usize, columns: usize, style: &TileStyle) -> f64 {
    if count == 0 || columns == 0 {
        return 0.0;
    }
    count.div_ceil(columns) as f64 * style.row_height
}

/// Working volume per exercise, ordered by first appearance in the log.
pub fn exercise_volumes(sets: &[ExerciseSet]) -> Vec<(String, f64)> {
    let mut out: Vec<(String, f64)> = Vec::new();
    for set in sets {
        let volume = set.volume_kg();
        if volume <= 0.0 {
            continue;
        }
        match out.iter_mut().find(|(name, _)| *name == set.exercise_name) {
            Some((_, total)) => *total += volume,
            None => out.push((set.exercise_name.clone(), volume)),
        }
    }
    out
}

#[derive(Clone, Debug)]
pub struct VolumeBarStyle {
    pub bar: Rgba8,
    pub track: Rgba8,
    pub name: Rgba8,
    pub amount: Rgba8,
    pub bar_height: f64,
    pub row_height: f64,
    pub max_rows: usize,
}

impl Default for VolumeBarStyle {
    fn default() -> Self {
        Self {
            bar: Rgba8::rgb(34, 211, 238),
            track: Rgba8::rgba(148, 163, 184, 38),
            name: Rgba8::rgb(226, 232, 240),
            amount: Rgba8::rgb(148, 163, 184),
            bar_height: 10.0,
            row_height: 58.0,
            max_rows: 6,
        }
    }
}

/// Horizontal per-exercise volume bars, widths relative to the largest
/// exercise, truncated to `max_rows` rows.
pub fn render_volume_bars(
    volumes: &[(String, f64)],
    x: f64,
    y: f64,
    w: f64,
    style: &VolumeBarStyle,
) -> SvgFragment {
    let mut frag = SvgFragment::new();
    let max = volumes.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    if max <= 0.0 {
        return frag;
    }
    for (i, (name, volume)) in volumes.iter().take(style.max_rows).enumerate() {
        let row_y = y + i as f64 * style.row_height;
        frag.text(x, row_y + 18.0, 18.0, 500, TextAnchor::Start, style.name, name);
        frag.text(
            x + w,
            row_y + 18.0,
            16.0,
            500,
            TextAnchor::End,
            style.amount,
            &format!("{} kg", volume.round() as i64),
        );
        let track_y = row_y + 28.0;
        frag.rect(x, track_y, w, style.bar_height, style.bar_height / 2.0, style.track);
        frag.rect(
            x,
            track_y,
            (w * volume / max).max(style.bar_height),
            style.bar_height,
            style.bar_height / 2.0,
            style.bar,
        );
    }
    frag
}

pub fn volume_bars_height(rows: usize, style: &VolumeBarStyle) -> f64 {
    rows.min(style.max_rows) as f64 * style.row_height
}
