use crate::foundation::color::Rgba8;
use crate::foundation::svg::{SvgFragment, TextAnchor};
use crate::telemetry::model::TelemetrySample;

pub const ZONE_COUNT: usize = 5;

/// Zone lower bounds as fractions of max heart rate. Zone 1 is everything
/// below the first threshold.
const ZONE_THRESHOLDS: [f64; 4] = [0.6, 0.7, 0.8, 0.9];

pub const ZONE_LABELS: [&str; ZONE_COUNT] = ["Z1", "Z2", "Z3", "Z4", "Z5"];

pub const ZONE_COLORS: [Rgba8; ZONE_COUNT] = [
    Rgba8::rgb(148, 163, 184), // easy: slate
    Rgba8::rgb(34, 211, 238),  // cyan
    Rgba8::rgb(34, 197, 94),   // green
    Rgba8::rgb(245, 158, 11),  // amber
    Rgba8::rgb(239, 68, 68),   // red
];

/// Time spent in each heart-rate zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ZoneBreakdown {
    pub max_hr: f64,
    pub seconds: [f64; ZONE_COUNT],
}

/// Zone index for one reading. Thresholds are 60/70/80/90% of max.
pub fn zone_index(hr: f64, max_hr: f64) -> usize {
    if max_hr <= 0.0 {
        return 0;
    }
    let frac = hr / max_hr;
    ZONE_THRESHOLDS.iter().filter(|&&t| frac >= t).count()
}

impl ZoneBreakdown {
    /// Bucket telemetry samples, each weighted by the gap to the next
    /// sample (the last sample gets the mean gap so it is not dropped).
    pub fn from_samples(samples: &[TelemetrySample], max_hr: f64) -> Self {
        let mut out = Self { max_hr, ..Self::default() };
        let with_hr: Vec<(f64, f64)> = samples
            .iter()
            .filter_map(|s| s.heart_rate.map(|hr| (s.elapsed_sec, hr)))
            .collect();
        if with_hr.is_empty() {
            return out;
        }
        let span = with_hr[with_hr.len() - 1].0 - with_hr[0].0;
        let mean_gap = if with_hr.len() > 1 {
            (span / (with_hr.len() - 1) as f64).max(0.0)
        } else {
            1.0
        };
        for (i, &(t, hr)) in with_hr.iter().enumerate() {
            let weight = match with_hr.get(i + 1) {
                Some(&(next_t, _)) => (next_t - t).max(0.0),
                None => mean_gap,
            };
            out.seconds[zone_index(hr, max_hr)] += weight;
        }
        out
    }

    /// Bucket an evenly spaced heart-rate array spanning `duration_sec`
    /// (the coarse strength enrichment timeline).
    pub fn from_even_samples(hr_samples: &[f64], duration_sec: f64, max_hr: f64) -> Self {
        let mut out = Self { max_hr, ..Self::default() };
        if hr_samples.is_empty() {
            return out;
        }
        let weight = duration_sec.max(0.0) / hr_samples.len() as f64;
        for &hr in hr_samples {
            out.seconds[zone_index(hr, max_hr)] += weight;
        }
        out
    }

    pub fn total_seconds(&self) -> f64 {
        self.seconds.iter().sum()
    }

    /// Per-zone fractions of total tracked time; all zeros when nothing
    /// was tracked.
    pub fn shares(&self) -> [f64; ZONE_COUNT] {
        let total = self.total_seconds();
        if total <= 0.0 {
            return [0.0; ZONE_COUNT];
        }
        self.seconds.map(|s| s / total)
    }

    pub fn is_empty(&self) -> bool {
        self.total_seconds() <= 0.0
    }
}

/// Max heart rate to normalize against: the recorded maximum when present,
/// otherwise the peak of the samples themselves, otherwise a 190 default.
pub fn effective_max_hr(recorded: Option<f64>, observed_peak: Option<f64>) -> f64 {
    recorded
        .filter(|&v| v > 0.0)
        .or(observed_peak.filter(|&v| v > 0.0))
        .unwrap_or(190.0)
}

/// Style for the horizontal zone bar rows.
#[derive(Clone, Debug)]
pub struct ZoneBarStyle {
    pub label: Rgba8,
    pub percent: Rgba8,
    pub track: Rgba8,
    pub bar_height: f64,
    pub row_gap: f64,
}

impl Default for ZoneBarStyle {
    fn default() -> Self {
        Self {
            label: Rgba8::rgb(148, 163, 184),
            percent: Rgba8::rgb(226, 232, 240),
            track: Rgba8::rgba(148, 163, 184, 38),
            bar_height: 14.0,
            row_gap: 12.0,
        }
    }
}

/// One labelled bar per zone, widths proportional to time share, hottest
/// zone on top. An empty breakdown renders nothing.
pub fn render_zone_bars(
    breakdown: &ZoneBreakdown,
    x: f64,
    y: f64,
    w: f64,
    style: &ZoneBarStyle,
) -> SvgFragment {
    let mut frag = SvgFragment::new();
    if breakdown.is_empty() {
        return frag;
    }
    let shares = breakdown.shares();
    let label_w = 36.0;
    let percent_w = 52.0;
    let track_w = (w - label_w - percent_w).max(0.0);
    for row in 0..ZONE_COUNT {
        let zone = ZONE_COUNT - 1 - row;
        let row_y = y + row as f64 * (style.bar_height + style.row_gap);
        let mid = row_y + style.bar_height / 2.0;
        frag.text(
            x,
            mid + 5.0,
            15.0,
            600,
            TextAnchor::Start,
            style.label,
            ZONE_LABELS[zone],
        );
        frag.rect(
            x + label_w,
            row_y,
            track_w,
            style.bar_height,
            style.bar_height / 2.0,
            style.track,
        );
        let bar_w = track_w * shares[zone];
        if bar_w > 0.0 {
            frag.rect(
                x + label_w,
                row_y,
                bar_w.max(style.bar_height),
                style.bar_height,
                style.bar_height / 2.0,
                ZONE_COLORS[zone],
            );
        }
        frag.text(
            x + w,
            mid + 5.0,
            15.0,
            500,
            TextAnchor::End,
            style.percent,
            &format!("{:.0}%", shares[zone] * 100.0),
        );
    }
    frag
}

/// Vertical extent of the rendered zone block.
pub fn zone_bars_height(style: &ZoneBarStyle) -> f64 {
    ZONE_COUNT as f64 * style.bar_height + (ZONE_COUNT - 1) as f64 * style.row_gap
}
