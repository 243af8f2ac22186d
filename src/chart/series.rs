use crate::foundation::color::Rgba8;
pub use crate::foundation::math::downsample;
use crate::telemetry::model::TelemetrySample;

/// Downsampling cap applied to every chart series before rendering.
pub const CHART_POINT_CAP: usize = 200;

/// Label formatting for chart min/max captions and metric tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ValueFormat {
    /// Plain rounded integer ("142").
    Integer,
    /// Rounded integer with a meters suffix ("87 m").
    Meters,
    /// Minutes:seconds per kilometer ("5:32").
    PaceMinPerKm,
}

impl ValueFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            Self::Integer => format!("{}", value.round() as i64),
            Self::Meters => format!("{} m", value.round() as i64),
            Self::PaceMinPerKm => {
                let total_sec = (value * 60.0).round().max(0.0) as i64;
                format!("{}:{:02}", total_sec / 60, total_sec % 60)
            }
        }
    }
}

/// An ordered, possibly sparse series of values plus rendering metadata.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub values: Vec<Option<f64>>,
    pub color: Rgba8,
    pub format: ValueFormat,
    /// When set, smaller values render near the top (pace: faster is up).
    pub invert: bool,
}

impl ChartSeries {
    /// Min/max over the non-null values of an already-downsampled series.
    /// `None` when fewer than two valid values remain: the series renders
    /// as an empty placeholder instead.
    pub fn scale_bounds(values: &[Option<f64>]) -> Option<(f64, f64)> {
        let mut valid = values.iter().flatten();
        let first = *valid.next()?;
        let mut min = first;
        let mut max = first;
        let mut count = 1usize;
        for &v in valid {
            min = min.min(v);
            max = max.max(v);
            count += 1;
        }
        (count >= 2).then_some((min, max))
    }
}

const SPEED_FLOOR_MPS: f64 = 0.3;

/// Pace in minutes per kilometer, derived from speed. Near-zero speeds are
/// treated as gaps rather than producing unbounded pace values.
pub fn pace_series(samples: &[TelemetrySample], color: Rgba8) -> ChartSeries {
    ChartSeries {
        label: "Pace".to_string(),
        values: samples
            .iter()
            .map(|s| {
                s.speed
                    .filter(|&v| v > SPEED_FLOOR_MPS)
                    .map(|v| 1000.0 / v / 60.0)
            })
            .collect(),
        color,
        format: ValueFormat::PaceMinPerKm,
        invert: true,
    }
}

pub fn heart_rate_series(samples: &[TelemetrySample], color: Rgba8) -> ChartSeries {
    ChartSeries {
        label: "Heart rate".to_string(),
        values: samples.iter().map(|s| s.heart_rate).collect(),
        color,
        format: ValueFormat::Integer,
        invert: false,
    }
}

pub fn elevation_series(samples: &[TelemetrySample], color: Rgba8) -> ChartSeries {
    ChartSeries {
        label: "Elevation".to_string(),
        values: samples.iter().map(|s| s.elevation).collect(),
        color,
        format: ValueFormat::Meters,
        invert: false,
    }
}

pub fn cadence_series(samples: &[TelemetrySample], color: Rgba8) -> ChartSeries {
    ChartSeries {
        label: "Cadence".to_string(),
        values: samples.iter().map(|s| s.cadence).collect(),
        color,
        format: ValueFormat::Integer,
        invert: false,
    }
}

pub fn power_series(samples: &[TelemetrySample], color: Rgba8) -> ChartSeries {
    ChartSeries {
        label: "Power".to_string(),
        values: samples.iter().map(|s| s.power).collect(),
        color,
        format: ValueFormat::Integer,
        invert: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_bounds_ignores_nulls() {
        let values = vec![None, Some(5.0), None, Some(2.0), Some(9.0)];
        assert_eq!(ChartSeries::scale_bounds(&values), Some((2.0, 9.0)));
    }

    #[test]
    fn one_valid_value_is_not_enough() {
        assert_eq!(ChartSeries::scale_bounds(&[Some(5.0), None, None]), None);
        assert_eq!(ChartSeries::scale_bounds(&[]), None);
    }

    #[test]
    fn pace_format_is_min_sec() {
        assert_eq!(ValueFormat::PaceMinPerKm.format(5.5), "5:30");
        assert_eq!(ValueFormat::PaceMinPerKm.format(4.0 + 5.0 / 60.0), "4:05");
    }

    #[test]
    fn pace_series_drops_near_zero_speed() {
        let samples = vec![
            TelemetrySample {
                elapsed_sec: 0.0,
                speed: Some(3.0),
                ..Default::default()
            },
            TelemetrySample {
                elapsed_sec: 1.0,
                speed: Some(0.0),
                ..Default::default()
            },
        ];
        let s = pace_series(&samples, Rgba8::rgb(0, 0, 0));
        assert!(s.invert);
        // 3 m/s = 5:33 min/km.
        assert!((s.values[0].unwrap() - 5.555).abs() < 0.01);
        assert_eq!(s.values[1], None);
    }
}
