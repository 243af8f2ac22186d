use crate::foundation::color::{GradientStops, Rgba8};
use crate::foundation::math::downsample;
use crate::foundation::svg::SvgFragment;
use crate::geo::mercator::MapViewport;
use crate::telemetry::model::GpsPoint;

/// Style and tuning constants for the route overlay.
#[derive(Clone, Debug)]
pub struct RouteStyle {
    /// Maximum polyline vertex count after downsampling.
    pub vertex_cap: usize,
    pub glow_width: f64,
    pub glow_alpha: u8,
    pub core_width: f64,
    /// Pace gradient breakpoints in minutes per kilometer, fast to slow.
    pub pace_stops: [(f64, Rgba8); 3],
    /// Pace assumed for segments with no speed reading.
    pub default_pace: f64,
    pub start_marker: Rgba8,
    pub end_marker: Rgba8,
    pub marker_radius: f64,
}

impl Default for RouteStyle {
    fn default() -> Self {
        Self {
            vertex_cap: 600,
            glow_width: 10.0,
            glow_alpha: 64,
            core_width: 4.0,
            pace_stops: [
                (3.5, Rgba8::rgb(239, 68, 68)),  // fast: red
                (5.0, Rgba8::rgb(245, 158, 11)), // mid: amber
                (7.0, Rgba8::rgb(34, 211, 238)), // slow: cyan
            ],
            default_pace: 5.0,
            start_marker: Rgba8::rgb(34, 197, 94),
            end_marker: Rgba8::rgb(239, 68, 68),
            marker_radius: 7.0,
        }
    }
}

impl RouteStyle {
    pub fn gradient(&self) -> GradientStops {
        GradientStops::from_table(&self.pace_stops)
    }
}

/// Pace of a segment in minutes per kilometer, from its endpoint's speed.
fn segment_pace(to: &GpsPoint, fallback: f64) -> f64 {
    match to.speed {
        Some(v) if v > 0.1 => 1000.0 / v / 60.0,
        _ => fallback,
    }
}

/// Draw the GPS track over the map viewport as a pace-colored polyline.
///
/// Zero-coordinate points are dropped, the remainder downsampled to the
/// vertex cap (keeping first and last). Each segment is stroked twice: a
/// wide low-opacity glow and a narrow full-opacity core, both colored from
/// the pace gradient. Start and end vertices get fixed-color dots. Fewer
/// than two valid points yields an empty fragment.
pub fn render_route(points: &[GpsPoint], viewport: &MapViewport, style: &RouteStyle) -> SvgFragment {
    let mut frag = SvgFragment::new();
    let valid: Vec<GpsPoint> = points
        .iter()
        .filter(|p| p.lat != 0.0 && p.lng != 0.0)
        .copied()
        .collect();
    if valid.len() < 2 {
        return frag;
    }
    let track = downsample(&valid, style.vertex_cap);
    let projected: Vec<kurbo::Point> = track.iter().map(|p| viewport.project(p.lat, p.lng)).collect();
    let gradient = style.gradient();

    // Glow pass under the whole track, then the core pass on top, so the
    // halo never sits on an adjacent segment's core stroke.
    for pass in 0..2 {
        for (i, w) in track.windows(2).enumerate() {
            let color = gradient.sample(segment_pace(&w[1], style.default_pace));
            let d = format!(
                "M{:.2},{:.2} L{:.2},{:.2}",
                projected[i].x,
                projected[i].y,
                projected[i + 1].x,
                projected[i + 1].y
            );
            if pass == 0 {
                frag.stroke_path(&d, color.with_alpha(style.glow_alpha), style.glow_width);
            } else {
                frag.stroke_path(&d, color, style.core_width);
            }
        }
    }

    let first = projected[0];
    let last = projected[projected.len() - 1];
    frag.circle(first.x, first.y, style.marker_radius, style.start_marker);
    frag.circle(last.x, last.y, style.marker_radius, style.end_marker);
    frag
}
