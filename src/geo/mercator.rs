use crate::telemetry::model::GpsPoint;

/// Square basemap tile edge in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Spherical Web Mercator, world-pixel space at an integer zoom.
///
/// `world_x` grows east, `world_y` grows south (screen convention); the
/// world is `2^zoom * 256` pixels on a side.
pub fn world_x(lng: f64, zoom: u8) -> f64 {
    (lng + 180.0) / 360.0 * zoom_scale(zoom)
}

pub fn world_y(lat: f64, zoom: u8) -> f64 {
    let phi = lat.to_radians();
    let y = (1.0 - (phi.tan() + 1.0 / phi.cos()).ln() / std::f64::consts::PI) / 2.0;
    y * zoom_scale(zoom)
}

fn zoom_scale(zoom: u8) -> f64 {
    f64::from(1u32 << u32::from(zoom)) * TILE_SIZE
}

/// Tuning constants for viewport/zoom selection.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct ViewportConfig {
    pub max_zoom: u8,
    pub min_zoom: u8,
    pub fallback_zoom: u8,
    /// Pixels reserved around the track inside the viewport.
    pub margin_px: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            max_zoom: 16,
            min_zoom: 10,
            fallback_zoom: 13,
            margin_px: 100.0,
        }
    }
}

/// A render viewport in world-pixel space at a chosen zoom.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MapViewport {
    pub zoom: u8,
    pub origin_x: f64,
    pub origin_y: f64,
    pub width: f64,
    pub height: f64,
}

impl MapViewport {
    /// Project a coordinate into viewport-pixel space.
    pub fn project(&self, lat: f64, lng: f64) -> kurbo::Point {
        kurbo::Point::new(
            world_x(lng, self.zoom) - self.origin_x,
            world_y(lat, self.zoom) - self.origin_y,
        )
    }
}

/// Pick the highest zoom in `[min_zoom, max_zoom]` at which the track's
/// projected bounding box plus margin fits the viewport, walking down from
/// the maximum. If no candidate fits, the fallback zoom is used. The origin
/// centers the viewport on the bounding-box midpoint.
///
/// Returns `None` for an empty track.
pub fn select_viewport(
    points: &[GpsPoint],
    width: f64,
    height: f64,
    cfg: &ViewportConfig,
) -> Option<MapViewport> {
    let (min_lat, max_lat, min_lng, max_lng) = bounds(points)?;

    let mut chosen = cfg.fallback_zoom;
    let mut found = false;
    for zoom in (cfg.min_zoom..=cfg.max_zoom).rev() {
        let bbox_w = (world_x(max_lng, zoom) - world_x(min_lng, zoom)).abs();
        // North has the smaller world_y.
        let bbox_h = (world_y(min_lat, zoom) - world_y(max_lat, zoom)).abs();
        if bbox_w <= width - cfg.margin_px && bbox_h <= height - cfg.margin_px {
            chosen = zoom;
            found = true;
            break;
        }
    }
    if !found {
        tracing::debug!(fallback = cfg.fallback_zoom, "no candidate zoom fits, using fallback");
    }

    let center_lat = (min_lat + max_lat) / 2.0;
    let center_lng = (min_lng + max_lng) / 2.0;
    Some(MapViewport {
        zoom: chosen,
        origin_x: world_x(center_lng, chosen) - width / 2.0,
        origin_y: world_y(center_lat, chosen) - height / 2.0,
        width,
        height,
    })
}

fn bounds(points: &[GpsPoint]) -> Option<(f64, f64, f64, f64)> {
    let first = points.first()?;
    let mut min_lat = first.lat;
    let mut max_lat = first.lat;
    let mut min_lng = first.lng;
    let mut max_lng = first.lng;
    for p in &points[1..] {
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
        min_lng = min_lng.min(p.lng);
        max_lng = max_lng.max(p.lng);
    }
    Some((min_lat, max_lat, min_lng, max_lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lng: f64) -> GpsPoint {
        GpsPoint {
            lat,
            lng,
            speed: None,
        }
    }

    #[test]
    fn world_x_increases_with_longitude() {
        let mut prev = world_x(-179.0, 12);
        for lng in [-90.0, -1.0, 0.0, 1.0, 90.0, 179.0] {
            let x = world_x(lng, 12);
            assert!(x > prev, "world_x not increasing at lng {lng}");
            prev = x;
        }
    }

    #[test]
    fn world_y_decreases_going_north() {
        let mut prev = world_y(-80.0, 12);
        for lat in [-45.0, -1.0, 0.0, 1.0, 45.0, 80.0] {
            let y = world_y(lat, 12);
            assert!(y < prev, "world_y not decreasing at lat {lat}");
            prev = y;
        }
    }

    #[test]
    fn equator_meridian_is_world_center() {
        let zoom = 10;
        let half = f64::from(1u32 << 10) * TILE_SIZE / 2.0;
        assert!((world_x(0.0, zoom) - half).abs() < 1e-6);
        assert!((world_y(0.0, zoom) - half).abs() < 1e-6);
    }

    #[test]
    fn tight_track_picks_max_zoom() {
        let points = [pt(59.9100, 10.7500), pt(59.9101, 10.7501)];
        let vp = select_viewport(&points, 900.0, 700.0, &ViewportConfig::default()).unwrap();
        assert_eq!(vp.zoom, 16);
    }

    #[test]
    fn larger_bbox_never_selects_higher_zoom() {
        let cfg = ViewportConfig::default();
        let small = [pt(59.90, 10.70), pt(59.93, 10.74)];
        let large = [pt(59.80, 10.60), pt(60.10, 11.00)];
        let vp_small = select_viewport(&small, 900.0, 700.0, &cfg).unwrap();
        let vp_large = select_viewport(&large, 900.0, 700.0, &cfg).unwrap();
        assert!(vp_large.zoom <= vp_small.zoom);
    }

    #[test]
    fn continent_scale_track_falls_back() {
        let cfg = ViewportConfig::default();
        let points = [pt(36.0, -5.0), pt(60.0, 25.0)];
        let vp = select_viewport(&points, 900.0, 700.0, &cfg).unwrap();
        assert_eq!(vp.zoom, cfg.fallback_zoom);
    }

    #[test]
    fn empty_track_has_no_viewport() {
        assert!(select_viewport(&[], 900.0, 700.0, &ViewportConfig::default()).is_none());
    }

    #[test]
    fn projection_centers_bbox_midpoint() {
        let points = [pt(59.90, 10.70), pt(59.92, 10.74)];
        let vp = select_viewport(&points, 900.0, 700.0, &ViewportConfig::default()).unwrap();
        let center = vp.project(59.91, 10.72);
        assert!((center.x - 450.0).abs() < 1.0);
        assert!((center.y - 350.0).abs() < 1.0);
    }
}
