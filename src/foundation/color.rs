/// Straight (non-premultiplied) RGBA8 color used throughout the SVG layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb` form, alpha carried separately as `fill-opacity`/`stroke-opacity`.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Linear per-channel interpolation, `t` clamped to [0, 1].
pub fn lerp_rgba8(a: Rgba8, b: Rgba8, t: f64) -> Rgba8 {
    let t = t.clamp(0.0, 1.0);
    let ch = |x: u8, y: u8| -> u8 {
        let v = f64::from(x) + (f64::from(y) - f64::from(x)) * t;
        v.round().clamp(0.0, 255.0) as u8
    };
    Rgba8 {
        r: ch(a.r, b.r),
        g: ch(a.g, b.g),
        b: ch(a.b, b.b),
        a: ch(a.a, b.a),
    }
}

/// A piecewise-linear gradient over an ordered list of `(value, color)` stops.
///
/// Values below the first stop clamp to the first color, values above the
/// last stop clamp to the last color, and values between two adjacent stops
/// interpolate channel-wise. Continuity at each stop falls out of the
/// interpolation form: at `t == 0` the left color is returned exactly.
#[derive(Clone, Debug)]
pub struct GradientStops {
    stops: Vec<(f64, Rgba8)>,
}

impl GradientStops {
    /// Stops must be ordered by ascending value; empty stop lists are rejected.
    pub fn new(stops: Vec<(f64, Rgba8)>) -> Option<Self> {
        if stops.is_empty() {
            return None;
        }
        if stops.windows(2).any(|w| w[0].0 > w[1].0) {
            return None;
        }
        Some(Self { stops })
    }

    /// Build from a constant stop table, sorting by value. An empty table
    /// degenerates to a single neutral gray stop.
    pub fn from_table(stops: &[(f64, Rgba8)]) -> Self {
        let mut stops = stops.to_vec();
        if stops.is_empty() {
            stops.push((0.0, Rgba8::rgb(128, 128, 128)));
        }
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { stops }
    }

    pub fn sample(&self, value: f64) -> Rgba8 {
        let first = self.stops[0];
        if value <= first.0 {
            return first.1;
        }
        for w in self.stops.windows(2) {
            let (v0, c0) = w[0];
            let (v1, c1) = w[1];
            if value <= v1 {
                if v1 <= v0 {
                    return c1;
                }
                return lerp_rgba8(c0, c1, (value - v0) / (v1 - v0));
            }
        }
        self.stops[self.stops.len() - 1].1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_lowercase_rrggbb() {
        assert_eq!(Rgba8::rgb(255, 0, 171).hex(), "#ff00ab");
    }

    #[test]
    fn lerp_endpoints_are_exact() {
        let a = Rgba8::rgb(10, 20, 30);
        let b = Rgba8::rgb(200, 100, 0);
        assert_eq!(lerp_rgba8(a, b, 0.0), a);
        assert_eq!(lerp_rgba8(a, b, 1.0), b);
    }

    #[test]
    fn gradient_is_continuous_at_stops() {
        let g = GradientStops::new(vec![
            (3.5, Rgba8::rgb(239, 68, 68)),
            (5.0, Rgba8::rgb(245, 158, 11)),
            (7.0, Rgba8::rgb(34, 211, 238)),
        ])
        .unwrap();
        for stop in [3.5, 5.0, 7.0] {
            let below = g.sample(stop - 1e-9);
            let at = g.sample(stop);
            let above = g.sample(stop + 1e-9);
            assert_eq!(below, at);
            assert_eq!(at, above);
        }
    }

    #[test]
    fn gradient_clamps_outside_range() {
        let g = GradientStops::new(vec![
            (3.5, Rgba8::rgb(1, 2, 3)),
            (7.0, Rgba8::rgb(7, 8, 9)),
        ])
        .unwrap();
        assert_eq!(g.sample(0.0), Rgba8::rgb(1, 2, 3));
        assert_eq!(g.sample(99.0), Rgba8::rgb(7, 8, 9));
    }

    #[test]
    fn unordered_stops_are_rejected() {
        assert!(GradientStops::new(vec![
            (5.0, Rgba8::rgb(0, 0, 0)),
            (3.0, Rgba8::rgb(1, 1, 1)),
        ])
        .is_none());
        assert!(GradientStops::new(vec![]).is_none());
    }
}
