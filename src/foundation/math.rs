/// Fixed-stride downsampling that always keeps the first and last element.
///
/// The output never exceeds `cap`; for inputs at or under the cap this is
/// the identity. Used to bound both route vertices and chart points.
pub fn downsample<T: Copy>(items: &[T], cap: usize) -> Vec<T> {
    if cap == 0 || items.is_empty() {
        return Vec::new();
    }
    if items.len() <= cap {
        return items.to_vec();
    }
    if cap == 1 {
        return vec![items[0]];
    }
    let stride = items.len().div_ceil(cap);
    let mut out: Vec<T> = items.iter().copied().step_by(stride).collect();
    let last_idx = items.len() - 1;
    if last_idx % stride != 0 {
        if out.len() < cap {
            out.push(items[last_idx]);
        } else {
            let n = out.len();
            out[n - 1] = items[last_idx];
        }
    }
    out
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
