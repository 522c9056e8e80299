use crate::foundation::core::{Point, Rect};

/// Replace infinities with a large finite stand-in, keep NaN.
pub(crate) fn tame(v: f64) -> f64 {
    const HUGE: f64 = 1e12;
    if v.is_infinite() { HUGE.copysign(v) } else { v }
}

/// Clip the segment `a -> b` to `rect` (Liang-Barsky).
///
/// Returns `None` when the segment lies entirely outside or an endpoint is NaN. Infinite
/// coordinates are treated as very large finite ones, so a segment running off towards an
/// asymptote keeps its visible direction.
pub fn clip_segment(a: Point, b: Point, rect: Rect) -> Option<(Point, Point)> {
    let (x0, y0, x1, y1) = (tame(a.x), tame(a.y), tame(b.x), tame(b.y));
    if [x0, y0, x1, y1].iter().any(|v| v.is_nan()) {
        return None;
    }
    let (dx, dy) = (x1 - x0, y1 - y0);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, x0 - rect.x0),
        (dx, rect.x1 - x0),
        (-dy, y0 - rect.y0),
        (dy, rect.y1 - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((
        Point::new(x0 + t0 * dx, y0 + t0 * dy),
        Point::new(x0 + t1 * dx, y0 + t1 * dy),
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/transform/clip.rs"]
mod tests;
