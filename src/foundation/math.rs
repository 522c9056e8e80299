use std::f64::consts::PI;

/// Linear interpolation between `a` and `b`.
///
/// Written as `a(1-t) + bt` so that `t = 0` and `t = 1` reproduce the endpoints exactly.
pub fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Cosine ease: `lerp((1 - cos(t*pi)) / 2, a, b)`.
pub fn ease(t: f64, a: f64, b: f64) -> f64 {
    let t2 = (1.0 - (t * PI).cos()) / 2.0;
    lerp(t2, a, b)
}

/// Inverse of [`lerp`]: the `t` for which `lerp(t, a, b) == v`.
pub fn inv_lerp(v: f64, a: f64, b: f64) -> f64 {
    (v - a) / (b - a)
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Map a unit float to a byte, clamping out-of-range input.
pub(crate) fn unit_to_u8(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
