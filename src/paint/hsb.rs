use crate::animation::ease::Ease;
use crate::foundation::core::Rgba8;
use crate::foundation::math::unit_to_u8;

/// Hue, saturation and brightness, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsb {
    /// Hue as a fraction of the full turn.
    pub h: f64,
    /// Saturation.
    pub s: f64,
    /// Brightness.
    pub b: f64,
}

impl Hsb {
    /// Convert the RGB channels of `c`; alpha is ignored.
    pub fn from_rgb(c: Rgba8) -> Self {
        let (r, g, b) = (f64::from(c.r), f64::from(c.g), f64::from(c.b));
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);

        let brightness = max / 255.0;
        let saturation = if max > 0.0 { (max - min) / max } else { 0.0 };
        if saturation == 0.0 {
            return Self {
                h: 0.0,
                s: 0.0,
                b: brightness,
            };
        }

        let span = max - min;
        let rc = (max - r) / span;
        let gc = (max - g) / span;
        let bc = (max - b) / span;
        let mut hue = if c.r >= c.g && c.r >= c.b {
            bc - gc
        } else if c.g >= c.b {
            2.0 + rc - bc
        } else {
            4.0 + gc - rc
        };
        hue /= 6.0;
        if hue < 0.0 {
            hue += 1.0;
        }
        Self {
            h: hue,
            s: saturation,
            b: brightness,
        }
    }

    /// Convert back to an RGB color with the given alpha.
    ///
    /// Hue wraps, so values outside `[0, 1)` are accepted.
    pub fn to_rgb(self, alpha: u8) -> Rgba8 {
        if self.s <= 0.0 {
            let v = unit_to_u8(self.b);
            return Rgba8::new(v, v, v, alpha);
        }
        let h = (self.h - self.h.floor()) * 6.0;
        let f = h - h.floor();
        let v = self.b;
        let p = v * (1.0 - self.s);
        let q = v * (1.0 - self.s * f);
        let t = v * (1.0 - self.s * (1.0 - f));
        let (r, g, b) = match h.floor() as u8 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Rgba8::new(unit_to_u8(r), unit_to_u8(g), unit_to_u8(b), alpha)
    }
}

/// Interpolate two colors in HSB space along the shorter way around the hue circle.
///
/// When the hues are more than half a turn apart, the larger one is moved down by a full turn
/// before interpolating and the result is wrapped back into `[0, 1)`. Saturation and brightness
/// follow `ease`; alpha is interpolated linearly.
pub fn lerp_hsb(t: f64, from: Rgba8, to: Rgba8, ease: Ease) -> Rgba8 {
    let mut a = Hsb::from_rgb(from);
    let mut b = Hsb::from_rgb(to);
    if (a.h - b.h).abs() > 0.5 {
        if a.h > b.h {
            a.h -= 1.0;
        } else {
            b.h -= 1.0;
        }
    }
    let mut h = ease.interp(t, a.h, b.h);
    if h < 0.0 {
        h += 1.0;
    }
    let mixed = Hsb {
        h,
        s: ease.interp(t, a.s, b.s),
        b: ease.interp(t, a.b, b.b),
    };
    let alpha = crate::foundation::math::lerp(t, f64::from(from.a), f64::from(to.a));
    mixed.to_rgb(alpha.round().clamp(0.0, 255.0) as u8)
}

#[cfg(test)]
#[path = "../../tests/unit/paint/hsb.rs"]
mod tests;
