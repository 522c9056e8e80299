use std::collections::BTreeMap;

use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{MathreelError, MathreelResult};
use crate::foundation::math::{inv_lerp, lerp};
use crate::transform::coords::CoordinateSpace;

/// Color source of a function graph.
#[derive(Clone, Debug, PartialEq)]
pub enum PaintSource {
    /// One color everywhere.
    Solid(Rgba8),
    /// Color keyed by math-space height.
    HeightGradient(HeightGradient),
}

/// Height keys of a height-coded paint, ascending by height. Always holds at least two keys.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGradient {
    keys: Vec<(i32, Rgba8)>,
}

impl HeightGradient {
    /// Keys in ascending height order.
    pub fn keys(&self) -> &[(i32, Rgba8)] {
        &self.keys
    }
}

impl PaintSource {
    /// Height-coded paint from `(height, color)` keys.
    ///
    /// A repeated height keeps its last color. A single key reduces to [`PaintSource::Solid`];
    /// an empty key set is rejected.
    pub fn height_coded(keys: impl IntoIterator<Item = (i32, Rgba8)>) -> MathreelResult<Self> {
        let keys: BTreeMap<i32, Rgba8> = keys.into_iter().collect();
        match keys.len() {
            0 => Err(MathreelError::validation(
                "height-coded paint needs at least one color key",
            )),
            1 => Ok(Self::Solid(keys.into_values().next().unwrap_or(Rgba8::TRANSPARENT))),
            _ => Ok(Self::HeightGradient(HeightGradient {
                keys: keys.into_iter().collect(),
            })),
        }
    }

    /// Resolve against the current frame's coordinate space.
    ///
    /// Gradient anchors are the device projections (at `scale`) of the highest key, which sits
    /// at fraction 0, and the lowest key, at fraction 1.
    pub fn resolve(&self, space: &CoordinateSpace, scale: f64) -> ResolvedPaint {
        match self {
            Self::Solid(c) => ResolvedPaint::Solid(*c),
            Self::HeightGradient(g) => {
                let (lo, hi) = match (g.keys.first(), g.keys.last()) {
                    (Some(lo), Some(hi)) => (lo.0, hi.0),
                    _ => return ResolvedPaint::Solid(Rgba8::TRANSPARENT),
                };
                let top = space.to_device(Point::new(0.0, f64::from(hi)), scale);
                let bottom = space.to_device(Point::new(0.0, f64::from(lo)), scale);
                let stops = g
                    .keys
                    .iter()
                    .rev()
                    .map(|(h, c)| (inv_lerp(f64::from(*h), f64::from(hi), f64::from(lo)), *c))
                    .collect();
                ResolvedPaint::Vertical(VerticalGradient {
                    top_y: top.y,
                    bottom_y: bottom.y,
                    stops,
                })
            }
        }
    }
}

impl From<Rgba8> for PaintSource {
    fn from(c: Rgba8) -> Self {
        Self::Solid(c)
    }
}

/// A [`PaintSource`] placed in device space for one frame.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedPaint {
    /// One color everywhere.
    Solid(Rgba8),
    /// Vertical linear gradient.
    Vertical(VerticalGradient),
}

impl ResolvedPaint {
    /// Color at the device pixel containing `p`.
    pub fn color_at(&self, p: Point) -> Rgba8 {
        match self {
            Self::Solid(c) => *c,
            Self::Vertical(g) => g.color_at(p),
        }
    }
}

/// Linear gradient along the device y axis, padded beyond both anchors.
#[derive(Clone, Debug, PartialEq)]
pub struct VerticalGradient {
    top_y: f64,
    bottom_y: f64,
    /// `(fraction, color)` ascending by fraction.
    stops: Vec<(f64, Rgba8)>,
}

impl VerticalGradient {
    /// Color at the device pixel containing `p`.
    pub fn color_at(&self, p: Point) -> Rgba8 {
        let y = if p.y.is_finite() {
            p.y.floor() + 0.5
        } else if p.y > 0.0 {
            f64::MAX
        } else {
            f64::MIN
        };
        self.color_at_fraction(inv_lerp(y, self.top_y, self.bottom_y))
    }

    fn color_at_fraction(&self, f: f64) -> Rgba8 {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Rgba8::TRANSPARENT;
        };
        if f.is_nan() || f <= first.0 {
            return first.1;
        }
        if f >= last.0 {
            return last.1;
        }
        for w in self.stops.windows(2) {
            let (f0, c0) = w[0];
            let (f1, c1) = w[1];
            if f <= f1 {
                let t = inv_lerp(f, f0, f1);
                let ch = |a: u8, b: u8| lerp(t, f64::from(a), f64::from(b)).round() as u8;
                return Rgba8::new(ch(c0.r, c1.r), ch(c0.g, c1.g), ch(c0.b, c1.b), ch(c0.a, c1.a));
            }
        }
        last.1
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/source.rs"]
mod tests;
