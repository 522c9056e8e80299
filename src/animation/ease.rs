use crate::foundation::math::{ease, lerp};

/// Interpolation curve used by an entity for all of its transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Plain linear interpolation.
    Linear,
    /// Cosine ease-in-out.
    #[default]
    Cosine,
}

impl Ease {
    /// `Cosine` for smooth entities, `Linear` otherwise.
    pub fn from_smooth(smooth: bool) -> Self {
        if smooth { Self::Cosine } else { Self::Linear }
    }

    /// Interpolate between `a` and `b` at progress `t`.
    pub fn interp(self, t: f64, a: f64, b: f64) -> f64 {
        match self {
            Self::Linear => lerp(t, a, b),
            Self::Cosine => ease(t, a, b),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
