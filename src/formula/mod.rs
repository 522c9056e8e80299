//! Formula typesetting.
//!
//! A [`Typesetter`] turns formula markup into a [`FormulaIcon`]: an alpha coverage mask that
//! the formula entity tints and places on the frame.

mod latex;

pub use latex::{LatexTools, LatexTypesetter};

use std::sync::Arc;

use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::MathreelResult;
use crate::render::surface::FrameSurface;

/// A typeset formula as a coverage mask in device pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct FormulaIcon {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major coverage, one byte per pixel.
    pub coverage: Arc<Vec<u8>>,
}

impl FormulaIcon {
    /// Draw with the icon's top-left corner at `top_left` (device pixels).
    pub fn render(
        &self,
        surface: &mut FrameSurface,
        top_left: Point,
        color: Rgba8,
        opacity: f64,
    ) -> MathreelResult<()> {
        surface.fill_mask(
            top_left,
            self.width,
            self.height,
            &self.coverage,
            color,
            opacity,
        )
    }
}

/// Converts formula markup into a drawable icon.
pub trait Typesetter {
    /// Typeset `markup` in display style with a base font size of `size_px` pixels.
    ///
    /// Failures are reported as [`crate::MathreelError::Layout`].
    fn typeset(&mut self, markup: &str, size_px: f64) -> MathreelResult<FormulaIcon>;
}
