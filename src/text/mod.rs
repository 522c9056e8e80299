//! Text shaping for labels.
//!
//! Labels only need line metrics and positioned glyphs; the shaper behind them is a
//! collaborator so that scenes can be exercised without font files.

mod parley_shaper;

pub use parley_shaper::ParleyShaper;

use crate::foundation::error::MathreelResult;

/// Metrics of a single shaped line, in device pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    /// Horizontal advance of the whole line.
    pub advance_width: f64,
    /// Distance from the baseline to the top of the line box.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: f64,
    /// Full line height including leading.
    pub line_height: f64,
}

/// One glyph positioned relative to the line's baseline origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    /// Glyph id in the shaping font.
    pub id: u32,
    /// Offset to the right of the origin.
    pub x: f32,
    /// Offset below the baseline.
    pub y: f32,
}

/// A single line of shaped text, ready to draw.
#[derive(Clone, Debug)]
pub struct ShapedText {
    /// Line metrics.
    pub metrics: TextMetrics,
    /// Font the glyph ids refer to.
    pub font: vello_cpu::peniko::FontData,
    /// Font size in pixels.
    pub font_size: f32,
    /// Glyphs in visual order.
    pub glyphs: Vec<PlacedGlyph>,
}

/// Shapes a string at a given pixel size.
pub trait TextShaper {
    /// Shape `text` as a single line at `size_px`.
    fn shape(&mut self, text: &str, size_px: f32) -> MathreelResult<ShapedText>;
}
