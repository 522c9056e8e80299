use std::path::Path;

use crate::foundation::error::{MathreelError, MathreelResult};
use crate::text::{PlacedGlyph, ShapedText, TextMetrics, TextShaper};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct NoBrush;

/// [`TextShaper`] backed by Parley, using a single font loaded once at startup.
pub struct ParleyShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<NoBrush>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl ParleyShaper {
    /// Register `font_bytes` (TTF/OTF) and use its first family for all labels.
    pub fn from_bytes(font_bytes: Vec<u8>) -> MathreelResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            MathreelError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MathreelError::validation("registered font family has no name"))?
            .to_string();

        tracing::debug!(family = %family_name, "loaded label font");
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0),
        })
    }

    /// Read a font file and register it.
    pub fn from_path(path: &Path) -> MathreelResult<Self> {
        use anyhow::Context as _;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }

    /// Name of the registered font family.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }
}

impl TextShaper for ParleyShaper {
    fn shape(&mut self, text: &str, size_px: f32) -> MathreelResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MathreelError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        let mut layout: parley::Layout<NoBrush> = builder.build(text);
        layout.break_all_lines(None);

        let mut metrics = TextMetrics {
            advance_width: f64::from(layout.width()),
            ..TextMetrics::default()
        };
        let mut glyphs = Vec::new();
        for (i, line) in layout.lines().enumerate() {
            let m = line.metrics();
            if i == 0 {
                metrics.ascent = f64::from(m.ascent);
                metrics.descent = f64::from(m.descent);
                metrics.line_height = f64::from(m.line_height);
            }
            let baseline = m.baseline;
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| PlacedGlyph {
                    id: g.id,
                    x: g.x,
                    y: g.y - baseline,
                }));
            }
        }

        Ok(ShapedText {
            metrics,
            font: self.font.clone(),
            font_size: size_px,
            glyphs,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/parley_shaper.rs"]
mod tests;
