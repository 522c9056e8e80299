use std::sync::Arc;
use std::time::Duration;

use crate::animation::ease::Ease;
use crate::animation::transition::{Step, Transition};
use crate::entity::{Animatable, Deletable, RenderCx, Renderable};
use crate::foundation::core::{Point, Rgba8, Vec2};
use crate::foundation::error::MathreelResult;
use crate::foundation::math::unit_to_u8;
use crate::render::surface::{FrameSurface, TextPaint};
use crate::text::{ShapedText, TextMetrics};

/// A line of text that wipes in from the left and wipes (or fades) out.
#[derive(Clone, Debug)]
pub struct Label {
    text: String,
    color: Rgba8,
    position: Point,
    font_size: f64,
    centered: bool,
    ease: Ease,
    smooth_delete: bool,
    entrance: Transition,
    deletion: Transition,
    shaped: Option<ShapedText>,
}

impl Label {
    /// Font size used when none is given.
    pub const DEFAULT_FONT_SIZE: f64 = 100.0;

    /// Centered label at math-space `position`.
    pub fn new(text: impl Into<String>, color: Rgba8, position: Point) -> Self {
        Self {
            text: text.into(),
            color,
            position,
            font_size: Self::DEFAULT_FONT_SIZE,
            centered: true,
            ease: Ease::Cosine,
            smooth_delete: true,
            entrance: Transition::settled(),
            deletion: Transition::unarmed(),
            shaped: None,
        }
    }

    /// Font size in pixels; also the width of the soft wipe edge.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self.shaped = None;
        self
    }

    /// Center the text on its position instead of starting the baseline there.
    pub fn centered(mut self, centered: bool) -> Self {
        self.centered = centered;
        self
    }

    /// Cosine easing when `true`, linear otherwise.
    pub fn smooth(mut self, smooth: bool) -> Self {
        self.ease = Ease::from_smooth(smooth);
        self
    }

    /// Wipe out directionally when `true`, fade out uniformly otherwise.
    pub fn smooth_delete(mut self, smooth_delete: bool) -> Self {
        self.smooth_delete = smooth_delete;
        self
    }

    /// Text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.shaped = None;
    }

    /// Math-space position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Move the label.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Change the color.
    pub fn set_color(&mut self, color: Rgba8) {
        self.color = color;
    }

    /// Entrance progress.
    pub fn entrance(&self) -> &Transition {
        &self.entrance
    }

    /// Deletion progress.
    pub fn deletion(&self) -> &Transition {
        &self.deletion
    }

    /// Visibility in `[0, 1]` at local x (pixels right of the text origin) for a run of
    /// `width` pixels.
    pub fn coverage_at(&self, x: f64, width: f64) -> f64 {
        let soft = self.font_size.max(1.0);
        let entered = if self.entrance.is_complete() {
            1.0
        } else {
            let edge = self.ease.interp(self.entrance.progress(), -soft, width);
            1.0 - ((x - edge) / soft).clamp(0.0, 1.0)
        };
        let deleted = self.deletion.progress();
        let remaining = if deleted <= 0.0 {
            1.0
        } else if self.smooth_delete {
            let edge = self.ease.interp(deleted, -soft, width);
            ((x - edge) / soft).clamp(0.0, 1.0)
        } else {
            self.ease.interp(deleted, 1.0, 0.0)
        };
        entered * remaining
    }

    fn is_fully_visible(&self) -> bool {
        self.entrance.is_complete() && self.deletion.progress() <= 0.0
    }

    fn text_paint(&self, width: f64) -> TextPaint {
        if self.is_fully_visible() {
            return TextPaint::Solid(self.color);
        }
        let columns = width.max(0.0).ceil() as usize + 1;
        let alpha = (0..columns)
            .map(|i| unit_to_u8(self.coverage_at(i as f64 + 0.5, width)))
            .collect();
        TextPaint::HorizontalRamp {
            color: self.color,
            alpha: Arc::new(alpha),
        }
    }

    fn shaped(&mut self, cx: &mut RenderCx<'_>) -> MathreelResult<&ShapedText> {
        let shaped = match self.shaped.take() {
            Some(s) => s,
            None => cx.shaper()?.shape(&self.text, self.font_size as f32)?,
        };
        Ok(self.shaped.insert(shaped))
    }

    fn draw(&mut self, surface: &mut FrameSurface, cx: &mut RenderCx<'_>) -> MathreelResult<()> {
        let mut origin = cx.space().to_device(self.position, 1.0);
        let metrics = self.shaped(cx)?.metrics;
        if self.centered {
            origin += centering_shift(&metrics);
        }
        let paint = self.text_paint(metrics.advance_width);
        surface.fill_text(origin, self.shaped(cx)?, &paint)
    }

    fn step(&mut self, cx: &mut RenderCx<'_>) {
        let fps = cx.fps();
        self.entrance.advance(fps);
        if self.deletion.advance(fps) == Step::Completed {
            cx.unregister_self();
        }
    }
}

fn centering_shift(m: &TextMetrics) -> Vec2 {
    Vec2::new(
        -m.advance_width / 2.0,
        (m.line_height - m.ascent - m.descent) / 2.0,
    )
}

impl Renderable for Label {
    fn render(&mut self, surface: &mut FrameSurface, cx: &mut RenderCx<'_>) -> MathreelResult<()> {
        if !self.deletion.is_complete() {
            self.draw(surface, cx)?;
        }
        self.step(cx);
        Ok(())
    }
}

impl Animatable for Label {
    fn animate(&mut self, duration: Duration) {
        self.entrance.arm(duration);
        self.deletion = Transition::unarmed();
    }
}

impl Deletable for Label {
    fn animate_delete(&mut self, duration: Duration) {
        self.deletion.arm(duration);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/entity/label.rs"]
mod tests;
