use std::time::Duration;

use crate::animation::ease::Ease;
use crate::animation::transition::{Step, Transition};
use crate::entity::{Animatable, Deletable, RenderCx, Renderable};
use crate::formula::FormulaIcon;
use crate::foundation::core::{Point, Rgba8, Vec2};
use crate::foundation::error::MathreelResult;
use crate::render::surface::FrameSurface;

/// Which corner of the typeset box sits at the formula's position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Alignment {
    /// Position is the top-left corner.
    #[default]
    Left,
    /// Position is the center.
    Center,
    /// Position is the bottom-right corner.
    Right,
}

impl Alignment {
    /// Offset from the anchor to the top-left corner of a `width x height` box (device pixels).
    pub fn offset(self, width: f64, height: f64) -> Vec2 {
        match self {
            Self::Left => Vec2::ZERO,
            Self::Center => Vec2::new(-width / 2.0, -height / 2.0),
            Self::Right => Vec2::new(-width, -height),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
enum MorphPhase {
    #[default]
    Idle,
    /// Fading out; `target` replaces the source once the fade completes.
    Deleting { target: String, duration: Duration },
    /// Fading the new source in.
    Retyping,
}

#[derive(Clone, Debug)]
struct CachedIcon {
    source: String,
    size_px: f64,
    icon: FormulaIcon,
}

/// A typeset formula that fades in and out and morphs by fading out, swapping its markup and
/// fading back in.
#[derive(Clone, Debug)]
pub struct Formula {
    source: String,
    color: Rgba8,
    position: Point,
    size_px: f64,
    alignment: Alignment,
    ease: Ease,
    entrance: Transition,
    deletion: Transition,
    phase: MorphPhase,
    icon: Option<CachedIcon>,
}

impl Formula {
    /// Base font size used when none is given.
    pub const DEFAULT_SIZE_PX: f64 = 50.0;

    /// Formula at math-space `position`, left aligned, smooth easing.
    pub fn new(source: impl Into<String>, color: Rgba8, position: Point) -> Self {
        Self {
            source: source.into(),
            color,
            position,
            size_px: Self::DEFAULT_SIZE_PX,
            alignment: Alignment::Left,
            ease: Ease::Cosine,
            entrance: Transition::settled(),
            deletion: Transition::unarmed(),
            phase: MorphPhase::Idle,
            icon: None,
        }
    }

    /// Base font size in pixels.
    pub fn with_size(mut self, size_px: f64) -> Self {
        self.size_px = size_px;
        self
    }

    /// Anchor alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Cosine easing when `true`, linear otherwise.
    pub fn smooth(mut self, smooth: bool) -> Self {
        self.ease = Ease::from_smooth(smooth);
        self
    }

    /// Current markup.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Math-space anchor.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Move the anchor.
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

    /// `true` while a morph has not finished fading the new markup in.
    pub fn is_morphing(&self) -> bool {
        self.phase != MorphPhase::Idle
    }

    /// Replace the markup with `target` over `duration`: fade out for the first half, fade the
    /// new markup in for the second.
    pub fn morph(&mut self, duration: Duration, target: impl Into<String>) {
        self.phase = MorphPhase::Deleting {
            target: target.into(),
            duration,
        };
        self.deletion.arm(duration / 2);
    }

    /// Opacity factor for the current progress.
    pub fn opacity(&self) -> f64 {
        let visible = (self.entrance.progress() - self.deletion.progress()).max(0.0);
        self.ease.interp(visible, 0.0, 1.0)
    }

    fn icon(&mut self, cx: &mut RenderCx<'_>) -> MathreelResult<&FormulaIcon> {
        let cached = match self.icon.take() {
            Some(c) if c.source == self.source && c.size_px == self.size_px => c,
            _ => CachedIcon {
                icon: cx.typesetter()?.typeset(&self.source, self.size_px)?,
                source: self.source.clone(),
                size_px: self.size_px,
            },
        };
        Ok(&self.icon.insert(cached).icon)
    }

    fn step(&mut self, cx: &mut RenderCx<'_>) {
        let fps = cx.fps();
        if self.entrance.advance(fps) == Step::Completed && self.phase == MorphPhase::Retyping {
            self.phase = MorphPhase::Idle;
        }
        if self.deletion.advance(fps) == Step::Completed {
            match std::mem::take(&mut self.phase) {
                MorphPhase::Deleting { target, duration } => {
                    tracing::debug!(from = %self.source, to = %target, "retyping formula");
                    self.source = target;
                    self.deletion = Transition::unarmed();
                    self.entrance.arm(duration / 2);
                    self.phase = MorphPhase::Retyping;
                    cx.register_self();
                }
                other => {
                    self.phase = other;
                    cx.unregister_self();
                }
            }
        }
    }
}

impl Renderable for Formula {
    fn render(&mut self, surface: &mut FrameSurface, cx: &mut RenderCx<'_>) -> MathreelResult<()> {
        let opacity = self.opacity();
        if opacity > 0.0 {
            let (color, alignment) = (self.color, self.alignment);
            let anchor = cx.space().to_device(self.position, 1.0);
            let icon = self.icon(cx)?;
            let top_left = anchor
                + alignment.offset(f64::from(icon.width), f64::from(icon.height));
            icon.render(surface, top_left, color, opacity)?;
        }
        self.step(cx);
        Ok(())
    }
}

impl Animatable for Formula {
    fn animate(&mut self, duration: Duration) {
        self.entrance.arm(duration);
        self.deletion = Transition::unarmed();
        self.phase = MorphPhase::Idle;
    }
}

impl Deletable for Formula {
    const REGISTERS_ON_DELETE: bool = true;

    fn animate_delete(&mut self, duration: Duration) {
        self.deletion.arm(duration);
        self.phase = MorphPhase::Idle;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/entity/formula.rs"]
mod tests;
