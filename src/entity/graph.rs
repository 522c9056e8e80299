use std::sync::Arc;
use std::time::Duration;

use crate::animation::ease::Ease;
use crate::animation::transition::{Step, Transition};
use crate::entity::{Animatable, Deletable, RenderCx, Renderable};
use crate::foundation::core::{Canvas, Point, Rect, Rgba8};
use crate::foundation::error::MathreelResult;
use crate::paint::hsb::lerp_hsb;
use crate::paint::source::PaintSource;
use crate::render::surface::FrameSurface;
use crate::transform::clip::clip_segment;
use crate::transform::coords::CoordinateSpace;

/// Plotted function `f: R -> R`, evaluated in unscaled math units.
pub type GraphFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Domain used by the convenience constructors: the width of a 1920 px canvas.
const DEFAULT_DOMAIN: (i64, i64) = (-960, 960);

/// A straight piece of a sampled graph, in math space at scale 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Start point.
    pub from: Point,
    /// End point.
    pub to: Point,
    /// Stroke color.
    pub color: Rgba8,
}

/// A function graph drawn as a polyline over an integer domain.
///
/// The graph is sampled every `sample_step` math units between the deletion-interpolated start
/// and the entrance-interpolated stop of its domain. While a morph is running each sample
/// blends towards the morph target, both in height and, per segment, in HSB color.
#[derive(Clone)]
pub struct FunctionGraph {
    function: GraphFn,
    paint: PaintSource,
    stroke_width: f64,
    domain_start: i64,
    domain_stop: i64,
    scale: u32,
    ease: Ease,
    clip: Option<Rect>,
    entrance: Transition,
    morph: Transition,
    deletion: Transition,
    morph_target: Option<Box<FunctionGraph>>,
}

impl std::fmt::Debug for FunctionGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionGraph")
            .field("paint", &self.paint)
            .field("stroke_width", &self.stroke_width)
            .field("domain", &(self.domain_start, self.domain_stop))
            .field("scale", &self.scale)
            .field("ease", &self.ease)
            .field("clip", &self.clip)
            .field("entrance", &self.entrance)
            .field("morph", &self.morph)
            .field("deletion", &self.deletion)
            .field("morph_target", &self.morph_target)
            .finish_non_exhaustive()
    }
}

impl FunctionGraph {
    /// Graph of `function` painted with `paint`, smooth easing, scale 1.
    pub fn new(
        function: impl Fn(f64) -> f64 + Send + Sync + 'static,
        paint: impl Into<PaintSource>,
        stroke_width: f64,
    ) -> Self {
        Self {
            function: Arc::new(function),
            paint: paint.into(),
            stroke_width,
            domain_start: DEFAULT_DOMAIN.0,
            domain_stop: DEFAULT_DOMAIN.1,
            scale: 1,
            ease: Ease::Cosine,
            clip: None,
            entrance: Transition::settled(),
            morph: Transition::settled(),
            deletion: Transition::unarmed(),
            morph_target: None,
        }
    }

    /// Solid-colored graph.
    pub fn mono(
        function: impl Fn(f64) -> f64 + Send + Sync + 'static,
        color: Rgba8,
        stroke_width: f64,
    ) -> Self {
        Self::new(function, PaintSource::Solid(color), stroke_width)
    }

    /// Graph colored by height; see [`PaintSource::height_coded`].
    pub fn height_coded(
        function: impl Fn(f64) -> f64 + Send + Sync + 'static,
        keys: impl IntoIterator<Item = (i32, Rgba8)>,
        stroke_width: f64,
    ) -> MathreelResult<Self> {
        Ok(Self::new(
            function,
            PaintSource::height_coded(keys)?,
            stroke_width,
        ))
    }

    /// Replace the plotted function.
    pub fn with_function(mut self, function: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        self.function = Arc::new(function);
        self
    }

    /// Replace the paint.
    pub fn with_paint(mut self, paint: impl Into<PaintSource>) -> Self {
        self.paint = paint.into();
        self
    }

    /// Sampled domain `[start, stop)` in math units.
    pub fn with_domain(mut self, start: i64, stop: i64) -> Self {
        self.domain_start = start;
        self.domain_stop = stop;
        self
    }

    /// Domain covering the full width of `canvas`.
    pub fn spanning(self, canvas: Canvas) -> Self {
        let half = i64::from(canvas.width) / 2;
        self.with_domain(-half, half)
    }

    /// Integer zoom: inputs are divided and outputs multiplied by `scale` (0 is treated as 1).
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.max(1);
        self
    }

    /// Stroke width in pixels.
    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    /// Cosine easing when `true`, linear otherwise.
    pub fn smooth(mut self, smooth: bool) -> Self {
        self.ease = Ease::from_smooth(smooth);
        self
    }

    /// Only draw inside `rect` (math space at scale 1).
    pub fn with_clip(mut self, rect: Rect) -> Self {
        self.clip = Some(rect);
        self
    }

    /// Current paint.
    pub fn paint(&self) -> &PaintSource {
        &self.paint
    }

    /// Domain `(start, stop)`.
    pub fn domain(&self) -> (i64, i64) {
        (self.domain_start, self.domain_stop)
    }

    /// Zoom factor.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Stroke width in pixels.
    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    /// Easing curve.
    pub fn ease(&self) -> Ease {
        self.ease
    }

    /// Pending morph target, if a morph is running.
    pub fn morph_target(&self) -> Option<&FunctionGraph> {
        self.morph_target.as_deref()
    }

    /// Entrance progress.
    pub fn entrance(&self) -> &Transition {
        &self.entrance
    }

    /// Morph progress.
    pub fn morph_progress(&self) -> &Transition {
        &self.morph
    }

    /// Deletion progress.
    pub fn deletion(&self) -> &Transition {
        &self.deletion
    }

    /// `f(x / scale) * scale`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let s = f64::from(self.scale);
        (self.function)(x / s) * s
    }

    /// Start a morph into `target`. On completion this graph becomes a copy of `target`.
    pub fn morph(&mut self, duration: Duration, target: FunctionGraph) {
        self.morph.arm(duration);
        self.morph_target = Some(Box::new(target));
    }

    fn interp(&self, t: f64, a: f64, b: f64) -> f64 {
        self.ease.interp(t, a, b)
    }

    /// Segments visible in the current state, with their colors.
    pub fn segments(&self, space: &CoordinateSpace, step: f64) -> Vec<Segment> {
        let step = if step.is_finite() && step > 0.0 { step } else { 1.0 };
        let (start, stop) = (self.domain_start as f64, self.domain_stop as f64);
        let from = self.interp(self.deletion.progress(), start, stop);
        let until = self.interp(self.entrance.progress(), start, stop);
        if !(from < until) {
            return Vec::new();
        }

        let own_paint = self.paint.resolve(space, f64::from(self.scale));
        let target = self
            .morph_target
            .as_deref()
            .map(|t| (t, t.paint.resolve(space, f64::from(t.scale))));
        let t = self.morph.progress();
        let height = |x: f64| match &target {
            Some((g, _)) => self.interp(t, self.evaluate(x), g.evaluate(x)),
            None => self.evaluate(x),
        };

        // Samples stay on the `from + k * step` grid; only those near the canvas are kept.
        let margin = step + self.stroke_width.max(0.0);
        let last_k = (until - from) / step;
        let k_at = |x: f64| ((x - from) / step).clamp(0.0, last_k);
        let first = k_at(space.left() - margin).floor() as usize;
        let end = k_at(space.right() + margin).ceil() as usize;
        let mut out = Vec::with_capacity(end.saturating_sub(first));
        for k in first..end {
            let x0 = from + (k as f64) * step;
            let x1 = x0 + step;
            let p0 = Point::new(x0, height(x0));
            let p1 = Point::new(x1, height(x1));
            let at = space.to_device(p0, 1.0);
            let color = match &target {
                Some((_, target_paint)) => {
                    lerp_hsb(t, own_paint.color_at(at), target_paint.color_at(at), self.ease)
                }
                None => own_paint.color_at(at),
            };
            out.push(Segment {
                from: p0,
                to: p1,
                color,
            });
        }
        out
    }

    fn draw(&self, surface: &mut FrameSurface, space: &CoordinateSpace, step: f64) {
        for seg in self.segments(space, step) {
            let (a, b) = match self.clip {
                Some(rect) => match clip_segment(seg.from, seg.to, rect) {
                    Some(ab) => ab,
                    None => continue,
                },
                None => (seg.from, seg.to),
            };
            surface.stroke_line(
                space.to_device(a, 1.0),
                space.to_device(b, 1.0),
                self.stroke_width,
                seg.color,
            );
        }
    }

    /// Become the morph target: every field is taken over and the target is dropped.
    fn adopt_morph_target(&mut self) {
        let Some(target) = self.morph_target.take() else {
            return;
        };
        let FunctionGraph {
            function,
            paint,
            stroke_width,
            domain_start,
            domain_stop,
            scale,
            ease,
            clip,
            entrance,
            morph: _,
            deletion,
            morph_target: _,
        } = *target;
        self.function = function;
        self.paint = paint;
        self.stroke_width = stroke_width;
        self.domain_start = domain_start;
        self.domain_stop = domain_stop;
        self.scale = scale;
        self.ease = ease;
        self.clip = clip;
        self.entrance = entrance;
        self.deletion = deletion;
        self.morph = Transition::settled();
        self.morph_target = None;
    }

    fn step(&mut self, cx: &mut RenderCx<'_>) {
        let fps = cx.fps();
        self.entrance.advance(fps);
        if self.morph.advance(fps) == Step::Completed {
            self.adopt_morph_target();
        }
        if self.deletion.advance(fps) == Step::Completed {
            cx.unregister_self();
        }
    }
}

impl Renderable for FunctionGraph {
    fn render(&mut self, surface: &mut FrameSurface, cx: &mut RenderCx<'_>) -> MathreelResult<()> {
        self.draw(surface, cx.space(), cx.sample_step());
        self.step(cx);
        Ok(())
    }
}

impl Animatable for FunctionGraph {
    fn animate(&mut self, duration: Duration) {
        self.entrance.arm(duration);
        self.deletion = Transition::unarmed();
    }
}

impl Deletable for FunctionGraph {
    fn animate_delete(&mut self, duration: Duration) {
        self.deletion.arm(duration);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/entity/graph.rs"]
mod tests;
