use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Rgba8};
use crate::foundation::error::{MathreelError, MathreelResult};
use crate::render::surface::{FrameRGBA, FrameSurface};
use crate::scene::{FrameContext, Scene};
use crate::timeline::Timeline;

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames in the requested range.
    pub frames_total: u64,
    /// Frames rendered and pushed to the sink.
    pub frames_rendered: u64,
    /// Frames before the range start that were rendered only to advance entity state.
    pub frames_replayed: u64,
}

/// Fixed-rate frame clock driving one scene with one timeline.
///
/// Entity state is a function of every frame rendered so far, so frames are always produced in
/// order starting at 0; asking for a later range first replays the frames before it.
pub struct Player {
    scene: Scene,
    timeline: Timeline,
    surface: FrameSurface,
    fps: Fps,
    next: FrameIndex,
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("scene", &self.scene)
            .field("timeline", &self.timeline)
            .field("canvas", &self.surface.canvas())
            .field("fps", &self.fps)
            .field("next", &self.next)
            .finish()
    }
}

impl Player {
    /// Player at frame 0.
    pub fn new(
        scene: Scene,
        timeline: Timeline,
        canvas: Canvas,
        background: Rgba8,
        fps: Fps,
    ) -> MathreelResult<Self> {
        let fps = Fps::new(fps.num, fps.den)?;
        Ok(Self {
            scene,
            timeline,
            surface: FrameSurface::new(canvas, background)?,
            fps,
            next: FrameIndex(0),
        })
    }

    /// The scene being played.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access to the scene, e.g. for driving it without a timeline.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Current canvas.
    pub fn canvas(&self) -> Canvas {
        self.surface.canvas()
    }

    /// Index of the next frame [`Player::step`] renders.
    pub fn next_frame(&self) -> FrameIndex {
        self.next
    }

    /// First frame after the scripted timeline has run out.
    pub fn end_frame(&self) -> FrameIndex {
        self.timeline.end_frame(self.fps)
    }

    /// Change the canvas from the next frame on.
    pub fn resize(&mut self, canvas: Canvas) -> MathreelResult<()> {
        self.surface.resize(canvas)
    }

    /// Fire due timeline actions, render the next frame and read it back.
    pub fn step(&mut self) -> MathreelResult<FrameRGBA> {
        self.advance()?;
        Ok(self.surface.finish())
    }

    /// Fire due timeline actions and record the next frame without rasterizing it.
    ///
    /// Entities advance their transitions while recording, so this is all a skipped frame needs.
    fn advance(&mut self) -> MathreelResult<()> {
        let frame = self.next;
        self.timeline.fire_due(frame, self.fps, &mut self.scene)?;
        let ctx = FrameContext {
            canvas: self.surface.canvas(),
            frame,
            fps: self.fps,
        };
        self.scene.render_frame(&mut self.surface, ctx)?;
        self.next = FrameIndex(frame.0 + 1);
        Ok(())
    }

    /// Render the frame at `frame`, replaying every frame before it that has not been rendered.
    pub fn render_frame(&mut self, frame: FrameIndex) -> MathreelResult<FrameRGBA> {
        let range = FrameRange::new(frame, FrameIndex(frame.0 + 1))?;
        let mut out = None;
        self.play(range, |_, f| {
            out = Some(f.clone());
            Ok(())
        })?;
        out.ok_or_else(|| MathreelError::render("frame was not rendered"))
    }

    /// Render `range` in order and stream it into `sink`.
    #[tracing::instrument(level = "info", skip(self, sink), fields(start = range.start.0, end = range.end.0))]
    pub fn render_range(
        &mut self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> MathreelResult<RenderStats> {
        let canvas = self.surface.canvas();
        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.fps,
        })?;
        let stats = self.play(range, |idx, frame| sink.push_frame(idx, frame))?;
        sink.end()?;
        tracing::info!(?stats, "rendered range");
        Ok(stats)
    }

    fn play(
        &mut self,
        range: FrameRange,
        mut emit: impl FnMut(FrameIndex, &FrameRGBA) -> MathreelResult<()>,
    ) -> MathreelResult<RenderStats> {
        if range.is_empty() {
            return Err(MathreelError::validation("render range must be non-empty"));
        }
        if range.start.0 < self.next.0 {
            return Err(MathreelError::validation(format!(
                "frame {} was already rendered; players only move forward (next is {})",
                range.start.0, self.next.0
            )));
        }

        let mut stats = RenderStats {
            frames_total: range.len_frames(),
            ..RenderStats::default()
        };
        while self.next.0 < range.start.0 {
            self.advance()?;
            stats.frames_replayed += 1;
        }
        while self.next.0 < range.end.0 {
            let idx = self.next;
            let frame = self.step()?;
            emit(idx, &frame)?;
            stats.frames_rendered += 1;
        }
        Ok(stats)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
