//! Scripted driver: an ordered list of scene actions placed on a time cursor.
//!
//! A [`Timeline`] replaces a driver thread that sleeps between calls. Actions are scheduled at
//! the current cursor; `wait` and the `*_wait` variants move the cursor forward. The player fires
//! every action whose time has come before rendering a frame, so an action at time `t` first
//! shows on frame `ceil(t * fps)`.

use std::collections::VecDeque;
use std::time::Duration;

use crate::entity::{Animatable, Deletable, Formula, FunctionGraph, Handle, SceneEntity};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::MathreelResult;
use crate::scene::Scene;

type Action = Box<dyn FnOnce(&mut Scene) -> MathreelResult<()>>;

struct Cue {
    at: Duration,
    label: String,
    action: Action,
}

/// Scene actions in firing order.
#[derive(Default)]
pub struct Timeline {
    cues: VecDeque<Cue>,
    cursor: Duration,
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("cursor", &self.cursor)
            .field(
                "cues",
                &self
                    .cues
                    .iter()
                    .map(|c| (c.at, c.label.as_str()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Timeline {
    /// Empty timeline with the cursor at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` at the cursor.
    pub fn then(
        mut self,
        label: impl Into<String>,
        action: impl FnOnce(&mut Scene) -> MathreelResult<()> + 'static,
    ) -> Self {
        self.cues.push_back(Cue {
            at: self.cursor,
            label: label.into(),
            action: Box::new(action),
        });
        self
    }

    /// Move the cursor forward.
    pub fn wait(mut self, duration: Duration) -> Self {
        self.cursor += duration;
        self
    }

    /// Register without animation.
    pub fn show<E: SceneEntity>(self, handle: Handle<E>) -> Self {
        self.then("show", move |s| s.show(handle))
    }

    /// Unregister without animation.
    pub fn delete<E: SceneEntity>(self, handle: Handle<E>) -> Self {
        self.then("delete", move |s| s.delete(handle))
    }

    /// Start an entrance.
    pub fn animate<E: SceneEntity + Animatable>(self, handle: Handle<E>, duration: Duration) -> Self {
        self.then("animate", move |s| s.animate(handle, duration))
    }

    /// Start an entrance and wait for it.
    pub fn animate_wait<E: SceneEntity + Animatable>(
        self,
        handle: Handle<E>,
        duration: Duration,
    ) -> Self {
        self.animate(handle, duration).wait(duration)
    }

    /// Start a deletion.
    pub fn animate_delete<E: SceneEntity + Deletable>(
        self,
        handle: Handle<E>,
        duration: Duration,
    ) -> Self {
        self.then("animate_delete", move |s| s.animate_delete(handle, duration))
    }

    /// Start a deletion and wait for it.
    pub fn animate_delete_wait<E: SceneEntity + Deletable>(
        self,
        handle: Handle<E>,
        duration: Duration,
    ) -> Self {
        self.animate_delete(handle, duration).wait(duration)
    }

    /// Start a graph morph.
    pub fn morph_graph(
        self,
        handle: Handle<FunctionGraph>,
        duration: Duration,
        target: FunctionGraph,
    ) -> Self {
        self.then("morph_graph", move |s| s.morph_graph(handle, duration, target))
    }

    /// Start a graph morph and wait for it.
    pub fn morph_graph_wait(
        self,
        handle: Handle<FunctionGraph>,
        duration: Duration,
        target: FunctionGraph,
    ) -> Self {
        self.morph_graph(handle, duration, target).wait(duration)
    }

    /// Start a formula retype.
    pub fn morph_formula(
        self,
        handle: Handle<Formula>,
        duration: Duration,
        markup: impl Into<String>,
    ) -> Self {
        let markup = markup.into();
        self.then("morph_formula", move |s| s.morph_formula(handle, duration, markup))
    }

    /// Start a formula retype and wait until the new markup starts fading in (half the
    /// duration).
    pub fn morph_formula_wait(
        self,
        handle: Handle<Formula>,
        duration: Duration,
        markup: impl Into<String>,
    ) -> Self {
        self.morph_formula(handle, duration, markup)
            .wait(duration / 2)
    }

    /// Current cursor: the time the next scheduled action would fire at.
    pub fn cursor(&self) -> Duration {
        self.cursor
    }

    /// Number of actions not fired yet.
    pub fn pending(&self) -> usize {
        self.cues.len()
    }

    /// First frame at or after the cursor; rendering `0..end_frame` plays the whole script.
    pub fn end_frame(&self, fps: Fps) -> FrameIndex {
        FrameIndex(fps.secs_to_frames_ceil(self.cursor.as_secs_f64()))
    }

    /// Fire every pending action due at or before `frame`, in scheduling order. Returns how many
    /// fired.
    pub fn fire_due(&mut self, frame: FrameIndex, fps: Fps, scene: &mut Scene) -> MathreelResult<usize> {
        let mut fired = 0;
        while let Some(cue) = self.cues.front() {
            if fps.secs_to_frames_ceil(cue.at.as_secs_f64()) > frame.0 {
                break;
            }
            let Some(cue) = self.cues.pop_front() else {
                break;
            };
            tracing::debug!(label = %cue.label, at = ?cue.at, frame = frame.0, "firing cue");
            (cue.action)(scene)?;
            fired += 1;
        }
        Ok(fired)
    }
}

#[cfg(test)]
#[path = "../tests/unit/timeline.rs"]
mod tests;
