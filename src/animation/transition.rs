use std::time::Duration;

use crate::foundation::core::Fps;

/// Result of stepping a [`Transition`] by one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Nothing is armed; progress did not change.
    Idle,
    /// Progress moved but has not reached 1 yet.
    Running,
    /// Progress reached 1 on this step. Reported once per arming.
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Run {
    duration: Duration,
    elapsed_frames: u64,
}

/// Progress of one timed change (entrance, morph or deletion) of an entity.
///
/// Progress always lies in `[0, 1]`. It is derived from the number of frames elapsed since
/// arming, so it reaches exactly 1 after `fps * duration` frames regardless of float
/// accumulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    progress: f64,
    run: Option<Run>,
}

impl Transition {
    /// A transition at rest at progress 1 (entrance and morph: "not started or finished").
    pub fn settled() -> Self {
        Self {
            progress: 1.0,
            run: None,
        }
    }

    /// A transition at rest at progress 0 (deletion: "not armed").
    pub fn unarmed() -> Self {
        Self {
            progress: 0.0,
            run: None,
        }
    }

    /// Start over from progress 0; the previous run, if any, is discarded.
    pub fn arm(&mut self, duration: Duration) {
        self.progress = 0.0;
        self.run = Some(Run {
            duration,
            elapsed_frames: 0,
        });
    }

    /// Current progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// `true` while armed and not yet complete.
    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// `true` once progress has reached 1.
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Duration of the current run, if armed.
    pub fn duration(&self) -> Option<Duration> {
        self.run.map(|r| r.duration)
    }

    /// Advance by one frame at `fps`.
    ///
    /// A zero duration completes on the first step after arming.
    pub fn advance(&mut self, fps: Fps) -> Step {
        let Some(run) = self.run.as_mut() else {
            return Step::Idle;
        };
        run.elapsed_frames += 1;
        let total_frames = run.duration.as_secs_f64() * fps.as_f64();
        let progress = if total_frames <= 0.0 {
            1.0
        } else {
            (run.elapsed_frames as f64 / total_frames).min(1.0)
        };
        if progress >= 1.0 {
            self.progress = 1.0;
            self.run = None;
            Step::Completed
        } else {
            self.progress = progress;
            Step::Running
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/transition.rs"]
mod tests;
