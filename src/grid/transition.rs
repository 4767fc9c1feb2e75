//! Black-screen transition sequencing and animation curves.
//!
//! Every black-screen move runs the same sequence:
//! fade to opaque -> instant jump while opaque -> settle -> fade back -> done.
//! The sequencer only says what to do next and how long to wait; the UI layer
//! owns the timers and the overlay widget.

use std::time::Duration;

use super::position::GridPos;

/// Durations for one black-screen sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTimings {
    /// Fade to black and fade back each take this long.
    pub fade: Duration,
    /// Hold on black after the jump before revealing.
    pub settle: Duration,
}

impl Default for TransitionTimings {
    fn default() -> Self {
        Self {
            fade: Duration::from_millis(500),
            settle: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Darkening,
    Settling,
    Revealing,
}

/// What the UI must do next, and when to call `advance` again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionStep {
    /// Animate the overlay towards `opacity` over `duration`, then advance.
    Fade { opacity: f64, duration: Duration },
    /// Scroll instantly to the target, then advance after `hold`.
    JumpTo { target: GridPos, hold: Duration },
    /// Sequence complete; input may resume.
    Finished,
}

#[derive(Debug, Clone)]
pub struct TransitionSequencer {
    phase: TransitionPhase,
    target: Option<GridPos>,
    timings: TransitionTimings,
}

impl TransitionSequencer {
    pub fn new(timings: TransitionTimings) -> Self {
        Self {
            phase: TransitionPhase::Idle,
            target: None,
            timings,
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != TransitionPhase::Idle
    }

    pub fn target(&self) -> Option<GridPos> {
        self.target
    }

    /// Timings apply to the next sequence; a running one keeps its own.
    pub fn set_timings(&mut self, timings: TransitionTimings) {
        if !self.is_active() {
            self.timings = timings;
        }
    }

    /// Start a sequence towards `target`. Refused while one is running.
    pub fn begin(&mut self, target: GridPos) -> Option<TransitionStep> {
        if self.is_active() {
            return None;
        }
        self.phase = TransitionPhase::Darkening;
        self.target = Some(target);
        Some(TransitionStep::Fade {
            opacity: 1.0,
            duration: self.timings.fade,
        })
    }

    /// Start with the overlay already opaque (application startup).
    pub fn begin_opaque(&mut self, target: GridPos) -> Option<TransitionStep> {
        self.begin(target)?;
        Some(TransitionStep::Fade {
            opacity: 1.0,
            duration: Duration::ZERO,
        })
    }

    /// Move to the next phase once the previous step has completed.
    pub fn advance(&mut self) -> TransitionStep {
        match self.phase {
            TransitionPhase::Idle => TransitionStep::Finished,
            TransitionPhase::Darkening => {
                self.phase = TransitionPhase::Settling;
                match self.target {
                    Some(target) => TransitionStep::JumpTo {
                        target,
                        hold: self.timings.settle,
                    },
                    None => self.advance(),
                }
            }
            TransitionPhase::Settling => {
                self.phase = TransitionPhase::Revealing;
                TransitionStep::Fade {
                    opacity: 0.0,
                    duration: self.timings.fade,
                }
            }
            TransitionPhase::Revealing => {
                self.phase = TransitionPhase::Idle;
                self.target = None;
                TransitionStep::Finished
            }
        }
    }
}

impl Default for TransitionSequencer {
    fn default() -> Self {
        Self::new(TransitionTimings::default())
    }
}

/// Linear opacity ramp used for the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeAnimation {
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
}

impl FadeAnimation {
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self { from, to, duration }
    }

    pub fn opacity_at(&self, elapsed: Duration) -> f64 {
        let t = progress(elapsed, self.duration);
        (self.from + (self.to - self.from) * t).clamp(0.0, 1.0)
    }

    pub fn is_done(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

/// Fraction of `duration` covered by `elapsed`, in 0..=1.
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// Cubic ease-in-out for smooth scrolling.
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
