//! One-shot animations started by visibility triggers
//!
//! Each animator is a small state machine driven by timers it requests from
//! a [`Scheduler`](crate::schedule::Scheduler). Once finished it never
//! restarts; `stop()` releases any pending timer early.

pub mod attr;
pub mod counter;
pub mod progress;
pub mod typing;

use std::time::Duration;

use crate::dom::ElementId;

pub use counter::{CounterAnimator, CounterState};
pub use progress::{ProgressBarAnimator, ProgressState};
pub use typing::{TypingEffect, TypingState};

/// Description of one animation run, fixed once created
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationJob {
    pub element: ElementId,
    pub start_value: f64,
    pub target_value: f64,
    pub duration: Duration,
    pub start_delay: Duration,
}

impl AnimationJob {
    /// Count from zero to `target` over `duration`; `target` is capped at
    /// [`MAX_COUNT`](attr::MAX_COUNT)
    pub fn counter(element: ElementId, target: u64, duration: Duration) -> Self {
        Self {
            element,
            start_value: 0.0,
            target_value: target.min(attr::MAX_COUNT) as f64,
            duration,
            start_delay: Duration::ZERO,
        }
    }

    /// Jump to `percent` after `delay`
    pub fn progress(element: ElementId, percent: f64, delay: Duration) -> Self {
        Self {
            element,
            start_value: 0.0,
            target_value: percent,
            duration: Duration::ZERO,
            start_delay: delay,
        }
    }
}
