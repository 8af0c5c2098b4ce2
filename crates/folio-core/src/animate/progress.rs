use tracing::debug;

use super::attr::parse_percent;
use super::AnimationJob;
use crate::config::ProgressConfig;
use crate::dom::{ElementId, Presentation};
use crate::schedule::{Scheduler, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    Idle,
    /// Waiting out the start delay
    Pending { timer: TimerId },
    Done,
    Stopped,
}

/// Sets a bar's width to its percentage once, after a short delay
///
/// The width is written in one jump; any easing comes from the element's own
/// CSS transition.
#[derive(Debug, Clone)]
pub struct ProgressBarAnimator {
    job: AnimationJob,
    state: ProgressState,
}

impl ProgressBarAnimator {
    pub fn new(job: AnimationJob) -> Self {
        Self {
            job,
            state: ProgressState::Idle,
        }
    }

    pub fn from_attribute(element: ElementId, raw: Option<&str>, config: &ProgressConfig) -> Self {
        let percent = parse_percent(raw);
        Self::new(AnimationJob::progress(
            element,
            percent,
            std::time::Duration::from_millis(config.delay_ms),
        ))
    }

    pub fn element(&self) -> ElementId {
        self.job.element
    }

    pub fn percent(&self) -> f64 {
        self.job.target_value
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    /// Begin the start delay. Only an idle bar triggers; returns whether it did.
    pub fn trigger<K, S>(&mut self, scheduler: &mut S, key: K) -> bool
    where
        S: Scheduler<K> + ?Sized,
    {
        if self.state != ProgressState::Idle {
            return false;
        }
        let timer = scheduler.set_timeout(self.job.start_delay, key);
        self.state = ProgressState::Pending { timer };
        true
    }

    /// Apply the width if `id` is this bar's pending timer
    pub fn on_timer<P>(&mut self, id: TimerId, presentation: &mut P) -> bool
    where
        P: Presentation + ?Sized,
    {
        match self.state {
            ProgressState::Pending { timer } if timer == id => {
                presentation.set_width_percent(self.job.element, self.job.target_value);
                debug!(element = %self.job.element, percent = self.job.target_value, "Progress bar filled");
                self.state = ProgressState::Done;
                true
            }
            _ => false,
        }
    }

    pub fn stop<K, S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler<K> + ?Sized,
    {
        match self.state {
            ProgressState::Pending { timer } => {
                scheduler.clear_timeout(timer);
                self.state = ProgressState::Stopped;
            }
            ProgressState::Idle => self.state = ProgressState::Stopped,
            ProgressState::Done | ProgressState::Stopped => {}
        }
    }
}
