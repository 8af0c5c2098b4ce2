use std::time::Duration;

use tracing::{debug, trace};

use super::attr::parse_count;
use super::AnimationJob;
use crate::config::CounterConfig;
use crate::dom::{ElementId, Presentation};
use crate::schedule::{Scheduler, TimerId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CounterState {
    Idle,
    Running { timer: TimerId, current: f64 },
    /// Reached the target; never restarts
    Finished,
    /// Stopped before reaching the target
    Stopped,
}

/// Counts a numeric display up from zero to its target in fixed ticks
///
/// Each tick adds `target / (duration / tick)` and shows the floor of the
/// running value. The tick that reaches or passes the target clamps to it,
/// shows it, and ends the animation.
#[derive(Debug, Clone)]
pub struct CounterAnimator {
    job: AnimationJob,
    tick: Duration,
    step: f64,
    state: CounterState,
}

impl CounterAnimator {
    pub fn new(job: AnimationJob, tick: Duration) -> Self {
        let target = job.target_value.max(0.0);
        let steps = job.duration.as_secs_f64() / tick.as_secs_f64();
        let step = target / steps;
        // A zero duration or zero tick finishes on the first tick
        let step = if tick.is_zero() || !step.is_finite() || (step <= 0.0 && target > 0.0) {
            target
        } else {
            step
        };

        Self {
            job,
            tick,
            step,
            state: CounterState::Idle,
        }
    }

    /// Build from the raw target attribute; malformed values count to 0
    pub fn from_attribute(element: ElementId, raw: Option<&str>, config: &CounterConfig) -> Self {
        let target = parse_count(raw);
        Self::new(
            AnimationJob::counter(element, target, config.duration()),
            config.tick(),
        )
    }

    pub fn element(&self) -> ElementId {
        self.job.element
    }

    pub fn target(&self) -> u64 {
        self.job.target_value.max(0.0) as u64
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn state(&self) -> CounterState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, CounterState::Running { .. })
    }

    /// Start ticking. Only an idle counter starts; returns whether it did.
    pub fn start<K, S>(&mut self, scheduler: &mut S, key: K) -> bool
    where
        S: Scheduler<K> + ?Sized,
    {
        if self.state != CounterState::Idle {
            return false;
        }
        debug!(element = %self.job.element, target = self.target(), "Counter started");
        let timer = scheduler.set_timeout(self.tick, key);
        self.state = CounterState::Running {
            timer,
            current: self.job.start_value,
        };
        true
    }

    /// Advance one tick if `id` is this counter's pending timer
    ///
    /// Returns the value displayed, or `None` for a stale or foreign timer.
    pub fn on_tick<K, S, P>(
        &mut self,
        id: TimerId,
        scheduler: &mut S,
        key: K,
        presentation: &mut P,
    ) -> Option<u64>
    where
        S: Scheduler<K> + ?Sized,
        P: Presentation + ?Sized,
    {
        let CounterState::Running { timer, current } = self.state else {
            return None;
        };
        if timer != id {
            return None;
        }

        let target = self.job.target_value.max(0.0);
        let mut current = current + self.step;
        let done = current >= target;
        if done {
            current = target;
        }

        let shown = current.floor() as u64;
        presentation.set_text(self.job.element, &shown.to_string());

        if done {
            debug!(element = %self.job.element, value = shown, "Counter finished");
            self.state = CounterState::Finished;
        } else {
            trace!(element = %self.job.element, value = shown, "Counter tick");
            let timer = scheduler.set_timeout(self.tick, key);
            self.state = CounterState::Running { timer, current };
        }

        Some(shown)
    }

    /// Cancel a running counter and release its timer
    pub fn stop<K, S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler<K> + ?Sized,
    {
        match self.state {
            CounterState::Running { timer, .. } => {
                scheduler.clear_timeout(timer);
                self.state = CounterState::Stopped;
            }
            CounterState::Idle => self.state = CounterState::Stopped,
            CounterState::Finished | CounterState::Stopped => {}
        }
    }
}
