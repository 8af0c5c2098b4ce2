//! Debounce and throttle as explicit state machines
//!
//! Neither wrapper owns a timer. `Throttle` reads the clock it is handed;
//! `Debounce` asks a [`Scheduler`] for its deferred call and is told when
//! that timer fires.

use std::time::Duration;

use crate::schedule::{as_millis, Millis, Scheduler, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleState {
    /// The next call goes through
    Open,
    /// A call went through at `since`; calls are dropped until the window ends
    Suppressed { since: Millis },
}

/// Leading-edge throttle: the first call of each window runs, the rest drop
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Millis,
    state: ThrottleState,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: as_millis(interval),
            state: ThrottleState::Open,
        }
    }

    pub fn state(&self) -> ThrottleState {
        self.state
    }

    /// Returns true when a call at `now` may run, and opens a new window if so
    ///
    /// A clock that went backwards (`now < since`) counts as an elapsed window.
    pub fn try_acquire(&mut self, now: Millis) -> bool {
        if let ThrottleState::Suppressed { since } = self.state {
            if now >= since && now - since < self.interval {
                return false;
            }
        }
        self.state = ThrottleState::Suppressed { since: now };
        true
    }

    pub fn reset(&mut self) {
        self.state = ThrottleState::Open;
    }
}

/// A callback behind a [`Throttle`]
pub struct Throttled<F> {
    throttle: Throttle,
    f: F,
}

impl<F> Throttled<F> {
    pub fn new(interval: Duration, f: F) -> Self {
        Self {
            throttle: Throttle::new(interval),
            f,
        }
    }

    /// Invoke the callback if the window allows it. Returns whether it ran.
    pub fn call<A>(&mut self, now: Millis, args: A) -> bool
    where
        F: FnMut(A),
    {
        if self.throttle.try_acquire(now) {
            (self.f)(args);
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebounceState<A> {
    Idle,
    /// A deferred call is waiting on `timer`, carrying the latest arguments
    Scheduled { timer: TimerId, args: A },
}

/// Trailing-edge debounce: one call per quiet period, with the last arguments
#[derive(Debug, Clone)]
pub struct Debounce<A> {
    wait: Duration,
    state: DebounceState<A>,
}

impl<A> Debounce<A> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            state: DebounceState::Idle,
        }
    }

    pub fn state(&self) -> &DebounceState<A> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Scheduled { .. })
    }

    /// Cancel any pending call and reschedule `wait` from now with `args`
    pub fn call<K, S>(&mut self, scheduler: &mut S, key: K, args: A)
    where
        S: Scheduler<K> + ?Sized,
    {
        if let DebounceState::Scheduled { timer, .. } = self.state {
            scheduler.clear_timeout(timer);
        }
        let timer = scheduler.set_timeout(self.wait, key);
        self.state = DebounceState::Scheduled { timer, args };
    }

    /// Handle a fired timer. Returns the arguments to run with if the timer
    /// is the one currently pending; stale ids are ignored.
    pub fn fire(&mut self, id: TimerId) -> Option<A> {
        match std::mem::replace(&mut self.state, DebounceState::Idle) {
            DebounceState::Scheduled { timer, args } if timer == id => Some(args),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn cancel<K, S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler<K> + ?Sized,
    {
        if let DebounceState::Scheduled { timer, .. } = self.state {
            scheduler.clear_timeout(timer);
        }
        self.state = DebounceState::Idle;
    }
}

/// A callback behind a [`Debounce`]
pub struct Debounced<A, F> {
    debounce: Debounce<A>,
    f: F,
}

impl<A, F> Debounced<A, F>
where
    F: FnMut(A),
{
    pub fn new(wait: Duration, f: F) -> Self {
        Self {
            debounce: Debounce::new(wait),
            f,
        }
    }

    pub fn call<K, S>(&mut self, scheduler: &mut S, key: K, args: A)
    where
        S: Scheduler<K> + ?Sized,
    {
        self.debounce.call(scheduler, key, args);
    }

    /// Run the callback if `id` is the pending timer. Returns whether it ran.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        match self.debounce.fire(id) {
            Some(args) => {
                (self.f)(args);
                true
            }
            None => false,
        }
    }

    pub fn cancel<K, S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler<K> + ?Sized,
    {
        self.debounce.cancel(scheduler);
    }
}
