//! Timer abstraction shared by every time-driven component
//!
//! Components never hold real timers. They ask a [`Scheduler`] for a timeout
//! tagged with a task key, and the host hands fired `(TimerId, key)` pairs
//! back to whichever component owns the key. Tests drive the same code with
//! [`VirtualScheduler`] and advance time explicitly.

mod virtual_time;

use std::time::Duration;

pub use virtual_time::VirtualScheduler;

/// Milliseconds on the host's monotonic clock
pub type Millis = u64;

/// Identity of one scheduled timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Host timer service, generic over the task key `K`
pub trait Scheduler<K> {
    /// Current time in milliseconds
    fn now(&self) -> Millis;

    /// Schedule `key` to be delivered once `delay` has elapsed
    fn set_timeout(&mut self, delay: Duration, key: K) -> TimerId;

    /// Cancel a pending timeout. Unknown or already-fired ids are ignored.
    fn clear_timeout(&mut self, id: TimerId);
}

/// Convert a duration to whole milliseconds, saturating
#[inline]
pub fn as_millis(duration: Duration) -> Millis {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
