use std::collections::BTreeMap;
use std::time::Duration;

use super::{as_millis, Millis, Scheduler, TimerId};

/// Deterministic scheduler whose clock only moves when told to
///
/// Due timers are released in due-time order; timers due at the same
/// instant keep their registration order.
#[derive(Debug)]
pub struct VirtualScheduler<K> {
    now: Millis,
    next_id: u64,
    /// Keyed by (due time, id) so iteration order is firing order
    queue: BTreeMap<(Millis, TimerId), K>,
}

impl<K> Default for VirtualScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> VirtualScheduler<K> {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(now: Millis) -> Self {
        Self {
            now,
            next_id: 0,
            queue: BTreeMap::new(),
        }
    }

    /// Number of timers still waiting to fire
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<Millis> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to it
    ///
    /// Hosts call this in a loop so timers scheduled by a firing callback
    /// are picked up within the same advance.
    pub fn pop_due(&mut self, until: Millis) -> Option<(TimerId, K)> {
        let (&(due, id), _) = self.queue.iter().next()?;
        if due > until {
            return None;
        }
        let key = self.queue.remove(&(due, id))?;
        self.now = self.now.max(due);
        Some((id, key))
    }

    /// Move the clock to `until` and return every timer due by then
    ///
    /// Only timers already queued are returned; use [`pop_due`](Self::pop_due)
    /// when firing a timer may schedule another inside the window.
    pub fn advance_to(&mut self, until: Millis) -> Vec<(TimerId, K)> {
        let mut fired = Vec::new();
        while let Some(entry) = self.pop_due(until) {
            fired.push(entry);
        }
        self.now = self.now.max(until);
        fired
    }

    pub fn advance_by(&mut self, delta: Duration) -> Vec<(TimerId, K)> {
        let until = self.now.saturating_add(as_millis(delta));
        self.advance_to(until)
    }

    /// Set the clock without firing anything due in between
    pub fn set_now(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }
}

impl<K> Scheduler<K> for VirtualScheduler<K> {
    fn now(&self) -> Millis {
        self.now
    }

    fn set_timeout(&mut self, delay: Duration, key: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now.saturating_add(as_millis(delay));
        self.queue.insert((due, id), key);
        id
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.queue.retain(|(_, queued), _| *queued != id);
    }
}
