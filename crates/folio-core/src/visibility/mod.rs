//! Viewport-visibility triggers
//!
//! A [`VisibilityWatcher`] owns a set of targets and turns batches of
//! intersection notifications into "this target just became visible"
//! triggers. It never talks to the browser itself; the host feeds it
//! [`IntersectionEntry`] batches, either from a native observer or from
//! [`geometry::intersection_entry`].

pub mod geometry;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::ElementId;

/// Offsets applied to the viewport edges before intersecting
///
/// Positive values grow the effective viewport, negative values shrink it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Margin {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

impl Margin {
    /// CSS `rootMargin` form, e.g. `0px 0px -50px 0px`
    pub fn to_css(&self) -> String {
        format!(
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

/// Whether a target keeps triggering after its first visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerPolicy {
    /// Fire once, then stop observing the target
    Once,
    /// Fire on every entry into view
    Repeatable,
}

/// Intersection configuration shared by all targets of one watcher
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    /// Visible fraction (0-1) a target must reach
    pub threshold: f64,
    pub margin: Margin,
    pub policy: TriggerPolicy,
}

impl WatchOptions {
    pub fn once(threshold: f64) -> Self {
        Self {
            threshold,
            margin: Margin::default(),
            policy: TriggerPolicy::Once,
        }
    }

    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_policy(mut self, policy: TriggerPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// One target's state in a notification batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    pub is_intersecting: bool,
    /// Visible fraction of the target, 0-1
    pub intersection_ratio: f64,
}

impl IntersectionEntry {
    pub fn outside(target: ElementId) -> Self {
        Self {
            target,
            is_intersecting: false,
            intersection_ratio: 0.0,
        }
    }

    pub fn visible(target: ElementId, ratio: f64) -> Self {
        Self {
            target,
            is_intersecting: true,
            intersection_ratio: ratio,
        }
    }
}

/// The element groups a page watches independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchGroup {
    Reveal,
    Counters,
    ProgressBars,
}

impl WatchGroup {
    pub const ALL: [WatchGroup; 3] = [Self::Reveal, Self::Counters, Self::ProgressBars];
}

impl fmt::Display for WatchGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Reveal => "reveal",
            Self::Counters => "counters",
            Self::ProgressBars => "progress_bars",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seen {
    /// No notification yet; an already-visible target must still fire
    Unknown,
    Outside,
    Inside,
}

/// Turns intersection batches into per-target visibility triggers
#[derive(Debug, Clone)]
pub struct VisibilityWatcher {
    options: WatchOptions,
    targets: HashMap<ElementId, Seen>,
    /// Registration order, used for deterministic iteration
    order: Vec<ElementId>,
}

impl VisibilityWatcher {
    pub fn new(options: WatchOptions) -> Self {
        Self {
            options,
            targets: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Start watching `target`. Returns false if it is already watched.
    pub fn observe(&mut self, target: ElementId) -> bool {
        if self.targets.contains_key(&target) {
            return false;
        }
        self.targets.insert(target, Seen::Unknown);
        self.order.push(target);
        true
    }

    pub fn observe_all(&mut self, targets: impl IntoIterator<Item = ElementId>) {
        for target in targets {
            self.observe(target);
        }
    }

    /// Stop watching `target`; a no-op if it is not watched
    pub fn unobserve(&mut self, target: ElementId) {
        if self.targets.remove(&target).is_some() {
            self.order.retain(|t| *t != target);
        }
    }

    /// Abandon a target that left the document before firing
    pub fn forget(&mut self, target: ElementId) {
        if self.targets.contains_key(&target) {
            debug!(target = %target, "Abandoning watch on detached element");
        }
        self.unobserve(target);
    }

    pub fn is_watching(&self, target: ElementId) -> bool {
        self.targets.contains_key(&target)
    }

    /// Targets still being watched, in registration order
    pub fn watched(&self) -> &[ElementId] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn meets(&self, entry: &IntersectionEntry) -> bool {
        entry.is_intersecting && entry.intersection_ratio >= self.options.threshold
    }

    /// Process one notification batch and return the targets that just
    /// became visible, in the batch's order
    ///
    /// Entries for targets not (or no longer) watched are ignored. With
    /// [`TriggerPolicy::Once`] a fired target is released immediately, so
    /// a batch listing it twice still fires it once.
    pub fn process(&mut self, entries: &[IntersectionEntry]) -> Vec<ElementId> {
        let mut fired = Vec::new();

        for entry in entries {
            let meets = self.meets(entry);
            let Some(seen) = self.targets.get_mut(&entry.target) else {
                continue;
            };

            let was_inside = *seen == Seen::Inside;
            *seen = if meets { Seen::Inside } else { Seen::Outside };

            if meets && !was_inside {
                fired.push(entry.target);
                if self.options.policy == TriggerPolicy::Once {
                    self.unobserve(entry.target);
                }
            }
        }

        fired
    }
}
