use std::collections::HashSet;

use tracing::debug;

use crate::config::RevealConfig;
use crate::dom::{ElementId, Presentation, StateFlag};
use crate::visibility::{IntersectionEntry, VisibilityWatcher, WatchOptions};

/// Adds the revealed flag to elements as they scroll into view
///
/// Each element is independent and is revealed at most once; order follows
/// the notification batches, not document order.
#[derive(Debug, Clone)]
pub struct RevealEngine {
    watcher: VisibilityWatcher,
    revealed: HashSet<ElementId>,
}

impl RevealEngine {
    pub fn new(config: &RevealConfig) -> Self {
        let options = WatchOptions::once(config.threshold).with_margin(config.margin);
        Self {
            watcher: VisibilityWatcher::new(options),
            revealed: HashSet::new(),
        }
    }

    /// Watch a set of elements (sections, cards, list items)
    ///
    /// Elements already revealed are not watched again.
    pub fn register(&mut self, elements: impl IntoIterator<Item = ElementId>) {
        for element in elements {
            if !self.revealed.contains(&element) {
                self.watcher.observe(element);
            }
        }
    }

    pub fn watcher(&self) -> &VisibilityWatcher {
        &self.watcher
    }

    pub fn forget(&mut self, element: ElementId) {
        self.watcher.forget(element);
    }

    pub fn is_revealed(&self, element: ElementId) -> bool {
        self.revealed.contains(&element)
    }

    /// Apply a notification batch. Returns the elements revealed by it.
    pub fn handle<P>(&mut self, entries: &[IntersectionEntry], presentation: &mut P) -> Vec<ElementId>
    where
        P: Presentation + ?Sized,
    {
        let fired = self.watcher.process(entries);
        for element in &fired {
            if self.revealed.insert(*element) {
                debug!(element = %element, "Revealed");
            }
            presentation.set_flag(*element, StateFlag::Revealed, true);
        }
        fired
    }
}
