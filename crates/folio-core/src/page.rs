//! The whole page's scroll and visibility behaviour behind one event API
//!
//! A host (browser binding, simulator, test) owns a [`Page`] and forwards
//! four kinds of events: scroll, resize, intersection batches per
//! [`WatchGroup`], and fired timers. The page never looks anything up on its
//! own; elements are handed in once through [`PageElements`] and geometry is
//! read from the [`Layout`] passed with each event.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::animate::{CounterAnimator, ProgressBarAnimator, TypingEffect};
use crate::config::SiteConfig;
use crate::dom::{ElementId, Presentation, StateFlag};
use crate::rate_limit::{Debounce, Throttle};
use crate::reveal::RevealEngine;
use crate::schedule::{Millis, Scheduler, TimerId, VirtualScheduler};
use crate::scroll::{HeroParallax, Layout, NavLink, ScrollState, ScrollStateTracker};
use crate::visibility::{IntersectionEntry, VisibilityWatcher, WatchGroup};

/// Timer keys, naming the component a fired timer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    CounterTick(ElementId),
    ProgressFill(ElementId),
    TypeNext,
    ResizeSettled,
    /// Trailing recompute after a scroll dropped by the throttle
    ScrollSettled,
}

/// An element together with the raw value of its data attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrElement {
    pub element: ElementId,
    #[serde(default)]
    pub value: Option<String>,
}

impl AttrElement {
    pub fn new(element: ElementId, value: Option<&str>) -> Self {
        Self {
            element,
            value: value.map(str::to_string),
        }
    }
}

/// Every element the page behaviour touches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageElements {
    /// Receives the loaded flag at start
    pub body: Option<ElementId>,
    pub navbar: Option<ElementId>,
    pub back_to_top: Option<ElementId>,
    pub nav_links: Vec<NavLink>,
    /// Sections, cards and list items that reveal on entry
    pub reveal: Vec<ElementId>,
    /// Counter elements with their target attribute
    pub counters: Vec<AttrElement>,
    /// Progress bars with their percentage attribute
    pub progress_bars: Vec<AttrElement>,
    pub hero: Option<ElementId>,
    /// Element whose text is typed in, with that text
    pub typed: Option<(ElementId, String)>,
}

pub struct Page<S, P> {
    scheduler: S,
    presentation: P,
    body: Option<ElementId>,
    scroll: ScrollStateTracker,
    scroll_throttle: Throttle,
    scroll_settle: Debounce<()>,
    resize: Debounce<()>,
    parallax: Option<HeroParallax>,
    reveal: RevealEngine,
    counter_watch: VisibilityWatcher,
    counters: HashMap<ElementId, CounterAnimator>,
    progress_watch: VisibilityWatcher,
    bars: HashMap<ElementId, ProgressBarAnimator>,
    typing: Option<TypingEffect>,
}

impl<S, P> Page<S, P>
where
    S: Scheduler<Task>,
    P: Presentation,
{
    pub fn new(config: &SiteConfig, elements: PageElements, scheduler: S, presentation: P) -> Self {
        let mut scroll = ScrollStateTracker::new(config.scroll.clone()).with_links(elements.nav_links);
        if let Some(navbar) = elements.navbar {
            scroll = scroll.with_navbar(navbar);
        }
        if let Some(button) = elements.back_to_top {
            scroll = scroll.with_back_to_top(button);
        }

        let mut reveal = RevealEngine::new(&config.reveal);
        reveal.register(elements.reveal);

        let mut counter_watch = VisibilityWatcher::new(config.watch_options(WatchGroup::Counters));
        let mut counters = HashMap::new();
        for AttrElement { element, value } in elements.counters {
            counter_watch.observe(element);
            counters.insert(
                element,
                CounterAnimator::from_attribute(element, value.as_deref(), &config.counter),
            );
        }

        let mut progress_watch =
            VisibilityWatcher::new(config.watch_options(WatchGroup::ProgressBars));
        let mut bars = HashMap::new();
        for AttrElement { element, value } in elements.progress_bars {
            progress_watch.observe(element);
            bars.insert(
                element,
                ProgressBarAnimator::from_attribute(element, value.as_deref(), &config.progress),
            );
        }

        Self {
            scheduler,
            presentation,
            body: elements.body,
            scroll_throttle: Throttle::new(config.scroll.throttle()),
            scroll_settle: Debounce::new(config.scroll.throttle()),
            resize: Debounce::new(config.scroll.resize_debounce()),
            scroll,
            parallax: elements
                .hero
                .map(|hero| HeroParallax::new(hero, &config.parallax)),
            reveal,
            counter_watch,
            counters,
            progress_watch,
            bars,
            typing: elements
                .typed
                .map(|(element, text)| TypingEffect::new(element, &text, &config.typing)),
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    pub fn scroll_state(&self) -> &ScrollState {
        self.scroll.current()
    }

    pub fn counter(&self, element: ElementId) -> Option<&CounterAnimator> {
        self.counters.get(&element)
    }

    pub fn progress_bar(&self, element: ElementId) -> Option<&ProgressBarAnimator> {
        self.bars.get(&element)
    }

    pub fn typing(&self) -> Option<&TypingEffect> {
        self.typing.as_ref()
    }

    /// Initial pass: derive scroll state, start typing, mark the page loaded
    pub fn start<L>(&mut self, layout: &L)
    where
        L: Layout + ?Sized,
    {
        self.scroll.update(layout, &mut self.presentation);
        if let Some(typing) = self.typing.as_mut() {
            typing.start(&mut self.scheduler, Task::TypeNext, &mut self.presentation);
        }
        if let Some(body) = self.body {
            self.presentation.set_flag(body, StateFlag::Loaded, true);
        }
        info!(
            counters = self.counters.len(),
            progress_bars = self.bars.len(),
            reveal = self.reveal.watcher().watched().len(),
            "Page behaviour started"
        );
    }

    /// A scroll event. Returns whether the scroll state was recomputed.
    ///
    /// A scroll dropped by the throttle arms a trailing recompute one
    /// window later, so the state at rest always matches the final position.
    pub fn on_scroll<L>(&mut self, layout: &L) -> bool
    where
        L: Layout + ?Sized,
    {
        let now = self.scheduler.now();
        let parallax_ran = match self.parallax.as_mut() {
            Some(parallax) => parallax.on_scroll(now, layout.scroll_y(), &mut self.presentation),
            None => true,
        };
        if !self.scroll_throttle.try_acquire(now) {
            self.scroll_settle
                .call(&mut self.scheduler, Task::ScrollSettled, ());
            return false;
        }
        self.scroll.update(layout, &mut self.presentation);
        if parallax_ran {
            self.scroll_settle.cancel(&mut self.scheduler);
        } else {
            self.scroll_settle
                .call(&mut self.scheduler, Task::ScrollSettled, ());
        }
        true
    }

    /// A resize event; recomputes once resizing has settled
    pub fn on_resize(&mut self) {
        self.resize.call(&mut self.scheduler, Task::ResizeSettled, ());
    }

    /// Route a batch of intersection notifications to its group
    ///
    /// Returns the targets that fired.
    pub fn on_intersections(
        &mut self,
        group: WatchGroup,
        entries: &[IntersectionEntry],
    ) -> Vec<ElementId> {
        match group {
            WatchGroup::Reveal => self.reveal.handle(entries, &mut self.presentation),
            WatchGroup::Counters => {
                let fired = self.counter_watch.process(entries);
                for element in &fired {
                    if let Some(counter) = self.counters.get_mut(element) {
                        counter.start(&mut self.scheduler, Task::CounterTick(*element));
                    }
                }
                fired
            }
            WatchGroup::ProgressBars => {
                let fired = self.progress_watch.process(entries);
                for element in &fired {
                    if let Some(bar) = self.bars.get_mut(element) {
                        debug!(element = %element, "Progress bar visible");
                        bar.trigger(&mut self.scheduler, Task::ProgressFill(*element));
                    }
                }
                fired
            }
        }
    }

    /// Deliver a fired timer to the component that owns it
    pub fn on_timer<L>(&mut self, id: TimerId, task: Task, layout: &L)
    where
        L: Layout + ?Sized,
    {
        match task {
            Task::CounterTick(element) => {
                if let Some(counter) = self.counters.get_mut(&element) {
                    counter.on_tick(id, &mut self.scheduler, task, &mut self.presentation);
                }
            }
            Task::ProgressFill(element) => {
                if let Some(bar) = self.bars.get_mut(&element) {
                    bar.on_timer(id, &mut self.presentation);
                }
            }
            Task::TypeNext => {
                if let Some(typing) = self.typing.as_mut() {
                    typing.on_timer(id, &mut self.scheduler, task, &mut self.presentation);
                }
            }
            Task::ScrollSettled => {
                if self.scroll_settle.fire(id).is_some() {
                    debug!("Scroll settled, recomputing scroll state");
                    self.scroll.update(layout, &mut self.presentation);
                    if let Some(parallax) = self.parallax.as_mut() {
                        parallax.apply(layout.scroll_y(), &mut self.presentation);
                    }
                }
            }
            Task::ResizeSettled => {
                if self.resize.fire(id).is_some() {
                    debug!("Resize settled, recomputing scroll state");
                    self.scroll.update(layout, &mut self.presentation);
                }
            }
        }
    }

    /// Whether `element` is still observed by `group`'s watcher
    pub fn is_watching(&self, group: WatchGroup, element: ElementId) -> bool {
        self.watcher(group).is_watching(element)
    }

    /// Targets `group` still observes, in registration order
    pub fn watched(&self, group: WatchGroup) -> &[ElementId] {
        self.watcher(group).watched()
    }

    fn watcher(&self, group: WatchGroup) -> &VisibilityWatcher {
        match group {
            WatchGroup::Reveal => self.reveal.watcher(),
            WatchGroup::Counters => &self.counter_watch,
            WatchGroup::ProgressBars => &self.progress_watch,
        }
    }

    /// Drop a detached element from every watcher
    pub fn forget(&mut self, element: ElementId) {
        self.reveal.forget(element);
        self.counter_watch.forget(element);
        self.progress_watch.forget(element);
    }

    /// Cancel every pending timer; the page shows whatever it last wrote
    pub fn dispose(&mut self) {
        for counter in self.counters.values_mut() {
            counter.stop(&mut self.scheduler);
        }
        for bar in self.bars.values_mut() {
            bar.stop(&mut self.scheduler);
        }
        if let Some(typing) = self.typing.as_mut() {
            typing.stop(&mut self.scheduler);
        }
        self.resize.cancel(&mut self.scheduler);
        self.scroll_settle.cancel(&mut self.scheduler);
        debug!("Page behaviour disposed");
    }
}

impl<P> Page<VirtualScheduler<Task>, P>
where
    P: Presentation,
{
    /// Run every timer due by `until`, including ones scheduled on the way
    ///
    /// Returns the number of timers delivered.
    pub fn advance_to<L>(&mut self, until: Millis, layout: &L) -> usize
    where
        L: Layout + ?Sized,
    {
        let mut delivered = 0;
        while let Some((id, task)) = self.scheduler.pop_due(until) {
            self.on_timer(id, task, layout);
            delivered += 1;
        }
        self.scheduler.set_now(until);
        delivered
    }

    pub fn advance_by<L>(&mut self, delta: Duration, layout: &L) -> usize
    where
        L: Layout + ?Sized,
    {
        let until = self
            .scheduler
            .now()
            .saturating_add(crate::schedule::as_millis(delta));
        self.advance_to(until, layout)
    }
}
