use tracing::{debug, trace};

use super::{Layout, NavLink, ScrollState};
use crate::config::ScrollConfig;
use crate::dom::{ElementId, Presentation, StateFlag};

/// Recomputes scroll-derived flags and applies them to the page
///
/// Every update reads the layout afresh and writes the full derived state,
/// so a missed or reordered tick cannot leave stale flags behind.
#[derive(Debug, Clone)]
pub struct ScrollStateTracker {
    config: ScrollConfig,
    navbar: Option<ElementId>,
    back_to_top: Option<ElementId>,
    links: Vec<NavLink>,
    current: ScrollState,
}

impl ScrollStateTracker {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            navbar: None,
            back_to_top: None,
            links: Vec::new(),
            current: ScrollState::default(),
        }
    }

    pub fn with_navbar(mut self, navbar: ElementId) -> Self {
        self.navbar = Some(navbar);
        self
    }

    pub fn with_back_to_top(mut self, button: ElementId) -> Self {
        self.back_to_top = Some(button);
        self
    }

    pub fn with_links(mut self, links: Vec<NavLink>) -> Self {
        self.links = links;
        self
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// State produced by the last update
    pub fn current(&self) -> &ScrollState {
        &self.current
    }

    /// Link currently marked active, if any
    pub fn active_link(&self) -> Option<&NavLink> {
        self.links
            .iter()
            .find(|link| link.targets(&self.current.active_section_id))
    }

    /// Recompute from `layout` and write the result to `presentation`
    pub fn update<L, P>(&mut self, layout: &L, presentation: &mut P) -> &ScrollState
    where
        L: Layout + ?Sized,
        P: Presentation + ?Sized,
    {
        let sections = layout.sections();
        let state = ScrollState::compute(layout.scroll_y(), &sections, &self.config);
        trace!(scroll_y = state.scroll_y, active = %state.active_section_id, "Scroll state");

        if state.active_section_id != self.current.active_section_id {
            debug!(
                from = %self.current.active_section_id,
                to = %state.active_section_id,
                "Active section changed"
            );
        }

        if let Some(navbar) = self.navbar {
            presentation.set_flag(navbar, StateFlag::Scrolled, state.navbar_scrolled);
        }
        if let Some(button) = self.back_to_top {
            presentation.set_flag(button, StateFlag::Shown, state.back_to_top_visible);
        }

        // Clear every other link before marking the match so at most one is active
        for link in &self.links {
            if !link.targets(&state.active_section_id) {
                presentation.set_flag(link.element, StateFlag::Active, false);
            }
        }
        for link in &self.links {
            if link.targets(&state.active_section_id) {
                presentation.set_flag(link.element, StateFlag::Active, true);
            }
        }

        self.current = state;
        &self.current
    }
}
