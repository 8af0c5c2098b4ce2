//! Scroll-derived page state
//!
//! # Layout
//! - `tracker` - navbar / back-to-top flags and the active navigation link
//! - `parallax` - hero offset following the scroll position

pub mod parallax;
pub mod tracker;

use serde::{Deserialize, Serialize};

use crate::config::ScrollConfig;
use crate::dom::ElementId;

pub use parallax::HeroParallax;
pub use tracker::ScrollStateTracker;

/// A navigable page section as laid out right now
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub top_offset: f64,
    pub height: f64,
}

impl Section {
    pub fn new(id: impl Into<String>, top_offset: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top_offset,
            height,
        }
    }

    /// Whether `scroll_y` falls in `[top - offset, top - offset + height)`
    pub fn contains(&self, scroll_y: f64, offset: f64) -> bool {
        let start = self.top_offset - offset;
        scroll_y >= start && scroll_y < start + self.height
    }
}

/// A navigation link and the in-page reference it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub element: ElementId,
    pub href: String,
}

impl NavLink {
    pub fn new(element: ElementId, href: impl Into<String>) -> Self {
        Self {
            element,
            href: href.into(),
        }
    }

    /// True when this link targets `section_id`; an empty id matches nothing
    pub fn targets(&self, section_id: &str) -> bool {
        !section_id.is_empty()
            && self
                .href
                .strip_prefix('#')
                .is_some_and(|fragment| fragment == section_id)
    }
}

/// Live page geometry, read fresh on every tick
pub trait Layout {
    fn scroll_y(&self) -> f64;

    /// Navigable sections in document order
    fn sections(&self) -> Vec<Section>;
}

/// Everything derived from one scroll position
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScrollState {
    pub scroll_y: f64,
    pub navbar_scrolled: bool,
    pub back_to_top_visible: bool,
    /// Empty when no section's range contains the scroll position
    pub active_section_id: String,
}

impl ScrollState {
    /// Derive the state from scratch; nothing carries over between calls
    pub fn compute(scroll_y: f64, sections: &[Section], config: &ScrollConfig) -> Self {
        Self {
            scroll_y,
            navbar_scrolled: scroll_y > config.navbar_threshold,
            back_to_top_visible: scroll_y > config.back_to_top_threshold,
            active_section_id: active_section(scroll_y, sections, config.section_offset)
                .map(|s| s.id.clone())
                .unwrap_or_default(),
        }
    }

    pub fn has_active_section(&self) -> bool {
        !self.active_section_id.is_empty()
    }
}

/// The section whose adjusted range contains `scroll_y`
///
/// When ranges overlap, the last matching section in document order wins.
pub fn active_section(scroll_y: f64, sections: &[Section], offset: f64) -> Option<&Section> {
    sections.iter().rev().find(|s| s.contains(scroll_y, offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_sections() -> Vec<Section> {
        vec![Section::new("a", 0.0, 500.0), Section::new("b", 500.0, 500.0)]
    }

    #[test]
    fn test_thresholds_hold_for_any_offset() {
        let config = ScrollConfig::default();
        for y in [0.0, 50.0, 50.5, 51.0, 299.0, 300.0, 301.0, 5000.0] {
            let state = ScrollState::compute(y, &[], &config);
            assert_eq!(state.navbar_scrolled, y > 50.0, "y={y}");
            assert_eq!(state.back_to_top_visible, y > 300.0, "y={y}");
        }
    }

    #[test]
    fn test_active_section_scenario() {
        let config = ScrollConfig::default();
        let sections = two_sections();
        assert_eq!(ScrollState::compute(600.0, &sections, &config).active_section_id, "b");
        assert_eq!(ScrollState::compute(0.0, &sections, &config).active_section_id, "a");
        let beyond = ScrollState::compute(10_000.0, &sections, &config);
        assert_eq!(beyond.active_section_id, "");
        assert!(!beyond.has_active_section());
    }

    #[test]
    fn test_offset_shifts_range_up() {
        let config = ScrollConfig::default();
        let sections = two_sections();
        // b's range starts at 400 with the 100px offset
        assert_eq!(ScrollState::compute(399.0, &sections, &config).active_section_id, "a");
        assert_eq!(ScrollState::compute(400.0, &sections, &config).active_section_id, "b");
        // a's range ends at 400 and b's at 900
        assert_eq!(ScrollState::compute(900.0, &sections, &config).active_section_id, "");
    }

    #[test]
    fn test_overlap_last_section_wins() {
        let sections = vec![Section::new("x", 0.0, 1000.0), Section::new("y", 200.0, 300.0)];
        assert_eq!(active_section(250.0, &sections, 0.0).map(|s| s.id.as_str()), Some("y"));
        assert_eq!(active_section(700.0, &sections, 0.0).map(|s| s.id.as_str()), Some("x"));
    }

    #[test]
    fn test_nav_link_targets() {
        let link = NavLink::new(ElementId(1), "#about");
        assert!(link.targets("about"));
        assert!(!link.targets("projects"));
        assert!(!link.targets(""));
        assert!(!NavLink::new(ElementId(2), "#").targets(""));
        assert!(!NavLink::new(ElementId(3), "about").targets("about"));
    }
}
