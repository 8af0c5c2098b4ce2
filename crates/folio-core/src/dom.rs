//! Presentation seam between the components and whatever renders the page

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle to a page element; the host owns the mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Boolean CSS state classes written by the components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateFlag {
    /// Navbar has scrolled past its threshold
    Scrolled,
    /// Back-to-top button is shown
    Shown,
    /// Element has been revealed by the reveal engine
    Revealed,
    /// Navigation link points at the active section
    Active,
    /// Page finished initializing
    Loaded,
}

impl StateFlag {
    /// Class name as written to the element's class list
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Scrolled => "scrolled",
            Self::Shown => "show",
            Self::Revealed => "animate-in",
            Self::Active => "active",
            Self::Loaded => "loaded",
        }
    }
}

/// Sink for every visual mutation the components make
///
/// Implementations must tolerate handles for elements that are gone.
pub trait Presentation {
    fn set_flag(&mut self, element: ElementId, flag: StateFlag, on: bool);

    fn set_text(&mut self, element: ElementId, text: &str);

    fn set_width_percent(&mut self, element: ElementId, percent: f64);

    fn set_translate_y(&mut self, element: ElementId, px: f64);
}

/// One recorded mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    Flag {
        element: ElementId,
        flag: StateFlag,
        on: bool,
    },
    Text {
        element: ElementId,
        text: String,
    },
    Width {
        element: ElementId,
        percent: f64,
    },
    TranslateY {
        element: ElementId,
        px: f64,
    },
}

impl Change {
    pub fn element(&self) -> ElementId {
        match self {
            Self::Flag { element, .. }
            | Self::Text { element, .. }
            | Self::Width { element, .. }
            | Self::TranslateY { element, .. } => *element,
        }
    }
}

/// In-memory presentation used by tests and the simulator
///
/// Keeps the current state per element plus a log of the writes that
/// actually changed something. Setting a flag to the value it already has
/// is a no-op and is not logged.
#[derive(Debug, Default)]
pub struct RecordingPresentation {
    flags: HashMap<ElementId, BTreeSet<StateFlag>>,
    text: HashMap<ElementId, String>,
    width: HashMap<ElementId, f64>,
    translate_y: HashMap<ElementId, f64>,
    log: Vec<Change>,
    /// Every value ever written as text, per element, in order
    text_history: HashMap<ElementId, Vec<String>>,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_flag(&self, element: ElementId, flag: StateFlag) -> bool {
        self.flags
            .get(&element)
            .is_some_and(|set| set.contains(&flag))
    }

    /// Elements currently carrying `flag`, in handle order
    pub fn flagged(&self, flag: StateFlag) -> Vec<ElementId> {
        let mut out: Vec<ElementId> = self
            .flags
            .iter()
            .filter(|(_, set)| set.contains(&flag))
            .map(|(el, _)| *el)
            .collect();
        out.sort();
        out
    }

    pub fn text(&self, element: ElementId) -> Option<&str> {
        self.text.get(&element).map(String::as_str)
    }

    pub fn text_history(&self, element: ElementId) -> &[String] {
        self.text_history
            .get(&element)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn width_percent(&self, element: ElementId) -> Option<f64> {
        self.width.get(&element).copied()
    }

    pub fn translate_y(&self, element: ElementId) -> Option<f64> {
        self.translate_y.get(&element).copied()
    }

    pub fn log(&self) -> &[Change] {
        &self.log
    }

    /// Take the log accumulated since the last drain
    pub fn drain_log(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.log)
    }
}

impl Presentation for RecordingPresentation {
    fn set_flag(&mut self, element: ElementId, flag: StateFlag, on: bool) {
        let set = self.flags.entry(element).or_default();
        let changed = if on { set.insert(flag) } else { set.remove(&flag) };
        if changed {
            self.log.push(Change::Flag { element, flag, on });
        }
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        self.text_history
            .entry(element)
            .or_default()
            .push(text.to_string());
        if self.text.get(&element).map(String::as_str) != Some(text) {
            self.text.insert(element, text.to_string());
            self.log.push(Change::Text {
                element,
                text: text.to_string(),
            });
        }
    }

    fn set_width_percent(&mut self, element: ElementId, percent: f64) {
        if self.width.insert(element, percent) != Some(percent) {
            self.log.push(Change::Width { element, percent });
        }
    }

    fn set_translate_y(&mut self, element: ElementId, px: f64) {
        if self.translate_y.insert(element, px) != Some(px) {
            self.log.push(Change::TranslateY { element, px });
        }
    }
}
