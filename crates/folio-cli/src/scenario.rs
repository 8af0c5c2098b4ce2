//! Scenario files: a page layout plus a timeline of scroll and resize steps

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use folio_core::page::{AttrElement, PageElements};
use folio_core::scroll::{Layout, NavLink, Section};
use folio_core::visibility::geometry::{intersection_entry, Rect, Viewport};
use folio_core::visibility::IntersectionEntry;
use folio_core::{ElementId, Error, Margin, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub viewport: ViewportDef,
    /// Time the replay stops, after the last step's timers have run
    #[serde(default)]
    pub end_ms: Option<u64>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub navbar: Option<String>,
    #[serde(default)]
    pub back_to_top: Option<String>,
    #[serde(default)]
    pub sections: Vec<SectionDef>,
    #[serde(default)]
    pub links: Vec<LinkDef>,
    #[serde(default)]
    pub counters: Vec<AttrDef>,
    #[serde(default)]
    pub progress_bars: Vec<AttrDef>,
    /// Cards and list items revealed on entry, besides the sections
    #[serde(default)]
    pub reveal: Vec<BoxDef>,
    #[serde(default)]
    pub hero: Option<String>,
    #[serde(default)]
    pub typed: Option<TypedDef>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ViewportDef {
    #[serde(default = "default_viewport_width")]
    pub width: f64,
    pub height: f64,
}

fn default_viewport_width() -> f64 {
    1280.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectionDef {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkDef {
    pub name: String,
    pub href: String,
}

/// An element carrying a numeric data attribute
#[derive(Debug, Clone, Deserialize)]
pub struct AttrDef {
    pub name: String,
    /// Raw attribute text, exactly as it would appear in the markup
    #[serde(default)]
    pub value: Option<String>,
    pub rect: Rect,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoxDef {
    pub name: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypedDef {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    pub at_ms: u64,
    #[serde(default)]
    pub scroll_y: Option<f64>,
    #[serde(default)]
    pub resize: Option<Resize>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Resize {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut scenario: Scenario = toml::from_str(content)?;
        scenario.validate()?;
        scenario.steps.sort_by_key(|step| step.at_ms);
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        if self.viewport.height <= 0.0 || self.viewport.width <= 0.0 {
            return Err(Error::Scenario("viewport must have a positive size".into()));
        }
        for step in &self.steps {
            if step.scroll_y.is_none() && step.resize.is_none() {
                return Err(Error::Scenario(format!(
                    "step at {}ms has neither scroll_y nor resize",
                    step.at_ms
                )));
            }
        }
        Ok(())
    }

    /// Time the replay runs to
    pub fn end_ms(&self) -> u64 {
        let last_step = self.steps.last().map(|s| s.at_ms).unwrap_or(0);
        self.end_ms.unwrap_or(last_step + 3000).max(last_step)
    }
}

/// Interned element names
#[derive(Debug, Default)]
pub struct Names {
    names: Vec<String>,
    ids: HashMap<String, ElementId>,
}

impl Names {
    pub fn intern(&mut self, name: &str) -> ElementId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = ElementId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        id
    }

    pub fn name(&self, id: ElementId) -> &str {
        self.names
            .get(id.0 as usize)
            .map(String::as_str)
            .unwrap_or("?")
    }
}

/// Geometry of the simulated page
#[derive(Debug, Clone)]
pub struct SimLayout {
    pub viewport: Viewport,
    pub sections: Vec<Section>,
    /// Boxes of every watched element
    pub rects: HashMap<ElementId, Rect>,
}

impl Layout for SimLayout {
    fn scroll_y(&self) -> f64 {
        self.viewport.scroll_y
    }

    fn sections(&self) -> Vec<Section> {
        self.sections.clone()
    }
}

impl SimLayout {
    /// What an observer with `margin` would report for `targets` right now
    pub fn entries(&self, targets: &[ElementId], margin: &Margin) -> Vec<IntersectionEntry> {
        targets
            .iter()
            .map(|target| match self.rects.get(target) {
                Some(rect) => intersection_entry(*target, *rect, &self.viewport, margin),
                None => IntersectionEntry::outside(*target),
            })
            .collect()
    }

    pub fn resize(&mut self, resize: Resize) {
        if let Some(width) = resize.width {
            self.viewport.width = width;
        }
        if let Some(height) = resize.height {
            self.viewport.height = height;
        }
    }
}

/// Turn a scenario into the page's element set and starting layout
pub fn build(scenario: &Scenario, names: &mut Names) -> (PageElements, SimLayout) {
    let mut rects = HashMap::new();
    let mut elements = PageElements {
        body: scenario.body.as_deref().map(|n| names.intern(n)),
        navbar: scenario.navbar.as_deref().map(|n| names.intern(n)),
        back_to_top: scenario.back_to_top.as_deref().map(|n| names.intern(n)),
        hero: scenario.hero.as_deref().map(|n| names.intern(n)),
        typed: scenario
            .typed
            .as_ref()
            .map(|t| (names.intern(&t.name), t.text.clone())),
        ..PageElements::default()
    };

    for section in &scenario.sections {
        let id = names.intern(&section.id);
        rects.insert(
            id,
            Rect::new(0.0, section.top, scenario.viewport.width, section.height),
        );
        elements.reveal.push(id);
    }
    for item in &scenario.reveal {
        let id = names.intern(&item.name);
        rects.insert(id, item.rect);
        elements.reveal.push(id);
    }
    for link in &scenario.links {
        elements
            .nav_links
            .push(NavLink::new(names.intern(&link.name), link.href.clone()));
    }
    for counter in &scenario.counters {
        let id = names.intern(&counter.name);
        rects.insert(id, counter.rect);
        elements
            .counters
            .push(AttrElement::new(id, counter.value.as_deref()));
    }
    for bar in &scenario.progress_bars {
        let id = names.intern(&bar.name);
        rects.insert(id, bar.rect);
        elements
            .progress_bars
            .push(AttrElement::new(id, bar.value.as_deref()));
    }

    let layout = SimLayout {
        viewport: Viewport {
            scroll_y: 0.0,
            width: scenario.viewport.width,
            height: scenario.viewport.height,
        },
        sections: scenario
            .sections
            .iter()
            .map(|s| Section::new(s.id.clone(), s.top, s.height))
            .collect(),
        rects,
    };

    (elements, layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
        navbar = "navbar"
        back_to_top = "back-to-top"
        body = "body"
        end_ms = 3000

        [viewport]
        height = 800.0

        [[sections]]
        id = "home"
        top = 0.0
        height = 800.0

        [[sections]]
        id = "about"
        top = 800.0
        height = 600.0

        [[links]]
        name = "nav-home"
        href = "#home"

        [[links]]
        name = "nav-about"
        href = "#about"

        [[counters]]
        name = "projects"
        value = "24"
        rect = { y = 1000.0, height = 80.0, width = 200.0 }

        [[progress_bars]]
        name = "rust-bar"
        value = "85"
        rect = { y = 1200.0, height = 10.0, width = 400.0 }

        [[steps]]
        at_ms = 500
        scroll_y = 700.0

        [[steps]]
        at_ms = 100
        scroll_y = 20.0
    "##;

    #[test]
    fn test_parse_sorts_steps() {
        let scenario = Scenario::parse(SAMPLE).unwrap();
        assert_eq!(scenario.viewport.width, 1280.0);
        let times: Vec<u64> = scenario.steps.iter().map(|s| s.at_ms).collect();
        assert_eq!(times, vec![100, 500]);
        assert_eq!(scenario.end_ms(), 3000);
    }

    #[test]
    fn test_build_registers_elements() {
        let scenario = Scenario::parse(SAMPLE).unwrap();
        let mut names = Names::default();
        let (elements, layout) = build(&scenario, &mut names);

        assert_eq!(elements.reveal.len(), 2);
        assert_eq!(elements.nav_links.len(), 2);
        assert_eq!(elements.counters[0].value.as_deref(), Some("24"));
        assert_eq!(layout.sections.len(), 2);

        let counter = elements.counters[0].element;
        assert_eq!(names.name(counter), "projects");
        assert_eq!(names.intern("projects"), counter);
    }

    #[test]
    fn test_empty_step_rejected() {
        let text = r#"
            [viewport]
            height = 800.0

            [[steps]]
            at_ms = 10
        "#;
        assert!(matches!(Scenario::parse(text), Err(Error::Scenario(_))));
    }

    #[test]
    fn test_entries_follow_scroll() {
        let scenario = Scenario::parse(SAMPLE).unwrap();
        let mut names = Names::default();
        let (elements, mut layout) = build(&scenario, &mut names);
        let counter = elements.counters[0].element;

        let entries = layout.entries(&[counter], &Margin::default());
        assert!(!entries[0].is_intersecting);

        layout.viewport.scroll_y = 600.0;
        let entries = layout.entries(&[counter], &Margin::default());
        assert!(entries[0].is_intersecting);
        assert!((entries[0].intersection_ratio - 1.0).abs() < 1e-9);
    }
}
