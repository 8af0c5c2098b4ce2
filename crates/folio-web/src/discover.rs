//! Finding the page's elements and assigning them handles

use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use folio_core::{AttrElement, ElementId, NavLink, PageElements};

use crate::presentation::DomPresentation;

/// Attribute holding an element's handle, so observer entries map back
pub const HANDLE_ATTR: &str = "data-folio-id";

/// CSS selectors locating each element role
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub navbar: String,
    pub back_to_top: String,
    pub nav_links: String,
    pub sections: String,
    /// Elements revealed on entry besides the sections
    pub reveal_items: String,
    pub counters: String,
    pub counter_attr: String,
    pub progress_bars: String,
    pub progress_attr: String,
    pub hero: String,
    pub typed: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            navbar: "#navbar".into(),
            back_to_top: "#back-to-top".into(),
            nav_links: ".nav-link".into(),
            sections: "section[id]".into(),
            reveal_items: "section, .skill-item, .project-card".into(),
            counters: ".stat-number".into(),
            counter_attr: "data-target".into(),
            progress_bars: ".progress-bar".into(),
            progress_attr: "data-width".into(),
            hero: ".hero".into(),
            typed: "#typed-name".into(),
        }
    }
}

/// Read the handle stamped on an element at discovery
pub fn handle_of(element: &Element) -> Option<ElementId> {
    element
        .get_attribute(HANDLE_ATTR)
        .and_then(|raw| raw.parse().ok())
        .map(ElementId)
}

struct Discovery<'a> {
    document: &'a Document,
    presentation: &'a mut DomPresentation,
    next: u32,
}

impl Discovery<'_> {
    fn register(&mut self, element: Element) -> Result<ElementId, JsValue> {
        if let Some(id) = handle_of(&element) {
            if self.presentation.get(id).is_some() {
                return Ok(id);
            }
        }
        let id = ElementId(self.next);
        self.next += 1;
        element.set_attribute(HANDLE_ATTR, &id.0.to_string())?;
        self.presentation.insert(id, element);
        Ok(id)
    }

    fn one(&mut self, selector: &str) -> Result<Option<ElementId>, JsValue> {
        match self.document.query_selector(selector)? {
            Some(element) => Ok(Some(self.register(element)?)),
            None => Ok(None),
        }
    }

    fn all(&mut self, selector: &str) -> Result<Vec<Element>, JsValue> {
        let list = self.document.query_selector_all(selector)?;
        Ok((0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect())
    }

    fn attr_elements(&mut self, selector: &str, attr: &str) -> Result<Vec<AttrElement>, JsValue> {
        let mut out = Vec::new();
        for element in self.all(selector)? {
            let value = element.get_attribute(attr);
            let id = self.register(element)?;
            out.push(AttrElement::new(id, value.as_deref()));
        }
        Ok(out)
    }
}

/// Collect every element the page behaviour touches
///
/// Each element gets a handle attribute and is registered with
/// `presentation`. An element matched by several roles keeps one handle.
pub fn discover(
    document: &Document,
    selectors: &Selectors,
    presentation: &mut DomPresentation,
) -> Result<PageElements, JsValue> {
    let mut d = Discovery {
        document,
        presentation,
        next: 0,
    };

    let body = match document.body() {
        Some(body) => Some(d.register(body.into())?),
        None => None,
    };

    let mut nav_links = Vec::new();
    for link in d.all(&selectors.nav_links)? {
        let href = link.get_attribute("href").unwrap_or_default();
        nav_links.push(NavLink::new(d.register(link)?, href));
    }

    let mut reveal = Vec::new();
    for element in d.all(&selectors.reveal_items)? {
        let id = d.register(element)?;
        if !reveal.contains(&id) {
            reveal.push(id);
        }
    }

    let typed = match document.query_selector(&selectors.typed)? {
        Some(element) => {
            let text = element.text_content().unwrap_or_default();
            Some((d.register(element)?, text))
        }
        None => None,
    };

    Ok(PageElements {
        body,
        navbar: d.one(&selectors.navbar)?,
        back_to_top: d.one(&selectors.back_to_top)?,
        nav_links,
        reveal,
        counters: d.attr_elements(&selectors.counters, &selectors.counter_attr)?,
        progress_bars: d.attr_elements(&selectors.progress_bars, &selectors.progress_attr)?,
        hero: d.one(&selectors.hero)?,
        typed,
    })
}
