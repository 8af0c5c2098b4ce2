use std::collections::HashMap;

use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, Window};

use folio_core::{ElementId, Layout, Presentation, Section, StateFlag};

/// Writes presentation changes straight to the DOM
#[derive(Default)]
pub struct DomPresentation {
    elements: HashMap<ElementId, Element>,
}

impl DomPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ElementId, element: Element) {
        self.elements.insert(id, element);
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        self.elements.remove(&id)
    }

    fn style(&self, id: ElementId, property: &str, value: &str) {
        let Some(element) = self.elements.get(&id).and_then(|e| e.dyn_ref::<HtmlElement>()) else {
            return;
        };
        if let Err(err) = element.style().set_property(property, value) {
            warn!(element = %id, property, ?err, "Style write failed");
        }
    }
}

impl Presentation for DomPresentation {
    fn set_flag(&mut self, element: ElementId, flag: StateFlag, on: bool) {
        let Some(target) = self.elements.get(&element) else {
            return;
        };
        if let Err(err) = target
            .class_list()
            .toggle_with_force(flag.class_name(), on)
        {
            warn!(element = %element, class = flag.class_name(), ?err, "Class write failed");
        }
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(target) = self.elements.get(&element) {
            target.set_text_content(Some(text));
        }
    }

    fn set_width_percent(&mut self, element: ElementId, percent: f64) {
        self.style(element, "width", &format!("{percent}%"));
    }

    fn set_translate_y(&mut self, element: ElementId, px: f64) {
        self.style(element, "transform", &format!("translateY({px}px)"));
    }
}

/// Live geometry of the document
pub struct DomLayout {
    window: Window,
    section_selector: String,
}

impl DomLayout {
    pub fn new(window: Window, section_selector: impl Into<String>) -> Self {
        Self {
            window,
            section_selector: section_selector.into(),
        }
    }
}

impl Layout for DomLayout {
    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn sections(&self) -> Vec<Section> {
        let Some(document) = self.window.document() else {
            return Vec::new();
        };
        let Ok(list) = document.query_selector_all(&self.section_selector) else {
            return Vec::new();
        };

        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .map(|el| {
                Section::new(
                    el.id(),
                    f64::from(el.offset_top()),
                    f64::from(el.offset_height()),
                )
            })
            .collect()
    }
}
