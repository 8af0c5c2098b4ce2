//! Browser binding for the folio page behaviour
//!
//! `new FolioPage(options)` finds the page's elements, wires scroll and
//! resize listeners plus one `IntersectionObserver` per watch group, and
//! runs the core [`Page`] on real timers. `options` may carry a `config`
//! object (same shape as the TOML config) and a `selectors` object.

pub mod discover;
mod observer;
pub mod presentation;
pub mod scheduler;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Deserialize;
use serde_wasm_bindgen as swb;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Window};

use folio_core::{ElementId, Page, SiteConfig, Task, TimerId, WatchGroup};

use crate::discover::{discover, handle_of, Selectors};
use crate::observer::GroupObserver;
use crate::presentation::{DomLayout, DomPresentation};
use crate::scheduler::{Dispatch, WebScheduler};

pub type WebPage = Page<WebScheduler<Task>, DomPresentation>;

pub(crate) struct Runtime {
    pub(crate) page: WebPage,
    layout: DomLayout,
}

impl Runtime {
    fn fire(&mut self, id: TimerId, task: Task) {
        self.page.scheduler_mut().settle(id);
        self.page.on_timer(id, task, &self.layout);
    }

    fn scroll(&mut self) {
        self.page.on_scroll(&self.layout);
    }

    fn resize(&mut self) {
        self.page.on_resize();
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MountOptions {
    config: SiteConfig,
    selectors: Selectors,
}

fn js_error(err: JsValue) -> JsError {
    JsError::new(&err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn with_runtime(runtime: &Weak<RefCell<Runtime>>, f: impl FnOnce(&mut Runtime)) {
    let Some(runtime) = runtime.upgrade() else {
        return;
    };
    match runtime.try_borrow_mut() {
        Ok(mut runtime) => f(&mut runtime),
        Err(_) => warn!("Page busy, event dropped"),
    };
}

#[wasm_bindgen]
pub struct FolioPage {
    window: Window,
    runtime: Rc<RefCell<Runtime>>,
    observers: Vec<GroupObserver>,
    listeners: Vec<(&'static str, Closure<dyn FnMut()>)>,
}

#[wasm_bindgen]
impl FolioPage {
    /// Attach to the current document. Pass undefined/null for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<FolioPage, JsError> {
        console_error_panic_hook::set_once();
        // Already installed by an earlier mount
        let _ = tracing_wasm::try_set_as_global_default();

        let options: MountOptions = if options.is_undefined() || options.is_null() {
            MountOptions::default()
        } else {
            swb::from_value(options).map_err(|e| JsError::new(&format!("options error: {e}")))?
        };
        options
            .config
            .validate()
            .map_err(|e| JsError::new(&e.to_string()))?;
        let config = options.config;

        let window = web_sys::window().ok_or_else(|| JsError::new("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsError::new("no document"))?;

        let mut presentation = DomPresentation::new();
        let elements = discover(&document, &options.selectors, &mut presentation).map_err(js_error)?;
        let watch: Vec<(WatchGroup, Vec<ElementId>)> = vec![
            (WatchGroup::Reveal, elements.reveal.clone()),
            (
                WatchGroup::Counters,
                elements.counters.iter().map(|c| c.element).collect(),
            ),
            (
                WatchGroup::ProgressBars,
                elements.progress_bars.iter().map(|b| b.element).collect(),
            ),
        ];
        let layout = DomLayout::new(window.clone(), options.selectors.sections.clone());

        let runtime = Rc::new_cyclic(|weak: &Weak<RefCell<Runtime>>| {
            let weak = weak.clone();
            let dispatch: Dispatch<Task> =
                Rc::new(move |id, task| with_runtime(&weak, |rt| rt.fire(id, task)));
            let scheduler = WebScheduler::new(window.clone(), dispatch);
            RefCell::new(Runtime {
                page: Page::new(&config, elements, scheduler, presentation),
                layout,
            })
        });

        let mut observers = Vec::new();
        for (group, targets) in watch {
            let observer = GroupObserver::new(
                group,
                &config.watch_options(group),
                Rc::downgrade(&runtime),
            )
            .map_err(js_error)?;
            let rt = runtime.borrow();
            for target in targets {
                if let Some(element) = rt.page.presentation().get(target) {
                    observer.observe(element);
                }
            }
            observers.push(observer);
        }

        let mut page = FolioPage {
            window,
            runtime,
            observers,
            listeners: Vec::new(),
        };
        page.listen("scroll", Runtime::scroll).map_err(js_error)?;
        page.listen("resize", Runtime::resize).map_err(js_error)?;

        {
            let rt = &mut *page.runtime.borrow_mut();
            rt.page.start(&rt.layout);
        }
        info!("Folio page mounted");

        Ok(page)
    }

    /// Current scroll-derived state as a plain object
    #[wasm_bindgen(js_name = scrollState)]
    pub fn scroll_state(&self) -> Result<JsValue, JsError> {
        let rt = self.runtime.borrow();
        swb::to_value(rt.page.scroll_state()).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Timers currently waiting to fire
    #[wasm_bindgen(js_name = pendingTimers)]
    pub fn pending_timers(&self) -> usize {
        self.runtime.borrow().page.scheduler().pending()
    }

    /// Stop tracking an element that is being removed from the document
    ///
    /// Returns false for elements the page never tracked.
    pub fn forget(&mut self, element: &Element) -> bool {
        let Some(id) = handle_of(element) else {
            return false;
        };
        for observer in &self.observers {
            observer.unobserve(element);
        }
        let mut rt = self.runtime.borrow_mut();
        rt.page.forget(id);
        rt.page.presentation_mut().remove(id).is_some()
    }

    /// Detach every listener and observer and cancel pending timers
    pub fn dispose(&mut self) {
        for (event, listener) in self.listeners.drain(..) {
            let _ = self
                .window
                .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
        }
        for observer in self.observers.drain(..) {
            observer.disconnect();
        }
        if let Ok(mut rt) = self.runtime.try_borrow_mut() {
            rt.page.dispose();
        }
    }
}

impl FolioPage {
    /// Read the core page state
    pub fn inspect<R>(&self, f: impl FnOnce(&WebPage) -> R) -> R {
        f(&self.runtime.borrow().page)
    }

    fn listen(&mut self, event: &'static str, handler: fn(&mut Runtime)) -> Result<(), JsValue> {
        let runtime = Rc::downgrade(&self.runtime);
        let listener = Closure::<dyn FnMut()>::new(move || with_runtime(&runtime, handler));
        self.window
            .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
        self.listeners.push((event, listener));
        Ok(())
    }
}

impl Drop for FolioPage {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Attach to the current document; same as `new FolioPage(options)`
#[wasm_bindgen]
pub fn mount(options: JsValue) -> Result<FolioPage, JsError> {
    FolioPage::new(options)
}
