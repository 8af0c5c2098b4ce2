use std::cell::RefCell;
use std::rc::Weak;

use js_sys::Array;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use folio_core::{IntersectionEntry, WatchGroup, WatchOptions};

use crate::discover::handle_of;
use crate::Runtime;

type Callback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// A native observer feeding one watch group
pub struct GroupObserver {
    observer: IntersectionObserver,
    _callback: Callback,
}

impl GroupObserver {
    pub fn new(
        group: WatchGroup,
        options: &WatchOptions,
        runtime: Weak<RefCell<Runtime>>,
    ) -> Result<Self, JsValue> {
        let callback: Callback = Closure::new(move |batch: Array, observer: IntersectionObserver| {
            let Some(runtime) = runtime.upgrade() else {
                return;
            };
            let Ok(mut runtime) = runtime.try_borrow_mut() else {
                debug!(group = %group, "Page busy, dropping intersection batch");
                return;
            };

            let mut targets: Vec<Element> = Vec::new();
            let mut entries = Vec::new();
            for value in batch.iter() {
                let entry: IntersectionObserverEntry = value.unchecked_into();
                let target = entry.target();
                let Some(id) = handle_of(&target) else {
                    continue;
                };
                entries.push(IntersectionEntry {
                    target: id,
                    is_intersecting: entry.is_intersecting(),
                    intersection_ratio: entry.intersection_ratio(),
                });
                targets.push(target);
            }

            runtime.page.on_intersections(group, &entries);

            // Release native observation for targets the page stopped watching
            for (target, entry) in targets.iter().zip(&entries) {
                if !runtime.page.is_watching(group, entry.target) {
                    observer.unobserve(target);
                }
            }
        });

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.margin.to_css());
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;

        Ok(Self {
            observer,
            _callback: callback,
        })
    }

    pub fn observe(&self, target: &Element) {
        self.observer.observe(target);
    }

    pub fn unobserve(&self, target: &Element) {
        self.observer.unobserve(target);
    }

    pub fn disconnect(&self) {
        self.observer.disconnect();
    }
}
