use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Performance, Window};

use folio_core::schedule::as_millis;
use folio_core::{Millis, Scheduler, TimerId};

/// Called with every timer that fires
pub type Dispatch<K> = Rc<dyn Fn(TimerId, K)>;

/// `setTimeout`-backed scheduler
///
/// Time comes from `performance.now()`, which never steps backwards; `Date`
/// is only a fallback for hosts without it. A fired timer is handed to the
/// dispatch callback, which must route it back to its owner and then call
/// [`settle`](Self::settle).
pub struct WebScheduler<K> {
    window: Window,
    performance: Option<Performance>,
    dispatch: Dispatch<K>,
    next_id: u64,
    handles: HashMap<TimerId, i32>,
}

impl<K> WebScheduler<K> {
    pub fn new(window: Window, dispatch: Dispatch<K>) -> Self {
        Self {
            performance: window.performance(),
            window,
            dispatch,
            next_id: 0,
            handles: HashMap::new(),
        }
    }

    /// Forget a timer that has fired
    pub fn settle(&mut self, id: TimerId) {
        self.handles.remove(&id);
    }

    pub fn pending(&self) -> usize {
        self.handles.len()
    }
}

impl<K: 'static> Scheduler<K> for WebScheduler<K> {
    fn now(&self) -> Millis {
        let now = match &self.performance {
            Some(performance) => performance.now(),
            None => js_sys::Date::now(),
        };
        now.max(0.0) as Millis
    }

    fn set_timeout(&mut self, delay: Duration, key: K) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);

        let dispatch = Rc::clone(&self.dispatch);
        let callback = Closure::once_into_js(move || dispatch(id, key));
        let timeout = as_millis(delay).min(i32::MAX as Millis) as i32;

        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                timeout,
            ) {
            Ok(handle) => {
                self.handles.insert(id, handle);
            }
            Err(err) => warn!(?err, "setTimeout failed"),
        }
        id
    }

    fn clear_timeout(&mut self, id: TimerId) {
        if let Some(handle) = self.handles.remove(&id) {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}
