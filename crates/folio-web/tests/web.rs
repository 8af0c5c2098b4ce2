#![cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlElement};

use folio_core::animate::CounterState;
use folio_core::{ElementId, Layout, Presentation, StateFlag, WatchGroup};
use folio_web::discover::{discover, handle_of, Selectors};
use folio_web::presentation::{DomLayout, DomPresentation};
use folio_web::FolioPage;

wasm_bindgen_test_configure!(run_in_browser);

const FIXTURE: &str = r##"
    <nav id="navbar">
      <a class="nav-link" href="#home">Home</a>
      <a class="nav-link" href="#about">About</a>
    </nav>
    <section id="home" style="height: 600px">
      <h1 class="hero"><span id="typed-name">Ada</span></h1>
    </section>
    <section id="about" style="height: 600px">
      <span class="stat-number" data-target="12">0</span>
      <div class="progress-bar" data-width="80"></div>
      <div class="skill-item">Rust</div>
    </section>
    <button id="back-to-top">Top</button>
"##;

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn setup() -> Document {
    let doc = document();
    let body = doc.body().unwrap();
    body.set_inner_html(FIXTURE);
    let _ = body.class_list().remove_1("loaded");
    doc
}

fn by_id(doc: &Document, id: &str) -> Element {
    doc.get_element_by_id(id).unwrap()
}

/// Let the browser deliver observer callbacks and a few timer ticks
async fn wait_ms(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    wasm_bindgen_futures::JsFuture::from(promise).await.unwrap();
}

/// Put a counter at the very top of the page so it is in view at mount
fn counter_on_top(doc: &Document) -> Element {
    let counter = doc.create_element("span").unwrap();
    counter.set_class_name("stat-number");
    counter.set_attribute("data-target", "1000").unwrap();
    counter.set_text_content(Some("0"));
    let body = doc.body().unwrap();
    body.prepend_with_node_1(&counter).unwrap();
    window_scroll_top();
    counter
}

fn window_scroll_top() {
    web_sys::window().unwrap().scroll_to_with_x_and_y(0.0, 0.0);
}

#[wasm_bindgen_test]
fn discover_assigns_one_handle_per_element() {
    let doc = setup();
    let mut pres = DomPresentation::new();
    let elements = discover(&doc, &Selectors::default(), &mut pres).unwrap();

    assert_eq!(elements.nav_links.len(), 2);
    assert_eq!(elements.nav_links[1].href, "#about");
    // two sections plus one skill item
    assert_eq!(elements.reveal.len(), 3);
    assert_eq!(elements.counters[0].value.as_deref(), Some("12"));
    assert_eq!(elements.progress_bars[0].value.as_deref(), Some("80"));
    assert_eq!(elements.typed.as_ref().map(|(_, t)| t.as_str()), Some("Ada"));

    let navbar = elements.navbar.unwrap();
    assert_eq!(handle_of(&by_id(&doc, "navbar")), Some(navbar));
}

#[wasm_bindgen_test]
fn presentation_writes_classes_text_and_style() {
    let doc = setup();
    let bar = by_id(&doc, "back-to-top");
    let mut pres = DomPresentation::new();
    let id = ElementId(7);
    pres.insert(id, bar.clone());

    pres.set_flag(id, StateFlag::Shown, true);
    assert!(bar.class_list().contains("show"));
    pres.set_flag(id, StateFlag::Shown, false);
    assert!(!bar.class_list().contains("show"));

    pres.set_text(id, "Up");
    assert_eq!(bar.text_content().as_deref(), Some("Up"));

    pres.set_width_percent(id, 42.0);
    let style = bar.dyn_ref::<HtmlElement>().unwrap().style();
    assert_eq!(style.get_property_value("width").unwrap(), "42%");

    // Unknown handles are ignored
    pres.set_flag(ElementId(99), StateFlag::Active, true);
}

#[wasm_bindgen_test]
fn layout_reads_sections_in_document_order() {
    setup();
    let layout = DomLayout::new(web_sys::window().unwrap(), "section[id]");
    let sections = layout.sections();
    let ids: Vec<&str> = sections.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["home", "about"]);
    assert_eq!(sections[0].height, 600.0);
    assert!(sections[1].top_offset >= sections[0].top_offset + 600.0);
}

#[wasm_bindgen_test]
fn mount_starts_the_page() {
    let doc = setup();
    let Ok(mut page) = FolioPage::new(JsValue::UNDEFINED) else {
        panic!("mount failed");
    };

    let body = doc.body().unwrap();
    assert!(body.class_list().contains("loaded"));
    // Typing clears the text and waits for its first character
    assert_eq!(by_id(&doc, "typed-name").text_content().as_deref(), Some(""));
    assert!(page.pending_timers() >= 1);

    page.dispose();
    assert_eq!(page.pending_timers(), 0);
}

#[wasm_bindgen_test]
fn mount_rejects_invalid_config() {
    setup();
    let options = js_sys::JSON::parse(r#"{"config":{"reveal":{"threshold":2.0}}}"#).unwrap();
    assert!(FolioPage::new(options).is_err());
}

#[wasm_bindgen_test]
async fn visible_counter_starts_and_is_released() {
    let doc = setup();
    let counter = counter_on_top(&doc);
    let Ok(mut page) = FolioPage::new(JsValue::UNDEFINED) else {
        panic!("mount failed");
    };
    let id = handle_of(&counter).unwrap();
    assert!(page.inspect(|p| p.is_watching(WatchGroup::Counters, id)));

    wait_ms(200).await;

    assert!(!page.inspect(|p| p.is_watching(WatchGroup::Counters, id)));
    let state = page.inspect(|p| p.counter(id).map(|c| c.state()));
    assert!(matches!(
        state,
        Some(CounterState::Running { .. } | CounterState::Finished)
    ));
    assert_ne!(counter.text_content().as_deref(), Some("0"));

    page.dispose();
}

#[wasm_bindgen_test]
fn forget_releases_a_detached_element() {
    let doc = setup();
    let Ok(mut page) = FolioPage::new(JsValue::UNDEFINED) else {
        panic!("mount failed");
    };
    let bar = doc.query_selector(".progress-bar").unwrap().unwrap();
    let id = handle_of(&bar).unwrap();

    assert!(page.forget(&bar));
    assert!(!page.inspect(|p| p.is_watching(WatchGroup::ProgressBars, id)));
    // Second call finds nothing left to release
    assert!(!page.forget(&bar));

    page.dispose();
}

#[wasm_bindgen_test]
fn mount_routes_logs_to_the_console_once() {
    setup();
    let Ok(mut first) = FolioPage::new(JsValue::UNDEFINED) else {
        panic!("mount failed");
    };
    assert!(tracing::dispatcher::has_been_set());
    first.dispose();

    // A second mount finds the subscriber already installed
    setup();
    let Ok(mut second) = FolioPage::new(JsValue::UNDEFINED) else {
        panic!("second mount failed");
    };
    assert!(second.pending_timers() >= 1);
    second.dispose();
}
