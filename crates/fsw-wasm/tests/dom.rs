//! Browser-side tests over synthetic marketplace fixtures.

#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::future::sleep;
use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::{Document, Element, MutationObserver, MutationObserverInit};

use fsw_core::buttons::{CONTAINER_CLASS, LABEL_CLASS, MARKER_ATTR, MARKER_VALUE};
use fsw_core::classify::{batch_is_relevant, ChangeRecord, OBSERVED_ATTRIBUTES};
use fsw_core::PassOutcome;
use fsw_wasm::reconcile::Reconciler;
use fsw_wasm::store::ForkSource;
use fsw_wasm::watchdog::summarize_records;

wasm_bindgen_test_configure!(run_in_browser);

/// Test double for the storage area: always reports the given identifier.
struct FixedStore(&'static str);

impl ForkSource for FixedStore {
    async fn fork_id(&self) -> Result<String, JsValue> {
        Ok(self.0.to_string())
    }
}

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn clear_body(document: &Document) {
    document.body().unwrap().set_inner_html("");
}

/// Build the marketplace's install-button structure: container div, anchor,
/// label span.
fn install_fixture(document: &Document, href: &str, label: &str) -> Element {
    let container = document.create_element("div").unwrap();
    container.set_class_name(CONTAINER_CLASS);
    let link = document.create_element("a").unwrap();
    link.set_attribute("href", href).unwrap();
    let span = document.create_element("span").unwrap();
    span.set_class_name(LABEL_CLASS);
    span.set_text_content(Some(label));
    link.append_child(&span).unwrap();
    container.append_child(&link).unwrap();
    document.body().unwrap().append_child(&container).unwrap();
    container
}

fn fixture_link(container: &Element) -> Element {
    container.query_selector("a").unwrap().unwrap()
}

#[wasm_bindgen_test]
async fn empty_document_reports_not_ready() {
    let document = document();
    clear_body(&document);

    let reconciler = Reconciler::new(document.clone(), FixedStore("windsurf"));
    let outcome = reconciler.reconcile().await;
    assert_eq!(outcome, PassOutcome::NoContainers);
    assert!(!outcome.containers_found());
}

#[wasm_bindgen_test]
async fn rewrites_stock_button() {
    let document = document();
    clear_body(&document);
    let container = install_fixture(&document, "vscode:extension/Foo.bar", "Install");

    let outcome = Reconciler::new(document.clone(), FixedStore("windsurf"))
        .reconcile()
        .await;
    assert_eq!(
        outcome,
        PassOutcome::Reconciled {
            containers: 1,
            edited: 1
        }
    );

    let link = fixture_link(&container);
    assert_eq!(
        link.get_attribute("href").as_deref(),
        Some("windsurf:extension/Foo.bar")
    );
    let label = container.query_selector(".ms-Button-label").unwrap().unwrap();
    assert_eq!(label.text_content().as_deref(), Some("Install on Windsurf"));
    assert_eq!(link.get_attribute(MARKER_ATTR).as_deref(), Some(MARKER_VALUE));
    let style = link.get_attribute("style").unwrap_or_default();
    assert!(style.contains("border"), "style not asserted: {style:?}");
    assert!(style.contains("padding"), "style not asserted: {style:?}");
}

#[wasm_bindgen_test]
async fn second_pass_changes_nothing() {
    let document = document();
    clear_body(&document);
    let container = install_fixture(&document, "vscode:extension/Foo.bar", "Install");

    let reconciler = Reconciler::new(document.clone(), FixedStore("cursor"));
    let first = reconciler.reconcile().await;
    assert_eq!(
        first,
        PassOutcome::Reconciled {
            containers: 1,
            edited: 1
        }
    );
    let settled = container.outer_html();

    let second = reconciler.reconcile().await;
    assert_eq!(
        second,
        PassOutcome::Reconciled {
            containers: 1,
            edited: 0
        }
    );
    assert_eq!(container.outer_html(), settled);
}

#[wasm_bindgen_test]
async fn invalid_preference_leaves_page_untouched() {
    let document = document();
    clear_body(&document);
    let container = install_fixture(&document, "vscode:extension/Foo.bar", "Install");
    let before = container.outer_html();

    let outcome = Reconciler::new(document.clone(), FixedStore("not-a-fork"))
        .reconcile()
        .await;
    assert_eq!(outcome, PassOutcome::InvalidPreference);
    assert_eq!(container.outer_html(), before);
    assert!(!fixture_link(&container).has_attribute(MARKER_ATTR));
}

#[wasm_bindgen_test]
async fn label_falls_back_to_anchor_text() {
    let document = document();
    clear_body(&document);

    // No label span; the anchor carries the text itself.
    let container = document.create_element("div").unwrap();
    container.set_class_name(CONTAINER_CLASS);
    let link = document.create_element("a").unwrap();
    link.set_attribute("href", "vscode:extension/Foo.bar").unwrap();
    link.set_text_content(Some("Install"));
    container.append_child(&link).unwrap();
    document.body().unwrap().append_child(&container).unwrap();

    Reconciler::new(document.clone(), FixedStore("theia"))
        .reconcile()
        .await;
    assert_eq!(link.text_content().as_deref(), Some("Install on Theia"));
    assert_eq!(
        link.get_attribute("href").as_deref(),
        Some("theia:extension/Foo.bar")
    );
}

#[wasm_bindgen_test]
async fn replaced_link_is_corrected_by_next_pass() {
    let document = document();
    clear_body(&document);
    let container = install_fixture(&document, "vscode:extension/Foo.bar", "Install");

    let reconciler = Reconciler::new(document.clone(), FixedStore("positron"));
    reconciler.reconcile().await;

    // The framework re-renders: the reconciled anchor is replaced wholesale
    // by a fresh stock one.
    let old_link = fixture_link(&container);
    container.remove_child(&old_link).unwrap();
    let fresh = document.create_element("a").unwrap();
    fresh
        .set_attribute("href", "vscode:extension/Foo.bar")
        .unwrap();
    fresh.set_text_content(Some("Install"));
    container.append_child(&fresh).unwrap();

    let outcome = reconciler.reconcile().await;
    assert_eq!(
        outcome,
        PassOutcome::Reconciled {
            containers: 1,
            edited: 1
        }
    );
    assert_eq!(
        fresh.get_attribute("href").as_deref(),
        Some("positron:extension/Foo.bar")
    );
    assert_eq!(fresh.text_content().as_deref(), Some("Install on Positron"));
}

/// Observe real mutation records and check the bridge classifies a framework
/// revert as relevant and unrelated churn as not.
#[wasm_bindgen_test]
async fn observed_records_classify_as_expected() {
    let document = document();
    clear_body(&document);
    let container = install_fixture(&document, "vscode:extension/Foo.bar", "Install");
    Reconciler::new(document.clone(), FixedStore("codium"))
        .reconcile()
        .await;

    let batches: Rc<RefCell<Vec<Vec<ChangeRecord>>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&batches);
    let callback = Closure::wrap(Box::new(move |records: Array, _observer: MutationObserver| {
        sink.borrow_mut().push(summarize_records(&records));
    }) as Box<dyn FnMut(Array, MutationObserver)>);
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref()).unwrap();

    let init = MutationObserverInit::new();
    init.set_child_list(true);
    init.set_subtree(true);
    init.set_attributes(true);
    init.set_character_data(true);
    let filter = Array::new();
    for name in OBSERVED_ATTRIBUTES {
        filter.push(&JsValue::from_str(name));
    }
    init.set_attribute_filter(&filter);
    observer
        .observe_with_options(document.body().unwrap().as_ref(), &init)
        .unwrap();

    // Unrelated churn: attribute change far from any button.
    let noise = document.create_element("div").unwrap();
    document.body().unwrap().append_child(&noise).unwrap();
    let _ = observer.take_records();
    noise.set_attribute("class", "sidebar").unwrap();
    sleep(Duration::from_millis(50)).await;
    let noise_batches = batches.borrow_mut().split_off(0);
    assert!(
        noise_batches.iter().all(|batch| !batch_is_relevant(batch)),
        "noise classified relevant: {noise_batches:?}"
    );

    // Framework revert: the href flips back to the stock prefix.
    fixture_link(&container)
        .set_attribute("href", "vscode:extension/Foo.bar")
        .unwrap();
    sleep(Duration::from_millis(50)).await;
    let revert_batches = batches.borrow_mut().split_off(0);
    assert!(
        revert_batches.iter().any(|batch| batch_is_relevant(batch)),
        "revert not classified relevant: {revert_batches:?}"
    );

    observer.disconnect();
}
