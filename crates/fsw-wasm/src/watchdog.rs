//! Mutation watchdog
//!
//! One MutationObserver subscription on the document body, filtered to the
//! watched attributes plus child-list and character-data changes. Each batch
//! is summarized into core change records and classified; relevant batches
//! arm a coalescing debounce timer that runs one reconcile pass.
//!
//! Startup is sequenced: window `load`, a settle delay for the framework's
//! first paint, then a bounded poll until the containers first appear, and
//! only then observation. The poll never runs steady-state.
//!
//! Loop avoidance is twofold: a settled pass performs zero DOM writes, and
//! the record queue is drained after every pass so the corrective writes a
//! pass does make never re-enter classification.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use gloo_timers::future::sleep;
use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, MutationObserver, MutationObserverInit,
    MutationRecord, NodeList, Window,
};

use fsw_core::buttons::{
    CONTAINER_SELECTOR, LABEL_IN_BUTTON_SELECTOR, LINK_IN_CONTAINER_SELECTOR, MARKER_ATTR,
};
use fsw_core::classify::{batch_is_relevant, ChangeRecord, NodeInterest, WatchedAttr, OBSERVED_ATTRIBUTES};
use fsw_core::schedule::{PollVerdict, StartupPoll, DEBOUNCE_MS, LOAD_SETTLE_MS, POLL_INTERVAL_MS};

use crate::reconcile::Reconciler;
use crate::store::ForkSource;

// =============================================================================
// Watchdog
// =============================================================================

/// Owns the observation subscription, the debounce timer, and the startup
/// lifecycle. Lives for the page lifetime; there is no teardown because the
/// page's own unload is the teardown.
pub struct Watchdog<S: ForkSource + 'static> {
    shared: Rc<Shared<S>>,
}

struct Shared<S: ForkSource + 'static> {
    window: Window,
    document: Document,
    reconciler: Reconciler<S>,
    observer: RefCell<Option<MutationObserver>>,
    // The callback must outlive the observer; stored, never dropped.
    observer_callback: RefCell<Option<Closure<dyn FnMut(Array, MutationObserver)>>>,
    debounce: RefCell<Option<Timeout>>,
    started: Cell<bool>,
    observing: Cell<bool>,
}

impl<S: ForkSource + 'static> Watchdog<S> {
    pub fn new(window: Window, document: Document, store: S) -> Self {
        let reconciler = Reconciler::new(document.clone(), store);
        Self {
            shared: Rc::new(Shared {
                window,
                document,
                reconciler,
                observer: RefCell::new(None),
                observer_callback: RefCell::new(None),
                debounce: RefCell::new(None),
                started: Cell::new(false),
                observing: Cell::new(false),
            }),
        }
    }

    /// Begin the startup sequence, waiting for the load signal if the page
    /// is still loading.
    pub fn start(&self) {
        let shared = &self.shared;
        if shared.document.ready_state() == "complete" {
            Shared::begin_startup(shared);
            return;
        }

        let for_load = Rc::clone(shared);
        let on_load = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            Shared::begin_startup(&for_load);
        }) as Box<dyn FnMut(web_sys::Event)>);
        if shared
            .window
            .add_event_listener_with_callback("load", on_load.as_ref().unchecked_ref())
            .is_err()
        {
            // Listener refused; start on the spot rather than never.
            Shared::begin_startup(shared);
        }
        // Lives for the page lifetime.
        on_load.forget();
    }
}

impl<S: ForkSource + 'static> Shared<S> {
    fn begin_startup(shared: &Rc<Self>) {
        if shared.started.replace(true) {
            return;
        }
        let shared = Rc::clone(shared);
        wasm_bindgen_futures::spawn_local(async move {
            sleep(Duration::from_millis(u64::from(LOAD_SETTLE_MS))).await;
            let mut poll = StartupPoll::new();
            loop {
                let outcome = shared.reconciler.reconcile().await;
                match poll.tick(outcome.containers_found()) {
                    PollVerdict::Activate | PollVerdict::Expired => break,
                    PollVerdict::NotReady => {
                        sleep(Duration::from_millis(u64::from(POLL_INTERVAL_MS))).await
                    }
                }
            }
            Self::activate_observer(&shared);
        });
    }

    fn activate_observer(shared: &Rc<Self>) {
        if shared.observing.get() {
            return;
        }
        let Some(body) = shared.document.body() else {
            return;
        };

        let for_callback = Rc::clone(shared);
        let callback = Closure::wrap(Box::new(move |records: Array, _observer: MutationObserver| {
            Self::on_mutations(&for_callback, &records);
        })
            as Box<dyn FnMut(Array, MutationObserver)>);

        let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(err) => {
                web_sys::console::warn_2(
                    &JsValue::from_str("forkswitch: observer construction failed"),
                    &err,
                );
                return;
            }
        };

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

        if let Err(err) = observer.observe_with_options(body.as_ref(), &init) {
            web_sys::console::warn_2(&JsValue::from_str("forkswitch: observe failed"), &err);
            return;
        }

        *shared.observer.borrow_mut() = Some(observer);
        *shared.observer_callback.borrow_mut() = Some(callback);
        shared.observing.set(true);
        log::debug!("mutation observation active");
    }

    /// Observation callback body. Must never throw into the page: every
    /// record that cannot be summarized is dropped.
    fn on_mutations(shared: &Rc<Self>, records: &Array) {
        let batch = summarize_records(records);
        if batch_is_relevant(&batch) {
            Self::schedule_pass(shared);
        }
    }

    fn schedule_pass(shared: &Rc<Self>) {
        let for_timer = Rc::clone(shared);
        let timeout = Timeout::new(DEBOUNCE_MS, move || {
            wasm_bindgen_futures::spawn_local(async move {
                Self::run_pass(&for_timer).await;
            });
        });
        // Replacing a pending timeout cancels it; bursts coalesce into one
        // pass.
        *shared.debounce.borrow_mut() = Some(timeout);
    }

    async fn run_pass(shared: &Rc<Self>) {
        let outcome = shared.reconciler.reconcile().await;
        if let fsw_core::PassOutcome::Reconciled { edited, .. } = outcome {
            if edited > 0 {
                log::debug!("corrective pass rewrote {edited} button(s)");
            }
        }
        // The pass's own writes are queued on the observer by now; drain
        // them so they never reach classification.
        if let Some(observer) = shared.observer.borrow().as_ref() {
            let _ = observer.take_records();
        }
    }
}

// =============================================================================
// Record summarization
// =============================================================================

/// Reduce a native record batch to classifier input. Records of unexpected
/// shape are skipped.
pub fn summarize_records(records: &Array) -> Vec<ChangeRecord> {
    let mut batch = Vec::with_capacity(records.length() as usize);
    for record in records.iter() {
        let Ok(record) = record.dyn_into::<MutationRecord>() else {
            continue;
        };
        if let Some(summary) = summarize_record(&record) {
            batch.push(summary);
        }
    }
    batch
}

fn summarize_record(record: &MutationRecord) -> Option<ChangeRecord> {
    match record.type_().as_str() {
        "childList" => Some(ChangeRecord::NodesChanged {
            touches_button: nodelist_touches_button(&record.added_nodes())
                || nodelist_touches_button(&record.removed_nodes()),
        }),
        "attributes" => {
            let element = record.target()?.dyn_into::<Element>().ok()?;
            let attr = WatchedAttr::from_name(&record.attribute_name()?)?;
            Some(ChangeRecord::AttributeChanged {
                target: node_interest(&element),
                attr,
                marker_present: element.has_attribute(MARKER_ATTR),
            })
        }
        "characterData" => Some(ChangeRecord::TextChanged {
            in_label: record
                .target()?
                .parent_element()
                .map(|parent| parent.matches(LABEL_IN_BUTTON_SELECTOR).unwrap_or(false))
                .unwrap_or(false),
        }),
        _ => None,
    }
}

fn node_interest(element: &Element) -> NodeInterest {
    if element.matches(LINK_IN_CONTAINER_SELECTOR).unwrap_or(false) {
        NodeInterest::Link
    } else if element.matches(CONTAINER_SELECTOR).unwrap_or(false) {
        NodeInterest::Container
    } else {
        NodeInterest::Other
    }
}

/// Does any node in the list belong to install-button markup? Removed nodes
/// are detached, so ancestry checks are matched on the node itself and its
/// subtree rather than via the document.
fn nodelist_touches_button(nodes: &NodeList) -> bool {
    for index in 0..nodes.length() {
        let Some(node) = nodes.item(index) else {
            continue;
        };
        let Some(element) = node.dyn_ref::<Element>() else {
            continue;
        };
        if element.matches(CONTAINER_SELECTOR).unwrap_or(false)
            || element.matches(LINK_IN_CONTAINER_SELECTOR).unwrap_or(false)
            || element
                .query_selector(CONTAINER_SELECTOR)
                .ok()
                .flatten()
                .is_some()
            || element.closest(CONTAINER_SELECTOR).ok().flatten().is_some()
        {
            return true;
        }
    }
    false
}
