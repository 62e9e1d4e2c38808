//! Reconciler DOM driver
//!
//! One pass snapshots every install button currently in the document, asks
//! the core planner what each needs, and applies exactly those writes. The
//! preference read is a suspension point: the document can change while it
//! is in flight, so elements are resolved per pass and a vanished element
//! means "nothing to do", not an error. Nothing in here may throw into the
//! host page.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use fsw_core::buttons::{
    CONTAINER_SELECTOR, LABEL_SELECTOR, LINK_SELECTOR, MARKER_ATTR, MARKER_BORDER,
    MARKER_PADDING, MARKER_VALUE,
};
use fsw_core::{plan_button, ButtonSnapshot, Fork, PassOutcome};

use crate::store::ForkSource;

// =============================================================================
// Reconciler
// =============================================================================

/// Applies the expected install-button state to a document.
pub struct Reconciler<S> {
    document: Document,
    store: S,
}

impl<S: ForkSource> Reconciler<S> {
    pub fn new(document: Document, store: S) -> Self {
        Self { document, store }
    }

    /// Run one reconcile pass over the whole document.
    pub async fn reconcile(&self) -> PassOutcome {
        let containers = match self.document.query_selector_all(CONTAINER_SELECTOR) {
            Ok(list) => list,
            Err(_) => return PassOutcome::NoContainers,
        };
        if containers.length() == 0 {
            return PassOutcome::NoContainers;
        }

        let fork = match self.store.fork_id().await {
            Ok(id) => match Fork::from_id(&id) {
                Some(fork) => fork,
                None => {
                    log::warn!("stored preference {id:?} is not a supported fork; leaving page untouched");
                    return PassOutcome::InvalidPreference;
                }
            },
            // A failed read aborts the pass the same way an out-of-set value
            // does: DOM untouched, retried on the next trigger.
            Err(err) => {
                web_sys::console::warn_2(&JsValue::from_str("forkswitch: preference read failed"), &err);
                return PassOutcome::InvalidPreference;
            }
        };

        let mut edited = 0usize;
        for index in 0..containers.length() {
            let Some(node) = containers.item(index) else {
                continue;
            };
            let Ok(container) = node.dyn_into::<Element>() else {
                continue;
            };
            let Ok(Some(link)) = container.query_selector(LINK_SELECTOR) else {
                continue;
            };
            if reconcile_link(&link, fork) {
                edited += 1;
            }
        }

        PassOutcome::Reconciled {
            containers: containers.length() as usize,
            edited,
        }
    }
}

// =============================================================================
// Per-link reconciliation
// =============================================================================

/// Apply the planned edits plus the style assertion to one anchor.
/// Returns whether any attribute or text write happened.
fn reconcile_link(link: &Element, fork: Fork) -> bool {
    let label_element = link
        .query_selector(LABEL_SELECTOR)
        .ok()
        .flatten()
        .unwrap_or_else(|| link.clone());

    let snapshot = ButtonSnapshot {
        href: link.get_attribute("href").unwrap_or_default(),
        label: label_element.text_content().unwrap_or_default(),
        marked: link.has_attribute(MARKER_ATTR),
    };
    let plan = plan_button(&snapshot, fork);

    let mut wrote = false;
    if let Some(href) = &plan.href {
        match link.set_attribute("href", href) {
            Ok(()) => wrote = true,
            Err(err) => {
                web_sys::console::warn_2(&JsValue::from_str("forkswitch: href write rejected"), &err)
            }
        }
    }
    if let Some(label) = plan.label {
        label_element.set_text_content(Some(label));
        wrote = true;
    }
    if plan.mark && link.set_attribute(MARKER_ATTR, MARKER_VALUE).is_ok() {
        wrote = true;
    }

    assert_marker_style(link);
    wrote
}

/// Reassert the visual marker on every pass, writing only on divergence so
/// a settled button generates no mutation records.
fn assert_marker_style(link: &Element) {
    let Some(html) = link.dyn_ref::<HtmlElement>() else {
        // Not an HTML element; the attribute path is all we have.
        apply_style_attribute(link);
        return;
    };

    let style = html.style();
    let border = style.get_property_value("border").unwrap_or_default();
    let padding = style.get_property_value("padding").unwrap_or_default();
    if border == MARKER_BORDER && padding == MARKER_PADDING {
        return;
    }

    let border_write = style.set_property("border", MARKER_BORDER);
    let padding_write = style.set_property("padding", MARKER_PADDING);
    if border_write.is_err() || padding_write.is_err() {
        log::warn!("style object write rejected; falling back to the style attribute");
        apply_style_attribute(link);
    }
}

fn apply_style_attribute(link: &Element) {
    let css = format!("border: {MARKER_BORDER}; padding: {MARKER_PADDING}");
    if let Err(err) = link.set_attribute("style", &css) {
        web_sys::console::warn_2(&JsValue::from_str("forkswitch: style fallback rejected"), &err);
    }
}
