//! WebAssembly bindings for ForkSwitch
//!
//! Three surfaces share this module: the content script
//! ([`run_content_script`], plus [`reconcile`] for one-off passes from the
//! extension's debugging console), the popup ([`supported_forks`] /
//! [`load_preference`] / [`save_preference`]), and the installation hook
//! ([`seed_default_preference`]). Errors cross the boundary as `JsValue`
//! rejections; inside, everything degrades soft.

use wasm_bindgen::prelude::*;

use fsw_core::Fork;

mod logger;
pub mod reconcile;
pub mod store;
pub mod watchdog;

use crate::reconcile::Reconciler;
use crate::store::{ForkSource, SyncAreaStore};
use crate::watchdog::Watchdog;

// =============================================================================
// Content script
// =============================================================================

/// Content-script entry point: start the watchdog on the current page.
#[wasm_bindgen]
pub fn run_content_script() {
    logger::init();
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    Watchdog::new(window, document, SyncAreaStore).start();
    log::debug!("content script started");
}

/// Run a single reconcile pass immediately. Resolves to whether any install
/// containers were found (`false` means the page has not rendered them yet).
#[wasm_bindgen]
pub async fn reconcile() -> bool {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return false;
    };
    Reconciler::new(document, SyncAreaStore)
        .reconcile()
        .await
        .containers_found()
}

// =============================================================================
// Popup surface
// =============================================================================

/// The supported forks as `{id, label}` objects, in display order.
#[wasm_bindgen]
pub fn supported_forks() -> js_sys::Array {
    let forks = js_sys::Array::new();
    for fork in Fork::ALL {
        let entry = js_sys::Object::new();
        let _ = js_sys::Reflect::set(
            &entry,
            &JsValue::from_str("id"),
            &JsValue::from_str(fork.id()),
        );
        let _ = js_sys::Reflect::set(
            &entry,
            &JsValue::from_str("label"),
            &JsValue::from_str(fork.display_name()),
        );
        forks.push(&entry);
    }
    forks
}

/// Read the stored fork identifier, with the default applied.
#[wasm_bindgen]
pub async fn load_preference() -> Result<JsValue, JsValue> {
    let id = SyncAreaStore.fork_id().await?;
    Ok(JsValue::from_str(&id))
}

/// Persist a fork choice from the popup. Rejects identifiers outside the
/// supported set so storage never holds a value the reconciler ignores.
#[wasm_bindgen]
pub async fn save_preference(id: String) -> Result<(), JsValue> {
    let fork = Fork::from_id(&id)
        .ok_or_else(|| JsValue::from_str(&format!("unknown fork identifier: {id:?}")))?;
    SyncAreaStore::set_fork_id(fork.id()).await
}

// =============================================================================
// Installation hook
// =============================================================================

/// Seed the default fork on install. Writes only when the key is absent;
/// resolves to whether a write happened.
#[wasm_bindgen]
pub async fn seed_default_preference() -> Result<bool, JsValue> {
    if SyncAreaStore::stored_fork_id().await?.is_some() {
        return Ok(false);
    }
    SyncAreaStore::set_fork_id(Fork::DEFAULT.id()).await?;
    Ok(true)
}
