//! Preference store bridge
//!
//! The preferred fork lives under a single key in `chrome.storage.sync`.
//! The content-script core only ever reads it; writes come from the popup
//! surface. Reads resolve to the raw stored string — validation against the
//! supported set happens in the reconciler, so an out-of-set value degrades
//! there instead of being papered over here.

use js_sys::{Array, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use fsw_core::Fork;

/// Storage key holding the preferred fork identifier.
pub const FORK_KEY: &str = "fork";

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = get)]
    fn storage_sync_get(keys: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch, js_namespace = ["chrome", "storage", "sync"], js_name = set)]
    fn storage_sync_set(items: &JsValue) -> Result<Promise, JsValue>;
}

// =============================================================================
// ForkSource
// =============================================================================

/// Where the current preference comes from. The reconciler takes this as an
/// injected dependency so browser tests can run without an extension
/// storage area.
pub trait ForkSource {
    /// The stored fork identifier, with the on-read default applied.
    #[allow(async_fn_in_trait)]
    async fn fork_id(&self) -> Result<String, JsValue>;
}

// =============================================================================
// chrome.storage.sync
// =============================================================================

/// The extension's synced storage area.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncAreaStore;

impl SyncAreaStore {
    /// Read the stored identifier without applying the default. Used by the
    /// installation hook to decide whether seeding is needed.
    pub async fn stored_fork_id() -> Result<Option<String>, JsValue> {
        let keys = Array::of1(&JsValue::from_str(FORK_KEY));
        let items = JsFuture::from(storage_sync_get(keys.as_ref())?).await?;
        Ok(Reflect::get(&items, &JsValue::from_str(FORK_KEY))
            .ok()
            .and_then(|value| value.as_string()))
    }

    /// Persist a fork identifier. Popup surface only; the content-script
    /// core never writes.
    pub async fn set_fork_id(id: &str) -> Result<(), JsValue> {
        let items = Object::new();
        Reflect::set(&items, &JsValue::from_str(FORK_KEY), &JsValue::from_str(id))?;
        JsFuture::from(storage_sync_set(items.as_ref())?).await?;
        Ok(())
    }
}

impl ForkSource for SyncAreaStore {
    async fn fork_id(&self) -> Result<String, JsValue> {
        let defaults = Object::new();
        Reflect::set(
            &defaults,
            &JsValue::from_str(FORK_KEY),
            &JsValue::from_str(Fork::DEFAULT.id()),
        )?;
        let items = JsFuture::from(storage_sync_get(defaults.as_ref())?).await?;
        Reflect::get(&items, &JsValue::from_str(FORK_KEY))
            .ok()
            .and_then(|value| value.as_string())
            .ok_or_else(|| JsValue::from_str("storage returned a non-string fork value"))
    }
}
