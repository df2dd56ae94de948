/// Chrome implementations of the browser seams, via js/chrome_bridge.js
use crate::browser::{StorageArea, TabsApi, WindowScope};
use crate::debounce::Timers;
use crate::error::{Result, WorkspaceError};
use crate::workspace_data::TabInfo;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::WorkerGlobalScope;

// Import JS bridge functions
#[wasm_bindgen(module = "/js/chrome_bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryTabs(window_id: Option<i32>) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn createTab(url: &str, active: bool, window_id: Option<i32>) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTabs(tab_ids: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn activateTab(tab_id: i32) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn focusWindow(window_id: i32) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getLastFocusedWindowId() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getCurrentWindowId() -> std::result::Result<JsValue, JsValue>;
}

/// Plain-object conversion; the default serializer would produce `Map`s
pub fn to_js<T: Serialize>(value: &T) -> std::result::Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

fn window_id_from(value: JsValue) -> Option<i32> {
    value.as_f64().map(|id| id as i32)
}

/// `chrome.storage.local`
pub struct ChromeStorage;

#[async_trait(?Send)]
impl StorageArea for ChromeStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let value = getStorage(key)
            .await
            .map_err(|e| WorkspaceError::storage(format!("Failed to get {}: {:?}", key, e)))?;
        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }
        serde_wasm_bindgen::from_value(value)
            .map(Some)
            .map_err(|e| WorkspaceError::storage(format!("Failed to parse {}: {:?}", key, e)))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let value = to_js(&value)
            .map_err(|e| WorkspaceError::storage(format!("Failed to serialize {}: {:?}", key, e)))?;
        setStorage(key, value)
            .await
            .map_err(|e| WorkspaceError::storage(format!("Failed to save {}: {:?}", key, e)))
    }
}

/// `chrome.tabs` and `chrome.windows`
pub struct ChromeTabs;

#[async_trait(?Send)]
impl TabsApi for ChromeTabs {
    async fn query(&self, scope: WindowScope) -> Result<Vec<TabInfo>> {
        let tabs = queryTabs(scope.window_id())
            .await
            .map_err(|e| WorkspaceError::tabs(format!("Failed to query tabs: {:?}", e)))?;
        serde_wasm_bindgen::from_value(tabs)
            .map_err(|e| WorkspaceError::tabs(format!("Failed to parse tabs: {:?}", e)))
    }

    async fn create(&self, url: &str, active: bool, window_id: Option<i32>) -> Result<TabInfo> {
        let tab = createTab(url, active, window_id)
            .await
            .map_err(|e| WorkspaceError::tabs(format!("Failed to create tab {}: {:?}", url, e)))?;
        serde_wasm_bindgen::from_value(tab)
            .map_err(|e| WorkspaceError::tabs(format!("Failed to parse created tab: {:?}", e)))
    }

    async fn remove(&self, tab_ids: &[i32]) -> Result<()> {
        let ids = to_js(&tab_ids)
            .map_err(|e| WorkspaceError::tabs(format!("Failed to serialize: {:?}", e)))?;
        removeTabs(ids)
            .await
            .map_err(|e| WorkspaceError::tabs(format!("Failed to remove tabs: {:?}", e)))
    }

    async fn activate(&self, tab_id: i32) -> Result<()> {
        activateTab(tab_id)
            .await
            .map_err(|e| WorkspaceError::tabs(format!("Failed to activate tab {}: {:?}", tab_id, e)))
    }

    async fn focus_window(&self, window_id: i32) -> Result<()> {
        focusWindow(window_id)
            .await
            .map_err(|e| WorkspaceError::tabs(format!("Failed to focus window {}: {:?}", window_id, e)))
    }

    async fn last_focused_window(&self) -> Result<Option<i32>> {
        getLastFocusedWindowId()
            .await
            .map(window_id_from)
            .map_err(|e| WorkspaceError::tabs(format!("Failed to get last focused window: {:?}", e)))
    }

    async fn current_window(&self) -> Result<Option<i32>> {
        getCurrentWindowId()
            .await
            .map(window_id_from)
            .map_err(|e| WorkspaceError::tabs(format!("Failed to get current window: {:?}", e)))
    }
}

/// `setTimeout`/`clearTimeout` of the service worker's global scope
pub struct WorkerTimers;

/// A scheduled timeout; owns the JS callback so clearing it frees the closure
pub struct WorkerTimeout {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl WorkerTimers {
    fn scope() -> WorkerGlobalScope {
        js_sys::global().unchecked_into()
    }
}

impl Timers for WorkerTimers {
    type Handle = WorkerTimeout;

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Result<WorkerTimeout> {
        let callback = Closure::once(callback);
        let id = Self::scope()
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                delay_ms as i32,
            )
            .map_err(|e| WorkspaceError::Timer(format!("{:?}", e)))?;
        Ok(WorkerTimeout {
            id,
            _callback: callback,
        })
    }

    fn clear_timeout(&self, handle: WorkerTimeout) {
        Self::scope().clear_timeout_with_handle(handle.id);
    }
}
