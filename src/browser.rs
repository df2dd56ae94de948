/// Seams between the coordinator and the browser's storage and tabs APIs
use crate::error::Result;
use crate::workspace_data::TabInfo;
use async_trait::async_trait;
use serde_json::Value;

/// Which tabs a procedure looks at and where it opens new ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowScope {
    Window(i32),
    AllWindows,
}

impl WindowScope {
    /// The window to open tabs in, if one is known
    pub fn window_id(self) -> Option<i32> {
        match self {
            WindowScope::Window(id) => Some(id),
            WindowScope::AllWindows => None,
        }
    }
}

impl From<Option<i32>> for WindowScope {
    fn from(window_id: Option<i32>) -> Self {
        match window_id {
            Some(id) if id > 0 => WindowScope::Window(id),
            _ => WindowScope::AllWindows,
        }
    }
}

/// Async key-value store holding JSON values (`chrome.storage.local`)
#[async_trait(?Send)]
pub trait StorageArea {
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    async fn set(&self, key: &str, value: Value) -> Result<()>;
}

/// The subset of `chrome.tabs` / `chrome.windows` the coordinator drives
#[async_trait(?Send)]
pub trait TabsApi {
    async fn query(&self, scope: WindowScope) -> Result<Vec<TabInfo>>;

    async fn create(&self, url: &str, active: bool, window_id: Option<i32>) -> Result<TabInfo>;

    async fn remove(&self, tab_ids: &[i32]) -> Result<()>;

    async fn activate(&self, tab_id: i32) -> Result<()>;

    async fn focus_window(&self, window_id: i32) -> Result<()>;

    /// The window the user last interacted with, if the browser reports one
    async fn last_focused_window(&self) -> Result<Option<i32>>;

    /// The window the background context considers current
    async fn current_window(&self) -> Result<Option<i32>>;
}
