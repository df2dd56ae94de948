/// In-memory browser used by the coordinator tests
use crate::browser::{TabsApi, WindowScope};
use crate::error::{Result, WorkspaceError};
use crate::workspace_data::TabInfo;
use async_trait::async_trait;
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, PartialEq)]
pub enum TabEvent {
    Created { id: i32, url: String, active: bool },
    Removed(Vec<i32>),
    Activated(i32),
    FocusedWindow(i32),
}

/// Fake `chrome.tabs`/`chrome.windows`
///
/// Removing the last tab of a window panics: in a real browser that closes
/// the window, and possibly the browser.
pub struct FakeBrowser {
    tabs: RefCell<Vec<TabInfo>>,
    next_id: Cell<i32>,
    events: RefCell<Vec<TabEvent>>,
    last_focused: Cell<Option<i32>>,
    current: Cell<Option<i32>>,
    fail_queries: Cell<bool>,
    created_pending: Cell<bool>,
}

impl FakeBrowser {
    /// One window with the given `(url, active)` tabs
    pub fn with_window(window_id: i32, tabs: &[(&str, bool)]) -> Self {
        let browser = FakeBrowser {
            tabs: RefCell::new(Vec::new()),
            next_id: Cell::new(100),
            events: RefCell::new(Vec::new()),
            last_focused: Cell::new(Some(window_id)),
            current: Cell::new(Some(window_id)),
            fail_queries: Cell::new(false),
            created_pending: Cell::new(false),
        };
        for (url, active) in tabs {
            browser.open(window_id, url, *active);
        }
        browser
    }

    /// Add a tab without recording an event
    pub fn open(&self, window_id: i32, url: &str, active: bool) -> i32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let mut tabs = self.tabs.borrow_mut();
        if active {
            for tab in tabs.iter_mut().filter(|t| t.window_id == Some(window_id)) {
                tab.active = false;
            }
        }
        tabs.push(TabInfo::new(id, window_id, url, url, active));
        id
    }

    pub fn set_last_focused(&self, window_id: Option<i32>) {
        self.last_focused.set(window_id);
    }

    /// Created tabs report only `pendingUrl`, like Chrome before the first
    /// navigation commits
    pub fn set_created_pending(&self, pending: bool) {
        self.created_pending.set(pending);
    }

    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.set(fail);
    }

    pub fn urls(&self, window_id: i32) -> Vec<String> {
        self.tabs
            .borrow()
            .iter()
            .filter(|t| t.window_id == Some(window_id))
            .filter_map(|t| t.current_url().map(str::to_string))
            .collect()
    }

    pub fn active_url(&self, window_id: i32) -> Option<String> {
        self.tabs
            .borrow()
            .iter()
            .find(|t| t.window_id == Some(window_id) && t.active)
            .and_then(|t| t.current_url().map(str::to_string))
    }

    pub fn events(&self) -> Vec<TabEvent> {
        self.events.borrow().clone()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn created_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, TabEvent::Created { .. }))
            .count()
    }

    pub fn removed_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, TabEvent::Removed(_)))
            .count()
    }
}

#[async_trait(?Send)]
impl TabsApi for FakeBrowser {
    async fn query(&self, scope: WindowScope) -> Result<Vec<TabInfo>> {
        if self.fail_queries.get() {
            return Err(WorkspaceError::tabs("No window with id"));
        }
        let tabs = self.tabs.borrow();
        Ok(match scope {
            WindowScope::Window(id) => tabs.iter().filter(|t| t.window_id == Some(id)).cloned().collect(),
            WindowScope::AllWindows => tabs.clone(),
        })
    }

    async fn create(&self, url: &str, active: bool, window_id: Option<i32>) -> Result<TabInfo> {
        let window = window_id.or(self.last_focused.get()).unwrap_or(1);
        let id = self.open(window, url, active);
        self.events.borrow_mut().push(TabEvent::Created {
            id,
            url: url.to_string(),
            active,
        });
        let mut tab = TabInfo::new(id, window, url, url, active);
        if self.created_pending.get() {
            tab.url = None;
            tab.pending_url = Some(url.to_string());
            if let Some(stored) = self.tabs.borrow_mut().iter_mut().find(|t| t.id == Some(id)) {
                *stored = tab.clone();
            }
        }
        Ok(tab)
    }

    async fn remove(&self, tab_ids: &[i32]) -> Result<()> {
        let mut tabs = self.tabs.borrow_mut();
        let windows: Vec<i32> = tabs
            .iter()
            .filter(|t| t.id.is_some_and(|id| tab_ids.contains(&id)))
            .filter_map(|t| t.window_id)
            .collect();
        tabs.retain(|t| !t.id.is_some_and(|id| tab_ids.contains(&id)));

        for window in windows {
            let remaining: Vec<&mut TabInfo> = tabs
                .iter_mut()
                .filter(|t| t.window_id == Some(window))
                .collect();
            if remaining.is_empty() {
                panic!("window {} left without tabs", window);
            }
            if !remaining.iter().any(|t| t.active) {
                if let Some(last) = remaining.into_iter().last() {
                    last.active = true;
                }
            }
        }
        self.events.borrow_mut().push(TabEvent::Removed(tab_ids.to_vec()));
        Ok(())
    }

    async fn activate(&self, tab_id: i32) -> Result<()> {
        let mut tabs = self.tabs.borrow_mut();
        let window = tabs
            .iter()
            .find(|t| t.id == Some(tab_id))
            .and_then(|t| t.window_id)
            .ok_or_else(|| WorkspaceError::tabs(format!("No tab with id: {}", tab_id)))?;
        for tab in tabs.iter_mut().filter(|t| t.window_id == Some(window)) {
            tab.active = tab.id == Some(tab_id);
        }
        self.events.borrow_mut().push(TabEvent::Activated(tab_id));
        Ok(())
    }

    async fn focus_window(&self, window_id: i32) -> Result<()> {
        self.last_focused.set(Some(window_id));
        self.events.borrow_mut().push(TabEvent::FocusedWindow(window_id));
        Ok(())
    }

    async fn last_focused_window(&self) -> Result<Option<i32>> {
        Ok(self.last_focused.get())
    }

    async fn current_window(&self) -> Result<Option<i32>> {
        Ok(self.current.get())
    }
}
