/// Workspace document persistence on top of a key-value storage area
///
/// Every operation is a full read, an in-memory mutation and one write of
/// the whole document. There is no field-level update.
use crate::browser::StorageArea;
use crate::config::CoordinatorConfig;
use crate::error::{Result, WorkspaceError};
use crate::operations::snapshot_tabs;
use crate::urls::normalize_new_tab_url;
use crate::workspace_data::{
    now_millis, Bookmark, TabInfo, Workspace, WorkspaceData, WorkspaceSettings,
};
use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

pub struct WorkspaceStore<S> {
    area: S,
    config: CoordinatorConfig,
}

impl<S: StorageArea> WorkspaceStore<S> {
    pub fn new(area: S, config: CoordinatorConfig) -> Self {
        WorkspaceStore { area, config }
    }

    pub fn area(&self) -> &S {
        &self.area
    }

    /// Load the document, creating and saving the default one on first use
    pub async fn read(&self) -> Result<WorkspaceData> {
        match self.area.get(&self.config.storage_key).await? {
            Some(value) if !value.is_null() => {
                let mut data: WorkspaceData = serde_json::from_value(value)?;
                if data.normalize(now_millis()) {
                    warn!("Workspace data was inconsistent; repaired in memory");
                }
                Ok(data)
            }
            _ => {
                debug!("No workspace data found, initializing default workspace");
                let data = WorkspaceData::with_default_workspace(now_millis());
                self.write(&data).await?;
                Ok(data)
            }
        }
    }

    /// Replace the stored document wholesale
    pub async fn write(&self, data: &WorkspaceData) -> Result<()> {
        let value = serde_json::to_value(data)?;
        self.area.set(&self.config.storage_key, value).await
    }

    pub async fn current_workspace(&self) -> Result<Workspace> {
        let data = self.read().await?;
        data.current_workspace().cloned()
    }

    pub async fn set_current_workspace(&self, workspace_id: &str) -> Result<()> {
        let mut data = self.read().await?;
        data.set_current(workspace_id)?;
        self.write(&data).await
    }

    pub async fn create_workspace(&self, name: &str) -> Result<Workspace> {
        let mut data = self.read().await?;
        let workspace = Workspace::named(name, now_millis());
        data.add_workspace(workspace.clone());
        self.write(&data).await?;
        Ok(workspace)
    }

    /// Apply `update` to one workspace and refresh its `updatedAt`
    pub async fn update_workspace<F>(&self, workspace_id: &str, update: F) -> Result<()>
    where
        F: FnOnce(&mut Workspace) -> Result<()>,
    {
        let mut data = self.read().await?;
        let workspace = data.workspace_mut(workspace_id)?;
        update(&mut *workspace)?;
        workspace.touch(now_millis());
        self.write(&data).await
    }

    pub async fn delete_workspace(&self, workspace_id: &str) -> Result<()> {
        let mut data = self.read().await?;
        data.remove_workspace(workspace_id)?;
        self.write(&data).await
    }

    pub async fn add_bookmark(&self, workspace_id: &str, bookmark: Bookmark) -> Result<()> {
        self.update_workspace(workspace_id, |ws| {
            ws.bookmarks.push(bookmark);
            Ok(())
        })
        .await
    }

    pub async fn update_bookmark<F>(&self, workspace_id: &str, bookmark_id: &str, update: F) -> Result<()>
    where
        F: FnOnce(&mut Bookmark),
    {
        self.update_workspace(workspace_id, |ws| {
            update(ws.bookmark_mut(bookmark_id)?);
            Ok(())
        })
        .await
    }

    pub async fn delete_bookmark(&self, workspace_id: &str, bookmark_id: &str) -> Result<()> {
        self.update_workspace(workspace_id, |ws| {
            ws.bookmarks.retain(|b| b.id != bookmark_id);
            Ok(())
        })
        .await
    }

    pub async fn reorder_bookmarks(&self, workspace_id: &str, order: &[String]) -> Result<()> {
        self.update_workspace(workspace_id, |ws| {
            ws.reorder_bookmarks(order);
            Ok(())
        })
        .await
    }

    /// Overwrite a workspace's tab snapshot from the given live tabs
    pub async fn save_closed_tabs(&self, workspace_id: &str, tabs: &[TabInfo]) -> Result<()> {
        let snapshot = snapshot_tabs(tabs);
        debug!(
            "Saving {} tabs for workspace {}",
            snapshot.closed_tabs.len(),
            workspace_id
        );
        self.update_workspace(workspace_id, |ws| {
            ws.closed_tabs = snapshot.closed_tabs;
            ws.active_tab_url = snapshot.active_tab_url;
            Ok(())
        })
        .await
    }

    pub async fn update_workspace_settings<F>(&self, workspace_id: &str, update: F) -> Result<()>
    where
        F: FnOnce(&mut WorkspaceSettings),
    {
        self.update_workspace(workspace_id, |ws| {
            update(&mut ws.settings);
            Ok(())
        })
        .await
    }

    /// URL for a fresh tab when a workspace has nothing saved
    pub async fn new_tab_url(&self) -> Result<String> {
        let stored = self.area.get(&self.config.new_tab_url_key).await?;
        let raw = stored.as_ref().and_then(|value| match value {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        });
        Ok(normalize_new_tab_url(
            raw.as_deref(),
            &self.config.default_new_tab_url,
        ))
    }
}

/// In-process storage area
///
/// Values are cloned in and out, so callers never share state with the
/// store. `fail_writes` simulates quota errors.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RefCell<HashMap<String, Value>>,
    fail_writes: Cell<bool>,
    writes: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: Value) -> Self {
        let storage = Self::new();
        storage.values.borrow_mut().insert(key.to_string(), value);
        storage
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }
}

#[async_trait(?Send)]
impl StorageArea for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        if self.fail_writes.get() {
            return Err(WorkspaceError::storage("QUOTA_BYTES quota exceeded"));
        }
        self.values.borrow_mut().insert(key.to_string(), value);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
