/// Background workspace coordinator
///
/// Decides which tabs belong to which workspace on switch, startup, suspend
/// and tab removal. Holds no state of its own: the current workspace and
/// every tab snapshot live in the stored document.
///
/// Tab procedures always create before they close, so a window never drops
/// to zero tabs (which would close it, or the whole browser).
use crate::browser::{StorageArea, TabsApi, WindowScope};
use crate::config::CoordinatorConfig;
use crate::error::{Result, WorkspaceError};
use crate::messages::{MessageSender, Request, Response};
use crate::operations::{closable_tab_ids, missing_urls, open_urls, snapshot_tabs};
use crate::storage::WorkspaceStore;
use crate::workspace_data::{now_millis, OnCloseBehavior, TabInfo, Workspace, DEFAULT_WORKSPACE_ID};
use log::{debug, error, info, warn};
use std::collections::HashSet;

/// What a restore did to the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreOutcome {
    pub created: usize,
    pub closed: usize,
}

pub struct Coordinator<S, T> {
    store: WorkspaceStore<S>,
    tabs: T,
}

impl<S: StorageArea, T: TabsApi> Coordinator<S, T> {
    pub fn new(area: S, tabs: T, config: CoordinatorConfig) -> Self {
        Coordinator {
            store: WorkspaceStore::new(area, config),
            tabs,
        }
    }

    pub fn store(&self) -> &WorkspaceStore<S> {
        &self.store
    }

    pub fn tabs(&self) -> &T {
        &self.tabs
    }

    // Lifecycle events. None of these may fail: errors are logged only.

    pub async fn on_installed(&self) {
        info!("Extension installed");
        if let Err(e) = self.store.read().await {
            error!("Error initializing workspace data: {}", e);
        }
    }

    pub async fn on_startup(&self) {
        info!("Extension startup - restoring workspace state");
        if let Err(e) = self.restore_on_startup().await {
            error!("Error restoring workspace on startup: {}", e);
        }
    }

    pub async fn on_suspend(&self) {
        info!("Extension suspending - saving workspace tabs");
        if let Err(e) = self.snapshot_current_workspace().await {
            error!("Error saving workspace tabs: {}", e);
        }
    }

    /// Runs once tab removals have settled
    pub async fn on_tabs_removed(&self) {
        if let Err(e) = self.snapshot_current_workspace().await {
            error!("Error saving workspace tabs: {}", e);
        }
    }

    pub async fn handle_message(&self, request: Request, sender: &MessageSender) -> Response {
        match request {
            Request::SwitchWorkspace { workspace_id } => {
                let scope = self.resolve_window(sender).await;
                let result = self.switch_workspace(&workspace_id, scope).await;
                if let Err(e) = &result {
                    error!("Error switching workspace: {}", e);
                }
                result.into()
            }
            Request::GetCurrentWorkspace => Response::CurrentWorkspace {
                workspace_id: self.current_workspace_id().await,
            },
            Request::DeleteWorkspace { workspace_id } => {
                let result = self.delete_workspace(&workspace_id, sender).await;
                if let Err(e) = &result {
                    error!("Error deleting workspace: {}", e);
                }
                result.into()
            }
        }
    }

    /// The sender's window, else the last focused one, else every window
    pub async fn resolve_window(&self, sender: &MessageSender) -> WindowScope {
        match WindowScope::from(sender.window_id()) {
            WindowScope::Window(id) => WindowScope::Window(id),
            WindowScope::AllWindows => self.last_focused_scope().await,
        }
    }

    async fn last_focused_scope(&self) -> WindowScope {
        match self.tabs.last_focused_window().await {
            Ok(window_id) => WindowScope::from(window_id),
            Err(e) => {
                debug!("No last focused window: {}", e);
                WindowScope::AllWindows
            }
        }
    }

    /// Never fails; falls back to the default workspace id
    pub async fn current_workspace_id(&self) -> String {
        match self.store.read().await {
            Ok(data) => data.current_workspace_id,
            Err(e) => {
                warn!("Could not read current workspace: {}", e);
                DEFAULT_WORKSPACE_ID.to_string()
            }
        }
    }

    /// Snapshot the window into the leaving workspace, make `target_id`
    /// current, then lay out the window for it
    pub async fn switch_workspace(&self, target_id: &str, scope: WindowScope) -> Result<()> {
        let mut data = self.store.read().await?;
        if data.workspace(target_id).is_none() {
            return Err(WorkspaceError::WorkspaceNotFound(target_id.to_string()));
        }

        let leaving_id = data.current_workspace_id.clone();
        if leaving_id != target_id {
            let tabs = self.tabs.query(scope).await?;
            let snapshot = snapshot_tabs(&tabs);
            let leaving = data.workspace_mut(&leaving_id)?;
            leaving.closed_tabs = snapshot.closed_tabs;
            leaving.active_tab_url = snapshot.active_tab_url;
            leaving.touch(now_millis());
        }

        // One write for both the snapshot and the new current id
        data.set_current(target_id)?;
        self.store.write(&data).await?;
        info!("Switched workspace {} -> {}", leaving_id, target_id);

        let target = data.current_workspace()?;
        let settings = &target.settings;
        match settings.on_close_behavior {
            OnCloseBehavior::Default if !settings.default_tabs.is_empty() => {
                self.replace_with_default_tabs(&settings.default_tabs, scope).await
            }
            OnCloseBehavior::Default | OnCloseBehavior::Continue => {
                self.replace_window_tabs(target_id, scope, Some(target)).await
            }
        }
    }

    /// Delete a workspace; if it was current, the window switches to the
    /// workspace that replaced it
    pub async fn delete_workspace(&self, workspace_id: &str, sender: &MessageSender) -> Result<()> {
        let data = self.store.read().await?;
        if data.workspaces.len() < 2 {
            return Err(WorkspaceError::LastWorkspace);
        }
        let was_current = data.current_workspace_id == workspace_id;

        self.store.delete_workspace(workspace_id).await?;
        info!("Deleted workspace {}", workspace_id);
        if !was_current {
            return Ok(());
        }

        let scope = self.resolve_window(sender).await;
        let data = self.store.read().await?;
        let current = data.current_workspace()?;
        self.replace_window_tabs(&current.id, scope, Some(current)).await
    }

    /// Save the last focused window's tabs into the current workspace
    pub async fn snapshot_current_workspace(&self) -> Result<()> {
        let data = self.store.read().await?;
        let scope = self.last_focused_scope().await;
        self.snapshot_tabs(&data.current_workspace_id, scope).await
    }

    /// Overwrite a workspace's saved tabs with what is open in `scope`
    pub async fn snapshot_tabs(&self, workspace_id: &str, scope: WindowScope) -> Result<()> {
        let tabs = self.tabs.query(scope).await?;
        self.store.save_closed_tabs(workspace_id, &tabs).await
    }

    /// Reopen a workspace's saved tabs that are not already open
    ///
    /// With `clear_existing`, the tabs open beforehand are closed, but only
    /// when at least one new tab was created.
    pub async fn restore_tabs(
        &self,
        workspace_id: &str,
        clear_existing: bool,
        scope: WindowScope,
    ) -> Result<RestoreOutcome> {
        let data = self.store.read().await?;
        let workspace = data
            .workspace(workspace_id)
            .ok_or_else(|| WorkspaceError::WorkspaceNotFound(workspace_id.to_string()))?;
        if workspace.closed_tabs.is_empty() {
            return Ok(RestoreOutcome::default());
        }

        let existing = self.tabs.query(scope).await?;
        let wanted: HashSet<&str> = workspace.closed_tabs.iter().map(|t| t.url.as_str()).collect();
        let to_close = closable_tab_ids(&existing, &wanted);

        let created = self
            .open_missing(workspace.closed_tabs.iter().map(|t| t.url.as_str()), &existing, scope)
            .await?
            .len();

        let mut closed = 0;
        if clear_existing && created > 0 && !to_close.is_empty() {
            self.tabs.remove(&to_close).await?;
            closed = to_close.len();
        }
        debug!(
            "Restored workspace {}: {} created, {} closed",
            workspace_id, created, closed
        );
        Ok(RestoreOutcome { created, closed })
    }

    /// Make the window show `workspace_id`'s saved tabs, or a single new tab
    /// when it has none
    ///
    /// Pass `prefetched` when the caller already holds the workspace, to
    /// avoid a second read racing with other writers.
    pub async fn replace_window_tabs(
        &self,
        workspace_id: &str,
        scope: WindowScope,
        prefetched: Option<&Workspace>,
    ) -> Result<()> {
        let fetched;
        let workspace = match prefetched {
            Some(workspace) => workspace,
            None => {
                let data = self.store.read().await?;
                fetched = data
                    .workspace(workspace_id)
                    .cloned()
                    .ok_or_else(|| WorkspaceError::WorkspaceNotFound(workspace_id.to_string()))?;
                &fetched
            }
        };

        let current = self.tabs.query(scope).await?;

        if workspace.closed_tabs.is_empty() {
            let to_close = closable_tab_ids(&current, &HashSet::new());
            let url = self.store.new_tab_url().await?;
            // Created active first, so closing afterwards cannot empty the window
            self.tabs.create(&url, true, scope.window_id()).await?;
            if !to_close.is_empty() {
                self.tabs.remove(&to_close).await?;
            }
            return Ok(());
        }

        let wanted: HashSet<&str> = workspace.closed_tabs.iter().map(|t| t.url.as_str()).collect();
        let to_close = closable_tab_ids(&current, &wanted);
        let created = self
            .open_missing(workspace.closed_tabs.iter().map(|t| t.url.as_str()), &current, scope)
            .await?;

        if !created.is_empty() && !to_close.is_empty() {
            self.tabs.remove(&to_close).await?;
        }

        let Some(active_url) = workspace.active_tab_url.as_deref() else {
            return Ok(());
        };
        let created_active = created
            .iter()
            .find(|(url, _)| url == active_url)
            .and_then(|(_, tab_id)| *tab_id);

        match (created_active, scope) {
            (Some(tab_id), _) => {
                self.tabs.activate(tab_id).await?;
                if let Some(window_id) = scope.window_id() {
                    self.tabs.focus_window(window_id).await?;
                }
            }
            (None, WindowScope::Window(window_id)) => {
                // Already open before the switch; find it again
                let tabs = self.tabs.query(scope).await?;
                let existing = tabs
                    .iter()
                    .find(|tab| tab.current_url() == Some(active_url))
                    .and_then(|tab| tab.id);
                if let Some(tab_id) = existing {
                    self.tabs.activate(tab_id).await?;
                    self.tabs.focus_window(window_id).await?;
                }
            }
            (None, WindowScope::AllWindows) => {}
        }
        Ok(())
    }

    async fn restore_on_startup(&self) -> Result<()> {
        let workspace = self.store.current_workspace().await?;
        let scope = WindowScope::from(self.tabs.current_window().await?);
        let settings = &workspace.settings;

        match settings.on_close_behavior {
            OnCloseBehavior::Continue => {
                if !workspace.closed_tabs.is_empty() {
                    self.restore_tabs(&workspace.id, true, scope).await?;
                }
            }
            OnCloseBehavior::Default => {
                if !settings.default_tabs.is_empty() {
                    let existing = self.tabs.query(scope).await?;
                    self.open_missing(settings.default_tabs.iter().map(String::as_str), &existing, scope)
                        .await?;
                }
            }
        }
        Ok(())
    }

    /// Open the default tabs that are missing, then close every other
    /// ordinary tab that was open before
    async fn replace_with_default_tabs(&self, default_tabs: &[String], scope: WindowScope) -> Result<()> {
        let current = self.tabs.query(scope).await?;
        let defaults: HashSet<&str> = default_tabs.iter().map(String::as_str).collect();
        let to_close = closable_tab_ids(&current, &defaults);

        self.open_missing(default_tabs.iter().map(String::as_str), &current, scope)
            .await?;

        if !to_close.is_empty() {
            self.tabs.remove(&to_close).await?;
        }
        Ok(())
    }

    /// Open each wanted URL not already in `existing`, in the background
    ///
    /// Returns the requested URL with the new tab's id. A freshly created
    /// tab may not report its URL until it starts loading.
    async fn open_missing<'a, I>(
        &self,
        wanted: I,
        existing: &[TabInfo],
        scope: WindowScope,
    ) -> Result<Vec<(String, Option<i32>)>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let missing = missing_urls(wanted, &open_urls(existing));
        let mut created = Vec::with_capacity(missing.len());
        for url in missing {
            let tab = self.tabs.create(&url, false, scope.window_id()).await?;
            created.push((url, tab.id));
        }
        Ok(created)
    }
}
