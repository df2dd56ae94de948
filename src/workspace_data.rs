/// Data structures for the persisted workspace document
use crate::error::{Result, WorkspaceError};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const DEFAULT_WORKSPACE_ID: &str = "default";
const DEFAULT_WORKSPACE_NAME: &str = "Default";

/// Milliseconds since the Unix epoch, as stored in `createdAt`/`updatedAt`
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch, as stored in `createdAt`/`updatedAt`
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

/// A browser tab as reported by the tabs API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub window_id: Option<i32>,
    #[serde(default)]
    pub url: Option<String>,
    /// Set instead of `url` until a new tab commits its first navigation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl TabInfo {
    pub fn new(id: i32, window_id: i32, url: &str, title: &str, active: bool) -> TabInfo {
        TabInfo {
            id: Some(id),
            window_id: Some(window_id),
            url: Some(url.to_string()),
            pending_url: None,
            title: Some(title.to_string()),
            active,
        }
    }

    /// The committed URL, or the pending one while the tab is still loading
    pub fn current_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .filter(|url| !url.is_empty())
            .or(self.pending_url.as_deref())
    }
}

/// Minimal record of a tab kept in a workspace snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClosedTab {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_row: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_col: Option<f64>,
}

impl Bookmark {
    pub fn new(title: &str, url: &str) -> Bookmark {
        Bookmark {
            id: format!("bookmark-{}", Uuid::new_v4()),
            title: title.to_string(),
            url: url.to_string(),
            favicon: None,
            position: None,
            grid_row: None,
            grid_col: None,
        }
    }
}

/// What a workspace does with the window when it becomes active again
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum OnCloseBehavior {
    /// Reopen the tabs from the last snapshot
    #[default]
    Continue,
    /// Open the configured default tabs
    Default,
}

impl From<String> for OnCloseBehavior {
    fn from(value: String) -> Self {
        match value.as_str() {
            "default" => OnCloseBehavior::Default,
            _ => OnCloseBehavior::Continue,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PanelMode {
    #[default]
    Fixed,
    Hovering,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PanelPosition {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkAlignment {
    #[default]
    Top,
    Bottom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomTheme {
    pub id: String,
    pub name: String,
    pub background_color: String,
    pub icon_background_color: String,
    pub icon_text_color: String,
    pub border_color: String,
    pub accent_color: String,
}

/// Appearance and behavior of one workspace
///
/// Owned by the sidebar and settings pages; the coordinator only reads
/// `on_close_behavior` and `default_tabs`. Numbers are whatever JS wrote
/// (possibly negative or fractional), and a field that does not parse
/// falls back to its default instead of failing the whole document.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSettings {
    pub rounded_corners: bool,
    pub margin_from_side: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub width: f64,
    pub border_radius: f64,
    pub icon_border_radius: f64,
    pub position: PanelPosition,
    pub alignment: BookmarkAlignment,

    pub background_color: String,
    pub icon_background_color: String,
    pub icon_text_color: String,
    pub border_color: String,
    pub accent_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_themes: Vec<CustomTheme>,
    pub icon_pack_id: Option<String>,

    pub mode: PanelMode,
    pub collapsible: bool,
    pub collapsed: bool,

    pub on_close_behavior: OnCloseBehavior,
    pub default_tabs: Vec<String>,

    /// Fields written by other extension pages that this crate does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        WorkspaceSettings {
            rounded_corners: true,
            margin_from_side: 0.0,
            margin_top: 0.0,
            margin_bottom: 0.0,
            width: 52.0,
            border_radius: 0.0,
            icon_border_radius: 25.0,
            position: PanelPosition::Left,
            alignment: BookmarkAlignment::Top,
            background_color: "#252526".to_string(),
            icon_background_color: "#2d2d2d".to_string(),
            icon_text_color: "#d4d4d4".to_string(),
            border_color: "#3e3e42".to_string(),
            accent_color: "#007acc".to_string(),
            theme_id: None,
            custom_themes: Vec::new(),
            icon_pack_id: Some("minimalist".to_string()),
            mode: PanelMode::Fixed,
            collapsible: false,
            collapsed: false,
            on_close_behavior: OnCloseBehavior::Continue,
            default_tabs: Vec::new(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Mirror of `id == currentWorkspaceId`, recomputed on every switch
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
    /// Tab snapshot; written only by the background coordinator
    #[serde(default)]
    pub closed_tabs: Vec<ClosedTab>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_tab_url: Option<String>,
    #[serde(default)]
    pub settings: WorkspaceSettings,
    #[serde(default)]
    pub created_at: f64,
    #[serde(default)]
    pub updated_at: f64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workspace {
    pub fn new(id: String, name: String, now: f64) -> Workspace {
        Workspace {
            id,
            name,
            icon: None,
            active: false,
            bookmarks: Vec::new(),
            closed_tabs: Vec::new(),
            active_tab_url: None,
            settings: WorkspaceSettings::default(),
            created_at: now,
            updated_at: now,
            extra: Map::new(),
        }
    }

    /// A fresh workspace with a unique generated id
    pub fn named(name: &str, now: f64) -> Workspace {
        Workspace::new(format!("workspace-{}", Uuid::new_v4()), name.to_string(), now)
    }

    pub fn touch(&mut self, now: f64) {
        self.updated_at = now;
    }

    pub fn bookmark_mut(&mut self, bookmark_id: &str) -> Result<&mut Bookmark> {
        self.bookmarks
            .iter_mut()
            .find(|b| b.id == bookmark_id)
            .ok_or_else(|| WorkspaceError::BookmarkNotFound(bookmark_id.to_string()))
    }

    /// Put bookmarks in the given id order and renumber their positions
    ///
    /// Unknown ids are skipped; bookmarks missing from `order` keep their
    /// relative order after the listed ones.
    pub fn reorder_bookmarks(&mut self, order: &[String]) {
        let mut remaining = std::mem::take(&mut self.bookmarks);
        let mut ordered = Vec::with_capacity(remaining.len());

        for id in order {
            if let Some(index) = remaining.iter().position(|b| &b.id == id) {
                ordered.push(remaining.remove(index));
            }
        }
        ordered.extend(remaining);

        for (index, bookmark) in ordered.iter_mut().enumerate() {
            bookmark.position = Some(index as f64);
        }
        self.bookmarks = ordered;
    }
}

impl<'de> Deserialize<'de> for WorkspaceSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut fields = match Value::deserialize(deserializer)? {
            Value::Object(fields) => fields,
            Value::Null => Map::new(),
            other => {
                warn!("Ignoring workspace settings that are not an object: {}", other);
                Map::new()
            }
        };

        let mut settings = WorkspaceSettings::default();
        take_field(&mut fields, "roundedCorners", &mut settings.rounded_corners);
        take_field(&mut fields, "marginFromSide", &mut settings.margin_from_side);
        take_field(&mut fields, "marginTop", &mut settings.margin_top);
        take_field(&mut fields, "marginBottom", &mut settings.margin_bottom);
        take_field(&mut fields, "width", &mut settings.width);
        take_field(&mut fields, "borderRadius", &mut settings.border_radius);
        take_field(&mut fields, "iconBorderRadius", &mut settings.icon_border_radius);
        take_field(&mut fields, "position", &mut settings.position);
        take_field(&mut fields, "alignment", &mut settings.alignment);
        take_field(&mut fields, "backgroundColor", &mut settings.background_color);
        take_field(&mut fields, "iconBackgroundColor", &mut settings.icon_background_color);
        take_field(&mut fields, "iconTextColor", &mut settings.icon_text_color);
        take_field(&mut fields, "borderColor", &mut settings.border_color);
        take_field(&mut fields, "accentColor", &mut settings.accent_color);
        take_field(&mut fields, "themeId", &mut settings.theme_id);
        take_field(&mut fields, "customThemes", &mut settings.custom_themes);
        take_field(&mut fields, "iconPackId", &mut settings.icon_pack_id);
        take_field(&mut fields, "mode", &mut settings.mode);
        take_field(&mut fields, "collapsible", &mut settings.collapsible);
        take_field(&mut fields, "collapsed", &mut settings.collapsed);
        take_field(&mut fields, "onCloseBehavior", &mut settings.on_close_behavior);
        take_field(&mut fields, "defaultTabs", &mut settings.default_tabs);
        settings.extra = fields;
        Ok(settings)
    }
}

/// Move `key` out of `fields` into `slot`; a value of the wrong shape
/// leaves the default in place
fn take_field<T: DeserializeOwned>(fields: &mut Map<String, Value>, key: &str, slot: &mut T) {
    let Some(value) = fields.remove(key) else {
        return;
    };
    match serde_json::from_value(value) {
        Ok(parsed) => *slot = parsed,
        Err(e) => warn!("Using default for settings field {}: {}", key, e),
    }
}

/// Root storage structure, kept under a single key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceData {
    pub workspaces: Vec<Workspace>,
    pub current_workspace_id: String,
}

impl WorkspaceData {
    /// The document created on first use: one active "Default" workspace
    pub fn with_default_workspace(now: f64) -> Self {
        let mut workspace = Workspace::new(
            DEFAULT_WORKSPACE_ID.to_string(),
            DEFAULT_WORKSPACE_NAME.to_string(),
            now,
        );
        workspace.active = true;

        WorkspaceData {
            workspaces: vec![workspace],
            current_workspace_id: DEFAULT_WORKSPACE_ID.to_string(),
        }
    }

    pub fn workspace(&self, workspace_id: &str) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.id == workspace_id)
    }

    pub fn workspace_mut(&mut self, workspace_id: &str) -> Result<&mut Workspace> {
        self.workspaces
            .iter_mut()
            .find(|w| w.id == workspace_id)
            .ok_or_else(|| WorkspaceError::WorkspaceNotFound(workspace_id.to_string()))
    }

    pub fn current_workspace(&self) -> Result<&Workspace> {
        self.workspace(&self.current_workspace_id)
            .ok_or(WorkspaceError::CurrentWorkspaceNotFound)
    }

    /// Make `workspace_id` current and recompute every `active` flag
    pub fn set_current(&mut self, workspace_id: &str) -> Result<()> {
        if self.workspace(workspace_id).is_none() {
            return Err(WorkspaceError::WorkspaceNotFound(workspace_id.to_string()));
        }
        self.current_workspace_id = workspace_id.to_string();
        self.sync_active_flags();
        Ok(())
    }

    pub fn sync_active_flags(&mut self) {
        let current = &self.current_workspace_id;
        for workspace in &mut self.workspaces {
            workspace.active = &workspace.id == current;
        }
    }

    pub fn add_workspace(&mut self, workspace: Workspace) {
        self.workspaces.push(workspace);
    }

    /// Remove a workspace, repointing the current id to the first remaining
    /// workspace when the removed one was current
    pub fn remove_workspace(&mut self, workspace_id: &str) -> Result<Workspace> {
        if self.workspaces.len() <= 1 {
            return Err(WorkspaceError::LastWorkspace);
        }
        let index = self
            .workspaces
            .iter()
            .position(|w| w.id == workspace_id)
            .ok_or_else(|| WorkspaceError::WorkspaceNotFound(workspace_id.to_string()))?;

        let removed = self.workspaces.remove(index);
        if self.current_workspace_id == workspace_id {
            self.current_workspace_id = self.workspaces[0].id.clone();
            self.sync_active_flags();
        }
        Ok(removed)
    }

    /// Restore the document invariants after loading data written elsewhere
    ///
    /// Returns true when anything had to change.
    pub fn normalize(&mut self, now: f64) -> bool {
        if self.workspaces.is_empty() {
            *self = WorkspaceData::with_default_workspace(now);
            return true;
        }

        let mut changed = false;
        if self.workspace(&self.current_workspace_id).is_none() {
            self.current_workspace_id = self.workspaces[0].id.clone();
            changed = true;
        }
        let flags_stale = self
            .workspaces
            .iter()
            .any(|w| w.active != (w.id == self.current_workspace_id));
        if flags_stale {
            self.sync_active_flags();
            changed = true;
        }
        changed
    }
}
