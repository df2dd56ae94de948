/// Coordinator configuration: storage keys and timing

pub const WORKSPACE_DATA_KEY: &str = "workspaceData";
pub const NEW_TAB_URL_KEY: &str = "newTabUrl";
pub const DEFAULT_NEW_TAB_URL: &str = "https://www.google.com/";
pub const TAB_REMOVED_DEBOUNCE_MS: u32 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    /// Key holding the whole workspace document in local storage
    pub storage_key: String,
    /// Key holding the user-configured new tab URL
    pub new_tab_url_key: String,
    /// Used when no new tab URL is stored or the stored one is unusable
    pub default_new_tab_url: String,
    /// Quiet period after the last tab removal before snapshotting
    pub tab_removed_debounce_ms: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig {
            storage_key: WORKSPACE_DATA_KEY.to_string(),
            new_tab_url_key: NEW_TAB_URL_KEY.to_string(),
            default_new_tab_url: DEFAULT_NEW_TAB_URL.to_string(),
            tab_removed_debounce_ms: TAB_REMOVED_DEBOUNCE_MS,
        }
    }
}
