/// Tab operations: snapshotting, open-URL sets and close candidates
use crate::urls::is_ordinary_url;
use crate::workspace_data::{ClosedTab, TabInfo};
use std::collections::HashSet;

/// What a window looked like when a workspace was left
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabSnapshot {
    pub closed_tabs: Vec<ClosedTab>,
    pub active_tab_url: Option<String>,
}

/// Reduce live tabs to the plain `{url, title}` records a workspace keeps
///
/// Internal pages are dropped, and an internal active tab leaves
/// `active_tab_url` empty.
pub fn snapshot_tabs(tabs: &[TabInfo]) -> TabSnapshot {
    let closed_tabs = tabs
        .iter()
        .filter(|tab| is_ordinary_url(tab.current_url()))
        .filter_map(|tab| {
            tab.current_url().map(|url| ClosedTab {
                url: url.to_string(),
                title: tab.title.clone(),
            })
        })
        .collect();

    let active_tab_url = tabs
        .iter()
        .find(|tab| tab.active)
        .and_then(|tab| tab.current_url())
        .filter(|url| is_ordinary_url(Some(url)))
        .map(str::to_string);

    TabSnapshot {
        closed_tabs,
        active_tab_url,
    }
}

/// URLs currently open, internal pages included
pub fn open_urls(tabs: &[TabInfo]) -> HashSet<String> {
    tabs.iter()
        .filter_map(|tab| tab.current_url())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ids of the ordinary tabs a workspace switch may close
///
/// Internal pages are never closed, so the side panel and settings pages
/// survive a switch. Tabs already showing a URL in `keep` stay open, since
/// the incoming workspace wants them and they will not be recreated.
pub fn closable_tab_ids(tabs: &[TabInfo], keep: &HashSet<&str>) -> Vec<i32> {
    tabs.iter()
        .filter(|tab| is_ordinary_url(tab.current_url()))
        .filter(|tab| !tab.current_url().is_some_and(|url| keep.contains(url)))
        .filter_map(|tab| tab.id)
        .collect()
}

/// URLs from `wanted` not yet in `open`, first occurrence only
pub fn missing_urls<'a, I>(wanted: I, open: &HashSet<String>) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    wanted
        .into_iter()
        .filter(|url| !url.is_empty() && !open.contains(*url))
        .filter(|url| seen.insert(*url))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(id: i32, url: &str, active: bool) -> TabInfo {
        TabInfo::new(id, 1, url, &format!("Tab {}", id), active)
    }

    #[test]
    fn test_snapshot_tabs() {
        let tabs = vec![
            tab(1, "https://x.com", false),
            tab(2, "https://y.com", true),
        ];

        let snapshot = snapshot_tabs(&tabs);

        let urls: Vec<&str> = snapshot.closed_tabs.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x.com", "https://y.com"]);
        assert_eq!(snapshot.closed_tabs[0].title.as_deref(), Some("Tab 1"));
        assert_eq!(snapshot.active_tab_url.as_deref(), Some("https://y.com"));
    }

    #[test]
    fn test_snapshot_excludes_internal_pages() {
        let tabs = vec![
            tab(1, "chrome://newtab/", false),
            tab(2, "https://github.com", false),
            tab(3, "chrome-extension://abc/options.html", true),
        ];

        let snapshot = snapshot_tabs(&tabs);

        assert_eq!(snapshot.closed_tabs.len(), 1);
        assert_eq!(snapshot.closed_tabs[0].url, "https://github.com");
        assert_eq!(snapshot.active_tab_url, None);
    }

    #[test]
    fn test_snapshot_skips_tabs_without_url() {
        let mut loading = tab(1, "", true);
        loading.url = None;
        let tabs = vec![loading, tab(2, "https://a.com", false)];

        let snapshot = snapshot_tabs(&tabs);

        assert_eq!(snapshot.closed_tabs.len(), 1);
        assert_eq!(snapshot.active_tab_url, None);
    }

    #[test]
    fn test_closable_tab_ids() {
        let mut no_id = tab(9, "https://c.com", false);
        no_id.id = None;
        let tabs = vec![
            tab(1, "https://a.com", false),
            tab(2, "chrome://settings", false),
            tab(3, "https://b.com", true),
            no_id,
        ];

        assert_eq!(closable_tab_ids(&tabs, &HashSet::new()), vec![1, 3]);
    }

    #[test]
    fn test_closable_tab_ids_keeps_wanted_urls() {
        let tabs = vec![
            tab(1, "https://a.com", false),
            tab(2, "https://b.com", true),
        ];
        let keep: HashSet<&str> = ["https://b.com"].into_iter().collect();

        assert_eq!(closable_tab_ids(&tabs, &keep), vec![1]);
    }

    #[test]
    fn test_missing_urls() {
        let open = open_urls(&[tab(1, "https://a.com", true), tab(2, "chrome://newtab/", false)]);

        let missing = missing_urls(
            ["https://a.com", "https://b.com", "", "https://b.com", "https://c.com"],
            &open,
        );

        assert_eq!(missing, vec!["https://b.com".to_string(), "https://c.com".to_string()]);
    }

    #[test]
    fn test_loading_tab_counts_by_pending_url() {
        let mut loading = tab(1, "", true);
        loading.url = None;
        loading.pending_url = Some("https://b.com".to_string());
        let tabs = vec![tab(2, "https://a.com", false), loading];

        let open = open_urls(&tabs);
        assert!(open.contains("https://b.com"));
        assert!(missing_urls(["https://a.com", "https://b.com"], &open).is_empty());

        let keep: HashSet<&str> = ["https://b.com"].into_iter().collect();
        assert_eq!(closable_tab_ids(&tabs, &keep), vec![2]);

        let snapshot = snapshot_tabs(&tabs);
        assert_eq!(snapshot.closed_tabs.len(), 2);
        assert_eq!(snapshot.active_tab_url.as_deref(), Some("https://b.com"));
    }
}
