/// URL classification and normalization for workspace tabs
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Browser-internal schemes that are never snapshotted, restored or closed
const INTERNAL_PREFIXES: [&str; 2] = ["chrome://", "chrome-extension://"];

static HTTP_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("valid scheme pattern"));

/// True for `chrome://` pages and extension-internal pages
pub fn is_internal_url(url: &str) -> bool {
    INTERNAL_PREFIXES.iter().any(|prefix| url.starts_with(prefix))
}

/// True for a URL a workspace may own: present, non-empty and not internal
pub fn is_ordinary_url(url: Option<&str>) -> bool {
    matches!(url, Some(u) if !u.is_empty() && !is_internal_url(u))
}

/// Turn the user's stored new tab setting into an openable URL
///
/// - Absent or blank values use `fallback`
/// - Values without an `http://` or `https://` scheme get `https://` prepended
/// - Anything that still fails to parse uses `fallback`
pub fn normalize_new_tab_url(raw: Option<&str>, fallback: &str) -> String {
    let trimmed = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return fallback.to_string(),
    };

    let candidate = if HTTP_SCHEME.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    match Url::parse(&candidate) {
        Ok(_) => candidate,
        Err(e) => {
            log::warn!("Ignoring unusable new tab URL {:?}: {}", trimmed, e);
            fallback.to_string()
        }
    }
}
