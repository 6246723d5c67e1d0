//! Page title helpers used by the batch rating lookup.

/// Namespace prefix of the discussion page that carries rating banners.
pub const TALK_PREFIX: &str = "Talk:";

/// Replace spaces with underscores (`"New York"` → `"New_York"`).
pub fn normalize_title(title: &str) -> String {
    title.replace(' ', "_")
}

/// Address the talk page of `title`.
pub fn talk_page(title: &str) -> String {
    format!("{TALK_PREFIX}{title}")
}

/// Strip a leading [`TALK_PREFIX`], if present.
pub fn strip_talk_prefix(title: &str) -> &str {
    title.strip_prefix(TALK_PREFIX).unwrap_or(title)
}

/// Sort titles by their lowercase form. Equal keys keep their input order.
pub fn sort_case_insensitive(titles: &mut [String]) {
    titles.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
}
