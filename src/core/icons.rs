//! Glyphs for tree rows.
//!
//! File icons are picked by a suffix match on the node name against a fixed
//! ordered rule table; the first matching rule wins and unmatched names fall
//! back to a generic marker.  All glyphs are two terminal cells wide so rows
//! stay aligned without any width math at render time.

/// Fold marker for a closed folder.
pub const FOLDER_CLOSED: &str = "▶";
/// Fold marker for an open folder.
pub const FOLDER_OPEN: &str = "▼";

/// Ordered suffix → icon rules.  First match wins.
const FILE_RULES: &[(&str, &str)] = &[
    (".js", "js"),
    (".html", "<>"),
    (".css", "##"),
    (".json", "{}"),
    (".md", "md"),
    (".png", "im"),
    (".jpg", "im"),
    (".gif", "im"),
];

/// Generic icon for names no rule matches.
const FILE_FALLBACK: &str = "··";

/// Icon for a file row, chosen by suffix.
pub fn file_icon(name: &str) -> &'static str {
    FILE_RULES
        .iter()
        .find(|(suffix, _)| name.ends_with(suffix))
        .map(|&(_, icon)| icon)
        .unwrap_or(FILE_FALLBACK)
}

/// Fold marker for a folder row.
pub fn folder_marker(open: bool) -> &'static str {
    if open {
        FOLDER_OPEN
    } else {
        FOLDER_CLOSED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_suffixes_map_to_their_icon() {
        assert_eq!(file_icon("app.js"), "js");
        assert_eq!(file_icon("index.html"), "<>");
        assert_eq!(file_icon("logo.png"), "im");
    }

    #[test]
    fn unmatched_names_fall_back() {
        assert_eq!(file_icon("Makefile"), FILE_FALLBACK);
        assert_eq!(file_icon("archive.tar"), FILE_FALLBACK);
    }

    #[test]
    fn match_is_a_suffix_not_a_substring() {
        // ".js" must not fire mid-name.
        assert_eq!(file_icon("main.js.bak"), FILE_FALLBACK);
        assert_eq!(file_icon("js"), FILE_FALLBACK);
        // ".json" is longer than ".js" and has its own rule.
        assert_eq!(file_icon("data.json"), "{}");
    }
}
