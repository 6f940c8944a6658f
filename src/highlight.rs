use regex::{Regex, RegexBuilder};

/// Builds the regex that marks search hits in titles and previews and that
/// the store uses to rewrite hits during replace. The query is escaped
/// verbatim; search itself is plain substring matching.
pub fn build_highlight_regex(query: &str) -> Option<Regex> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(trimmed))
        .case_insensitive(true)
        .build()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_yields_no_regex() {
        assert!(build_highlight_regex("   ").is_none());
    }

    #[test]
    fn matches_are_case_insensitive() {
        let regex = build_highlight_regex("note").expect("regex");
        let hits: Vec<_> = regex.find_iter("Note NOTE note").map(|m| m.as_str()).collect();
        assert_eq!(hits, vec!["Note", "NOTE", "note"]);
    }

    #[test]
    fn metacharacters_are_escaped() {
        let regex = build_highlight_regex("a.b").expect("regex");
        assert!(regex.is_match("a.b"));
        assert!(!regex.is_match("axb"));
    }
}
