//! Case-insensitive substring matching over note identifiers and content.
//!
//! The query is lowercased once by the caller ([`crate::store::NoteStore::search`]);
//! this module only implements the per-note predicate so the store's match
//! iterator and the interactive search share one definition.

/// True when `query` (already lowercased) occurs in the identifier or the
/// content. An empty query matches everything.
pub fn note_matches(query: &str, id: &str, content: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    id.to_lowercase().contains(query) || content.to_lowercase().contains(query)
}

/// Normalises raw user input into the lowercase form `note_matches` expects.
pub fn normalize_query(input: &str) -> String {
    input.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_matches_everything() {
        assert!(note_matches("", "whatever.txt", ""));
    }

    #[test]
    fn matches_are_case_insensitive() {
        assert!(note_matches("needle", "plain.txt", "the NEEDLE is here"));
        assert!(note_matches("meeting", "Meeting_notes.txt", "no hit in body"));
    }

    #[test]
    fn miss_returns_false() {
        assert!(!note_matches("absent", "plain.txt", "nothing relevant"));
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_query("  MiXeD  "), "mixed");
    }
}
