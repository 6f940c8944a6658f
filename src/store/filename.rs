use std::str::FromStr;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use super::Category;

pub const NOTE_EXTENSION: &str = "txt";

const STAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year][month][day]_[hour][minute][second]");

/// Derives the backing filename for a note: `<title>_<stamp>_<category>.txt`,
/// spaces in the title replaced by underscores.
pub fn derive(title: &str, saved_at: OffsetDateTime, category: Category) -> String {
    let title = sanitize_title(title);
    let stamp = saved_at
        .format(STAMP_FORMAT)
        .unwrap_or_else(|_| saved_at.unix_timestamp().to_string());
    format!("{title}_{stamp}_{category}.{NOTE_EXTENSION}")
}

/// Best-effort recovery of title and category from a filename.
///
/// The derivation is lossy: titles containing underscores cannot be split
/// back apart unambiguously. Callers treat the result as a display hint, not
/// a contract.
pub fn parse(file_name: &str) -> (String, Category) {
    let stem = file_name
        .strip_suffix(&format!(".{NOTE_EXTENSION}"))
        .unwrap_or(file_name);

    let mut parts: Vec<&str> = stem.split('_').collect();
    let category = parts
        .last()
        .and_then(|last| Category::from_str(last).ok())
        .unwrap_or_default();
    if parts.len() > 1 && Category::from_str(parts[parts.len() - 1]).is_ok() {
        parts.pop();
    }
    // Drop the two timestamp segments when they look like one.
    if parts.len() >= 3 && looks_like_stamp(parts[parts.len() - 2], parts[parts.len() - 1]) {
        parts.truncate(parts.len() - 2);
    }
    let title = if parts.is_empty() {
        stem.to_string()
    } else {
        parts.join(" ")
    };
    (title, category)
}

pub fn sanitize_title(title: &str) -> String {
    let trimmed = title.trim();
    let base = if trimmed.is_empty() { "Untitled" } else { trimmed };
    base.chars()
        .map(|ch| match ch {
            ' ' => '_',
            '/' | '\\' | ':' => '-',
            other => other,
        })
        .collect()
}

fn looks_like_stamp(date: &str, time: &str) -> bool {
    date.len() == 8
        && time.len() == 6
        && date.bytes().all(|b| b.is_ascii_digit())
        && time.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn derives_expected_shape() {
        let name = derive(
            "Meeting notes",
            datetime!(2024-01-02 13:05:00 UTC),
            Category::Work,
        );
        assert_eq!(name, "Meeting_notes_20240102_130500_Work.txt");
    }

    #[test]
    fn empty_title_falls_back_to_untitled() {
        let name = derive("   ", datetime!(2024-01-02 13:05:00 UTC), Category::General);
        assert!(name.starts_with("Untitled_"));
    }

    #[test]
    fn parse_recovers_title_and_category() {
        let (title, category) = parse("Meeting_notes_20240102_130500_Work.txt");
        assert_eq!(title, "Meeting notes");
        assert_eq!(category, Category::Work);
    }

    #[test]
    fn parse_without_stamp_keeps_whole_stem() {
        let (title, category) = parse("groceries.txt");
        assert_eq!(title, "groceries");
        assert_eq!(category, Category::General);
    }

    #[test]
    fn parse_is_lossy_for_underscored_titles() {
        // "release_plan" was a single title segment; the parse cannot know.
        let (title, category) = parse("release_plan_20240102_130500_Code.txt");
        assert_eq!(title, "release plan");
        assert_eq!(category, Category::Code);
    }

    #[test]
    fn path_separators_are_neutralised() {
        let name = derive(
            "a/b\\c:d",
            datetime!(2024-01-02 13:05:00 UTC),
            Category::General,
        );
        assert!(!name.contains('/') && !name.contains('\\') && !name.contains(':'));
    }
}
