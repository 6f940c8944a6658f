use std::str::FromStr;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use super::Category;

const HEADER_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Metadata line prepended to note files: `[2024-01-02 13:05:00] Work`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteHeader {
    pub saved_at: OffsetDateTime,
    pub category: Category,
}

impl NoteHeader {
    pub fn new(saved_at: OffsetDateTime, category: Category) -> Self {
        Self { saved_at, category }
    }

    pub fn render(&self) -> String {
        let stamp = self
            .saved_at
            .format(HEADER_FORMAT)
            .unwrap_or_else(|_| self.saved_at.unix_timestamp().to_string());
        format!("[{stamp}] {}", self.category)
    }
}

/// Splits a file's raw text into an optional header and the remaining content.
///
/// Files written by older revisions carry no header line; anything that does
/// not parse cleanly is treated as plain content, never an error.
pub fn split_header(raw: &str) -> (Option<NoteHeader>, &str) {
    let Some(first_line_end) = raw.find('\n') else {
        return match parse_header_line(raw) {
            Some(header) => (Some(header), ""),
            None => (None, raw),
        };
    };
    let first_line = &raw[..first_line_end];
    match parse_header_line(first_line) {
        Some(header) => (Some(header), &raw[first_line_end + 1..]),
        None => (None, raw),
    }
}

fn parse_header_line(line: &str) -> Option<NoteHeader> {
    let rest = line.strip_prefix('[')?;
    let (stamp, tail) = rest.split_once(']')?;
    let category = Category::from_str(tail.trim()).ok()?;
    let saved_at = PrimitiveDateTime::parse(stamp, HEADER_FORMAT)
        .ok()?
        .assume_utc();
    Some(NoteHeader::new(saved_at, category))
}
