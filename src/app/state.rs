use time::format_description::FormatItem;
use time::macros::format_description;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::ThemeName;
use crate::format::{Alignment, StyleFlags, TextStyle};
use crate::journaling::AutoSaveStatus;
use crate::store::{Category, Note, NoteId, NoteStore};

const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    List,
    Editor,
}

#[derive(Debug, Clone)]
pub struct NoteSummary {
    pub id: NoteId,
    pub title: String,
    pub category: Category,
    pub pinned: bool,
    pub preview: String,
    pub updated_label: Option<String>,
    pub content: String,
}

/// Word and character counts for the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextCounts {
    pub words: usize,
    pub chars: usize,
}

pub fn count_text(content: &str) -> TextCounts {
    TextCounts {
        words: content.unicode_words().count(),
        chars: content.chars().count(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub active: bool,
    pub query: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewNoteOverlay {
    pub title: String,
    pub category: Category,
}

#[derive(Debug, Clone, Default)]
pub struct PathPromptOverlay {
    pub input: String,
}

#[derive(Debug, Clone)]
pub struct DeleteOverlay {
    pub note_id: NoteId,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Archive,
    Pdf,
}

#[derive(Debug, Clone)]
pub struct ExportOverlay {
    pub kind: ExportKind,
    pub input: String,
}

/// Prompt for the text that will stand in for the current search hits.
#[derive(Debug, Clone)]
pub struct ReplaceOverlay {
    pub note_id: NoteId,
    pub query: String,
    pub input: String,
}

#[derive(Debug, Clone)]
pub enum OverlayState {
    NewNote(NewNoteOverlay),
    LoadPath(PathPromptOverlay),
    ConfirmDelete(DeleteOverlay),
    ConfirmDeleteAll,
    Export(ExportOverlay),
    Replace(ReplaceOverlay),
}

/// Live edit buffer for one note. `note_id` stays `None` until the first
/// save assigns a backing file.
#[derive(Debug, Clone)]
pub struct EditorState {
    pub title: String,
    pub category: Category,
    pub note_id: Option<NoteId>,
    pub buffer: String,
    pub cursor: usize,
    pub dirty: bool,
    /// Display style for the whole buffer while editing.
    pub style: TextStyle,
}

impl EditorState {
    fn new(title: String, category: Category, note_id: Option<NoteId>, buffer: String) -> Self {
        let cursor = buffer.len();
        Self {
            title,
            category,
            note_id,
            buffer,
            cursor,
            dirty: false,
            style: TextStyle::default(),
        }
    }

    pub fn toggle_style(&mut self, flag: StyleFlags) {
        self.style = self.style.toggled(flag);
    }

    pub fn adjust_font_size(&mut self, delta: i16) {
        let size = self.style.size.saturating_add_signed(delta);
        self.style = self.style.with_size(size);
    }

    pub fn cycle_alignment(&mut self) {
        let next = match self.style.alignment {
            Alignment::Left => Alignment::Center,
            Alignment::Center => Alignment::Right,
            Alignment::Right => Alignment::Left,
        };
        self.style = self.style.with_alignment(next);
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn counts(&self) -> TextCounts {
        count_text(&self.buffer)
    }

    pub fn mark_saved(&mut self, note_id: NoteId) {
        self.note_id = Some(note_id);
        self.dirty = false;
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut scratch = [0u8; 4];
        let encoded = ch.encode_utf8(&mut scratch);
        self.buffer.insert_str(self.cursor, encoded);
        self.cursor += encoded.len();
        self.dirty = true;
    }

    pub fn insert_newline(&mut self) {
        self.buffer.insert(self.cursor, '\n');
        self.cursor += 1;
        self.dirty = true;
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let prev = prev_grapheme_boundary(&self.buffer, self.cursor);
        self.buffer.drain(prev..self.cursor);
        self.cursor = prev;
        self.dirty = true;
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.buffer.len() {
            return false;
        }
        let next = next_grapheme_boundary(&self.buffer, self.cursor);
        if next == self.cursor {
            return false;
        }
        self.buffer.drain(self.cursor..next);
        self.dirty = true;
        true
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = prev_grapheme_boundary(&self.buffer, self.cursor);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.buffer.len() {
            self.cursor = next_grapheme_boundary(&self.buffer, self.cursor);
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = line_start(&self.buffer, self.cursor);
    }

    pub fn move_end(&mut self) {
        self.cursor = line_end(&self.buffer, self.cursor);
    }

    pub fn move_up(&mut self) {
        let start = line_start(&self.buffer, self.cursor);
        if start == 0 {
            self.cursor = 0;
            return;
        }
        let column = self.cursor - start;
        let prev_start = line_start(&self.buffer, start - 1);
        let prev_len = line_end(&self.buffer, prev_start) - prev_start;
        self.cursor = prev_start + column.min(prev_len);
    }

    pub fn move_down(&mut self) {
        let end = line_end(&self.buffer, self.cursor);
        if end >= self.buffer.len() {
            self.cursor = self.buffer.len();
            return;
        }
        let start = line_start(&self.buffer, self.cursor);
        let column = self.cursor - start;
        let next_start = end + 1;
        let next_len = line_end(&self.buffer, next_start) - next_start;
        self.cursor = next_start + column.min(next_len);
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.dirty = true;
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub focus: FocusPane,
    pub selected: usize,
    pub preview_lines: usize,
    pub notes: Vec<NoteSummary>,
    pub search: SearchState,
    pub status_message: Option<String>,
    pub overlay: Option<OverlayState>,
    pub editor: Option<EditorState>,
    pub autosave_status: AutoSaveStatus,
    pub theme: ThemeName,
}

impl AppState {
    pub fn load(store: &NoteStore, preview_lines: usize, theme: ThemeName) -> Self {
        let notes = build_summaries(store, "", preview_lines);
        Self {
            focus: FocusPane::List,
            selected: 0,
            preview_lines,
            notes,
            search: SearchState::default(),
            status_message: None,
            overlay: None,
            editor: None,
            autosave_status: AutoSaveStatus::Inactive,
            theme,
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn selected(&self) -> Option<&NoteSummary> {
        self.notes.get(self.selected)
    }

    pub fn selected_note_id(&self) -> Option<NoteId> {
        self.selected().map(|note| note.id.clone())
    }

    /// Rebuilds the list snapshot from the store, preserving the active
    /// search filter.
    pub fn refresh(&mut self, store: &NoteStore) {
        let query = crate::search::normalize_query(&self.search.query);
        self.notes = build_summaries(store, &query, self.preview_lines);
        self.normalize_selection();
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.notes.is_empty() {
            return;
        }
        let len = self.notes.len() as isize;
        let next = (self.selected as isize + delta).clamp(0, len - 1);
        self.selected = next as usize;
    }

    pub fn select_note_by_id(&mut self, note_id: &str) {
        if let Some(idx) = self.notes.iter().position(|note| note.id == note_id) {
            self.selected = idx;
        } else {
            self.normalize_selection();
        }
    }

    fn normalize_selection(&mut self) {
        if self.notes.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.notes.len() {
            self.selected = self.notes.len() - 1;
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::List => FocusPane::Editor,
            FocusPane::Editor => FocusPane::List,
        };
    }

    pub fn toggle_theme(&mut self) -> ThemeName {
        self.theme = self.theme.toggled();
        self.theme
    }

    // Search.

    pub fn begin_search(&mut self) {
        self.search.active = true;
        self.focus = FocusPane::List;
    }

    pub fn finish_search(&mut self) {
        self.search.active = false;
    }

    pub fn cancel_search(&mut self, store: &NoteStore) {
        self.search.active = false;
        self.search.query.clear();
        self.refresh(store);
    }

    pub fn push_search_char(&mut self, store: &NoteStore, ch: char) {
        self.search.query.push(ch);
        self.refresh(store);
    }

    pub fn pop_search_char(&mut self, store: &NoteStore) {
        if self.search.query.pop().is_some() {
            self.refresh(store);
        }
    }

    pub fn is_search_active(&self) -> bool {
        self.search.active
    }

    // Editor.

    pub fn begin_editor(
        &mut self,
        title: String,
        category: Category,
        note_id: Option<NoteId>,
        buffer: String,
    ) {
        self.editor = Some(EditorState::new(title, category, note_id, buffer));
        self.focus = FocusPane::Editor;
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
        self.focus = FocusPane::List;
    }

    pub fn editor(&self) -> Option<&EditorState> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut EditorState> {
        self.editor.as_mut()
    }

    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }

    /// Counts shown in the status bar: the live buffer while editing,
    /// otherwise the selected note.
    pub fn visible_counts(&self) -> TextCounts {
        if let Some(editor) = &self.editor {
            return editor.counts();
        }
        self.selected()
            .map(|note| count_text(&note.content))
            .unwrap_or_default()
    }

    // Status + autosave.

    pub fn set_status_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.status_message = message.map(Into::into);
    }

    pub fn set_autosave_status(&mut self, status: AutoSaveStatus) {
        self.autosave_status = status;
    }

    // Overlays.

    pub fn overlay(&self) -> Option<&OverlayState> {
        self.overlay.as_ref()
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn open_new_note(&mut self, category: Category) {
        self.overlay = Some(OverlayState::NewNote(NewNoteOverlay {
            title: String::new(),
            category,
        }));
    }

    pub fn open_load_path(&mut self) {
        self.overlay = Some(OverlayState::LoadPath(PathPromptOverlay::default()));
    }

    pub fn open_confirm_delete(&mut self) {
        let Some(note) = self.selected() else {
            return;
        };
        self.overlay = Some(OverlayState::ConfirmDelete(DeleteOverlay {
            note_id: note.id.clone(),
            title: note.title.clone(),
        }));
    }

    pub fn open_confirm_delete_all(&mut self) {
        self.overlay = Some(OverlayState::ConfirmDeleteAll);
    }

    pub fn open_export(&mut self, kind: ExportKind, suggested: String) {
        self.overlay = Some(OverlayState::Export(ExportOverlay {
            kind,
            input: suggested,
        }));
    }

    pub fn open_replace(&mut self, note_id: NoteId, query: String) {
        self.overlay = Some(OverlayState::Replace(ReplaceOverlay {
            note_id,
            query,
            input: String::new(),
        }));
    }

    pub fn new_note_overlay_mut(&mut self) -> Option<&mut NewNoteOverlay> {
        match self.overlay.as_mut() {
            Some(OverlayState::NewNote(draft)) => Some(draft),
            _ => None,
        }
    }

    pub fn load_path_overlay_mut(&mut self) -> Option<&mut PathPromptOverlay> {
        match self.overlay.as_mut() {
            Some(OverlayState::LoadPath(prompt)) => Some(prompt),
            _ => None,
        }
    }

    pub fn confirm_delete_overlay(&self) -> Option<&DeleteOverlay> {
        match self.overlay.as_ref() {
            Some(OverlayState::ConfirmDelete(confirm)) => Some(confirm),
            _ => None,
        }
    }

    pub fn export_overlay_mut(&mut self) -> Option<&mut ExportOverlay> {
        match self.overlay.as_mut() {
            Some(OverlayState::Export(prompt)) => Some(prompt),
            _ => None,
        }
    }

    pub fn export_overlay(&self) -> Option<&ExportOverlay> {
        match self.overlay.as_ref() {
            Some(OverlayState::Export(prompt)) => Some(prompt),
            _ => None,
        }
    }

    pub fn replace_overlay_mut(&mut self) -> Option<&mut ReplaceOverlay> {
        match self.overlay.as_mut() {
            Some(OverlayState::Replace(prompt)) => Some(prompt),
            _ => None,
        }
    }

    pub fn replace_overlay(&self) -> Option<&ReplaceOverlay> {
        match self.overlay.as_ref() {
            Some(OverlayState::Replace(prompt)) => Some(prompt),
            _ => None,
        }
    }
}

fn build_summaries(store: &NoteStore, query: &str, preview_lines: usize) -> Vec<NoteSummary> {
    store
        .snapshot()
        .into_iter()
        .filter(|note| crate::search::note_matches(query, &note.id, &note.content))
        .map(|note| summarize(note, preview_lines))
        .collect()
}

fn summarize(note: &Note, preview_lines: usize) -> NoteSummary {
    NoteSummary {
        id: note.id.clone(),
        title: note.title.clone(),
        category: note.category,
        pinned: note.pinned,
        preview: build_preview(&note.content, preview_lines),
        updated_label: note
            .saved_at
            .and_then(|stamp| stamp.format(TIMESTAMP_FORMAT).ok()),
        content: note.content.clone(),
    }
}

fn build_preview(content: &str, preview_lines: usize) -> String {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(preview_lines.max(1))
        .collect::<Vec<_>>()
        .join("\n")
}

fn prev_grapheme_boundary(text: &str, cursor: usize) -> usize {
    text[..cursor]
        .grapheme_indices(true)
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_grapheme_boundary(text: &str, cursor: usize) -> usize {
    text[cursor..]
        .graphemes(true)
        .next()
        .map(|g| cursor + g.len())
        .unwrap_or(text.len())
}

fn line_start(text: &str, cursor: usize) -> usize {
    text[..cursor].rfind('\n').map(|idx| idx + 1).unwrap_or(0)
}

fn line_end(text: &str, cursor: usize) -> usize {
    text[cursor..]
        .find('\n')
        .map(|idx| cursor + idx)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_match_expected_values() {
        let counts = count_text("hello world");
        assert_eq!(counts.words, 2);
        assert_eq!(counts.chars, 11);

        let empty = count_text("");
        assert_eq!(empty.words, 0);
        assert_eq!(empty.chars, 0);
    }

    #[test]
    fn counts_handle_multiline_text() {
        let counts = count_text("one two\nthree");
        assert_eq!(counts.words, 3);
    }

    #[test]
    fn editor_insert_and_backspace_round_trip() {
        let mut editor = EditorState::new("T".into(), Category::General, None, String::new());
        for ch in "hi".chars() {
            editor.insert_char(ch);
        }
        assert_eq!(editor.buffer(), "hi");
        assert!(editor.backspace());
        assert_eq!(editor.buffer(), "h");
        assert!(editor.dirty);
    }

    #[test]
    fn editor_vertical_movement_clamps_to_line_length() {
        let mut editor =
            EditorState::new("T".into(), Category::General, None, "long line\nab".into());
        editor.cursor = editor.buffer.len(); // end of "ab"
        editor.move_up();
        // Column 2 on the first line.
        assert_eq!(editor.cursor, 2);
        editor.move_end();
        assert_eq!(editor.cursor, "long line".len());
        editor.move_down();
        assert_eq!(&editor.buffer[editor.cursor..], "");
    }

    #[test]
    fn editor_font_size_adjusts_and_floors_at_one() {
        let mut editor = EditorState::new("T".into(), Category::General, None, String::new());
        editor.adjust_font_size(2);
        assert_eq!(editor.style.size, 14);
        editor.adjust_font_size(-100);
        assert_eq!(editor.style.size, 1);
    }

    #[test]
    fn editor_grapheme_aware_backspace() {
        let mut editor = EditorState::new("T".into(), Category::General, None, String::new());
        editor.insert_char('e');
        editor.insert_char('\u{301}'); // combining acute accent
        assert!(editor.backspace());
        assert_eq!(editor.buffer(), "");
    }

    #[test]
    fn selection_stays_in_bounds_after_refresh() {
        let mut state = AppState {
            focus: FocusPane::List,
            selected: 5,
            preview_lines: 3,
            notes: Vec::new(),
            search: SearchState::default(),
            status_message: None,
            overlay: None,
            editor: None,
            autosave_status: AutoSaveStatus::Inactive,
            theme: ThemeName::Dark,
        };
        state.normalize_selection();
        assert_eq!(state.selected, 0);
    }
}
