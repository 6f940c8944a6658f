use std::path::Path;

use anyhow::{Context, Result};

use crate::config::ExportOptions;
use crate::export;
use crate::store::{NoteId, NoteStore};

/// Thin wrapper around store mutations triggered from the TUI.
pub struct ActionDispatcher<'a> {
    store: &'a mut NoteStore,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(store: &'a mut NoteStore) -> Self {
        Self { store }
    }

    pub fn toggle_pin(&mut self, note_id: &str, pin: bool) -> bool {
        self.store.set_pinned(note_id, pin)
    }

    pub fn delete(&mut self, note_id: &str) -> Result<()> {
        self.store
            .delete(note_id)
            .with_context(|| format!("deleting note {note_id}"))
    }

    pub fn delete_all(&mut self) -> usize {
        self.store.delete_all()
    }

    pub fn load_external(&mut self, path: &Path) -> Result<NoteId> {
        let note = self
            .store
            .load(path)
            .with_context(|| format!("loading note from {}", path.display()))?;
        Ok(note.id)
    }

    pub fn replace(&mut self, note_id: &str, query: &str, replacement: &str) -> Result<usize> {
        self.store
            .replace_in_note(note_id, query, replacement)
            .with_context(|| format!("replacing matches in {note_id}"))
    }

    pub fn export_archive(&self, path: &Path) -> Result<usize> {
        self.store.export_all(path)
    }

    pub fn export_pdf(&self, note_id: &str, path: &Path, options: &ExportOptions) -> Result<()> {
        let note = self
            .store
            .get(note_id)
            .with_context(|| format!("note {note_id} not found"))?;
        export::pdf::write_pdf(&note.title, &note.content, path, options.pdf_options())
    }
}
