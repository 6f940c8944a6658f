use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::search;

pub mod filename;
mod header;

pub use header::{split_header, NoteHeader};

/// Identifier of a note: the name of its backing file.
pub type NoteId = String;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Category {
    #[default]
    General,
    Work,
    Personal,
    Ideas,
    Code,
}

impl Category {
    /// Cycles to the next category, wrapping after the last one.
    pub fn next(self) -> Self {
        use strum::IntoEnumIterator;
        let mut iter = Self::iter().cycle();
        for candidate in iter.by_ref() {
            if candidate == self {
                break;
            }
        }
        iter.next().unwrap_or_default()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("note content is empty")]
    EmptyContent,
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub pinned: bool,
    pub saved_at: Option<OffsetDateTime>,
    /// Backing file. Usually `notes_dir/<id>`, but manual save-as may point
    /// anywhere.
    pub path: PathBuf,
}

impl Note {
    /// A fresh, never-saved note. It has no identifier and no backing file
    /// until the first non-empty save.
    pub fn draft(title: &str, category: Category) -> Self {
        Self {
            id: NoteId::new(),
            title: title.to_string(),
            content: String::new(),
            category,
            pinned: false,
            saved_at: None,
            path: PathBuf::new(),
        }
    }

    /// The exact bytes written to the backing file: metadata header line
    /// followed by the content.
    pub fn rendered(&self) -> String {
        match self.saved_at {
            Some(saved_at) => {
                let header = NoteHeader::new(saved_at, self.category);
                format!("{}\n{}", header.render(), self.content)
            }
            None => self.content.clone(),
        }
    }
}

/// In-memory note map mirrored to flat `*.txt` files in a notes directory.
///
/// The map preserves insertion order; pinned-first ordering is applied by
/// [`NoteStore::snapshot`] for display, never by the map itself.
pub struct NoteStore {
    notes_dir: PathBuf,
    notes: IndexMap<NoteId, Note>,
}

impl NoteStore {
    /// Opens the store rooted at `notes_dir`, creating the directory when
    /// missing and ingesting any note files already present.
    pub fn open(notes_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let notes_dir = notes_dir.into();
        fs::create_dir_all(&notes_dir).map_err(|err| StoreError::io(&notes_dir, err))?;
        let mut store = Self {
            notes_dir,
            notes: IndexMap::new(),
        };
        store.reconcile()?;
        Ok(store)
    }

    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.notes.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    /// Notes in display order: pinned first, otherwise insertion order.
    pub fn snapshot(&self) -> Vec<&Note> {
        let mut pinned = Vec::new();
        let mut rest = Vec::new();
        for note in self.notes.values() {
            if note.pinned {
                pinned.push(note);
            } else {
                rest.push(note);
            }
        }
        pinned.extend(rest);
        pinned
    }

    /// Starts an empty note. It lives only in memory; the store does not
    /// track it and nothing touches disk until the first non-empty save.
    pub fn create(&self, title: &str, category: Category) -> Note {
        Note::draft(title, category)
    }

    pub fn set_pinned(&mut self, id: &str, pinned: bool) -> bool {
        match self.notes.get_mut(id) {
            Some(note) => {
                note.pinned = pinned;
                true
            }
            None => false,
        }
    }

    /// Saves a note into the notes directory. When `id_hint` names a known
    /// note its backing file is reused; otherwise a filename is derived from
    /// title, timestamp and category.
    pub fn save(
        &mut self,
        id_hint: Option<&str>,
        title: &str,
        content: &str,
        category: Category,
    ) -> Result<NoteId, StoreError> {
        if content.trim().is_empty() {
            return Err(StoreError::EmptyContent);
        }
        let now = OffsetDateTime::now_utc();
        let (id, path) = match id_hint.and_then(|hint| self.notes.get(hint)) {
            Some(existing) => (existing.id.clone(), existing.path.clone()),
            None => {
                let id = filename::derive(title, now, category);
                let path = self.notes_dir.join(&id);
                (id, path)
            }
        };
        self.write_and_insert(id, path, title, content, category, now)
    }

    /// Manual "save as": the user picks the full path. The note is tracked
    /// under the chosen file name even when the path lies outside the notes
    /// directory.
    pub fn save_as(
        &mut self,
        path: &Path,
        title: &str,
        content: &str,
        category: Category,
    ) -> Result<NoteId, StoreError> {
        if content.trim().is_empty() {
            return Err(StoreError::EmptyContent);
        }
        let id = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| filename::sanitize_title(title));
        let now = OffsetDateTime::now_utc();
        self.write_and_insert(id, path.to_path_buf(), title, content, category, now)
    }

    fn write_and_insert(
        &mut self,
        id: NoteId,
        path: PathBuf,
        title: &str,
        content: &str,
        category: Category,
        now: OffsetDateTime,
    ) -> Result<NoteId, StoreError> {
        let note = Note {
            id: id.clone(),
            title: title.to_string(),
            content: content.to_string(),
            category,
            pinned: self.notes.get(&id).map(|n| n.pinned).unwrap_or(false),
            saved_at: Some(now),
            path: path.clone(),
        };
        fs::write(&path, note.rendered()).map_err(|err| StoreError::io(&path, err))?;
        self.notes.insert(id.clone(), note);
        Ok(id)
    }

    /// Reads a file into a new in-memory note. A metadata header, when
    /// present, is stripped from the content; its absence is not an error.
    pub fn load(&mut self, path: &Path) -> Result<Note, StoreError> {
        let raw = fs::read_to_string(path).map_err(|err| StoreError::io(path, err))?;
        let id = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string());
        let (parsed_title, parsed_category) = filename::parse(&id);
        let (header, content) = split_header(&raw);
        let note = Note {
            id: id.clone(),
            title: parsed_title,
            content: content.to_string(),
            category: header
                .as_ref()
                .map(|h| h.category)
                .unwrap_or(parsed_category),
            pinned: false,
            saved_at: header.map(|h| h.saved_at),
            path: path.to_path_buf(),
        };
        self.notes.insert(id, note.clone());
        Ok(note)
    }

    /// Removes the backing file (a missing file is fine) and the in-memory
    /// entry. Unknown identifiers are a no-op.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let Some(note) = self.notes.get(id) else {
            return Ok(());
        };
        remove_file_if_present(&note.path)?;
        self.notes.shift_remove(id);
        Ok(())
    }

    /// Best-effort bulk delete: every in-memory entry is dropped; a file that
    /// refuses to unlink is logged and skipped, never rolled back.
    pub fn delete_all(&mut self) -> usize {
        let drained: Vec<Note> = self.notes.drain(..).map(|(_, note)| note).collect();
        let count = drained.len();
        for note in drained {
            if let Err(err) = remove_file_if_present(&note.path) {
                tracing::warn!(?err, id = %note.id, "could not remove note file during delete-all");
            }
        }
        count
    }

    /// Replaces every occurrence of `query` (case-insensitive) in one note's
    /// content and rewrites its backing file. Returns the number of matches
    /// replaced; zero matches leave the note and its file untouched.
    pub fn replace_in_note(
        &mut self,
        id: &str,
        query: &str,
        replacement: &str,
    ) -> Result<usize, StoreError> {
        let Some(regex) = crate::highlight::build_highlight_regex(query) else {
            return Ok(0);
        };
        let Some(note) = self.notes.get(id) else {
            return Ok(0);
        };
        let count = regex.find_iter(&note.content).count();
        if count == 0 {
            return Ok(0);
        }
        let rewritten = regex
            .replace_all(&note.content, regex::NoExpand(replacement))
            .into_owned();
        let title = note.title.clone();
        let category = note.category;
        self.save(Some(id), &title, &rewritten, category)?;
        Ok(count)
    }

    /// Lazy, restartable sequence of notes whose identifier or content
    /// contains `query` (case-insensitive). An empty query matches all.
    pub fn search<'a>(&'a self, query: &str) -> Matches<'a> {
        Matches {
            inner: self.notes.values(),
            query: query.to_lowercase(),
        }
    }

    /// Bundles every note's rendered content into a single zip archive.
    pub fn export_all(&self, path: &Path) -> anyhow::Result<usize> {
        crate::export::archive::write_zip(self.iter(), path)
    }

    /// Ingests any `.txt` file in the notes directory that is not already in
    /// memory. Unreadable entries are skipped with a warning.
    pub fn reconcile(&mut self) -> Result<usize, StoreError> {
        let dir = fs::read_dir(&self.notes_dir).map_err(|err| StoreError::io(&self.notes_dir, err))?;
        let mut ingested = 0usize;
        for entry in dir {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(?err, "skipping unreadable notes directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(filename::NOTE_EXTENSION)
            {
                continue;
            }
            let already_known = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| self.notes.contains_key(name))
                .unwrap_or(false);
            if already_known {
                continue;
            }
            match self.load(&path) {
                Ok(_) => ingested += 1,
                Err(err) => {
                    tracing::warn!(?err, path = %path.display(), "skipping unreadable note file");
                }
            }
        }
        Ok(ingested)
    }
}

fn remove_file_if_present(path: &Path) -> Result<(), StoreError> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(StoreError::io(path, err)),
    }
}

/// Iterator over notes matching a query. Cloning restarts the scan from the
/// beginning.
#[derive(Clone)]
pub struct Matches<'a> {
    inner: indexmap::map::Values<'a, NoteId, Note>,
    query: String,
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a Note;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .by_ref()
            .find(|note| search::note_matches(&self.query, &note.id, &note.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    fn open_store(temp: &TempDir) -> NoteStore {
        NoteStore::open(temp.path().join("notes")).expect("open store")
    }

    #[test]
    fn save_then_load_round_trips_content() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        let id = store.save(None, "Round Trip", "alpha\nbeta\n", Category::Personal)?;
        let path = store.get(&id).expect("note present").path.clone();

        let mut fresh = open_store(&temp);
        let note = fresh.load(&path)?;
        assert_eq!(note.content, "alpha\nbeta\n");
        assert_eq!(note.category, Category::Personal);
        Ok(())
    }

    #[test]
    fn create_touches_neither_map_nor_disk() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let store = open_store(&temp);
        let draft = store.create("Scratch", Category::Ideas);

        assert!(draft.saved_at.is_none());
        assert!(draft.content.is_empty());
        assert!(store.is_empty());
        assert_eq!(std::fs::read_dir(store.notes_dir())?.count(), 0);
        Ok(())
    }

    #[test]
    fn save_rejects_blank_content() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        let result = store.save(None, "Empty", "   \n", Category::General);
        assert_matches!(result, Err(StoreError::EmptyContent));
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn save_with_hint_reuses_backing_file() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        let id = store.save(None, "Draft", "first", Category::General)?;
        let id_again = store.save(Some(&id), "Draft", "second", Category::General)?;
        assert_eq!(id, id_again);
        assert_eq!(store.len(), 1);

        let on_disk: Vec<_> = std::fs::read_dir(store.notes_dir())?
            .filter_map(|entry| entry.ok())
            .collect();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(store.get(&id).expect("note").content, "second");
        Ok(())
    }

    #[test]
    fn delete_removes_entry_and_file_and_stays_deleted() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        let id = store.save(None, "Doomed", "body", Category::General)?;
        let path = store.get(&id).expect("note").path.clone();

        store.delete(&id)?;
        assert!(!store.contains(&id));
        assert!(!path.exists());

        // Reconciling must not resurrect it.
        let ingested = store.reconcile()?;
        assert_eq!(ingested, 0);
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn delete_unknown_id_is_noop() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        store.delete("no-such-note.txt")?;
        Ok(())
    }

    #[test]
    fn delete_all_clears_map_even_when_a_file_is_gone() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        let first = store.save(None, "One", "alpha", Category::General)?;
        store.save(None, "Two", "beta", Category::Work)?;
        store.save(None, "Three", "gamma", Category::Ideas)?;

        // Simulate an external removal; delete_all must carry on regardless.
        let gone = store.get(&first).expect("note").path.clone();
        std::fs::remove_file(&gone)?;

        let removed = store.delete_all();
        assert_eq!(removed, 3);
        assert!(store.is_empty());
        let remaining = std::fs::read_dir(store.notes_dir())?.count();
        assert_eq!(remaining, 0);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn delete_all_skips_files_that_refuse_to_unlink() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);

        // A path routed through a regular file cannot be unlinked; the error
        // is not NotFound, so the skip branch has to run.
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "plain file")?;
        let mut stuck = Note::draft("Stuck", Category::General);
        stuck.id = "stuck.txt".into();
        stuck.path = blocker.join("stuck.txt");
        store.notes.insert(stuck.id.clone(), stuck);

        let first = store.save(None, "One", "alpha", Category::General)?;
        let second = store.save(None, "Two", "beta", Category::Work)?;
        let first_path = store.get(&first).expect("note").path.clone();
        let second_path = store.get(&second).expect("note").path.clone();

        let removed = store.delete_all();
        assert_eq!(removed, 3);
        assert!(store.is_empty());
        // The failing entry did not stop the deletes queued after it.
        assert!(!first_path.exists());
        assert!(!second_path.exists());
        assert_eq!(std::fs::read_dir(store.notes_dir())?.count(), 0);
        Ok(())
    }

    #[test]
    fn replace_rewrites_every_match_and_the_backing_file() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        let id = store.save(None, "Renames", "Alpha beta\nalpha ALPHA end", Category::General)?;

        let replaced = store.replace_in_note(&id, "alpha", "omega")?;
        assert_eq!(replaced, 3);
        let path = store.get(&id).expect("note").path.clone();
        assert_eq!(
            store.get(&id).expect("note").content,
            "omega beta\nomega omega end"
        );

        let mut fresh = open_store(&temp);
        let reloaded = fresh.load(&path)?;
        assert_eq!(reloaded.content, "omega beta\nomega omega end");
        Ok(())
    }

    #[test]
    fn replace_without_matches_leaves_the_note_alone() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        let id = store.save(None, "Quiet", "nothing to see", Category::General)?;

        assert_eq!(store.replace_in_note(&id, "missing", "x")?, 0);
        assert_eq!(store.replace_in_note(&id, "   ", "x")?, 0);
        assert_eq!(store.get(&id).expect("note").content, "nothing to see");
        Ok(())
    }

    #[test]
    fn replace_refuses_to_blank_a_note() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        let id = store.save(None, "Short", "word", Category::General)?;

        let result = store.replace_in_note(&id, "word", "");
        assert_matches!(result, Err(StoreError::EmptyContent));
        assert_eq!(store.get(&id).expect("note").content, "word");
        Ok(())
    }

    #[test]
    fn reconcile_ingests_foreign_files() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        std::fs::write(store.notes_dir().join("dropped_in.txt"), "external body")?;
        std::fs::write(store.notes_dir().join("ignored.md"), "not a note")?;

        let ingested = store.reconcile()?;
        assert_eq!(ingested, 1);
        let note = store.get("dropped_in.txt").expect("ingested note");
        assert_eq!(note.content, "external body");
        Ok(())
    }

    #[test]
    fn search_empty_query_matches_all() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        store.save(None, "One", "alpha", Category::General)?;
        store.save(None, "Two", "beta", Category::General)?;
        assert_eq!(store.search("").count(), 2);
        Ok(())
    }

    #[test]
    fn search_finds_single_content_hit() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        store.save(None, "One", "nothing here", Category::General)?;
        let target = store.save(None, "Two", "the NEEDLE lives here", Category::General)?;
        store.save(None, "Three", "also nothing", Category::General)?;

        let hits: Vec<_> = store.search("needle").map(|note| note.id.clone()).collect();
        assert_eq!(hits, vec![target]);

        // Restartable: a cloned iterator scans from the start again.
        let matches = store.search("needle");
        let restarted = matches.clone();
        assert_eq!(matches.count(), restarted.count());
        Ok(())
    }

    #[test]
    fn snapshot_orders_pinned_first() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        store.save(None, "Plain", "body", Category::General)?;
        let pinned = store.save(None, "Starred", "body", Category::General)?;
        assert!(store.set_pinned(&pinned, true));

        let ordered: Vec<_> = store.snapshot().iter().map(|n| n.id.clone()).collect();
        assert_eq!(ordered[0], pinned);
        Ok(())
    }

    #[test]
    fn save_as_tracks_note_outside_notes_dir() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = open_store(&temp);
        let target = temp.path().join("elsewhere.txt");
        let id = store.save_as(&target, "Elsewhere", "content", Category::Code)?;
        assert_eq!(id, "elsewhere.txt");
        assert!(target.exists());
        assert!(store.contains("elsewhere.txt"));
        Ok(())
    }
}
