use std::time::{Duration, Instant};

use time::OffsetDateTime;

use crate::config::AutoSaveConfig;
use crate::store::{Category, NoteId, NoteStore, StoreError};

#[derive(Debug, Clone)]
pub enum AutoSaveStatus {
    Disabled,
    Inactive,
    Idle {
        note_id: Option<NoteId>,
        last_saved_at: Option<OffsetDateTime>,
    },
    Error {
        message: String,
        occurred_at: OffsetDateTime,
    },
}

#[derive(Debug, Clone)]
pub enum AutoSaveEvent {
    Saved {
        note_id: NoteId,
        timestamp: OffsetDateTime,
    },
    Error {
        message: String,
    },
}

/// Periodic save task polled by the application event loop.
///
/// The session's backing file is chosen on the first successful tick and
/// reused for the rest of the session; a fresh session gets a fresh file.
/// Ticks with a whitespace-only buffer never touch the filesystem, and tick
/// failures are logged and swallowed with no retry.
#[derive(Debug)]
pub struct AutoSaveRuntime {
    enabled: bool,
    interval: Duration,
    session: Option<Session>,
}

#[derive(Debug)]
struct Session {
    title: String,
    category: Category,
    buffer: String,
    note_id: Option<NoteId>,
    last_tick: Instant,
    last_saved_at: Option<OffsetDateTime>,
    last_error: Option<Failure>,
}

#[derive(Debug, Clone)]
struct Failure {
    message: String,
    occurred_at: OffsetDateTime,
}

impl AutoSaveRuntime {
    pub fn new(config: &AutoSaveConfig) -> Self {
        Self {
            enabled: config.enabled,
            interval: Duration::from_secs(config.interval_secs),
            session: None,
        }
    }

    pub fn status(&self) -> AutoSaveStatus {
        if !self.enabled {
            return AutoSaveStatus::Disabled;
        }
        let Some(session) = &self.session else {
            return AutoSaveStatus::Inactive;
        };
        if let Some(failure) = &session.last_error {
            return AutoSaveStatus::Error {
                message: failure.message.clone(),
                occurred_at: failure.occurred_at,
            };
        }
        AutoSaveStatus::Idle {
            note_id: session.note_id.clone(),
            last_saved_at: session.last_saved_at,
        }
    }

    pub fn has_active_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_note_id(&self) -> Option<&NoteId> {
        self.session.as_ref().and_then(|s| s.note_id.as_ref())
    }

    /// Begins a session for a fresh or reopened note. Passing an existing
    /// identifier pins the session to that note's backing file from the
    /// start; otherwise the file is derived on the first successful save.
    pub fn start_session(
        &mut self,
        title: &str,
        category: Category,
        existing: Option<NoteId>,
        initial_buffer: &str,
    ) {
        self.session = Some(Session {
            title: title.to_string(),
            category,
            buffer: initial_buffer.to_string(),
            note_id: existing,
            last_tick: Instant::now(),
            last_saved_at: None,
            last_error: None,
        });
    }

    /// Ends the session; the next session starts with a fresh file.
    pub fn end_session(&mut self) -> Option<NoteId> {
        self.session.take().and_then(|session| session.note_id)
    }

    /// Mirrors the live editor buffer.
    pub fn update_buffer(&mut self, contents: &str) {
        if let Some(session) = self.session.as_mut() {
            if session.buffer != contents {
                session.buffer.clear();
                session.buffer.push_str(contents);
            }
        }
    }

    /// Tracks title/category edits. Only affects filename derivation while
    /// no backing file has been chosen yet; afterwards the file is fixed.
    pub fn update_metadata(&mut self, title: &str, category: Category) {
        if let Some(session) = self.session.as_mut() {
            session.title = title.to_string();
            session.category = category;
        }
    }

    /// Called from the event loop tick. Saves at most once per interval.
    pub fn poll(&mut self, store: &mut NoteStore) -> Option<AutoSaveEvent> {
        if !self.enabled {
            return None;
        }
        let due = self
            .session
            .as_ref()
            .map(|session| session.last_tick.elapsed() >= self.interval)
            .unwrap_or(false);
        if !due {
            return None;
        }
        self.save_session(store)
    }

    /// Manual save path: ignores the interval, still skips empty buffers.
    pub fn flush_now(&mut self, store: &mut NoteStore) -> Option<AutoSaveEvent> {
        if self.session.is_none() {
            return None;
        }
        self.save_session(store)
    }

    fn save_session(&mut self, store: &mut NoteStore) -> Option<AutoSaveEvent> {
        let session = self.session.as_mut()?;
        session.last_tick = Instant::now();
        if session.buffer.trim().is_empty() {
            return None;
        }
        let result: Result<NoteId, StoreError> = store.save(
            session.note_id.as_deref(),
            &session.title,
            &session.buffer,
            session.category,
        );
        let timestamp = OffsetDateTime::now_utc();
        match result {
            Ok(note_id) => {
                session.note_id = Some(note_id.clone());
                session.last_saved_at = Some(timestamp);
                session.last_error = None;
                Some(AutoSaveEvent::Saved { note_id, timestamp })
            }
            Err(err) => {
                // Swallowed by design: no retry, no dialog.
                tracing::warn!(?err, "autosave tick failed");
                let message = err.to_string();
                session.last_error = Some(Failure {
                    message: message.clone(),
                    occurred_at: timestamp,
                });
                Some(AutoSaveEvent::Error { message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    fn instant_config() -> AutoSaveConfig {
        AutoSaveConfig {
            enabled: true,
            interval_secs: 0,
        }
    }

    #[test]
    fn empty_buffer_tick_writes_nothing() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = NoteStore::open(temp.path().join("notes"))?;
        let mut runtime = AutoSaveRuntime::new(&instant_config());
        runtime.start_session("Untitled", Category::General, None, "");

        assert!(runtime.poll(&mut store).is_none());
        assert_eq!(std::fs::read_dir(store.notes_dir())?.count(), 0);
        Ok(())
    }

    #[test]
    fn session_reuses_one_file_across_ticks() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = NoteStore::open(temp.path().join("notes"))?;
        let mut runtime = AutoSaveRuntime::new(&instant_config());
        runtime.start_session("Draft", Category::Ideas, None, "first pass");

        let first = runtime.poll(&mut store);
        assert_matches!(first, Some(AutoSaveEvent::Saved { .. }));

        runtime.update_buffer("second pass");
        let second = runtime.poll(&mut store);
        assert_matches!(second, Some(AutoSaveEvent::Saved { .. }));

        assert_eq!(std::fs::read_dir(store.notes_dir())?.count(), 1);
        let id = runtime.session_note_id().expect("session file chosen").clone();
        assert_eq!(store.get(&id).expect("note").content, "second pass");
        Ok(())
    }

    #[test]
    fn new_session_gets_a_new_file() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = NoteStore::open(temp.path().join("notes"))?;
        let mut runtime = AutoSaveRuntime::new(&instant_config());

        runtime.start_session("First", Category::General, None, "one");
        runtime.poll(&mut store);
        let first_id = runtime.end_session().expect("first session saved");

        runtime.start_session("Second", Category::General, None, "two");
        runtime.poll(&mut store);
        let second_id = runtime.end_session().expect("second session saved");

        assert_ne!(first_id, second_id);
        assert_eq!(store.len(), 2);
        Ok(())
    }

    #[test]
    fn poll_respects_interval() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = NoteStore::open(temp.path().join("notes"))?;
        let config = AutoSaveConfig {
            enabled: true,
            interval_secs: 3600,
        };
        let mut runtime = AutoSaveRuntime::new(&config);
        runtime.start_session("Patient", Category::General, None, "content");

        assert!(runtime.poll(&mut store).is_none());
        // A manual flush does not wait for the interval.
        assert_matches!(
            runtime.flush_now(&mut store),
            Some(AutoSaveEvent::Saved { .. })
        );
        Ok(())
    }

    #[test]
    fn disabled_runtime_never_saves() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = NoteStore::open(temp.path().join("notes"))?;
        let config = AutoSaveConfig {
            enabled: false,
            interval_secs: 0,
        };
        let mut runtime = AutoSaveRuntime::new(&config);
        runtime.start_session("Idle", Category::General, None, "content");

        assert!(runtime.poll(&mut store).is_none());
        assert_matches!(runtime.status(), AutoSaveStatus::Disabled);
        Ok(())
    }

    #[test]
    fn editing_existing_note_updates_in_place() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let mut store = NoteStore::open(temp.path().join("notes"))?;
        let id = store.save(None, "Existing", "original", Category::Work)?;

        let mut runtime = AutoSaveRuntime::new(&instant_config());
        runtime.start_session("Existing", Category::Work, Some(id.clone()), "original");
        runtime.update_buffer("revised");
        runtime.poll(&mut store);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).expect("note").content, "revised");
        Ok(())
    }
}
