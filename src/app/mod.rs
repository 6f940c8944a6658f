use std::io::Stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::ListState;
use ratatui::Terminal;

use crate::config::{AppConfig, ConfigPaths};
use crate::format::StyleFlags;
use crate::journaling::{AutoSaveEvent, AutoSaveRuntime};
use crate::store::NoteStore;
use crate::ui;

mod actions;
pub mod state;

pub use state::{
    AppState, EditorState, ExportKind, FocusPane, NoteSummary, OverlayState, TextCounts,
};

use actions::ActionDispatcher;

enum Action {
    Quit,
    SelectNext,
    SelectPrevious,
    ToggleFocus,
    Refresh,
    NewNote,
    EnterEdit,
    StartSearch,
    ReplaceMatches,
    TogglePin,
    DeleteNote,
    DeleteAll,
    LoadNote,
    ExportArchive,
    ExportPdf,
    ToggleTheme,
    ManualSave,
}

pub struct App {
    pub config: Arc<AppConfig>,
    pub store: NoteStore,
    export_dir: PathBuf,
    state: AppState,
    list_state: ListState,
    should_quit: bool,
    tick_rate: Duration,
    auto_save: AutoSaveRuntime,
}

impl App {
    pub fn new(config: Arc<AppConfig>, store: NoteStore, paths: &ConfigPaths) -> Self {
        let preview_lines = config.preview_lines as usize;
        let mut state = AppState::load(&store, preview_lines, config.theme);
        let mut list_state = ListState::default();
        if !state.is_empty() {
            list_state.select(Some(state.selected));
        }
        let auto_save = AutoSaveRuntime::new(&config.auto_save);
        state.set_autosave_status(auto_save.status());
        Self {
            config,
            store,
            export_dir: paths.export_dir.clone(),
            state,
            list_state,
            should_quit: false,
            tick_rate: Duration::from_millis(250),
            auto_save,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        loop {
            terminal
                .draw(|frame| {
                    if !self.state.is_empty() {
                        self.list_state.select(Some(self.state.selected));
                    } else {
                        self.list_state.select(None);
                    }
                    ui::draw_app(frame, &self.state, &mut self.list_state);
                })
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(0));

            if event::poll(timeout).context("polling for terminal events")? {
                match event::read().context("reading terminal event")? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(_, _) => {
                        // no-op: next draw will naturally adapt to the new size
                    }
                    _ => {}
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                self.on_tick();
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    fn on_tick(&mut self) {
        if let Some(event) = self.auto_save.poll(&mut self.store) {
            self.handle_autosave_event(event);
        }
        self.state.set_autosave_status(self.auto_save.status());
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.handle_overlay_key(key) {
            return;
        }

        if self.state.is_editing() && self.handle_editor_key(key) {
            return;
        }

        if self.state.is_search_active() {
            match key.code {
                KeyCode::Esc => {
                    self.state.cancel_search(&self.store);
                    return;
                }
                KeyCode::Enter => {
                    self.state.finish_search();
                    return;
                }
                KeyCode::Backspace => {
                    self.state.pop_search_char(&self.store);
                    return;
                }
                KeyCode::Char(ch) if plain(key) => {
                    self.state.push_search_char(&self.store, ch);
                    return;
                }
                _ => {}
            }
        }

        let action = match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrevious),
            KeyCode::Tab => Some(Action::ToggleFocus),
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Refresh)
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::ManualSave)
            }
            KeyCode::Char('a') if plain(key) => Some(Action::NewNote),
            KeyCode::Char('e') if plain(key) => Some(Action::EnterEdit),
            KeyCode::Char('p') if plain(key) => Some(Action::TogglePin),
            KeyCode::Char('d') if plain(key) => Some(Action::DeleteNote),
            KeyCode::Char('D') => Some(Action::DeleteAll),
            KeyCode::Char('o') if plain(key) => Some(Action::LoadNote),
            KeyCode::Char('z') if plain(key) => Some(Action::ExportArchive),
            KeyCode::Char('x') if plain(key) => Some(Action::ExportPdf),
            KeyCode::Char('t') if plain(key) => Some(Action::ToggleTheme),
            KeyCode::Char('/') if plain(key) => Some(Action::StartSearch),
            KeyCode::Char('R') => Some(Action::ReplaceMatches),
            _ => None,
        };

        if let Some(action) = action {
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: Action) {
        if self.state.is_editing() {
            match action {
                Action::ManualSave | Action::Quit | Action::ToggleTheme => {}
                _ => {
                    self.state.set_status_message(Some(
                        "Finish editing (Esc to exit, Ctrl-s to save) before performing other actions.",
                    ));
                    return;
                }
            }
        }
        match action {
            Action::Quit => {
                if self.state.is_editing() && !self.exit_editing() {
                    return;
                }
                self.should_quit = true;
            }
            Action::SelectNext => self.state.move_selection(1),
            Action::SelectPrevious => self.state.move_selection(-1),
            Action::ToggleFocus => self.state.toggle_focus(),
            Action::Refresh => self.handle_refresh(),
            Action::NewNote => {
                if self.state.overlay().is_none() {
                    self.state.open_new_note(self.config.default_category);
                    self.state
                        .set_status_message(Some("Enter a title and press Enter"));
                }
            }
            Action::EnterEdit => self.handle_enter_edit(),
            Action::StartSearch => self.state.begin_search(),
            Action::ReplaceMatches => self.handle_replace_matches(),
            Action::TogglePin => self.handle_toggle_pin(),
            Action::DeleteNote => {
                if self.state.overlay().is_none() && self.state.selected().is_some() {
                    self.state.open_confirm_delete();
                    self.state
                        .set_status_message(Some("Delete note: Enter confirm \u{2022} Esc cancel"));
                } else if self.state.selected().is_none() {
                    self.state.set_status_message(Some("No note selected"));
                }
            }
            Action::DeleteAll => {
                if self.state.overlay().is_none() {
                    if self.store.is_empty() {
                        self.state.set_status_message(Some("No notes to delete"));
                    } else {
                        self.state.open_confirm_delete_all();
                        self.state.set_status_message(Some(
                            "Delete ALL notes: Enter confirm \u{2022} Esc cancel",
                        ));
                    }
                }
            }
            Action::LoadNote => {
                if self.state.overlay().is_none() {
                    self.state.open_load_path();
                    self.state
                        .set_status_message(Some("Enter a file path to load"));
                }
            }
            Action::ExportArchive => {
                if self.state.overlay().is_none() {
                    if self.store.is_empty() {
                        self.state.set_status_message(Some("No notes to export"));
                        return;
                    }
                    let suggested = self.export_dir.join("notes.zip").display().to_string();
                    self.state.open_export(ExportKind::Archive, suggested);
                }
            }
            Action::ExportPdf => {
                if self.state.overlay().is_none() {
                    let Some(note) = self.state.selected() else {
                        self.state.set_status_message(Some("No note selected"));
                        return;
                    };
                    let file_name = format!("{}.pdf", note.id.trim_end_matches(".txt"));
                    let suggested = self.export_dir.join(file_name).display().to_string();
                    self.state.open_export(ExportKind::Pdf, suggested);
                }
            }
            Action::ToggleTheme => {
                let theme = self.state.toggle_theme();
                self.state
                    .set_status_message(Some(format!("Theme: {theme:?}")));
            }
            Action::ManualSave => self.handle_manual_save(),
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) -> bool {
        match self.state.overlay() {
            Some(OverlayState::NewNote(_)) => {
                match key.code {
                    KeyCode::Esc => {
                        self.state.close_overlay();
                        self.state.set_status_message(Some("Canceled new note"));
                    }
                    KeyCode::Enter => self.submit_new_note(),
                    KeyCode::Tab => {
                        if let Some(draft) = self.state.new_note_overlay_mut() {
                            draft.category = draft.category.next();
                        }
                    }
                    KeyCode::Backspace => {
                        if let Some(draft) = self.state.new_note_overlay_mut() {
                            draft.title.pop();
                        }
                    }
                    KeyCode::Char(ch) if plain(key) => {
                        if let Some(draft) = self.state.new_note_overlay_mut() {
                            if draft.title.len() < 120 {
                                draft.title.push(ch);
                            }
                        }
                    }
                    _ => {}
                }
                true
            }
            Some(OverlayState::LoadPath(_)) => {
                match key.code {
                    KeyCode::Esc => {
                        self.state.close_overlay();
                        self.state.set_status_message(Some("Load canceled"));
                    }
                    KeyCode::Enter => self.submit_load_note(),
                    KeyCode::Backspace => {
                        if let Some(prompt) = self.state.load_path_overlay_mut() {
                            prompt.input.pop();
                        }
                    }
                    KeyCode::Char(ch) if plain(key) => {
                        if let Some(prompt) = self.state.load_path_overlay_mut() {
                            prompt.input.push(ch);
                        }
                    }
                    _ => {}
                }
                true
            }
            Some(OverlayState::ConfirmDelete(_)) => {
                match key.code {
                    KeyCode::Esc => {
                        self.state.close_overlay();
                        self.state.set_status_message(Some("Delete canceled"));
                    }
                    KeyCode::Enter => self.submit_delete_note(),
                    _ => {}
                }
                true
            }
            Some(OverlayState::ConfirmDeleteAll) => {
                match key.code {
                    KeyCode::Esc => {
                        self.state.close_overlay();
                        self.state.set_status_message(Some("Delete all canceled"));
                    }
                    KeyCode::Enter => self.submit_delete_all(),
                    _ => {}
                }
                true
            }
            Some(OverlayState::Export(_)) => {
                match key.code {
                    KeyCode::Esc => {
                        self.state.close_overlay();
                        self.state.set_status_message(Some("Export canceled"));
                    }
                    KeyCode::Enter => self.submit_export(),
                    KeyCode::Backspace => {
                        if let Some(prompt) = self.state.export_overlay_mut() {
                            prompt.input.pop();
                        }
                    }
                    KeyCode::Char(ch) if plain(key) => {
                        if let Some(prompt) = self.state.export_overlay_mut() {
                            prompt.input.push(ch);
                        }
                    }
                    _ => {}
                }
                true
            }
            Some(OverlayState::Replace(_)) => {
                match key.code {
                    KeyCode::Esc => {
                        self.state.close_overlay();
                        self.state.set_status_message(Some("Replace canceled"));
                    }
                    KeyCode::Enter => self.submit_replace(),
                    KeyCode::Backspace => {
                        if let Some(prompt) = self.state.replace_overlay_mut() {
                            prompt.input.pop();
                        }
                    }
                    KeyCode::Char(ch) if plain(key) => {
                        if let Some(prompt) = self.state.replace_overlay_mut() {
                            prompt.input.push(ch);
                        }
                    }
                    _ => {}
                }
                true
            }
            None => false,
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => {
                    self.handle_manual_save();
                    return true;
                }
                KeyCode::Char('b') => {
                    if let Some(editor) = self.state.editor_mut() {
                        editor.toggle_style(StyleFlags::BOLD);
                    }
                    return true;
                }
                KeyCode::Char('k') => {
                    if let Some(editor) = self.state.editor_mut() {
                        editor.toggle_style(StyleFlags::ITALIC);
                    }
                    return true;
                }
                KeyCode::Char('u') => {
                    if let Some(editor) = self.state.editor_mut() {
                        editor.toggle_style(StyleFlags::UNDERLINE);
                    }
                    return true;
                }
                KeyCode::Char('l') => {
                    if let Some(editor) = self.state.editor_mut() {
                        editor.cycle_alignment();
                    }
                    return true;
                }
                KeyCode::Up => {
                    if let Some(editor) = self.state.editor_mut() {
                        editor.adjust_font_size(1);
                    }
                    return true;
                }
                KeyCode::Down => {
                    if let Some(editor) = self.state.editor_mut() {
                        editor.adjust_font_size(-1);
                    }
                    return true;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Esc => {
                if self.exit_editing() {
                    self.state.set_status_message(Some("Exited edit mode"));
                }
                true
            }
            KeyCode::Enter => {
                self.apply_editor_change(|editor| {
                    editor.insert_newline();
                    true
                });
                true
            }
            KeyCode::Backspace => {
                self.apply_editor_change(|editor| editor.backspace());
                true
            }
            KeyCode::Delete => {
                self.apply_editor_change(|editor| editor.delete());
                true
            }
            KeyCode::Tab => {
                self.apply_editor_change(|editor| {
                    editor.insert_char('\t');
                    true
                });
                true
            }
            KeyCode::Char(ch) if plain(key) => {
                self.apply_editor_change(|editor| {
                    editor.insert_char(ch);
                    true
                });
                true
            }
            KeyCode::Left => {
                if let Some(editor) = self.state.editor_mut() {
                    editor.move_left();
                }
                true
            }
            KeyCode::Right => {
                if let Some(editor) = self.state.editor_mut() {
                    editor.move_right();
                }
                true
            }
            KeyCode::Up => {
                if let Some(editor) = self.state.editor_mut() {
                    editor.move_up();
                }
                true
            }
            KeyCode::Down => {
                if let Some(editor) = self.state.editor_mut() {
                    editor.move_down();
                }
                true
            }
            KeyCode::Home => {
                if let Some(editor) = self.state.editor_mut() {
                    editor.move_home();
                }
                true
            }
            KeyCode::End => {
                if let Some(editor) = self.state.editor_mut() {
                    editor.move_end();
                }
                true
            }
            _ => false,
        }
    }

    fn apply_editor_change<F>(&mut self, f: F)
    where
        F: FnOnce(&mut EditorState) -> bool,
    {
        let changed = match self.state.editor_mut() {
            Some(editor) => f(editor),
            None => return,
        };
        if changed {
            if let Some(editor) = self.state.editor() {
                self.auto_save.update_buffer(editor.buffer());
            }
            self.state.set_autosave_status(self.auto_save.status());
        }
    }

    fn submit_new_note(&mut self) {
        let Some((title, category)) = self
            .state
            .new_note_overlay_mut()
            .map(|draft| (draft.title.trim().to_string(), draft.category))
        else {
            return;
        };
        if title.is_empty() {
            self.state.set_status_message(Some("Title cannot be empty"));
            return;
        }
        self.state.close_overlay();
        let note = self.store.create(&title, category);
        self.auto_save
            .start_session(&note.title, note.category, None, &note.content);
        self.state
            .begin_editor(note.title, note.category, None, note.content);
        self.state.set_autosave_status(self.auto_save.status());
        self.state.set_status_message(Some(
            "New note: type content \u{2022} Esc exit \u{2022} Ctrl-s save",
        ));
    }

    fn submit_load_note(&mut self) {
        let Some(input) = self
            .state
            .load_path_overlay_mut()
            .map(|prompt| prompt.input.trim().to_string())
        else {
            return;
        };
        if input.is_empty() {
            self.state.set_status_message(Some("Path cannot be empty"));
            return;
        }
        let path = PathBuf::from(&input);
        let mut dispatcher = ActionDispatcher::new(&mut self.store);
        match dispatcher.load_external(&path) {
            Ok(note_id) => {
                self.state.close_overlay();
                self.state.refresh(&self.store);
                self.state.select_note_by_id(&note_id);
                self.state
                    .set_status_message(Some(format!("Loaded {note_id}")));
            }
            Err(err) => {
                tracing::error!(?err, path = %path.display(), "failed to load note");
                self.state
                    .set_status_message(Some(format!("Load failed: {err:#}")));
            }
        }
    }

    fn submit_delete_note(&mut self) {
        let Some(confirm) = self.state.confirm_delete_overlay() else {
            return;
        };
        let note_id = confirm.note_id.clone();
        let mut dispatcher = ActionDispatcher::new(&mut self.store);
        match dispatcher.delete(&note_id) {
            Ok(()) => {
                self.state.close_overlay();
                self.state.refresh(&self.store);
                self.state.set_status_message(Some("Note deleted"));
            }
            Err(err) => {
                tracing::error!(?err, %note_id, "failed to delete note");
                self.state.set_status_message(Some("Failed to delete note"));
            }
        }
    }

    fn submit_delete_all(&mut self) {
        let mut dispatcher = ActionDispatcher::new(&mut self.store);
        let count = dispatcher.delete_all();
        self.state.close_overlay();
        self.state.refresh(&self.store);
        self.state
            .set_status_message(Some(format!("Deleted {count} note(s)")));
    }

    fn submit_export(&mut self) {
        let Some((kind, input)) = self
            .state
            .export_overlay()
            .map(|prompt| (prompt.kind, prompt.input.trim().to_string()))
        else {
            return;
        };
        if input.is_empty() {
            self.state.set_status_message(Some("Path cannot be empty"));
            return;
        }
        let path = PathBuf::from(&input);
        match kind {
            ExportKind::Archive => {
                let dispatcher = ActionDispatcher::new(&mut self.store);
                match dispatcher.export_archive(&path) {
                    Ok(count) => {
                        self.state.close_overlay();
                        self.state
                            .set_status_message(Some(format!("Exported {count} note(s)")));
                    }
                    Err(err) => {
                        tracing::error!(?err, path = %path.display(), "archive export failed");
                        self.state
                            .set_status_message(Some(format!("Export failed: {err:#}")));
                    }
                }
            }
            ExportKind::Pdf => {
                let Some(note_id) = self.state.selected_note_id() else {
                    self.state.set_status_message(Some("No note selected"));
                    return;
                };
                let options = self.config.export.clone();
                let dispatcher = ActionDispatcher::new(&mut self.store);
                match dispatcher.export_pdf(&note_id, &path, &options) {
                    Ok(()) => {
                        self.state.close_overlay();
                        self.state
                            .set_status_message(Some(format!("PDF written to {input}")));
                    }
                    Err(err) => {
                        tracing::error!(?err, %note_id, "pdf export failed");
                        self.state
                            .set_status_message(Some(format!("Export failed: {err:#}")));
                    }
                }
            }
        }
    }

    fn handle_replace_matches(&mut self) {
        if self.state.overlay().is_some() {
            return;
        }
        let query = self.state.search.query.trim().to_string();
        if query.is_empty() {
            self.state
                .set_status_message(Some("Search first (/) to mark what to replace"));
            return;
        }
        let Some(note_id) = self.state.selected_note_id() else {
            self.state.set_status_message(Some("No note selected"));
            return;
        };
        self.state.open_replace(note_id, query);
        self.state
            .set_status_message(Some("Type the replacement and press Enter"));
    }

    fn submit_replace(&mut self) {
        let Some((note_id, query, replacement)) = self
            .state
            .replace_overlay()
            .map(|prompt| (prompt.note_id.clone(), prompt.query.clone(), prompt.input.clone()))
        else {
            return;
        };
        let mut dispatcher = ActionDispatcher::new(&mut self.store);
        match dispatcher.replace(&note_id, &query, &replacement) {
            Ok(0) => {
                self.state.close_overlay();
                self.state
                    .set_status_message(Some(format!("No matches for '{query}'")));
            }
            Ok(count) => {
                self.state.close_overlay();
                self.state.refresh(&self.store);
                self.state.select_note_by_id(&note_id);
                self.state
                    .set_status_message(Some(format!("Replaced {count} match(es)")));
            }
            Err(err) => {
                tracing::error!(?err, %note_id, "replace failed");
                self.state
                    .set_status_message(Some(format!("Replace failed: {err:#}")));
            }
        }
    }

    fn handle_refresh(&mut self) {
        match self.store.reconcile() {
            Ok(found) => {
                self.state.refresh(&self.store);
                if found > 0 {
                    self.state
                        .set_status_message(Some(format!("Picked up {found} new file(s)")));
                } else {
                    self.state.set_status_message(Some("Refreshed"));
                }
            }
            Err(err) => {
                tracing::error!(?err, "failed to rescan notes directory");
                self.state.set_status_message(Some("Refresh failed"));
            }
        }
    }

    fn handle_toggle_pin(&mut self) {
        let Some(note) = self.state.selected() else {
            self.state.set_status_message(Some("No note selected"));
            return;
        };
        let note_id = note.id.clone();
        let should_pin = !note.pinned;
        let mut dispatcher = ActionDispatcher::new(&mut self.store);
        if !dispatcher.toggle_pin(&note_id, should_pin) {
            self.state
                .set_status_message(Some("Failed to update pin state"));
            return;
        }
        self.state.refresh(&self.store);
        self.state.select_note_by_id(&note_id);
        let message = if should_pin {
            "Note pinned"
        } else {
            "Note unpinned"
        };
        self.state.set_status_message(Some(message));
    }

    fn handle_enter_edit(&mut self) {
        if self.state.is_editing() {
            self.state
                .set_status_message(Some("Already editing; press Esc to exit edit mode"));
            return;
        }
        let Some(note) = self.state.selected().cloned() else {
            self.state.set_status_message(Some("No note selected"));
            return;
        };
        self.auto_save
            .start_session(&note.title, note.category, Some(note.id.clone()), &note.content);
        self.state
            .begin_editor(note.title, note.category, Some(note.id), note.content);
        self.state.set_autosave_status(self.auto_save.status());
        self.state.set_status_message(Some(
            "Editing note: type to modify \u{2022} Esc exit \u{2022} Ctrl-s save",
        ));
    }

    fn handle_manual_save(&mut self) {
        if !self.state.is_editing() {
            self.state
                .set_status_message(Some("Manual save is only available while editing"));
            return;
        }
        match self.auto_save.flush_now(&mut self.store) {
            Some(event) => {
                let was_saved = matches!(event, AutoSaveEvent::Saved { .. });
                self.handle_autosave_event(event);
                if was_saved {
                    self.state.set_status_message(Some("Changes saved"));
                }
            }
            None => {
                self.state
                    .set_status_message(Some("Nothing to save (note is empty)"));
            }
        }
        self.state.set_autosave_status(self.auto_save.status());
    }

    fn exit_editing(&mut self) -> bool {
        let dirty = self
            .state
            .editor()
            .map(|editor| editor.dirty)
            .unwrap_or(false);
        if dirty {
            if let Some(AutoSaveEvent::Error { message }) = self.auto_save.flush_now(&mut self.store)
            {
                self.state.set_status_message(Some(format!(
                    "Failed to save changes: {message}; still in edit mode"
                )));
                return false;
            }
        }
        let saved_id = self.auto_save.end_session();
        self.state.close_editor();
        self.state.refresh(&self.store);
        if let Some(note_id) = saved_id {
            self.state.select_note_by_id(&note_id);
        }
        self.state.set_autosave_status(self.auto_save.status());
        true
    }

    fn handle_autosave_event(&mut self, event: AutoSaveEvent) {
        match event {
            AutoSaveEvent::Saved { note_id, .. } => {
                if let Some(editor) = self.state.editor_mut() {
                    editor.mark_saved(note_id);
                }
            }
            AutoSaveEvent::Error { message } => {
                self.state
                    .set_status_message(Some(format!("Autosave error: {message}")));
            }
        }
        self.state.set_autosave_status(self.auto_save.status());
    }
}

fn plain(key: KeyEvent) -> bool {
    !key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("restoring screen state")?;
    Ok(())
}
