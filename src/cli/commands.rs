use std::fmt::Write as _;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::app::App;
use crate::config::{AppConfig, ConfigPaths};
use crate::store::{Category, Note, NoteStore};

#[derive(Args, Debug, Clone)]
pub struct NewArgs {
    /// Title for the note (prompted if omitted)
    #[arg()]
    pub title: Option<String>,
    /// Provide the note content inline. If omitted, reads from stdin.
    #[arg(long)]
    pub content: Option<String>,
    /// Category for the note
    #[arg(long, default_value_t = Category::General)]
    pub category: Category,
    /// Pin the new note
    #[arg(long)]
    pub pin: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// Search terms, matched as a case-insensitive substring
    #[arg()]
    pub query: Vec<String>,
    /// Limit the number of results printed
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// File name of the note to delete
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteAllArgs {
    /// Confirm deleting every note
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Where to write the archive (defaults to the export directory)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportPdfArgs {
    /// File name of the note to export
    pub id: String,
    /// Where to write the PDF (defaults to the export directory)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn run_tui(app: &mut App) -> Result<()> {
    app.run()
}

pub fn new_note(config: Arc<AppConfig>, store: &mut NoteStore, args: NewArgs) -> Result<()> {
    let mut title = match args.title {
        Some(t) => t,
        None => prompt("Title")?,
    };
    title = title.trim().to_owned();
    if title.is_empty() {
        bail!("note title cannot be empty");
    }
    let content = if let Some(content) = args.content {
        content
    } else {
        read_stdin()?.unwrap_or_default()
    };
    let category = if args.category == Category::General {
        config.default_category
    } else {
        args.category
    };

    let note_id = store
        .save(None, &title, &content, category)
        .context("creating note")?;
    if args.pin {
        store.set_pinned(&note_id, true);
    }
    println!(
        "Created {note_id}{}",
        if args.pin { " (pinned)" } else { "" }
    );
    Ok(())
}

pub fn list_notes(store: &NoteStore) -> Result<()> {
    print!("{}", format_note_list(store.snapshot()));
    Ok(())
}

pub fn search_notes(store: &NoteStore, args: SearchArgs) -> Result<()> {
    let output = run_search(store, &args)?;
    print!("{output}");
    Ok(())
}

fn run_search(store: &NoteStore, args: &SearchArgs) -> Result<String> {
    let raw_query = args.query.join(" ");
    let trimmed = raw_query.trim();
    if trimmed.is_empty() {
        bail!("search query cannot be empty");
    }
    let matches: Vec<&Note> = store.search(trimmed).take(args.limit).collect();
    Ok(format_note_list(matches))
}

pub fn delete_note(store: &mut NoteStore, args: DeleteArgs) -> Result<()> {
    if !store.contains(&args.id) {
        bail!("note '{}' not found", args.id);
    }
    store
        .delete(&args.id)
        .with_context(|| format!("deleting note {}", args.id))?;
    println!("Deleted {}", args.id);
    Ok(())
}

pub fn delete_all_notes(store: &mut NoteStore, args: DeleteAllArgs) -> Result<()> {
    if !args.yes {
        bail!("refusing to delete all notes without --yes");
    }
    let count = store.delete_all();
    println!("Deleted {count} note(s)");
    Ok(())
}

pub fn export_archive(store: &NoteStore, paths: &ConfigPaths, args: ExportArgs) -> Result<()> {
    let target = args
        .output
        .unwrap_or_else(|| paths.export_dir.join("notes.zip"));
    let count = store
        .export_all(&target)
        .with_context(|| format!("writing archive to {}", target.display()))?;
    println!("Exported {count} note(s) to {}", target.display());
    Ok(())
}

pub fn export_pdf(
    store: &NoteStore,
    config: &AppConfig,
    paths: &ConfigPaths,
    args: ExportPdfArgs,
) -> Result<()> {
    let Some(note) = store.get(&args.id) else {
        bail!("note '{}' not found", args.id);
    };
    let target = args.output.unwrap_or_else(|| {
        let file_name = format!("{}.pdf", args.id.trim_end_matches(".txt"));
        paths.export_dir.join(file_name)
    });
    crate::export::pdf::write_pdf(
        &note.title,
        &note.content,
        &target,
        config.export.pdf_options(),
    )
    .with_context(|| format!("writing PDF to {}", target.display()))?;
    println!("Exported {} to {}", args.id, target.display());
    Ok(())
}

fn format_note_list(notes: Vec<&Note>) -> String {
    if notes.is_empty() {
        return "No notes found.\n".to_string();
    }
    let mut out = String::new();
    for note in notes {
        let mut headline = format!("{}  {}  [{}]", note.id, note.title, note.category);
        if note.pinned {
            headline.push_str("  [PINNED]");
        }
        let _ = writeln!(&mut out, "{headline}");
        if let Some(saved_at) = note.saved_at {
            let _ = writeln!(&mut out, "    saved {}", format_timestamp(saved_at));
        }
        if let Some(snippet) = build_snippet(&note.content, 2) {
            let _ = writeln!(&mut out, "    {snippet}");
        }
        out.push('\n');
    }
    out
}

fn build_snippet(content: &str, lines: usize) -> Option<String> {
    let mut segments = Vec::new();
    for line in content.lines().take(lines) {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            segments.push(trimmed.to_string());
        }
    }
    if segments.is_empty() {
        None
    } else {
        let snippet = segments.join(" ");
        Some(snippet.chars().take(160).collect())
    }
}

fn format_timestamp(dt: OffsetDateTime) -> String {
    dt.format(&Rfc3339)
        .unwrap_or_else(|_| dt.unix_timestamp().to_string())
}

fn prompt(label: &str) -> Result<String> {
    use std::io::Write;
    let mut stdout = io::stdout();
    write!(stdout, "{}: ", label)?;
    stdout.flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end().to_owned())
}

fn read_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_store() -> Result<(TempDir, NoteStore)> {
        let temp = TempDir::new().context("creating temp dir")?;
        let store = NoteStore::open(temp.path().join("notes"))?;
        Ok((temp, store))
    }

    #[test]
    fn cli_search_prints_hits_and_marks_pinned() -> Result<()> {
        let (_temp, mut store) = setup_store()?;
        let plan_id = store.save(None, "Project Plan", "timeline overview", Category::Work)?;
        store.set_pinned(&plan_id, true);
        store.save(None, "Misc Note", "just chatter", Category::General)?;

        let args = SearchArgs {
            query: vec!["timeline".into()],
            limit: 10,
        };
        let output = run_search(&store, &args)?;

        assert!(output.contains("Project Plan"));
        assert!(output.contains("[PINNED]"));
        assert!(!output.contains("Misc Note"));
        Ok(())
    }

    #[test]
    fn cli_search_rejects_blank_query() -> Result<()> {
        let (_temp, store) = setup_store()?;
        let args = SearchArgs {
            query: vec!["   ".into()],
            limit: 10,
        };
        assert!(run_search(&store, &args).is_err());
        Ok(())
    }

    #[test]
    fn cli_delete_all_requires_confirmation() -> Result<()> {
        let (_temp, mut store) = setup_store()?;
        store.save(None, "Keep", "content", Category::General)?;

        let err = delete_all_notes(&mut store, DeleteAllArgs { yes: false }).unwrap_err();
        assert!(err.to_string().contains("--yes"));
        assert_eq!(store.len(), 1);

        delete_all_notes(&mut store, DeleteAllArgs { yes: true })?;
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn cli_delete_reports_unknown_notes() -> Result<()> {
        let (_temp, mut store) = setup_store()?;
        let err = delete_note(
            &mut store,
            DeleteArgs {
                id: "missing.txt".into(),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("not found"));
        Ok(())
    }

    #[test]
    fn cli_export_writes_archive_to_chosen_path() -> Result<()> {
        let (temp, mut store) = setup_store()?;
        store.save(None, "Archived", "content", Category::General)?;
        let paths = test_paths(temp.path());
        let target = temp.path().join("out/backup.zip");
        std::fs::create_dir_all(temp.path().join("out"))?;

        export_archive(
            &store,
            &paths,
            ExportArgs {
                output: Some(target.clone()),
            },
        )?;
        assert!(target.exists());
        Ok(())
    }

    fn test_paths(root: &std::path::Path) -> ConfigPaths {
        ConfigPaths {
            config_dir: root.join("config"),
            config_file: root.join("config/config.toml"),
            data_dir: root.join("data"),
            notes_dir: root.join("data/notes"),
            export_dir: root.join("data/exports"),
            log_dir: root.join("state/logs"),
            state_dir: root.join("state"),
        }
    }
}
