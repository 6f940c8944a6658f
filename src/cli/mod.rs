use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::App;
use crate::config::ConfigLoader;
use crate::store::NoteStore;

pub mod commands;

use self::commands::{DeleteAllArgs, DeleteArgs, ExportArgs, ExportPdfArgs, NewArgs, SearchArgs};

#[derive(Parser, Debug)]
#[command(
    name = "notewell",
    version,
    about = "Terminal note-taking application backed by plain text files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over NOTEWELL_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over NOTEWELL_DATA)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive TUI (default)
    Tui,
    /// Create a new note from the command line
    New(NewArgs),
    /// List all notes
    List,
    /// Run a non-interactive search and print matching notes
    Search(SearchArgs),
    /// Delete a single note by its file name
    Delete(DeleteArgs),
    /// Delete every note
    DeleteAll(DeleteAllArgs),
    /// Export all notes into a zip archive
    Export(ExportArgs),
    /// Export one note as a PDF document
    ExportPdf(ExportPdfArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var("NOTEWELL_CONFIG", path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var("NOTEWELL_DATA", path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    let paths = loader.paths().clone();
    init_tracing(&cli.log_level)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let config = loader.load_or_init()?;
    let mut store = NoteStore::open(paths.notes_dir.clone())
        .with_context(|| format!("opening note store at {}", paths.notes_dir.display()))?;

    let config = Arc::new(config);
    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let mut app = App::new(config, store, &paths);
            commands::run_tui(&mut app)
        }
        Commands::New(args) => commands::new_note(config, &mut store, args),
        Commands::List => commands::list_notes(&store),
        Commands::Search(args) => commands::search_notes(&store, args),
        Commands::Delete(args) => commands::delete_note(&mut store, args),
        Commands::DeleteAll(args) => commands::delete_all_notes(&mut store, args),
        Commands::Export(args) => commands::export_archive(&store, &paths, args),
        Commands::ExportPdf(args) => commands::export_pdf(&store, &config, &paths, args),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(())
    })
    .map(|_| ())
}
