pub mod app;
pub mod cli;
pub mod config;
pub mod export;
pub mod format;
pub mod highlight;
pub mod journaling;
pub mod search;
pub mod store;
pub mod ui;

pub use config::{AppConfig, ConfigLoader, ConfigPaths};
pub use store::{Category, Note, NoteId, NoteStore};
