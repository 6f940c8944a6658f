use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::store::Note;

/// Bundles notes into one zip archive: one deflated entry per note, named by
/// its identifier, content written exactly as the backing file renders it.
pub fn write_zip<'a>(notes: impl Iterator<Item = &'a Note>, path: &Path) -> Result<usize> {
    let notes: Vec<&Note> = notes.collect();
    if notes.is_empty() {
        bail!("no notes to export");
    }

    let file = File::create(path)
        .with_context(|| format!("creating archive {}", path.display()))?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for note in &notes {
        writer
            .start_file(&note.id, options)
            .with_context(|| format!("starting archive entry {}", note.id))?;
        writer
            .write_all(note.rendered().as_bytes())
            .with_context(|| format!("writing archive entry {}", note.id))?;
    }
    writer.finish().context("finalising archive")?;
    Ok(notes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Category, NoteStore};
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    #[test]
    fn archive_contains_one_entry_per_note() -> Result<()> {
        let temp = TempDir::new()?;
        let mut store = NoteStore::open(temp.path().join("notes"))?;
        let first = store.save(None, "One", "alpha body", Category::General)?;
        let second = store.save(None, "Two", "beta body", Category::Work)?;

        let archive_path = temp.path().join("export.zip");
        let written = write_zip(store.iter(), &archive_path)?;
        assert_eq!(written, 2);

        let mut archive = ZipArchive::new(File::open(&archive_path)?)?;
        assert_eq!(archive.len(), 2);
        for id in [&first, &second] {
            let mut entry = archive.by_name(id)?;
            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            assert!(content.contains("body"));
        }
        Ok(())
    }

    #[test]
    fn empty_store_is_rejected_before_touching_disk() -> Result<()> {
        let temp = TempDir::new()?;
        let store = NoteStore::open(temp.path().join("notes"))?;
        let archive_path = temp.path().join("export.zip");
        assert!(write_zip(store.iter(), &archive_path).is_err());
        assert!(!archive_path.exists());
        Ok(())
    }
}
