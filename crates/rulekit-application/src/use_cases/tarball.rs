//! Reproducible policy tarball writer
//!
//! Uses tar and flate2 with fixed header fields so identical rendered rules
//! always produce identical archive bytes.

use std::fs;
use std::path::{Path, PathBuf};

use flate2::{Compression, GzBuilder};
use rulekit_domain::{Error, Result};
use tar::{Builder, EntryType, Header};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Permission bits recorded for every archived file
const ENTRY_MODE: u32 = 0o644;

/// Archive every file under `source_dir` into a gzip tarball at `destination`
///
/// Entries are stored relative to `source_dir` in name order. The archive
/// is staged beside `destination` and only moved into place once complete;
/// on any error the destination is left untouched.
pub fn write_tarball(source_dir: &Path, destination: &Path) -> Result<()> {
    let parent = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = NamedTempFile::new_in(parent)?;
    let entries = collect_entries(source_dir)?;

    let encoder = GzBuilder::new()
        .mtime(0)
        .write(staged.as_file_mut(), Compression::default());
    let mut archive = Builder::new(encoder);

    for (name, path) in &entries {
        let data = fs::read(path)?;
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(ENTRY_MODE);
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);
        archive.append_data(&mut header, name, data.as_slice())?;
    }

    let encoder = archive.into_inner()?;
    encoder.finish()?;

    staged.persist(destination).map_err(|e| {
        Error::io_with_source(format!("persisting {}", destination.display()), e.error)
    })?;

    tracing::debug!(
        entries = entries.len(),
        destination = %destination.display(),
        "wrote policy tarball"
    );
    Ok(())
}

/// Regular files below `root` as (archive name, path), sorted by name
fn collect_entries(root: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::io_with_source("walking rendered rules", e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| Error::io_with_source("relativizing rendered rule path", e))?
            .to_path_buf();
        entries.push((name, entry.into_path()));
    }
    Ok(entries)
}
