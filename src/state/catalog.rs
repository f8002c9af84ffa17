use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::data::ImageEntry;
use super::omission::OmissionLedger;
use crate::error::{AnnotatorError, Result};

/// List the images in `folder` that are eligible for annotation
///
/// Only direct children are considered. Files are kept when their extension is
/// on the whitelist and their name is not in `omitted`. The result is sorted by
/// file name so the same folder snapshot always yields the same order.
///
/// Fails with `FolderNotFound` when `folder` is empty or is not a directory.
/// Entries that cannot be read (a dangling symlink, a permission error) are
/// skipped with a warning.
pub fn rebuild(folder: &Path, omitted: &OmissionLedger) -> Result<Vec<ImageEntry>> {
    if folder.as_os_str().is_empty() || !folder.is_dir() {
        return Err(AnnotatorError::FolderNotFound(folder.to_path_buf()));
    }

    let mut entries = Vec::new();
    for dir_entry in WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let dir_entry = match dir_entry {
            Ok(dir_entry) => dir_entry,
            Err(e) => {
                warn!("⚠️  Skipping unreadable entry in {}: {}", folder.display(), e);
                continue;
            }
        };

        if !dir_entry.file_type().is_file() {
            continue;
        }

        let Some(entry) = ImageEntry::from_path(dir_entry.path()) else {
            continue;
        };

        if omitted.contains(&entry.filename) {
            debug!("Skipping omitted image {}", entry.filename);
            continue;
        }

        entries.push(entry);
    }

    info!("📁 Catalog rebuilt from {}: {} images", folder.display(), entries.len());
    Ok(entries)
}

/// The ordered list of images currently eligible for annotation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<ImageEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<ImageEntry>) -> Self {
        Self { entries }
    }

    /// Re-derive the catalog from `folder`
    pub fn from_folder(folder: &Path, omitted: &OmissionLedger) -> Result<Self> {
        rebuild(folder, omitted).map(Self::new)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ImageEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn position(&self, filename: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.filename == filename)
    }

    /// Remove `filename` in place, returning the index it occupied
    pub fn remove(&mut self, filename: &str) -> Option<usize> {
        let index = self.position(filename)?;
        self.entries.remove(index);
        Some(index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
