/// Shared data structures for the session state
///
/// These structs represent the data model that flows between
/// the stores and the presentation layer.
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extensions accepted into the catalog (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Represents a single image eligible for annotation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageEntry {
    /// Filename only (e.g., "IMG_0001.jpg")
    pub filename: String,
}

impl ImageEntry {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
        }
    }

    /// Build an entry from a path if its extension is on the whitelist
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        if !IMAGE_EXTENSIONS
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(extension))
        {
            return None;
        }
        let Some(filename) = path.file_name()?.to_str() else {
            debug!("Skipping image with a non UTF-8 name: {}", path.display());
            return None;
        };
        Some(Self::new(filename))
    }

    /// Filename with its extension stripped
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.filename)
    }

    /// Full path of this image inside `folder`
    pub fn path_in(&self, folder: &Path) -> PathBuf {
        folder.join(&self.filename)
    }
}
