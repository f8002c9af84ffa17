/// Error types for the annotation session engine
///
/// Every failure here is recoverable at the operation boundary: the session
/// keeps its prior in-memory state and the caller decides what to show.
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotatorError {
    /// The image folder is unset or no longer exists
    #[error("Image folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    /// A config or annotations file is not well-formed JSON of the expected shape
    #[error("Invalid format in {}: {source}", .path.display())]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A label value outside the enumeration for its field
    #[error("Invalid value {value:?} for {field}")]
    InvalidLabel { field: String, value: String },

    /// An attribute key that does not exist on the record
    #[error("Unknown attribute field: {0}")]
    UnknownField(String),

    /// Annotation was started before both folders were chosen
    #[error("Please select both input and output folders.")]
    FoldersNotSelected,

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, AnnotatorError>;

impl AnnotatorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_format(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::InvalidFormat {
            path: path.into(),
            source,
        }
    }
}
