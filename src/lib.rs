//! Annotation session engine for labelling facial attributes across a folder
//! of images.
//!
//! The engine owns the image catalog, the annotation store, the omission
//! ledger and the navigation cursor. A GUI drives it through [`Session`] and
//! renders what it returns; nothing here depends on a windowing toolkit.

// Declare the modules
pub mod error;
pub mod imaging;
pub mod session;
pub mod state;
pub mod stats;

pub use error::{AnnotatorError, Result};
pub use session::{Command, CurrentImage, Outcome, Session};
pub use state::annotation::{AnnotationRecord, FaceAttributes};
pub use state::catalog::{rebuild, Catalog};
pub use state::config::SessionConfig;
pub use state::data::ImageEntry;
pub use state::labels::Label;
pub use state::omission::OmissionLedger;
pub use state::store::{AnnotationStore, ANNOTATIONS_FILE_NAME};
pub use stats::Statistics;
