use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::annotation::AnnotationRecord;
use super::catalog::Catalog;
use crate::error::{AnnotatorError, Result};

/// Fixed name of the annotations file inside the output folder
pub const ANNOTATIONS_FILE_NAME: &str = "annotations.json";

/// Map from image file name to its annotation record
///
/// Loaded and written wholesale. Records may outlive their image's presence
/// in the catalog (omitted later, or the folder changed).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct AnnotationStore {
    records: BTreeMap<String, AnnotationRecord>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, filename: &str) -> Option<&AnnotationRecord> {
        self.records.get(filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.records.contains_key(filename)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnnotationRecord)> {
        self.records.iter()
    }

    /// Store `record` under `filename` when at least one attribute is set
    ///
    /// An all-empty record leaves any existing entry untouched. Returns whether
    /// the map was written.
    pub fn save(&mut self, filename: &str, record: AnnotationRecord) -> bool {
        if record.attributes.is_unannotated() {
            debug!("Nothing labelled for {}, not storing", filename);
            return false;
        }
        self.records.insert(filename.to_string(), record);
        true
    }

    /// `(annotated, total)` over the images currently in `catalog`
    pub fn count(&self, catalog: &Catalog) -> (usize, usize) {
        let annotated = catalog
            .entries()
            .iter()
            .filter(|entry| self.contains(&entry.filename))
            .count();
        (annotated, catalog.len())
    }

    /// Read a store from an annotations file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| AnnotatorError::io(path, e))?;
        let store: Self = serde_json::from_str(&content)
            .map_err(|e| AnnotatorError::invalid_format(path, e))?;
        info!("📂 Loaded {} annotations from {}", store.len(), path.display());
        Ok(store)
    }

    /// Replace the whole map from `path`, keeping the current one on failure
    pub fn reload_from(&mut self, path: &Path) -> Result<usize> {
        *self = Self::load(path)?;
        Ok(self.len())
    }

    /// Serialize the whole map with four-space indentation
    pub fn to_json_pretty(&self) -> std::result::Result<Vec<u8>, serde_json::Error> {
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        Ok(buffer)
    }

    /// Overwrite `path` with the whole map
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self
            .to_json_pretty()
            .map_err(|e| AnnotatorError::invalid_format(path, e))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| AnnotatorError::io(parent, e))?;
        }
        fs::write(path, json).map_err(|e| AnnotatorError::io(path, e))?;
        debug!("💾 Wrote {} annotations to {}", self.len(), path.display());
        Ok(())
    }
}
