/// The annotation session engine
///
/// A `Session` owns the config, catalog, annotation store, omission ledger
/// (inside the config), cursor and the draft attributes being edited. The
/// presentation layer holds one session and drives it through the methods
/// below or through `dispatch`.
///
/// Moving off an image with `advance`, `retreat` or `omit_current` first
/// saves the draft under that image, so navigation never drops edits.
use image::RgbaImage;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{AnnotatorError, Result};
use crate::imaging;
use crate::state::annotation::{AnnotationRecord, FaceAttributes};
use crate::state::catalog::Catalog;
use crate::state::config::SessionConfig;
use crate::state::cursor::Cursor;
use crate::state::store::{AnnotationStore, ANNOTATIONS_FILE_NAME};
use crate::stats::{self, Statistics};

/// What the presentation layer shows for the image under the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentImage {
    /// Position in the catalog
    pub index: usize,
    /// `index + 1`, written into the record on the next save
    pub id: String,
    pub filename: String,
    pub path: PathBuf,
    /// "WxH", empty when the file could not be read as an image
    pub dimensions: String,
    pub annotated: bool,
}

/// One user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectImageFolder(PathBuf),
    SelectOutputFolder(PathBuf),
    LoadAnnotations(PathBuf),
    Start,
    SetLabel { field: String, value: String },
    SetFlag { field: String, value: bool },
    Save,
    Next,
    Previous,
    Omit { reason: String },
    NextUnannotated,
    Search(String),
    UpdateStatistics,
}

/// Result of a dispatched command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    FolderSelected { images: usize },
    OutputSelected,
    AnnotationsLoaded { records: usize },
    Edited,
    Saved { annotated: bool },
    /// The cursor is on this image
    Showing(CurrentImage),
    /// The catalog is empty, nothing to show
    NoImage,
    /// Nothing changed (blank search)
    Unchanged,
    /// Search matched nothing; cursor unchanged
    NotFound,
    /// Every image in the catalog has a record; cursor unchanged
    AllAnnotated,
    Statistics(Statistics),
}

impl Outcome {
    fn showing(current: Option<CurrentImage>) -> Self {
        current.map_or(Self::NoImage, Self::Showing)
    }
}

pub struct Session {
    config_path: PathBuf,
    config: SessionConfig,
    catalog: Catalog,
    store: AnnotationStore,
    cursor: Cursor,
    /// Attributes being edited for the current image
    draft: FaceAttributes,
    current: Option<CurrentImage>,
    startup_errors: Vec<AnnotatorError>,
}

impl Session {
    /// Open a session backed by the config file at `config_path`
    ///
    /// Startup never fails: an unreadable config falls back to defaults, a
    /// broken annotations file leaves the store empty, and a vanished image
    /// folder is cleared. Those errors are kept for `startup_errors`.
    pub fn open(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let mut startup_errors = Vec::new();

        let config = match SessionConfig::load(&config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("⚠️  Using default config: {}", e);
                startup_errors.push(e);
                SessionConfig::default()
            }
        };

        let mut session = Self {
            config_path,
            config,
            catalog: Catalog::default(),
            store: AnnotationStore::new(),
            cursor: Cursor::new(),
            draft: FaceAttributes::new(),
            current: None,
            startup_errors,
        };

        if let Some(path) = session.config.annotations_file.clone().filter(|p| p.exists()) {
            if let Err(e) = session.store.reload_from(&path) {
                warn!("⚠️  Could not load annotations: {}", e);
                session.startup_errors.push(e);
            }
        }

        if session.config.image_folder.is_some() {
            if let Err(e) = session.rebuild_catalog() {
                session.startup_errors.push(e);
            }
        }

        info!(
            "🎨 Session ready: {} images, {} annotations, {} omitted",
            session.catalog.len(),
            session.store.len(),
            session.config.omissions.len()
        );
        session
    }

    /// Open a session with the config in the platform config directory
    pub fn open_default() -> Self {
        Self::open(SessionConfig::default_path())
    }

    /// Write the config one last time and drop the session
    pub fn close(self) -> Result<()> {
        self.persist_config()?;
        info!("Session closed");
        Ok(())
    }

    // ========== Folders and files ==========

    /// Point the session at a new image folder and rebuild the catalog
    ///
    /// The cursor goes back to "no current image". A missing folder leaves
    /// an empty catalog and an unset folder, then returns `FolderNotFound`.
    pub fn select_image_folder(&mut self, folder: impl Into<PathBuf>) -> Result<usize> {
        self.config.image_folder = Some(folder.into());
        let rebuilt = self.rebuild_catalog();
        self.persist_config()?;
        rebuilt
    }

    pub fn select_output_folder(&mut self, folder: impl Into<PathBuf>) -> Result<()> {
        self.config.output_folder = Some(folder.into());
        self.persist_config()
    }

    /// Replace the annotation store with the contents of `path`
    ///
    /// On failure the current store is kept and the error returned. The
    /// draft is left as it is.
    pub fn load_annotations(&mut self, path: impl Into<PathBuf>) -> Result<usize> {
        let path = path.into();
        let count = self.store.reload_from(&path)?;
        self.config.annotations_file = Some(path);
        self.persist_config()?;

        // the draft may hold unsaved edits, only the status is refreshed
        if let Some(current) = self.current.as_mut() {
            current.annotated = self.store.contains(&current.filename);
        }
        Ok(count)
    }

    /// True once both the image and output folders are chosen
    pub fn is_ready(&self) -> bool {
        self.config.image_folder.is_some() && self.config.output_folder.is_some()
    }

    /// Begin annotating: move onto the next image (the first when not started)
    pub fn start(&mut self) -> Result<Option<CurrentImage>> {
        if !self.is_ready() {
            return Err(AnnotatorError::FoldersNotSelected);
        }
        self.advance()
    }

    // ========== Editing and saving ==========

    pub fn draft(&self) -> &FaceAttributes {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut FaceAttributes {
        &mut self.draft
    }

    pub fn set_draft(&mut self, attributes: FaceAttributes) {
        self.draft = attributes;
    }

    /// Commit the draft under the current image
    ///
    /// Nothing is stored when the draft is empty. After a store the whole
    /// annotations file in the output folder is rewritten and its path
    /// recorded in the config. Returns whether the current image now has a
    /// record (false when there is no current image).
    pub fn save(&mut self) -> Result<bool> {
        let Some(current) = self.current.as_ref() else {
            return Ok(false);
        };

        let filename = current.filename.clone();
        let record = AnnotationRecord {
            id: current.id.clone(),
            filename: filename.clone(),
            dimensions: current.dimensions.clone(),
            attributes: self.draft.clone(),
        };

        if self.store.save(&filename, record) {
            self.persist_annotations()?;
        }

        let annotated = self.store.contains(&filename);
        if let Some(current) = self.current.as_mut() {
            current.annotated = annotated;
        }
        Ok(annotated)
    }

    // ========== Navigation ==========

    /// Save, then move to the next image (wrapping)
    pub fn advance(&mut self) -> Result<Option<CurrentImage>> {
        self.save()?;
        let next = self.cursor.advance(self.catalog.len());
        Ok(next.and_then(|index| self.land(index)))
    }

    /// Save, then move to the previous image (wrapping)
    pub fn retreat(&mut self) -> Result<Option<CurrentImage>> {
        self.save()?;
        let previous = self.cursor.retreat(self.catalog.len());
        Ok(previous.and_then(|index| self.land(index)))
    }

    /// Move to the next image without a record; `None` when all are annotated
    pub fn jump_to_next_unannotated(&mut self) -> Option<CurrentImage> {
        let store = &self.store;
        let index = self
            .cursor
            .jump_to_next_unannotated(self.catalog.entries(), |entry| {
                store.contains(&entry.filename)
            })?;
        self.land(index)
    }

    /// Move to the first image whose base name or stored id equals `query`
    pub fn search(&mut self, query: &str) -> Option<CurrentImage> {
        let store = &self.store;
        let index = self.cursor.search(self.catalog.entries(), query, |entry| {
            store.get(&entry.filename).map(|record| record.id.as_str())
        })?;
        self.land(index)
    }

    // ========== Omission ==========

    /// Save, then omit the current image and show the one that followed it
    pub fn omit_current(&mut self, reason: &str) -> Result<Option<CurrentImage>> {
        let Some(current) = self.current.clone() else {
            return Ok(None);
        };
        self.save()?;

        self.config.omissions.omit(&current.filename, reason);
        self.catalog.remove(&current.filename);
        self.current = None;
        info!("🚫 Omitted {}: {:?}", current.filename, reason);

        let landed = self
            .cursor
            .clamp(self.catalog.len())
            .and_then(|index| self.land(index));
        if landed.is_none() {
            self.draft.reset();
        }

        self.persist_config()?;
        Ok(landed)
    }

    /// Omit `filename` whether or not it is the current image
    ///
    /// Omitting the current image behaves like `omit_current`. Otherwise the
    /// name is recorded and removed from the catalog, and the current image
    /// keeps its place (its display id shifts if an earlier image was
    /// removed).
    pub fn omit(&mut self, filename: &str, reason: &str) -> Result<()> {
        if self.current.as_ref().is_some_and(|c| c.filename == filename) {
            self.omit_current(reason)?;
            return Ok(());
        }

        self.config.omissions.omit(filename, reason);
        if let Some(removed) = self.catalog.remove(filename) {
            if let Some(current) = self.current.as_mut().filter(|c| c.index > removed) {
                current.index -= 1;
                current.id = (current.index + 1).to_string();
                self.cursor.set(current.index);
            }
        }
        info!("🚫 Omitted {}: {:?}", filename, reason);
        self.persist_config()
    }

    /// `(name, reason)` for every omitted image, oldest first
    pub fn omitted(&self) -> Vec<(&str, &str)> {
        self.config.omissions.list()
    }

    /// Borderless preview of an omitted image still present in the folder
    pub fn omitted_preview(&self, filename: &str) -> Result<Option<RgbaImage>> {
        if !self.config.omissions.contains(filename) {
            return Ok(None);
        }
        let Some(folder) = self.config.image_folder.as_deref() else {
            return Ok(None);
        };
        let path = folder.join(filename);
        if !path.exists() {
            return Ok(None);
        }
        imaging::render_preview(&path, None).map(Some)
    }

    // ========== Read-only accessors ==========

    pub fn current(&self) -> Option<&CurrentImage> {
        self.current.as_ref()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|c| c.path.as_path())
    }

    /// Raw bytes of the current image file
    pub fn current_bytes(&self) -> Result<Option<Vec<u8>>> {
        let Some(path) = self.current_path() else {
            return Ok(None);
        };
        fs::read(path)
            .map(Some)
            .map_err(|e| AnnotatorError::io(path, e))
    }

    /// Bounded preview of the current image framed in its status color
    pub fn current_preview(&self) -> Result<Option<RgbaImage>> {
        let Some(current) = self.current.as_ref() else {
            return Ok(None);
        };
        let frame = imaging::status_color(current.annotated);
        imaging::render_preview(&current.path, Some(frame)).map(Some)
    }

    /// `(annotated, total)` over the current catalog
    pub fn count(&self) -> (usize, usize) {
        self.store.count(&self.catalog)
    }

    /// `(annotated, not annotated)` for the counter display
    pub fn counters(&self) -> (usize, usize) {
        let (annotated, total) = self.count();
        (annotated, total - annotated)
    }

    pub fn statistics(&self) -> Statistics {
        stats::compute(&self.store)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor.index()
    }

    /// Errors recovered from while opening the session
    pub fn startup_errors(&self) -> &[AnnotatorError] {
        &self.startup_errors
    }

    // ========== Commands ==========

    /// Run one user action
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        let outcome = match command {
            Command::SelectImageFolder(folder) => Outcome::FolderSelected {
                images: self.select_image_folder(folder)?,
            },
            Command::SelectOutputFolder(folder) => {
                self.select_output_folder(folder)?;
                Outcome::OutputSelected
            }
            Command::LoadAnnotations(path) => Outcome::AnnotationsLoaded {
                records: self.load_annotations(path)?,
            },
            Command::Start => Outcome::showing(self.start()?),
            Command::SetLabel { field, value } => {
                self.draft.set_label(&field, &value)?;
                Outcome::Edited
            }
            Command::SetFlag { field, value } => {
                self.draft.set_flag(&field, value)?;
                Outcome::Edited
            }
            Command::Save => Outcome::Saved {
                annotated: self.save()?,
            },
            Command::Next => Outcome::showing(self.advance()?),
            Command::Previous => Outcome::showing(self.retreat()?),
            Command::Omit { reason } => Outcome::showing(self.omit_current(&reason)?),
            Command::NextUnannotated => self
                .jump_to_next_unannotated()
                .map_or(Outcome::AllAnnotated, Outcome::Showing),
            Command::Search(query) if query.trim().is_empty() => Outcome::Unchanged,
            Command::Search(query) => self
                .search(&query)
                .map_or(Outcome::NotFound, Outcome::Showing),
            Command::UpdateStatistics => Outcome::Statistics(self.statistics()),
        };
        Ok(outcome)
    }

    // ========== Internals ==========

    /// Put the cursor on `index` and load that image for display
    ///
    /// Dimensions are re-read from the file and the display id is
    /// `index + 1`. The draft takes the stored attributes, or is cleared.
    fn land(&mut self, index: usize) -> Option<CurrentImage> {
        let entry = self.catalog.get(index)?.clone();
        let folder = self.config.image_folder.as_deref().unwrap_or(Path::new(""));
        let path = entry.path_in(folder);

        let dimensions = match imaging::probe_dimensions(&path) {
            Ok(size) => imaging::format_dimensions(size),
            Err(e) => {
                warn!("⚠️  {}", e);
                String::new()
            }
        };

        match self.store.get(&entry.filename) {
            Some(record) => self.draft = record.attributes.clone(),
            None => self.draft.reset(),
        }

        self.cursor.set(index);
        let current = CurrentImage {
            index,
            id: (index + 1).to_string(),
            annotated: self.store.contains(&entry.filename),
            filename: entry.filename,
            path,
            dimensions,
        };
        self.current = Some(current.clone());
        Some(current)
    }

    /// Re-derive the catalog from the configured folder
    ///
    /// A missing folder is cleared from the config rather than kept as a
    /// stale reference. Other failures leave the folder selected.
    fn rebuild_catalog(&mut self) -> Result<usize> {
        self.cursor.reset();
        self.current = None;
        self.draft.reset();

        let folder = self.config.image_folder.clone().unwrap_or_default();
        match Catalog::from_folder(&folder, &self.config.omissions) {
            Ok(catalog) => {
                self.catalog = catalog;
                Ok(self.catalog.len())
            }
            Err(e @ AnnotatorError::FolderNotFound(_)) => {
                warn!("⚠️  {}, clearing image folder", e);
                self.catalog.clear();
                self.config.image_folder = None;
                Err(e)
            }
            Err(e) => {
                warn!("⚠️  {}", e);
                self.catalog.clear();
                Err(e)
            }
        }
    }

    fn persist_annotations(&mut self) -> Result<()> {
        let Some(output) = self.config.output_folder.as_deref() else {
            warn!("⚠️  No output folder selected, annotations kept in memory only");
            return Ok(());
        };

        let path = output.join(ANNOTATIONS_FILE_NAME);
        self.store.write(&path)?;
        if self.config.annotations_file.as_deref() != Some(path.as_path()) {
            info!("💾 Annotations file is now {}", path.display());
        }
        self.config.annotations_file = Some(path);
        self.persist_config()
    }

    fn persist_config(&self) -> Result<()> {
        self.config.save(&self.config_path)
    }
}

// Implement Debug without dumping every record
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config_path", &self.config_path)
            .field("images", &self.catalog.len())
            .field("annotations", &self.store.len())
            .field("cursor", &self.cursor.index())
            .finish()
    }
}
