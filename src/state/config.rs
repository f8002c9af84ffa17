use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::omission::OmissionLedger;
use crate::error::{AnnotatorError, Result};

/// Durable session settings, stored as a JSON object
///
/// ```json
/// {"image_folder": "", "output_folder": "", "json_file": "",
///  "omitted_images": [], "omitted_reasons": {}}
/// ```
///
/// Empty strings on disk are unset paths in memory.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    #[serde(with = "empty_path")]
    pub image_folder: Option<PathBuf>,
    #[serde(with = "empty_path")]
    pub output_folder: Option<PathBuf>,
    /// Annotations file loaded at startup and rewritten on save
    #[serde(rename = "json_file", with = "empty_path")]
    pub annotations_file: Option<PathBuf>,
    #[serde(flatten)]
    pub omissions: OmissionLedger,
}

impl SessionConfig {
    /// Get the path where the config file lives by default
    ///
    /// - Linux: ~/.config/face-annotator/config.json
    /// - macOS: ~/Library/Application Support/face-annotator/config.json
    /// - Windows: %APPDATA%\face-annotator\config.json
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_default();

        path.push("face-annotator");
        path.push("config.json");
        path
    }

    /// Load the config at `path`, or defaults when no file exists yet
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, starting with defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| AnnotatorError::io(path, e))?;
        let mut config: Self = serde_json::from_str(&content)
            .map_err(|e| AnnotatorError::invalid_format(path, e))?;
        config.omissions.normalize();

        info!("⚙️  Config loaded from {}", path.display());
        Ok(config)
    }

    /// Overwrite the config file at `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| AnnotatorError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnnotatorError::invalid_format(path, e))?;
        fs::write(path, json).map_err(|e| AnnotatorError::io(path, e))?;

        debug!("Config saved to {}", path.display());
        Ok(())
    }
}

/// Serde adapter for optional paths stored as possibly-empty strings
mod empty_path {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<PathBuf>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let text = value
            .as_deref()
            .map(|path| path.to_string_lossy())
            .unwrap_or_default();
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<PathBuf>, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok((!text.is_empty()).then(|| PathBuf::from(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = SessionConfig::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = SessionConfig {
            image_folder: Some(PathBuf::from("/photos/in")),
            output_folder: Some(PathBuf::from("/photos/out")),
            ..Default::default()
        };
        config.omissions.omit("x.jpg", "blurry");
        config.save(&path).unwrap();

        assert_eq!(SessionConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_file_format_keys() {
        let config = SessionConfig {
            output_folder: Some(PathBuf::from("/out")),
            ..Default::default()
        };
        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(value["image_folder"], "");
        assert_eq!(value["output_folder"], "/out");
        assert_eq!(value["json_file"], "");
        assert!(value["omitted_images"].as_array().unwrap().is_empty());
        assert!(value["omitted_reasons"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_partial_file_and_broken_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, r#"{"image_folder": "/in", "omitted_images": ["a.png"]}"#).unwrap();
        let config = SessionConfig::load(&path).unwrap();
        assert_eq!(config.image_folder, Some(PathBuf::from("/in")));
        assert_eq!(config.output_folder, None);
        assert_eq!(config.omissions.list(), vec![("a.png", "")]);

        fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            SessionConfig::load(&path),
            Err(AnnotatorError::InvalidFormat { .. })
        ));
    }
}
