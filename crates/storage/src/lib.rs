use directories::ProjectDirs;
use doc_model::{PdfFormat, RecentItem, DEFAULT_STYLESHEET};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_SCHEMA_VERSION: u32 = 1;
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Settings store facade: one JSON document under the platform data
/// directory, read whole and written whole on every mutation.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsEnvelope {
    version: u32,
    settings: StoredSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredSettings {
    recently_opened: Vec<RecentItem>,
    stylesheets: Vec<String>,
    default_stylesheet: Option<String>,
    pdf_format: Option<PdfFormat>,
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs =
            ProjectDirs::from("dev", "md-editor", "md-editor").ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn recently_opened(&self) -> Result<Vec<RecentItem>, StorageError> {
        Ok(self.load()?.recently_opened)
    }

    pub fn set_recently_opened(&self, items: &[RecentItem]) -> Result<(), StorageError> {
        let mut settings = self.load()?;
        settings.recently_opened = items.to_vec();
        self.save(&settings)
    }

    /// Configured stylesheet paths, with the built-in default always as the
    /// implicit first entry.
    pub fn stylesheets(&self) -> Result<Vec<String>, StorageError> {
        let mut stylesheets = self.load()?.stylesheets;
        stylesheets.insert(0, DEFAULT_STYLESHEET.to_owned());

        Ok(stylesheets)
    }

    pub fn set_stylesheets(&self, stylesheets: &[String]) -> Result<(), StorageError> {
        let mut settings = self.load()?;
        settings.stylesheets =
            stylesheets.iter().filter(|path| *path != DEFAULT_STYLESHEET).cloned().collect();
        self.save(&settings)
    }

    pub fn default_stylesheet(&self) -> Result<String, StorageError> {
        Ok(self.load()?.default_stylesheet.unwrap_or_else(|| DEFAULT_STYLESHEET.to_owned()))
    }

    pub fn set_default_stylesheet(&self, stylesheet: &str) -> Result<(), StorageError> {
        let mut settings = self.load()?;
        settings.default_stylesheet = Some(stylesheet.to_owned());
        self.save(&settings)
    }

    pub fn pdf_format(&self) -> Result<PdfFormat, StorageError> {
        Ok(self.load()?.pdf_format.unwrap_or_default())
    }

    pub fn set_pdf_format(&self, pdf_format: &PdfFormat) -> Result<(), StorageError> {
        let mut settings = self.load()?;
        settings.pdf_format = Some(pdf_format.clone());
        self.save(&settings)
    }

    fn load(&self) -> Result<StoredSettings, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(StoredSettings::default());
        }

        let bytes = fs::read(path)?;
        let envelope: SettingsEnvelope = serde_json::from_slice(&bytes)?;

        Ok(envelope.settings)
    }

    fn save(&self, settings: &StoredSettings) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let envelope =
            SettingsEnvelope { version: SETTINGS_SCHEMA_VERSION, settings: settings.clone() };

        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.settings_path(), bytes)?;
        Ok(())
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }
}
