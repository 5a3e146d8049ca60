//! Host-side stylesheet service.
//!
//! Serves the configured stylesheet list and reads CSS off disk. The
//! `"(default)"` marker resolves to a bundled stylesheet materialized in
//! the user-data directory on first run. Read failures yield an empty
//! string; the preview renders unstyled and recovers on the next pick.

use doc_model::DEFAULT_STYLESHEET;
use log::error;
use std::fs;
use std::io;
use std::path::PathBuf;
use storage::Storage;

const DEFAULT_STYLESHEET_FILENAME: &str = "default.css";

/// Bundled fallback stylesheet.
const DEFAULT_CSS: &str = "\
body {
  font-family: system-ui, sans-serif;
  line-height: 1.5;
  max-width: 46em;
}

code, pre {
  font-family: ui-monospace, monospace;
  background: #f4f4f4;
}

blockquote {
  border-left: 3px solid #ccc;
  margin-left: 0;
  padding-left: 1em;
  color: #555;
}
";

pub struct StylesheetService {
    storage: Storage,
    user_data_dir: PathBuf,
}

impl StylesheetService {
    pub fn new(storage: Storage, user_data_dir: impl Into<PathBuf>) -> Self {
        Self { storage, user_data_dir: user_data_dir.into() }
    }

    /// Writes the bundled default stylesheet if none exists yet.
    pub fn ensure_default(&self) -> io::Result<()> {
        let path = self.default_stylesheet_path();
        if path.exists() {
            return Ok(());
        }

        fs::create_dir_all(&self.user_data_dir)?;
        fs::write(path, DEFAULT_CSS)
    }

    /// Configured stylesheets, the default marker first.
    pub fn stylesheets(&self) -> Vec<String> {
        match self.storage.stylesheets() {
            Ok(stylesheets) => stylesheets,
            Err(err) => {
                error!("Could not load stylesheet list: {err}");
                vec![DEFAULT_STYLESHEET.to_owned()]
            }
        }
    }

    /// CSS contents for a stylesheet path or the default marker. Failures
    /// are logged and yield an empty string.
    pub fn read(&self, filepath: &str) -> String {
        let path = if filepath == DEFAULT_STYLESHEET {
            self.default_stylesheet_path()
        } else {
            PathBuf::from(filepath)
        };

        match fs::read_to_string(&path) {
            Ok(css) => css,
            Err(err) => {
                error!("Failed to open stylesheet file {}: {err}", path.display());
                String::new()
            }
        }
    }

    fn default_stylesheet_path(&self) -> PathBuf {
        self.user_data_dir.join(DEFAULT_STYLESHEET_FILENAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (StylesheetService, tempfile::TempDir) {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let storage = Storage::with_root(temp.path());
        let service = StylesheetService::new(storage, temp.path());
        (service, temp)
    }

    #[test]
    fn default_marker_resolves_to_the_materialized_stylesheet() {
        let (service, _temp) = service();
        service.ensure_default().expect("materialization should succeed");

        let css = service.read(DEFAULT_STYLESHEET);
        assert!(css.contains("font-family"));
    }

    #[test]
    fn ensure_default_keeps_an_existing_file() {
        let (service, temp) = service();
        fs::write(temp.path().join(DEFAULT_STYLESHEET_FILENAME), "body { color: red; }")
            .expect("write should succeed");

        service.ensure_default().expect("materialization should succeed");
        assert_eq!(service.read(DEFAULT_STYLESHEET), "body { color: red; }");
    }

    #[test]
    fn missing_stylesheet_reads_as_empty() {
        let (service, _temp) = service();
        assert_eq!(service.read("/nowhere/missing.css"), "");
    }

    #[test]
    fn list_always_starts_with_the_default_marker() {
        let (service, _temp) = service();
        let stylesheets = service.stylesheets();
        assert_eq!(stylesheets.first().map(String::as_str), Some(DEFAULT_STYLESHEET));
    }
}
