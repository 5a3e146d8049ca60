//! UI-side stylesheet collaborator.
//!
//! Tracks the most recently used stylesheet and fetches CSS from the
//! host. Read failures self-heal to an empty stylesheet: the preview
//! renders unstyled rather than erroring, and the next selection tries
//! again.

use doc_model::Stylesheet;
use ipc::UiEndpoint;
use log::{error, warn};

pub struct StylesheetStore {
    available: Vec<String>,
    active: String,
}

impl StylesheetStore {
    /// `default` is the configured default stylesheet; it stays the
    /// active selection until the user picks another.
    pub fn new(default: impl Into<String>) -> Self {
        Self { available: Vec::new(), active: default.into() }
    }

    /// Fetches the available list from the host and revalidates the
    /// active selection against it (case-insensitively); a selection
    /// that is no longer available falls back to the first entry.
    pub fn initialize(&mut self, bus: &mut UiEndpoint) -> Result<(), ipc::BusError> {
        let stylesheets = bus.get_available_stylesheets()?;

        if stylesheets.is_empty() {
            warn!("Host returned no stylesheets");
            return Ok(());
        }

        if self.active.is_empty() {
            self.active = stylesheets[0].clone();
        } else {
            let wanted = self.active.to_uppercase();
            match stylesheets.iter().find(|entry| entry.to_uppercase() == wanted) {
                Some(found) => self.active = found.clone(),
                None => self.active = stylesheets[0].clone(),
            }
        }

        self.available = stylesheets;
        Ok(())
    }

    pub fn available(&self) -> &[String] {
        &self.available
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn set_active(&mut self, stylesheet: &str) {
        if stylesheet != self.active {
            self.active = stylesheet.to_owned();
        }
    }

    /// The stylesheet a newly activated document should start with: the
    /// most recently used one, which is the configured default until the
    /// user changes it.
    pub fn last_used(&self, bus: &mut UiEndpoint, _md_filepath: Option<&str>) -> Stylesheet {
        let filepath = self.active.clone();
        self.fetch(bus, &filepath)
    }

    /// Fetches a stylesheet's CSS; failures are logged and yield an
    /// empty stylesheet.
    pub fn fetch(&self, bus: &mut UiEndpoint, filepath: &str) -> Stylesheet {
        match bus.get_stylesheet(filepath) {
            Ok(css) => Stylesheet { filepath: filepath.to_owned(), css },
            Err(err) => {
                error!("Failed to fetch stylesheet '{filepath}': {err}");
                Stylesheet { filepath: filepath.to_owned(), css: String::new() }
            }
        }
    }
}
