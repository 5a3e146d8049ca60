//! PDF export service.
//!
//! Bridges a save-as-pdf event to the printer backend: merges the
//! persisted format with the header/footer fragments composed by the UI
//! and writes the result next to the source file. The backend is created
//! lazily, at most once, and released on shutdown.

use pdf_export::{PdfExportError, PdfPrinter, PrintJob};
use std::fs;
use std::path::Path;
use storage::Storage;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("could not load PDF format settings: {0}")]
    Settings(#[from] storage::StorageError),
    #[error(transparent)]
    Print(#[from] PdfExportError),
    #[error("could not write '{filepath}': {source}")]
    Write {
        filepath: String,
        #[source]
        source: std::io::Error,
    },
}

type PrinterFactory = Box<dyn FnOnce() -> Box<dyn PdfPrinter + Send> + Send>;

pub struct PdfExportService {
    storage: Storage,
    factory: Option<PrinterFactory>,
    printer: Option<Box<dyn PdfPrinter + Send>>,
}

impl PdfExportService {
    pub fn new(storage: Storage) -> Self {
        Self::with_factory(storage, || Box::new(pdf_export::default_printer()))
    }

    pub fn with_factory<F>(storage: Storage, factory: F) -> Self
    where
        F: FnOnce() -> Box<dyn PdfPrinter + Send> + Send + 'static,
    {
        Self { storage, factory: Some(Box::new(factory)), printer: None }
    }

    pub fn export(
        &mut self,
        filepath: &str,
        html: &str,
        header: &str,
        footer: &str,
    ) -> Result<(), ExportError> {
        let format = self.storage.pdf_format()?;

        let header = compose_fragment(
            format.display_header,
            format.header_template.as_deref(),
            header,
        );
        let footer = compose_fragment(
            format.display_footer,
            format.footer_template.as_deref(),
            footer,
        );

        let job = PrintJob { html: html.to_owned(), header, footer, format };

        if self.printer.is_none() {
            let factory = self.factory.take().ok_or_else(|| {
                PdfExportError::Backend("printer backend already shut down".to_owned())
            })?;
            self.printer = Some(factory());
        }
        let printer = self.printer.as_mut().ok_or_else(|| {
            PdfExportError::Backend("printer backend unavailable".to_owned())
        })?;

        let bytes = printer.print(&job)?;
        fs::write(Path::new(filepath), bytes)
            .map_err(|source| ExportError::Write { filepath: filepath.to_owned(), source })?;

        Ok(())
    }

    /// Releases the printer backend. Called once on process shutdown.
    pub fn close(&mut self) {
        if let Some(printer) = self.printer.as_mut() {
            printer.close();
        }
        self.printer = None;
    }
}

/// A header/footer only participates when its toggle is on; the UI's
/// extracted style fragment precedes the configured template.
fn compose_fragment(display: bool, template: Option<&str>, ui_fragment: &str) -> String {
    if !display {
        return String::new();
    }

    let mut fragment = String::from(ui_fragment);
    if let Some(template) = template {
        fragment.push_str(template);
    }
    fragment
}
