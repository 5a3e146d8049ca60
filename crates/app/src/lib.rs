//! Host-process core for the Markdown editor.
//!
//! The binary wires an [`Application`] (host services + menu) to a
//! [`md_editor_ui::UiShell`] running on its own thread, with the bus as
//! the only link between them: the same shape as the host/UI process
//! split, collapsed into one binary.

pub mod application;
pub mod dialog;
pub mod menu;
pub mod menu_state;
pub mod pdf;
pub mod recent_files;
pub mod stylesheets;

pub use application::Application;
pub use dialog::{FilePicker, NativeFilePicker};
pub use menu_state::{EditFlags, MenuError, MenuState};
pub use pdf::PdfExportService;
pub use recent_files::RecentFiles;
pub use stylesheets::StylesheetService;

use log::error;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

pub const APP_NAME: &str = "Markdown Editor";

const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("storage error: {0}")]
    Storage(#[from] storage::StorageError),
    #[error("bus error: {0}")]
    Bus(#[from] ipc::BusError),
    #[error(transparent)]
    Menu(#[from] menu_state::MenuError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs the editor: host services on this thread, the UI shell on its
/// own, until the UI goes away or quit is requested.
pub fn run(paths: Vec<PathBuf>) -> Result<(), AppError> {
    let storage = storage::Storage::from_default_project()?;
    let (host, ui) = ipc::pair();

    let mut app = Application::new(storage, host, Box::new(NativeFilePicker), APP_NAME)?;

    let ui_thread = thread::spawn(move || {
        let mut shell = match md_editor_ui::UiShell::new(ui) {
            Ok(shell) => shell,
            Err(err) => {
                error!("UI shell failed to start: {err}");
                return;
            }
        };

        loop {
            match shell.poll() {
                Ok(()) => thread::sleep(POLL_INTERVAL),
                Err(_) => break,
            }
        }
    });

    for path in &paths {
        app.open_markdown_path(path);
    }

    let outcome = loop {
        match app.poll() {
            Ok(true) => thread::sleep(POLL_INTERVAL),
            Ok(false) => break Ok(()),
            Err(err) => break Err(err),
        }
    };

    app.shutdown();
    drop(app);
    if ui_thread.join().is_err() {
        error!("UI thread panicked");
    }

    outcome
}
