//! File dialogs behind a seam so headless tests can inject picks.

use std::path::PathBuf;

pub trait FilePicker: Send {
    fn pick_markdown_file(&mut self) -> Option<PathBuf>;
}

/// Native open dialog.
#[derive(Debug, Default)]
pub struct NativeFilePicker;

impl FilePicker for NativeFilePicker {
    fn pick_markdown_file(&mut self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter("Markdown Files", &["md"])
            .add_filter("All Files", &["*"])
            .pick_file()
    }
}
