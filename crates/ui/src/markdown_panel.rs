//! The Markdown document tab.

use crate::panels::{ShellContext, StateChange, TabPanel};
use crate::preview::{compose_document, extract_rules_containing};
use crate::shell::TOOLBAR_STYLESHEETS;
use crate::toolbar::{ControlState, ControlValue, ToolbarState};
use crate::util::filename_from_path;
use doc_model::{MarkdownFile, MenuId, MenuItemState, Stylesheet};
use ipc::{MenuCommand, RendererEvent};
use log::{debug, error};
use markdown_render::RenderedMarkdown;
use std::path::Path;

const UNTITLED: &str = "Untitled";

#[derive(Default)]
pub struct MarkdownPanel {
    data: MarkdownFile,
    rendered: RenderedMarkdown,
    /// Unresolved until the first activation.
    stylesheet: Option<Stylesheet>,
    active: bool,
}

impl MarkdownPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stylesheet(&self) -> Option<&Stylesheet> {
        self.stylesheet.as_ref()
    }

    fn css(&self) -> &str {
        self.stylesheet.as_ref().map(|stylesheet| stylesheet.css.as_str()).unwrap_or("")
    }

    /// The fully composed preview document.
    pub fn document_html(&self) -> String {
        compose_document(&self.rendered.html, self.rendered.title.as_deref(), self.css())
    }

    /// Selects the stylesheet in the dropdown and enables it; the control
    /// starts disabled while no document is open.
    fn selection_patch(&self, filepath: &str) -> ToolbarState {
        let mut patch = ToolbarState::new();
        patch.insert(
            TOOLBAR_STYLESHEETS.to_owned(),
            ControlState {
                id: TOOLBAR_STYLESHEETS.to_owned(),
                value: Some(ControlValue::Text(filepath.to_owned())),
                enabled: Some(true),
                options: None,
            },
        );
        patch
    }

    fn save_as_pdf(&self, ctx: &mut ShellContext<'_>) {
        let css = self.css();
        let html = self.document_html();
        let header = style_fragment(&extract_rules_containing(css, "header"));
        let footer = style_fragment(&extract_rules_containing(css, "footer"));

        let event = RendererEvent::SaveAsPdf {
            filepath: pdf_target_path(&self.data.filepath),
            html,
            header,
            footer,
        };

        if let Err(err) = ctx.bus.emit_event(&event) {
            error!("Failed to forward save-as-pdf for '{}': {err}", self.data.filepath);
        }
    }
}

impl TabPanel for MarkdownPanel {
    fn set_data(&mut self, data: MarkdownFile) {
        self.rendered = markdown_render::render(&data.contents);
        self.data = data;
    }

    fn titles(&self) -> (String, String) {
        if self.data.filepath.is_empty() {
            return (UNTITLED.to_owned(), UNTITLED.to_owned());
        }

        let name = filename_from_path(&self.data.filepath).unwrap_or(UNTITLED);
        let title = Path::new(name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(name)
            .to_owned();

        (title, self.data.filepath.clone())
    }

    fn active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool, ctx: &mut ShellContext<'_>) {
        self.active = active;
        if !active {
            return;
        }

        let first_activation = self.stylesheet.is_none();
        if first_activation {
            let filepath =
                if self.data.filepath.is_empty() { None } else { Some(self.data.filepath.as_str()) };
            self.stylesheet = Some(ctx.stylesheets.last_used(ctx.bus, filepath));
        }

        // Re-broadcast the selection on every activation so switching
        // between tabs with different stylesheets updates the dropdown.
        if let Some(stylesheet) = &self.stylesheet {
            let patch = self.selection_patch(&stylesheet.filepath);
            ctx.push_state(StateChange::Toolbar(patch));
        }

        if first_activation {
            ctx.push_state(StateChange::Menu(vec![MenuItemState::enabled(MenuId::FileSaveAsPdf)]));
        }
    }

    fn on_command(&mut self, command: &MenuCommand, ctx: &mut ShellContext<'_>) {
        match command {
            MenuCommand::SetStylesheet { value } => {
                if !self.active {
                    debug!("Ignoring stylesheet change for inactive tab '{}'", self.data.filepath);
                    return;
                }

                ctx.stylesheets.set_active(value);
                // The dropdown already shows the user's pick; no toolbar
                // re-broadcast on this path.
                self.stylesheet = Some(ctx.stylesheets.fetch(ctx.bus, value));
            }
            MenuCommand::SaveAsPdf => self.save_as_pdf(ctx),
            MenuCommand::OpenMarkdown { .. } => {
                error!("Unsupported MenuCommand for a document tab - {command:?}");
            }
        }
    }
}

fn style_fragment(rules: &str) -> String {
    if rules.is_empty() {
        String::new()
    } else {
        format!("<style>{rules}</style>")
    }
}

/// Default export target next to the source file.
fn pdf_target_path(md_filepath: &str) -> String {
    if md_filepath.is_empty() {
        return "untitled.pdf".to_owned();
    }

    match md_filepath.rsplit_once('.') {
        Some((stem, extension)) if !extension.contains(['/', '\\']) => format!("{stem}.pdf"),
        _ => format!("{md_filepath}.pdf"),
    }
}
