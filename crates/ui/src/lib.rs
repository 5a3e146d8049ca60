//! UI-process core: the tabbed editing shell.
//!
//! Owns which documents are open, routes host commands to the active
//! document, and keeps the toolbar and the host-side menu in sync through
//! sparse state patches. Nothing in here touches the OS; everything
//! reaches the host through the bus endpoint it is given.

mod markdown_panel;
mod modal;
mod panels;
mod preview;
mod shell;
mod stylesheets;
mod tabs;
mod toolbar;
mod util;

pub use markdown_panel::MarkdownPanel;
pub use modal::with_modal;
pub use panels::{PanelHost, ShellContext, StateChange, TabPanel};
pub use preview::{compose_document, extract_rules_containing, SCREEN_CSS};
pub use shell::{UiShell, TOOLBAR_STYLESHEETS};
pub use stylesheets::StylesheetStore;
pub use tabs::{TabItem, TabKey, TabManager, TabViewHost};
pub use toolbar::{
    ControlBase, ControlClick, ControlState, ControlValue, DropdownOption, ToolbarControl,
    ToolbarController, ToolbarState,
};

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("bus error: {0}")]
    Bus(#[from] ipc::BusError),
}
