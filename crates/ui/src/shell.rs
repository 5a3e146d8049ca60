//! The UI shell: the root component of the UI process.
//!
//! Wires the bus endpoint, the tab manager, the panel host, and the
//! toolbar together. Host commands come in through `poll`; state changes
//! requested by tabs are applied here after each dispatch.

use crate::markdown_panel::MarkdownPanel;
use crate::panels::{PanelHost, ShellContext, StateChange};
use crate::stylesheets::StylesheetStore;
use crate::tabs::{TabItem, TabKey, TabManager};
use crate::toolbar::{
    ControlClick, DropdownOption, ToolbarControl, ToolbarController, ToolbarState,
};
use crate::util::filename_from_path;
use crate::ShellError;
use doc_model::{MarkdownFile, MenuId, MenuItemState, Settings};
use ipc::{MenuCommand, RendererEvent, UiEndpoint};
use log::error;

/// Toolbar id of the stylesheet dropdown.
pub const TOOLBAR_STYLESHEETS: &str = "stylesheets";

pub struct UiShell {
    bus: UiEndpoint,
    tabs: TabManager,
    panels: PanelHost,
    toolbar: ToolbarController,
    stylesheets: StylesheetStore,
    settings: Settings,
    /// Toolbar state with no tabs open, restored when the last tab
    /// closes.
    empty_toolbar_state: ToolbarState,
}

impl UiShell {
    /// Fetches settings and the stylesheet list from the host (blocking
    /// until the host end services the requests) and builds the initial
    /// toolbar.
    pub fn new(mut bus: UiEndpoint) -> Result<Self, ShellError> {
        let settings = bus.get_settings()?;

        let mut stylesheets = StylesheetStore::new(settings.default_stylesheet.clone());
        stylesheets.initialize(&mut bus)?;

        let options = stylesheets
            .available()
            .iter()
            .map(|path| {
                DropdownOption::new(path.clone(), filename_from_path(path).unwrap_or(path))
            })
            .collect();

        let mut toolbar = ToolbarController::new();
        toolbar.set_controls(vec![ToolbarControl::dropdown(
            TOOLBAR_STYLESHEETS,
            "Stylesheets",
            &settings.default_stylesheet,
            options,
        )
        .disabled()]);

        let empty_toolbar_state = toolbar.state();

        Ok(Self {
            bus,
            tabs: TabManager::new(),
            panels: PanelHost::new(),
            toolbar,
            stylesheets,
            settings,
            empty_toolbar_state,
        })
    }

    pub fn app_name(&self) -> Option<&str> {
        self.bus.app_info().map(|info| info.app_name.as_str())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn toolbar_controls(&self) -> Vec<ToolbarControl> {
        self.toolbar.controls()
    }

    pub fn toolbar_state(&self) -> ToolbarState {
        self.toolbar.state()
    }

    pub fn tab_items(&self) -> Vec<TabItem> {
        self.tabs.items()
    }

    pub fn subscribe_tab_items<F>(&mut self, listener: F)
    where
        F: FnMut(&[TabItem]) + Send + 'static,
    {
        self.tabs.subscribe(listener);
    }

    /// Exposes the bus for modal scopes and dialogs.
    pub fn bus_mut(&mut self) -> &mut UiEndpoint {
        &mut self.bus
    }

    /// Drains host traffic and dispatches it. Returns `Disconnected`
    /// once the host has gone away.
    pub fn poll(&mut self) -> Result<(), ShellError> {
        let commands = self.bus.poll()?;
        for command in commands {
            self.handle_command(command);
        }

        Ok(())
    }

    fn handle_command(&mut self, command: MenuCommand) {
        match command {
            MenuCommand::OpenMarkdown { filepath, contents } => {
                self.open_markdown_file(MarkdownFile { filepath, contents });
            }
            routed => self.route_to_active(&routed),
        }
    }

    pub fn open_markdown_file(&mut self, data: MarkdownFile) {
        let changes = {
            let mut ctx = ShellContext::new(&mut self.bus, &mut self.stylesheets);
            self.tabs.open(&mut self.panels, Box::new(MarkdownPanel::new()), data, &mut ctx);
            ctx.into_changes()
        };
        self.apply_state_changes(changes);
    }

    pub fn switch_to_tab(&mut self, key: &TabKey) {
        let changes = {
            let mut ctx = ShellContext::new(&mut self.bus, &mut self.stylesheets);
            self.tabs.switch_to(&mut self.panels, key, &mut ctx);
            ctx.into_changes()
        };
        self.apply_state_changes(changes);
    }

    pub fn close_tab(&mut self, key: &TabKey) {
        let changes = {
            let mut ctx = ShellContext::new(&mut self.bus, &mut self.stylesheets);
            self.tabs.close(&mut self.panels, key, &mut ctx);
            ctx.into_changes()
        };
        self.apply_state_changes(changes);
    }

    /// Toolbar click entry point. The controller's own state is updated
    /// before the click takes effect anywhere else.
    pub fn on_toolbar_control_click(&mut self, click: ControlClick) {
        self.toolbar.on_control_click(&click);

        match click.id.as_str() {
            TOOLBAR_STYLESHEETS => {
                let Some(value) = click.value.as_ref().and_then(|value| value.as_text()) else {
                    error!("Stylesheet selection without a value");
                    return;
                };
                self.route_to_active(&MenuCommand::SetStylesheet { value: value.to_owned() });
            }
            other => error!("Unrecognized toolbar control id '{other}'"),
        }
    }

    fn route_to_active(&mut self, command: &MenuCommand) {
        let changes = {
            let mut ctx = ShellContext::new(&mut self.bus, &mut self.stylesheets);
            self.tabs.send_command(&mut self.panels, command, &mut ctx);
            ctx.into_changes()
        };
        self.apply_state_changes(changes);
    }

    fn apply_state_changes(&mut self, changes: Vec<StateChange>) {
        for change in changes {
            match change {
                StateChange::Toolbar(patch) => self.toolbar.apply_state(&patch),
                StateChange::Menu(menu_states) => self.emit_tab_changed(menu_states),
                StateChange::Empty => {
                    let reset = self.empty_toolbar_state.clone();
                    self.toolbar.apply_state(&reset);
                    self.emit_tab_changed(vec![MenuItemState::disabled(MenuId::FileSaveAsPdf)]);
                }
            }
        }
    }

    fn emit_tab_changed(&self, menu_states: Vec<MenuItemState>) {
        if let Err(err) = self.bus.emit_event(&RendererEvent::TabChanged { menu_states }) {
            error!("Failed to publish menu state change: {err}");
        }
    }
}
