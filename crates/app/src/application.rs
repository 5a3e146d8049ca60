//! Host application context.
//!
//! Owns the explicitly constructed host services (menu model + state
//! machine, recently-opened registry, stylesheet service, PDF export)
//! and the host end of the bus. One instance per process, created at
//! startup and driven by the main loop.

use crate::dialog::FilePicker;
use crate::menu::{build_main_menu, Menu, MenuAction};
use crate::menu_state::{EditFlags, MenuError, MenuState};
use crate::pdf::PdfExportService;
use crate::recent_files::RecentFiles;
use crate::stylesheets::StylesheetService;
use crate::AppError;
use doc_model::{AppInfo, RecentItem, Settings};
use ipc::{BusError, HostEndpoint, MenuCommand, RendererEvent, RendererRequest, SettingsRequest};
use log::{error, info};
use std::fs;
use std::path::Path;
use storage::Storage;

pub struct Application {
    bus: HostEndpoint,
    menu: Option<Menu>,
    menu_state: MenuState,
    recent: RecentFiles,
    pdf: PdfExportService,
    picker: Box<dyn FilePicker>,
    app_name: String,
    is_mac: bool,
    should_quit: bool,
}

impl Application {
    pub fn new(
        storage: Storage,
        bus: HostEndpoint,
        picker: Box<dyn FilePicker>,
        app_name: &str,
    ) -> Result<Self, AppError> {
        Self::with_platform(storage, bus, picker, app_name, cfg!(target_os = "macos"))
    }

    pub fn with_platform(
        storage: Storage,
        mut bus: HostEndpoint,
        picker: Box<dyn FilePicker>,
        app_name: &str,
        is_mac: bool,
    ) -> Result<Self, AppError> {
        let stylesheet_service = StylesheetService::new(storage.clone(), storage.root());
        if let Err(err) = stylesheet_service.ensure_default() {
            error!("Could not materialize the default stylesheet: {err}");
        }

        bus.serve_renderer_requests(move |request| match request {
            RendererRequest::GetAvailableStylesheets => {
                serde_json::to_value(stylesheet_service.stylesheets())
                    .map_err(|err| err.to_string())
            }
            RendererRequest::GetStylesheet { filepath } => {
                serde_json::to_value(stylesheet_service.read(filepath))
                    .map_err(|err| err.to_string())
            }
        })?;

        let settings_storage = storage.clone();
        bus.serve_settings_requests(move |request| match request {
            SettingsRequest::GetSettings => {
                let settings = Settings {
                    stylesheets: settings_storage
                        .stylesheets()
                        .map_err(|err| err.to_string())?,
                    default_stylesheet: settings_storage
                        .default_stylesheet()
                        .map_err(|err| err.to_string())?,
                    pdf_format: settings_storage.pdf_format().map_err(|err| err.to_string())?,
                };
                serde_json::to_value(settings).map_err(|err| err.to_string())
            }
        })?;

        let recent = RecentFiles::new(storage.clone());
        let pdf = PdfExportService::new(storage);

        let mut app = Self {
            bus,
            menu: None,
            menu_state: MenuState::new(),
            recent,
            pdf,
            picker,
            app_name: app_name.to_owned(),
            is_mac,
            should_quit: false,
        };

        app.rebuild_menu();
        app.bus.send_app_info(&AppInfo { app_name: app.app_name.clone() })?;

        Ok(app)
    }

    pub fn menu(&self) -> Result<&Menu, MenuError> {
        self.menu.as_ref().ok_or(MenuError::ApplicationMenuNotSet)
    }

    pub fn menu_suppressed(&self) -> bool {
        self.menu_state.is_suppressed()
    }

    pub fn recent_items(&self) -> Vec<RecentItem> {
        self.recent.items()
    }

    /// Drains UI traffic. `Ok(false)` means the process should exit:
    /// either the UI end went away or quit was requested.
    pub fn poll(&mut self) -> Result<bool, AppError> {
        let events = match self.bus.poll() {
            Ok(events) => events,
            Err(BusError::Disconnected) => return Ok(false),
            Err(err) => return Err(err.into()),
        };

        for event in events {
            self.handle_renderer_event(event)?;
        }

        Ok(!self.should_quit)
    }

    fn handle_renderer_event(&mut self, event: RendererEvent) -> Result<(), AppError> {
        match event {
            RendererEvent::ModalOpened => {
                let menu = self.menu.as_mut().ok_or(MenuError::ApplicationMenuNotSet)?;
                self.menu_state.suppress(menu);
            }
            RendererEvent::ModalClosed => {
                let menu = self.menu.as_mut().ok_or(MenuError::ApplicationMenuNotSet)?;
                self.menu_state.restore(menu)?;
            }
            RendererEvent::TabChanged { menu_states } => {
                let menu = self.menu.as_mut().ok_or(MenuError::ApplicationMenuNotSet)?;
                self.menu_state.apply_partial(menu, &menu_states)?;
            }
            RendererEvent::SaveAsPdf { filepath, html, header, footer } => {
                if let Err(err) = self.pdf.export(&filepath, &html, &header, &footer) {
                    error!("Failed to export PDF to '{filepath}': {err}");
                }
            }
        }

        Ok(())
    }

    /// Menu click entry point: resolves the id against the live tree and
    /// runs its action. Disabled items are ignored.
    pub fn activate_menu_item(&mut self, id: &str) -> Result<(), AppError> {
        let action = {
            let menu = self.menu()?;
            let item =
                menu.find_item(id).ok_or_else(|| MenuError::ItemNotFound(id.to_owned()))?;

            if !item.enabled {
                info!("Ignoring activation of disabled menu item '{id}'");
                return Ok(());
            }

            item.action.clone()
        };

        match action {
            Some(action) => self.handle_menu_action(&action),
            None => Ok(()),
        }
    }

    pub fn handle_menu_action(&mut self, action: &MenuAction) -> Result<(), AppError> {
        match action {
            MenuAction::OpenFile => {
                if let Some(path) = self.picker.pick_markdown_file() {
                    self.open_markdown_path(&path);
                }
                Ok(())
            }
            MenuAction::OpenRecent(recent_item) => {
                self.open_markdown_path(Path::new(&recent_item.label));
                Ok(())
            }
            MenuAction::ClearRecentlyOpened => {
                self.recent.clear();
                self.rebuild_menu();
                Ok(())
            }
            MenuAction::SaveAsPdf => Ok(self.bus.send_command(&MenuCommand::SaveAsPdf)?),
            MenuAction::Exit => {
                self.should_quit = true;
                Ok(())
            }
        }
    }

    /// Reads a Markdown file and hands it to the UI. Read failures are
    /// logged and the open is abandoned; successful opens land in the
    /// recent list, which rebuilds the menu.
    pub fn open_markdown_path(&mut self, path: &Path) {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                error!("Failed to open/read file contents of {}: {err}", path.display());
                return;
            }
        };

        let filepath = path.to_string_lossy().into_owned();
        let command = MenuCommand::OpenMarkdown { filepath: filepath.clone(), contents };
        if let Err(err) = self.bus.send_command(&command) {
            error!("Failed to deliver open command for '{filepath}': {err}");
            return;
        }

        self.recent.add(RecentItem::new(filepath));
        self.rebuild_menu();
    }

    pub fn set_edit_menu_state(&mut self, flags: &EditFlags) -> Result<(), AppError> {
        let menu = self.menu.as_mut().ok_or(MenuError::ApplicationMenuNotSet)?;
        self.menu_state.set_edit_menu_state(menu, flags);
        Ok(())
    }

    /// Releases external resources. Called once on shutdown.
    pub fn shutdown(&mut self) {
        self.pdf.close();
    }

    /// Menus cannot be edited in place, so every recent-list change
    /// builds a fresh tree and swaps it, carrying the current dynamic
    /// state over the template defaults.
    fn rebuild_menu(&mut self) {
        let mut rebuilt = build_main_menu(&self.app_name, self.is_mac, &self.recent.items());
        if let Some(old) = &self.menu {
            rebuilt.carry_state_from(old);
        }
        self.menu = Some(rebuilt);
    }
}
