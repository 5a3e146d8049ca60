//! Native-menu model.
//!
//! The platform menu is treated as immutable once built: every change of
//! the recent list builds a fresh tree from the template, carries the
//! current dynamic state over, and swaps the whole menu. Items are keyed
//! by the stable id strings from [`doc_model::MenuId`]; recent entries
//! generate indexed ids in the same namespace.

use doc_model::{MenuId, RecentItem};

/// Roles a menu item can delegate to the platform. Clipboard and
/// close/quit roles stay usable while a modal dialog suppresses the
/// rest of the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuRole {
    Close,
    Quit,
    About,
    Services,
    Hide,
    HideOthers,
    Unhide,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
}

impl MenuRole {
    /// Whether items with this role remain enabled during suppression.
    pub fn always_enabled(&self) -> bool {
        matches!(
            self,
            MenuRole::Close
                | MenuRole::Quit
                | MenuRole::Undo
                | MenuRole::Redo
                | MenuRole::Cut
                | MenuRole::Copy
                | MenuRole::Paste
                | MenuRole::SelectAll
        )
    }
}

/// What activating an item asks the application to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    OpenFile,
    OpenRecent(RecentItem),
    ClearRecentlyOpened,
    SaveAsPdf,
    Exit,
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    pub role: Option<MenuRole>,
    pub enabled: bool,
    pub checked: Option<bool>,
    pub action: Option<MenuAction>,
}

impl MenuItem {
    fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            role: None,
            enabled: true,
            checked: None,
            action: None,
        }
    }

    fn with_role(mut self, role: MenuRole) -> Self {
        self.role = Some(role);
        self
    }

    fn with_action(mut self, action: MenuAction) -> Self {
        self.action = Some(action);
        self
    }

    fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Submenu {
    pub id: String,
    pub label: String,
    pub enabled: bool,
    pub entries: Vec<MenuEntry>,
}

impl Submenu {
    fn new(id: impl Into<String>, label: impl Into<String>, entries: Vec<MenuEntry>) -> Self {
        Self { id: id.into(), label: label.into(), enabled: true, entries }
    }
}

#[derive(Debug, Clone)]
pub enum MenuEntry {
    Item(MenuItem),
    Separator,
    Submenu(Submenu),
}

#[derive(Debug, Clone, Default)]
pub struct Menu {
    pub entries: Vec<MenuEntry>,
}

impl Menu {
    pub fn find_item(&self, id: &str) -> Option<&MenuItem> {
        find_item(&self.entries, id)
    }

    pub fn find_item_mut(&mut self, id: &str) -> Option<&mut MenuItem> {
        find_item_mut(&mut self.entries, id)
    }

    pub fn find_submenu_mut(&mut self, id: &str) -> Option<&mut Submenu> {
        find_submenu_mut(&mut self.entries, id)
    }

    /// Copies enabled/checked state from `old` for every id present in
    /// both trees, so a rebuild reflects the current state rather than
    /// the template defaults.
    pub fn carry_state_from(&mut self, old: &Menu) {
        carry_state(&mut self.entries, old);
    }
}

fn find_item<'a>(entries: &'a [MenuEntry], id: &str) -> Option<&'a MenuItem> {
    for entry in entries {
        match entry {
            MenuEntry::Item(item) if item.id == id => return Some(item),
            MenuEntry::Submenu(submenu) => {
                if let Some(found) = find_item(&submenu.entries, id) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn find_item_mut<'a>(entries: &'a mut [MenuEntry], id: &str) -> Option<&'a mut MenuItem> {
    for entry in entries {
        match entry {
            MenuEntry::Item(item) if item.id == id => return Some(item),
            MenuEntry::Submenu(submenu) => {
                if let Some(found) = find_item_mut(&mut submenu.entries, id) {
                    return Some(found);
                }
            }
            _ => {}
        }
    }
    None
}

fn find_submenu_mut<'a>(entries: &'a mut [MenuEntry], id: &str) -> Option<&'a mut Submenu> {
    for entry in entries {
        if let MenuEntry::Submenu(submenu) = entry {
            if submenu.id == id {
                return Some(submenu);
            }
            if let Some(found) = find_submenu_mut(&mut submenu.entries, id) {
                return Some(found);
            }
        }
    }
    None
}

fn carry_state(entries: &mut [MenuEntry], old: &Menu) {
    for entry in entries {
        match entry {
            MenuEntry::Item(item) => {
                if let Some(previous) = old.find_item(&item.id) {
                    item.enabled = previous.enabled;
                    item.checked = previous.checked;
                }
            }
            MenuEntry::Submenu(submenu) => carry_state(&mut submenu.entries, old),
            MenuEntry::Separator => {}
        }
    }
}

/// Id of the n-th recent entry.
pub fn recent_item_id(index: usize) -> String {
    format!("{}_{index}", MenuId::FileOpenRecent.as_str())
}

/// Builds the full main menu from the current recent list.
pub fn build_main_menu(app_name: &str, is_mac: bool, recent_items: &[RecentItem]) -> Menu {
    let mut entries = Vec::new();

    if is_mac {
        entries.push(MenuEntry::Submenu(application_menu(app_name)));
    }

    entries.push(MenuEntry::Submenu(file_menu(is_mac, recent_items)));
    entries.push(MenuEntry::Submenu(edit_menu()));

    Menu { entries }
}

fn file_menu(is_mac: bool, recent_items: &[RecentItem]) -> Submenu {
    let exit_role = if is_mac { MenuRole::Close } else { MenuRole::Quit };

    Submenu::new(
        MenuId::File.as_str(),
        "File",
        vec![
            MenuEntry::Item(
                MenuItem::new(MenuId::FileOpen.as_str(), "Open...")
                    .with_action(MenuAction::OpenFile),
            ),
            MenuEntry::Submenu(Submenu::new(
                MenuId::FileOpenRecent.as_str(),
                "Open Recent",
                recent_entries(recent_items),
            )),
            MenuEntry::Separator,
            MenuEntry::Item(
                MenuItem::new(MenuId::FileSaveAsPdf.as_str(), "Save as PDF...")
                    .with_action(MenuAction::SaveAsPdf)
                    .disabled(),
            ),
            MenuEntry::Separator,
            MenuEntry::Item(
                MenuItem::new(MenuId::FileExit.as_str(), if is_mac { "Close" } else { "Exit" })
                    .with_role(exit_role)
                    .with_action(MenuAction::Exit),
            ),
        ],
    )
}

fn recent_entries(recent_items: &[RecentItem]) -> Vec<MenuEntry> {
    let mut entries = Vec::new();

    if !recent_items.is_empty() {
        for (index, recent_item) in recent_items.iter().enumerate() {
            entries.push(MenuEntry::Item(
                MenuItem::new(recent_item_id(index), recent_item.label.clone())
                    .with_action(MenuAction::OpenRecent(recent_item.clone())),
            ));
        }

        entries.push(MenuEntry::Separator);
    }

    let mut clear = MenuItem::new(MenuId::FileOpenRecentClear.as_str(), "Clear Recently Opened")
        .with_action(MenuAction::ClearRecentlyOpened);
    clear.enabled = !recent_items.is_empty();
    entries.push(MenuEntry::Item(clear));

    entries
}

fn edit_menu() -> Submenu {
    Submenu::new(
        MenuId::Edit.as_str(),
        "Edit",
        vec![
            MenuEntry::Item(
                MenuItem::new(MenuId::EditUndo.as_str(), "Undo").with_role(MenuRole::Undo),
            ),
            MenuEntry::Item(
                MenuItem::new(MenuId::EditRedo.as_str(), "Redo").with_role(MenuRole::Redo),
            ),
            MenuEntry::Separator,
            MenuEntry::Item(MenuItem::new(MenuId::EditCut.as_str(), "Cut").with_role(MenuRole::Cut)),
            MenuEntry::Item(
                MenuItem::new(MenuId::EditCopy.as_str(), "Copy").with_role(MenuRole::Copy),
            ),
            MenuEntry::Item(
                MenuItem::new(MenuId::EditPaste.as_str(), "Paste").with_role(MenuRole::Paste),
            ),
            MenuEntry::Separator,
            MenuEntry::Item(
                MenuItem::new(MenuId::EditSelectAll.as_str(), "Select All")
                    .with_role(MenuRole::SelectAll),
            ),
        ],
    )
}

fn application_menu(app_name: &str) -> Submenu {
    Submenu::new(
        MenuId::Application.as_str(),
        app_name,
        vec![
            MenuEntry::Item(
                MenuItem::new(MenuId::ApplicationAbout.as_str(), format!("About {app_name}"))
                    .with_role(MenuRole::About),
            ),
            MenuEntry::Separator,
            MenuEntry::Item(
                MenuItem::new(MenuId::ApplicationServices.as_str(), "Services")
                    .with_role(MenuRole::Services),
            ),
            MenuEntry::Separator,
            MenuEntry::Item(
                MenuItem::new(MenuId::ApplicationHide.as_str(), format!("Hide {app_name}"))
                    .with_role(MenuRole::Hide),
            ),
            MenuEntry::Item(
                MenuItem::new(MenuId::ApplicationHideOthers.as_str(), "Hide Others")
                    .with_role(MenuRole::HideOthers),
            ),
            MenuEntry::Item(
                MenuItem::new(MenuId::ApplicationUnhide.as_str(), "Show All")
                    .with_role(MenuRole::Unhide),
            ),
            MenuEntry::Separator,
            MenuEntry::Item(
                MenuItem::new(MenuId::ApplicationQuit.as_str(), format!("Quit {app_name}"))
                    .with_role(MenuRole::Quit),
            ),
        ],
    )
}
