//! Menu enablement state machine.
//!
//! Two states: normal, and suppressed while a modal dialog is up. The
//! pre-suppression state of every touched entry is captured in a saved
//! map keyed by item id; restore writes it back verbatim. Patches that
//! arrive while suppressed are applied to the saved map so they take
//! effect on restore instead of fighting the suppression.

use crate::menu::{Menu, MenuEntry, MenuRole};
use doc_model::MenuItemState;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("menu item '{0}' could not be found")]
    ItemNotFound(String),
    #[error("application menu has not been set")]
    ApplicationMenuNotSet,
}

/// Enablement snapshot of the text-editing roles, as reported by the
/// focused editing surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditFlags {
    pub can_undo: bool,
    pub can_redo: bool,
    pub can_cut: bool,
    pub can_copy: bool,
    pub can_paste: bool,
    pub can_select_all: bool,
}

#[derive(Debug, Clone, Copy)]
struct SavedItemState {
    enabled: bool,
    checked: Option<bool>,
}

#[derive(Debug, Default)]
pub struct MenuState {
    /// Pre-suppression state by item id; non-empty exactly while
    /// suppressed.
    saved: BTreeMap<String, SavedItemState>,
}

impl MenuState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_suppressed(&self) -> bool {
        !self.saved.is_empty()
    }

    /// Disables every interactive entry except the always-enabled roles
    /// and their ancestor menus (which must stay open so those roles
    /// remain reachable). Idempotent: a second call while suppressed
    /// would capture the all-disabled state, so it is a no-op instead.
    pub fn suppress(&mut self, menu: &mut Menu) {
        if self.is_suppressed() {
            return;
        }

        let mut forced = BTreeSet::new();
        let mut ancestors = Vec::new();
        collect_forced_menus(&menu.entries, &mut ancestors, &mut forced);

        suppress_entries(&mut menu.entries, &forced, &mut self.saved);
    }

    /// Writes every saved state back onto the live menu by id. A missing
    /// id means the menu tree changed shape across the cycle, which is a
    /// configuration defect.
    pub fn restore(&mut self, menu: &mut Menu) -> Result<(), MenuError> {
        for (id, state) in &self.saved {
            if let Some(item) = menu.find_item_mut(id) {
                item.enabled = state.enabled;
                item.checked = state.checked;
            } else if let Some(submenu) = menu.find_submenu_mut(id) {
                submenu.enabled = state.enabled;
            } else {
                return Err(MenuError::ItemNotFound(id.clone()));
            }
        }

        self.saved.clear();
        Ok(())
    }

    /// Applies a sparse patch. While suppressed, patches land on the
    /// saved map so they materialize on restore; otherwise they hit the
    /// live items directly. Unknown ids are a configuration defect.
    pub fn apply_partial(
        &mut self,
        menu: &mut Menu,
        states: &[MenuItemState],
    ) -> Result<(), MenuError> {
        for state in states {
            let id = state.id.as_str();

            if let Some(saved) = self.saved.get_mut(id) {
                saved.enabled = state.enabled;
                if state.checked.is_some() {
                    saved.checked = state.checked;
                }
            } else {
                let item =
                    menu.find_item_mut(id).ok_or_else(|| MenuError::ItemNotFound(id.to_owned()))?;
                item.enabled = state.enabled;
                if state.checked.is_some() {
                    item.checked = state.checked;
                }
            }
        }

        Ok(())
    }

    /// Applies the focused surface's edit capabilities to the clipboard
    /// roles. Roles missing from the menu are skipped.
    pub fn set_edit_menu_state(&mut self, menu: &mut Menu, flags: &EditFlags) {
        set_role_enabled(&mut menu.entries, MenuRole::Undo, flags.can_undo);
        set_role_enabled(&mut menu.entries, MenuRole::Redo, flags.can_redo);
        set_role_enabled(&mut menu.entries, MenuRole::Cut, flags.can_cut);
        set_role_enabled(&mut menu.entries, MenuRole::Copy, flags.can_copy);
        set_role_enabled(&mut menu.entries, MenuRole::Paste, flags.can_paste);
        set_role_enabled(&mut menu.entries, MenuRole::SelectAll, flags.can_select_all);
    }
}

fn collect_forced_menus(
    entries: &[MenuEntry],
    ancestors: &mut Vec<String>,
    forced: &mut BTreeSet<String>,
) {
    for entry in entries {
        match entry {
            MenuEntry::Item(item) => {
                if item.role.is_some_and(|role| role.always_enabled()) {
                    forced.extend(ancestors.iter().cloned());
                }
            }
            MenuEntry::Submenu(submenu) => {
                ancestors.push(submenu.id.clone());
                collect_forced_menus(&submenu.entries, ancestors, forced);
                ancestors.pop();
            }
            MenuEntry::Separator => {}
        }
    }
}

fn suppress_entries(
    entries: &mut [MenuEntry],
    forced: &BTreeSet<String>,
    saved: &mut BTreeMap<String, SavedItemState>,
) {
    for entry in entries {
        match entry {
            MenuEntry::Item(item) => {
                if item.role.is_some_and(|role| role.always_enabled()) {
                    continue;
                }

                saved.insert(
                    item.id.clone(),
                    SavedItemState { enabled: item.enabled, checked: item.checked },
                );
                item.enabled = false;
            }
            MenuEntry::Submenu(submenu) => {
                saved.insert(
                    submenu.id.clone(),
                    SavedItemState { enabled: submenu.enabled, checked: None },
                );
                submenu.enabled = forced.contains(&submenu.id);
                suppress_entries(&mut submenu.entries, forced, saved);
            }
            MenuEntry::Separator => {}
        }
    }
}

fn set_role_enabled(entries: &mut [MenuEntry], role: MenuRole, enabled: bool) {
    for entry in entries {
        match entry {
            MenuEntry::Item(item) => {
                if item.role == Some(role) {
                    item.enabled = enabled;
                }
            }
            MenuEntry::Submenu(submenu) => set_role_enabled(&mut submenu.entries, role, enabled),
            MenuEntry::Separator => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::build_main_menu;
    use doc_model::{MenuId, RecentItem};

    fn menu() -> Menu {
        build_main_menu("Markdown Editor", true, &[RecentItem::new("/a.md")])
    }

    #[test]
    fn suppress_disables_all_but_the_always_enabled_roles() {
        let mut menu = menu();
        let mut state = MenuState::new();

        state.suppress(&mut menu);

        assert!(!menu.find_item(MenuId::FileOpen.as_str()).expect("item expected").enabled);
        assert!(!menu
            .find_item(MenuId::ApplicationAbout.as_str())
            .expect("item expected")
            .enabled);
        // Close/quit and clipboard roles stay usable.
        assert!(menu.find_item(MenuId::FileExit.as_str()).expect("item expected").enabled);
        assert!(menu.find_item(MenuId::EditCopy.as_str()).expect("item expected").enabled);
        assert!(state.is_suppressed());
    }

    #[test]
    fn ancestors_of_always_enabled_roles_stay_reachable() {
        let mut menu = menu();
        let mut state = MenuState::new();

        state.suppress(&mut menu);

        // The File menu holds the close role, the application menu holds
        // quit; both must remain openable.
        let file = menu.find_submenu_mut(MenuId::File.as_str()).expect("submenu expected");
        assert!(file.enabled);
        let application =
            menu.find_submenu_mut(MenuId::Application.as_str()).expect("submenu expected");
        assert!(application.enabled);
        // The recent submenu holds no allowlisted role and goes dark.
        let recent =
            menu.find_submenu_mut(MenuId::FileOpenRecent.as_str()).expect("submenu expected");
        assert!(!recent.enabled);
    }

    #[test]
    fn restore_returns_every_item_to_its_exact_prior_state() {
        let mut menu = menu();
        menu.find_item_mut(MenuId::FileSaveAsPdf.as_str()).expect("item expected").enabled = true;

        let clear_before =
            menu.find_item(MenuId::FileOpenRecentClear.as_str()).expect("item expected").enabled;

        let mut state = MenuState::new();
        state.suppress(&mut menu);
        state.restore(&mut menu).expect("restore should succeed");

        assert!(menu.find_item(MenuId::FileSaveAsPdf.as_str()).expect("item expected").enabled);
        assert!(menu.find_item(MenuId::FileOpen.as_str()).expect("item expected").enabled);
        assert_eq!(
            menu.find_item(MenuId::FileOpenRecentClear.as_str()).expect("item expected").enabled,
            clear_before
        );
        assert!(!state.is_suppressed());
    }

    #[test]
    fn second_suppress_does_not_clobber_the_saved_state() {
        let mut menu = menu();
        menu.find_item_mut(MenuId::FileSaveAsPdf.as_str()).expect("item expected").enabled = true;

        let mut state = MenuState::new();
        state.suppress(&mut menu);
        state.suppress(&mut menu);
        state.restore(&mut menu).expect("restore should succeed");

        assert!(menu.find_item(MenuId::FileSaveAsPdf.as_str()).expect("item expected").enabled);
    }

    #[test]
    fn partial_patches_reach_the_saved_state_while_suppressed() {
        let mut menu = menu();
        let mut state = MenuState::new();

        state.suppress(&mut menu);
        state
            .apply_partial(&mut menu, &[MenuItemState::enabled(MenuId::FileSaveAsPdf)])
            .expect("patch should succeed");

        // Still suppressed on the live item...
        assert!(!menu.find_item(MenuId::FileSaveAsPdf.as_str()).expect("item expected").enabled);

        // ...but materializes on restore.
        state.restore(&mut menu).expect("restore should succeed");
        assert!(menu.find_item(MenuId::FileSaveAsPdf.as_str()).expect("item expected").enabled);
    }

    #[test]
    fn partial_patches_hit_live_items_when_not_suppressed() {
        let mut menu = menu();
        let mut state = MenuState::new();

        state
            .apply_partial(&mut menu, &[MenuItemState::enabled(MenuId::FileSaveAsPdf)])
            .expect("patch should succeed");

        assert!(menu.find_item(MenuId::FileSaveAsPdf.as_str()).expect("item expected").enabled);
    }

    #[test]
    fn unknown_patch_id_is_a_configuration_defect() {
        let mut menu = build_main_menu("Markdown Editor", false, &[]);
        let mut state = MenuState::new();

        let err = state
            .apply_partial(&mut menu, &[MenuItemState::enabled(MenuId::ApplicationQuit)])
            .expect_err("patch should fail");

        assert!(matches!(err, MenuError::ItemNotFound(id) if id == "application_quit"));
    }

    #[test]
    fn edit_flags_drive_the_clipboard_roles() {
        let mut menu = menu();
        let mut state = MenuState::new();

        state.set_edit_menu_state(
            &mut menu,
            &EditFlags { can_undo: true, can_paste: true, ..EditFlags::default() },
        );

        assert!(menu.find_item(MenuId::EditUndo.as_str()).expect("item expected").enabled);
        assert!(menu.find_item(MenuId::EditPaste.as_str()).expect("item expected").enabled);
        assert!(!menu.find_item(MenuId::EditCut.as_str()).expect("item expected").enabled);
    }
}
