use serde::{Deserialize, Serialize};

/// Marker entry standing in for the built-in stylesheet. Always the first
/// entry of the stylesheet list; the host resolves it to a real file.
pub const DEFAULT_STYLESHEET: &str = "(default)";

/// Cap on the persisted recently-opened list.
pub const MAX_RECENTLY_OPENED_ITEMS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub app_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownFile {
    pub filepath: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentItem {
    pub label: String,
}

impl RecentItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }

    /// Case-normalized key used to deduplicate entries.
    pub fn dedup_key(&self) -> String {
        self.label.to_uppercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stylesheet {
    pub filepath: String,
    pub css: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfMargins {
    pub top: String,
    pub bottom: String,
    pub left: String,
    pub right: String,
}

impl Default for PdfMargins {
    fn default() -> Self {
        Self {
            top: "20mm".to_owned(),
            bottom: "20mm".to_owned(),
            left: "20mm".to_owned(),
            right: "20mm".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfFormat {
    pub paper_format: String,
    pub landscape: bool,
    pub margins: PdfMargins,
    pub display_header: bool,
    pub display_footer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_template: Option<String>,
}

impl Default for PdfFormat {
    fn default() -> Self {
        Self {
            paper_format: "a4".to_owned(),
            landscape: false,
            margins: PdfMargins::default(),
            display_header: false,
            display_footer: false,
            header_template: None,
            footer_template: None,
        }
    }
}

/// Settings snapshot delivered to the UI process in one round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub stylesheets: Vec<String>,
    pub default_stylesheet: String,
    pub pdf_format: PdfFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stylesheets: vec![DEFAULT_STYLESHEET.to_owned()],
            default_stylesheet: DEFAULT_STYLESHEET.to_owned(),
            pdf_format: PdfFormat::default(),
        }
    }
}

/// Identifier of an interactive menu entry. Unique within the menu tree;
/// the menu state machine addresses live items through these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuId {
    File,
    FileOpen,
    FileOpenRecent,
    FileOpenRecentClear,
    FileSaveAsPdf,
    FileExit,
    Edit,
    EditUndo,
    EditRedo,
    EditCut,
    EditCopy,
    EditPaste,
    EditSelectAll,
    Application,
    ApplicationAbout,
    ApplicationServices,
    ApplicationHide,
    ApplicationHideOthers,
    ApplicationUnhide,
    ApplicationQuit,
}

impl MenuId {
    /// Stable string form, identical to the serde representation. Menu
    /// trees key their items by these strings so dynamically generated
    /// entries (recent files) can share the namespace.
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuId::File => "file",
            MenuId::FileOpen => "file_open",
            MenuId::FileOpenRecent => "file_open_recent",
            MenuId::FileOpenRecentClear => "file_open_recent_clear",
            MenuId::FileSaveAsPdf => "file_save_as_pdf",
            MenuId::FileExit => "file_exit",
            MenuId::Edit => "edit",
            MenuId::EditUndo => "edit_undo",
            MenuId::EditRedo => "edit_redo",
            MenuId::EditCut => "edit_cut",
            MenuId::EditCopy => "edit_copy",
            MenuId::EditPaste => "edit_paste",
            MenuId::EditSelectAll => "edit_select_all",
            MenuId::Application => "application",
            MenuId::ApplicationAbout => "application_about",
            MenuId::ApplicationServices => "application_services",
            MenuId::ApplicationHide => "application_hide",
            MenuId::ApplicationHideOthers => "application_hide_others",
            MenuId::ApplicationUnhide => "application_unhide",
            MenuId::ApplicationQuit => "application_quit",
        }
    }
}

/// Sparse patch for a single menu item, as carried by `TabChanged` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemState {
    pub id: MenuId,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

impl MenuItemState {
    pub fn enabled(id: MenuId) -> Self {
        Self { id, enabled: true, checked: None }
    }

    pub fn disabled(id: MenuId) -> Self {
        Self { id, enabled: false, checked: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_item_dedup_key_is_case_insensitive() {
        let a = RecentItem::new("C:\\Notes\\Todo.md");
        let b = RecentItem::new("c:\\notes\\todo.MD");

        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn default_settings_expose_the_builtin_stylesheet() {
        let settings = Settings::default();

        assert_eq!(settings.stylesheets, vec![DEFAULT_STYLESHEET.to_owned()]);
        assert_eq!(settings.default_stylesheet, DEFAULT_STYLESHEET);
    }

    #[test]
    fn pdf_format_round_trips_without_optional_templates() {
        let format = PdfFormat::default();
        let json = serde_json::to_string(&format).expect("serialize should succeed");

        assert!(!json.contains("headerTemplate"));

        let parsed: PdfFormat = serde_json::from_str(&json).expect("parse should succeed");
        assert_eq!(parsed, format);
    }

    #[test]
    fn menu_ids_serialize_as_stable_strings() {
        let json = serde_json::to_string(&MenuId::FileSaveAsPdf).expect("serialize should succeed");
        assert_eq!(json, "\"file_save_as_pdf\"");
    }

    #[test]
    fn menu_id_strings_match_the_serde_form() {
        for id in [MenuId::File, MenuId::FileOpenRecentClear, MenuId::ApplicationHideOthers] {
            let json = serde_json::to_string(&id).expect("serialize should succeed");
            assert_eq!(json, format!("\"{}\"", id.as_str()));
        }
    }
}
