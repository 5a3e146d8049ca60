//! Host and UI ends wired over the bus, driving full editing sessions.

use md_editor::dialog::FilePicker;
use md_editor::Application;
use md_editor_ui::{with_modal, UiShell};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use storage::Storage;

struct NoPicker;

impl FilePicker for NoPicker {
    fn pick_markdown_file(&mut self) -> Option<PathBuf> {
        None
    }
}

fn host_application(root: &Path) -> (Application, ipc::UiEndpoint) {
    let storage = Storage::with_root(root);
    let (host, ui) = ipc::pair();
    let app =
        Application::with_platform(storage, host, Box::new(NoPicker), "Markdown Editor", false)
            .expect("application should start");

    (app, ui)
}

/// Runs the host loop until the UI end disconnects, then hands the
/// application back for post-session assertions.
fn spawn_host(app: Application) -> thread::JoinHandle<Application> {
    thread::spawn(move || {
        let mut app = app;
        loop {
            match app.poll() {
                Ok(true) => thread::sleep(Duration::from_millis(1)),
                _ => break,
            }
        }
        app
    })
}

fn write_markdown(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write should succeed");
    path
}

#[test]
fn tab_lifecycle_scenario() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let (mut app, ui) = host_application(temp.path());

    let a = write_markdown(temp.path(), "a.md", "# A\n");
    let b = write_markdown(temp.path(), "b.md", "# B\n");
    app.open_markdown_path(&a);

    let host = spawn_host(app);
    let mut shell = UiShell::new(ui).expect("shell should start");

    shell.poll().expect("poll should succeed");
    let items = shell.tab_items();
    assert_eq!(items.len(), 1);
    assert!(items[0].active);
    assert_eq!(items[0].title, "a");
    let k1 = items[0].key.clone();

    // A second document opens inactive-first/active-last.
    shell.open_markdown_file(doc_model::MarkdownFile {
        filepath: b.to_string_lossy().into_owned(),
        contents: fs::read_to_string(&b).expect("read should succeed"),
    });
    let items = shell.tab_items();
    assert_eq!(items.len(), 2);
    assert!(!items[0].active);
    assert!(items[1].active);
    assert_eq!(items[1].title, "b");
    let k2 = items[1].key.clone();

    shell.switch_to_tab(&k1);
    let items = shell.tab_items();
    assert!(items[0].active);
    assert!(!items[1].active);

    // Closing the active non-trailing tab activates the trailing entry.
    shell.close_tab(&k1);
    let items = shell.tab_items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].key, k2);
    assert!(items[0].active);

    shell.close_tab(&k2);
    assert!(shell.tab_items().is_empty());

    drop(shell);
    let app = host.join().expect("host thread should exit");

    // The empty broadcast disabled PDF export again.
    let menu = app.menu().expect("menu expected");
    let item = menu.find_item(doc_model::MenuId::FileSaveAsPdf.as_str()).expect("item expected");
    assert!(!item.enabled);

    // Only the host-side open touched the recent list.
    let recent = app.recent_items();
    assert_eq!(recent.len(), 1);
    assert!(recent[0].label.ends_with("a.md"));
}

#[test]
fn save_as_pdf_flows_from_menu_to_disk() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let storage = Storage::with_root(temp.path());

    let mut format = doc_model::PdfFormat::default();
    format.display_header = true;
    format.header_template = Some("<span class=\"title\"></span>".to_owned());
    storage.set_pdf_format(&format).expect("save should succeed");

    let (mut app, ui) = host_application(temp.path());
    let source = write_markdown(temp.path(), "report.md", "# Quarterly Report\n\nNumbers.\n");

    app.open_markdown_path(&source);
    app.handle_menu_action(&md_editor::menu::MenuAction::SaveAsPdf)
        .expect("action should succeed");

    let host = spawn_host(app);
    let mut shell = UiShell::new(ui).expect("shell should start");
    shell.poll().expect("poll should succeed");
    drop(shell);
    host.join().expect("host thread should exit");

    let target = temp.path().join("report.pdf");
    let bytes = fs::read(&target).expect("exported PDF should exist");
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn modal_scope_round_trips_suppression() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let (app, ui) = host_application(temp.path());

    let host = spawn_host(app);
    let mut shell = UiShell::new(ui).expect("shell should start");

    with_modal(shell.bus_mut(), |_| {});

    drop(shell);
    let app = host.join().expect("host thread should exit");

    assert!(!app.menu_suppressed());
    let menu = app.menu().expect("menu expected");
    let item = menu.find_item(doc_model::MenuId::FileOpen.as_str()).expect("item expected");
    assert!(item.enabled);
}

#[test]
fn stylesheet_round_trip_never_rejects_for_a_default_store() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let (app, mut ui) = host_application(temp.path());
    let host = spawn_host(app);

    let stylesheets = ui.get_available_stylesheets().expect("list should succeed");
    assert!(!stylesheets.is_empty());

    let css = ui.get_stylesheet(&stylesheets[0]).expect("read should succeed");
    assert!(css.contains("font-family"));

    drop(ui);
    host.join().expect("host thread should exit");
}
