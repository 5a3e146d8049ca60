//! Tab panel hosting.
//!
//! The tab manager tracks identity and order; the panel host owns the
//! mounted views. Exactly one panel is active at a time, and panels only
//! ever run inside a dispatch context handed to them by the shell.

use crate::stylesheets::StylesheetStore;
use crate::tabs::{TabKey, TabViewHost};
use crate::toolbar::ToolbarState;
use doc_model::{MarkdownFile, MenuItemState};
use ipc::{MenuCommand, UiEndpoint};
use std::collections::HashMap;

/// A state mutation requested by a tab or the tab manager, consumed by
/// the shell after the triggering handler returns.
#[derive(Debug, Clone, PartialEq)]
pub enum StateChange {
    /// Sparse toolbar patch.
    Toolbar(ToolbarState),
    /// Sparse menu patch, forwarded to the host.
    Menu(Vec<MenuItemState>),
    /// The last tab closed; toolbar and menu reset to their tab-less
    /// configuration.
    Empty,
}

/// Dispatch context for one incoming message. Panels reach the bus and
/// the stylesheet collaborator through it and queue state changes on it;
/// the shell applies the queue once the handler is done.
pub struct ShellContext<'a> {
    pub bus: &'a mut UiEndpoint,
    pub stylesheets: &'a mut StylesheetStore,
    changes: Vec<StateChange>,
}

impl<'a> ShellContext<'a> {
    pub fn new(bus: &'a mut UiEndpoint, stylesheets: &'a mut StylesheetStore) -> Self {
        Self { bus, stylesheets, changes: Vec::new() }
    }

    pub fn push_state(&mut self, change: StateChange) {
        self.changes.push(change);
    }

    pub fn into_changes(self) -> Vec<StateChange> {
        self.changes
    }
}

/// One mounted document view.
pub trait TabPanel {
    /// Installs the document payload and recomputes everything derived
    /// from it. Never called incrementally.
    fn set_data(&mut self, data: MarkdownFile);

    /// `(title, full_title)` as derived from the installed data.
    fn titles(&self) -> (String, String);

    fn active(&self) -> bool;

    fn set_active(&mut self, active: bool, ctx: &mut ShellContext<'_>);

    fn on_command(&mut self, command: &MenuCommand, ctx: &mut ShellContext<'_>);
}

/// Owns the mounted panels, keyed by tab key.
#[derive(Default)]
pub struct PanelHost {
    panels: HashMap<TabKey, Box<dyn TabPanel>>,
}

impl PanelHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Deactivates every panel first so two can never be active at once,
    /// then activates the target.
    fn activate(&mut self, key: &TabKey, ctx: &mut ShellContext<'_>) {
        for (panel_key, panel) in &mut self.panels {
            if panel_key != key && panel.active() {
                panel.set_active(false, ctx);
            }
        }

        if let Some(panel) = self.panels.get_mut(key) {
            panel.set_active(true, ctx);
        }
    }
}

impl TabViewHost for PanelHost {
    fn open(
        &mut self,
        key: &TabKey,
        mut panel: Box<dyn TabPanel>,
        data: MarkdownFile,
        ctx: &mut ShellContext<'_>,
    ) -> (String, String) {
        panel.set_data(data);
        let titles = panel.titles();

        self.panels.insert(key.clone(), panel);
        self.activate(key, ctx);

        titles
    }

    fn switch_to(&mut self, key: &TabKey, ctx: &mut ShellContext<'_>) {
        if self.panels.contains_key(key) {
            self.activate(key, ctx);
        }
    }

    fn close(&mut self, key: &TabKey) {
        self.panels.remove(key);
    }

    fn command(&mut self, key: &TabKey, command: &MenuCommand, ctx: &mut ShellContext<'_>) {
        if let Some(panel) = self.panels.get_mut(key) {
            panel.on_command(command, ctx);
        }
    }
}
