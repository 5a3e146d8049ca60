//! Tab lifecycle management.
//!
//! Single source of truth for which documents are open, their order, and
//! which one is active. The activation-order vector lists keys oldest
//! activation first; the last entry is always the active tab.

use crate::panels::{ShellContext, StateChange, TabPanel};
use doc_model::MarkdownFile;
use std::time::{SystemTime, UNIX_EPOCH};

/// Opaque tab identity, generated from a monotonically increasing
/// millisecond timestamp at open time. Never reused, never derived from
/// content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabKey(String);

impl TabKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TabKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabItem {
    pub key: TabKey,
    pub title: String,
    pub full_title: String,
    pub active: bool,
}

/// The seam between tab identity and the mounted views. The panel host
/// implements this; tests substitute their own.
pub trait TabViewHost {
    /// Mounts the view for a freshly opened tab and returns the titles
    /// it derived from the data.
    fn open(
        &mut self,
        key: &TabKey,
        panel: Box<dyn TabPanel>,
        data: MarkdownFile,
        ctx: &mut ShellContext<'_>,
    ) -> (String, String);

    fn switch_to(&mut self, key: &TabKey, ctx: &mut ShellContext<'_>);

    fn close(&mut self, key: &TabKey);

    fn command(&mut self, key: &TabKey, command: &ipc::MenuCommand, ctx: &mut ShellContext<'_>);
}

type TabItemsListener = Box<dyn FnMut(&[TabItem]) + Send>;

#[derive(Default)]
pub struct TabManager {
    items: Vec<TabItem>,
    /// Keys in order of activation, the active tab being last. Never
    /// contains duplicates.
    activation_order: Vec<TabKey>,
    subscribers: Vec<TabItemsListener>,
    last_key_millis: u64,
}

impl TabManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to tab-item list updates. The current list is replayed
    /// immediately.
    pub fn subscribe<F>(&mut self, mut listener: F)
    where
        F: FnMut(&[TabItem]) + Send + 'static,
    {
        listener(&self.items);
        self.subscribers.push(Box::new(listener));
    }

    pub fn items(&self) -> Vec<TabItem> {
        self.items.clone()
    }

    pub fn active_key(&self) -> Option<&TabKey> {
        self.activation_order.last()
    }

    /// Opens a new tab: the fresh item starts active, the previous active
    /// item is deactivated, and the titles come back from the mounted
    /// view since they depend on content the view processes.
    pub fn open(
        &mut self,
        views: &mut dyn TabViewHost,
        panel: Box<dyn TabPanel>,
        data: MarkdownFile,
        ctx: &mut ShellContext<'_>,
    ) -> TabKey {
        let key = self.next_key();

        if let Some(active) = self.active_item_mut() {
            active.active = false;
        }

        self.items.push(TabItem {
            key: key.clone(),
            title: String::new(),
            full_title: String::new(),
            active: true,
        });
        self.activation_order.push(key.clone());
        self.publish();

        let (title, full_title) = views.open(&key, panel, data, ctx);
        if let Some(item) = self.items.iter_mut().find(|item| item.key == key) {
            item.title = title;
            item.full_title = full_title;
        }
        self.publish();

        key
    }

    /// No-op for unknown keys. Moves the key to the end of the activation
    /// order and notifies the view host.
    pub fn switch_to(&mut self, views: &mut dyn TabViewHost, key: &TabKey, ctx: &mut ShellContext<'_>) {
        if !self.items.iter().any(|item| item.key == *key) {
            return;
        }

        if let Some(active) = self.active_item_mut() {
            if active.key != *key {
                active.active = false;
            }
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.key == *key) {
            item.active = true;
        }

        self.activation_order.retain(|entry| entry != key);
        self.activation_order.push(key.clone());

        views.switch_to(key, ctx);
        self.publish();
    }

    /// No-op for unknown keys. Closing the active tab activates whatever
    /// the order says was active before it; closing the last tab
    /// broadcasts the empty state.
    pub fn close(&mut self, views: &mut dyn TabViewHost, key: &TabKey, ctx: &mut ShellContext<'_>) {
        let Some(position) = self.items.iter().position(|item| item.key == *key) else {
            return;
        };

        if self.items[position].active {
            self.activation_order.pop();

            if let Some(next_key) = self.activation_order.last().cloned() {
                if let Some(item) = self.items.iter_mut().find(|item| item.key == next_key) {
                    item.active = true;
                }
                views.switch_to(&next_key, ctx);
            }
        } else {
            self.activation_order.retain(|entry| entry != key);
        }

        views.close(key);
        self.items.remove(position);
        self.publish();

        if self.items.is_empty() {
            ctx.push_state(StateChange::Empty);
        }
    }

    /// Routes a host command to the active tab; no-op with no tabs open.
    pub fn send_command(
        &mut self,
        views: &mut dyn TabViewHost,
        command: &ipc::MenuCommand,
        ctx: &mut ShellContext<'_>,
    ) {
        if let Some(key) = self.activation_order.last().cloned() {
            views.command(&key, command, ctx);
        }
    }

    fn active_item_mut(&mut self) -> Option<&mut TabItem> {
        let key = self.activation_order.last()?.clone();
        self.items.iter_mut().find(|item| item.key == key)
    }

    fn publish(&mut self) {
        for subscriber in &mut self.subscribers {
            subscriber(&self.items);
        }
    }

    /// Millisecond timestamp, bumped when two opens land on the same
    /// tick so keys stay strictly increasing.
    fn next_key(&mut self) -> TabKey {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0);

        self.last_key_millis = if now > self.last_key_millis { now } else { self.last_key_millis + 1 };

        TabKey(self.last_key_millis.to_string())
    }
}
