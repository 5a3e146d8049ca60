//! Recently-opened registry.
//!
//! Bounded list of opened files, deduplicated by case-normalized label.
//! Internally most-recently-used last (re-adding moves an entry to the
//! end); exposed and persisted most-recent first. Every mutation
//! persists synchronously and republishes, and late subscribers get the
//! latest list replayed immediately.

use doc_model::{RecentItem, MAX_RECENTLY_OPENED_ITEMS};
use log::error;
use storage::Storage;

type RecentListener = Box<dyn FnMut(&[RecentItem]) + Send>;

pub struct RecentFiles {
    /// MRU last; keys are `RecentItem::dedup_key`.
    items: Vec<RecentItem>,
    storage: Storage,
    subscribers: Vec<RecentListener>,
}

impl RecentFiles {
    /// Loads the persisted list, trimming anything beyond the bound.
    pub fn new(storage: Storage) -> Self {
        let persisted = match storage.recently_opened() {
            Ok(items) => items,
            Err(err) => {
                error!("Could not load recently-opened list: {err}");
                Vec::new()
            }
        };

        // Persisted order is most-recent first; internal order is MRU
        // last. Trim the oldest entries in case the file grew a tail.
        let mut items: Vec<RecentItem> = persisted.into_iter().rev().collect();
        let excess = items.len().saturating_sub(MAX_RECENTLY_OPENED_ITEMS);
        items.drain(..excess);

        Self { items, storage, subscribers: Vec::new() }
    }

    /// Subscribes to list updates; the current list is replayed
    /// immediately.
    pub fn subscribe<F>(&mut self, mut listener: F)
    where
        F: FnMut(&[RecentItem]) + Send + 'static,
    {
        listener(&self.display_list());
        self.subscribers.push(Box::new(listener));
    }

    /// Most-recent first.
    pub fn items(&self) -> Vec<RecentItem> {
        self.display_list()
    }

    /// Removes any entry with the same case-normalized label, then
    /// appends, so repeated opens move an entry to the front instead of
    /// duplicating it. Oldest entries are evicted past the bound.
    pub fn add(&mut self, recent_item: RecentItem) {
        let key = recent_item.dedup_key();
        self.items.retain(|item| item.dedup_key() != key);
        self.items.push(recent_item);

        let excess = self.items.len().saturating_sub(MAX_RECENTLY_OPENED_ITEMS);
        self.items.drain(..excess);

        self.persist_and_publish();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist_and_publish();
    }

    fn display_list(&self) -> Vec<RecentItem> {
        self.items.iter().rev().cloned().collect()
    }

    fn persist_and_publish(&mut self) {
        let list = self.display_list();

        if let Err(err) = self.storage.set_recently_opened(&list) {
            error!("Could not persist recently-opened list: {err}");
        }

        for subscriber in &mut self.subscribers {
            subscriber(&list);
        }
    }
}
