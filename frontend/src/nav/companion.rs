//! Companion panes and bookmarks, both persisted user preferences.

use futures_signals::signal::Signal;
use shared::{BookmarksSection, CompanionMode};
use std::collections::HashSet;
use std::sync::Arc;

use super::storage::{KeyValueStore, load_json, save_json};
use super::HeaderAction;
use crate::dataflow::Atom;

const COMPANION_KEY: &str = "companion";
const BOOKMARKS_KEY: &str = "bookmarks";

/// Pages shown next to the main view.
#[derive(Clone)]
pub struct Companion {
    paths: Atom<Vec<String>>,
    mode: CompanionMode,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl Companion {
    pub fn new(mode: CompanionMode) -> Self {
        Self {
            paths: Atom::default(),
            mode,
            store: None,
        }
    }

    /// Companion restoring and saving its pages through `store`.
    pub fn persisted(mode: CompanionMode, store: Arc<dyn KeyValueStore>) -> Self {
        let mut paths = distinct(load_json(store.as_ref(), COMPANION_KEY).unwrap_or_default());
        if mode == CompanionMode::Single {
            paths.truncate(1);
        }
        Self {
            paths: Atom::new(paths),
            mode,
            store: Some(store),
        }
    }

    pub fn open(&self, path: &str) {
        self.paths.update(|paths| {
            if paths.iter().any(|open| open == path) {
                return;
            }
            match self.mode {
                CompanionMode::Single => *paths = vec![path.to_string()],
                CompanionMode::Multiple => paths.push(path.to_string()),
            }
        });
        self.save();
    }

    pub fn close(&self, path: &str) {
        self.paths.update(|paths| paths.retain(|open| open != path));
        self.save();
    }

    pub fn toggle(&self, path: &str) {
        if self.contains(path) {
            self.close(path);
        } else {
            self.open(path);
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.get_cloned().iter().any(|open| open == path)
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.get_cloned()
    }

    pub fn paths_signal(&self) -> impl Signal<Item = Vec<String>> + Send + use<> {
        self.paths.signal()
    }

    fn save(&self) {
        if let Some(store) = &self.store {
            save_json(store.as_ref(), COMPANION_KEY, &self.paths.get_cloned());
        }
    }
}

/// First occurrence of each path, in order.
fn distinct(paths: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    paths.into_iter().filter(|path| seen.insert(path.clone())).collect()
}

/// Header button opening or closing `path` in the companion pane.
pub fn companion_action(companion: &Companion, path: &str) -> HeaderAction {
    let (icon, tooltip) = if companion.contains(path) {
        ("fas fa-times", "Close the companion page")
    } else {
        ("fas fa-columns", "Open in a companion page")
    };
    HeaderAction {
        id: format!("companion:{path}"),
        icon: icon.to_string(),
        tooltip: tooltip.to_string(),
    }
}

#[derive(Clone)]
pub struct Bookmarks {
    paths: Atom<Vec<String>>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl Bookmarks {
    pub fn new(section: &BookmarksSection) -> Self {
        Self {
            paths: Atom::new(section.defaults.clone()),
            store: None,
        }
    }

    /// Bookmarks saved in `store`, or the configured defaults the first time.
    pub fn persisted(section: &BookmarksSection, store: Arc<dyn KeyValueStore>) -> Self {
        let paths = distinct(load_json(store.as_ref(), BOOKMARKS_KEY).unwrap_or_else(|| section.defaults.clone()));
        Self {
            paths: Atom::new(paths),
            store: Some(store),
        }
    }

    pub fn toggle(&self, path: &str) {
        self.paths.update(|paths| match paths.iter().position(|saved| saved == path) {
            Some(index) => {
                paths.remove(index);
            }
            None => paths.push(path.to_string()),
        });
        if let Some(store) = &self.store {
            save_json(store.as_ref(), BOOKMARKS_KEY, &self.paths.get_cloned());
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.get_cloned().iter().any(|saved| saved == path)
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.get_cloned()
    }

    pub fn paths_signal(&self) -> impl Signal<Item = Vec<String>> + Send + use<> {
        self.paths.signal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::MemoryStore;

    #[test]
    fn single_mode_keeps_one_page() {
        let companion = Companion::new(CompanionMode::Single);
        companion.open("/doc");
        companion.open("/projects");
        assert_eq!(companion.paths(), vec!["/projects"]);
        assert_eq!(companion_action(&companion, "/projects").icon, "fas fa-times");
        assert_eq!(companion_action(&companion, "/doc").icon, "fas fa-columns");
    }

    #[test]
    fn multiple_mode_toggles_in_order() {
        let companion = Companion::new(CompanionMode::Multiple);
        companion.toggle("/a");
        companion.toggle("/b");
        companion.toggle("/a");
        companion.toggle("/c");
        assert_eq!(companion.paths(), vec!["/b", "/c"]);
    }

    #[test]
    fn preferences_are_restored_from_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
        let section = BookmarksSection::default();

        let bookmarks = Bookmarks::persisted(&section, store.clone());
        assert_eq!(bookmarks.paths(), section.defaults);
        bookmarks.toggle("/environment");
        bookmarks.toggle("/doc/how-to");
        Companion::persisted(CompanionMode::Multiple, store.clone()).open("/webpm");

        let restored = Bookmarks::persisted(&section, store.clone());
        assert!(!restored.contains("/environment"));
        assert!(restored.contains("/doc/how-to"));
        assert_eq!(Companion::persisted(CompanionMode::Single, store).paths(), vec!["/webpm"]);
    }

    #[test]
    fn stored_duplicates_are_dropped() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::default());
        save_json(store.as_ref(), COMPANION_KEY, &vec!["/a", "/b", "/a", "/b", "/c"]);
        save_json(store.as_ref(), BOOKMARKS_KEY, &vec!["/doc", "/doc"]);

        let companion = Companion::persisted(CompanionMode::Multiple, store.clone());
        assert_eq!(companion.paths(), vec!["/a", "/b", "/c"]);
        companion.close("/a");
        assert!(!companion.contains("/a"));

        let bookmarks = Bookmarks::persisted(&BookmarksSection::default(), store);
        assert_eq!(bookmarks.paths(), vec!["/doc"]);
        bookmarks.toggle("/doc");
        assert!(!bookmarks.contains("/doc"));
    }
}
