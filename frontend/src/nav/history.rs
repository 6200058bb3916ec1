//! Address bar abstraction; the browser implementation lives with the renderer.

use std::sync::{Mutex, PoisonError};

pub trait AddressBar: Send + Sync {
    /// Record `url` as a new history entry.
    fn push(&self, url: &str);
}

/// In-process history, used by the console and in tests.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<String>>,
}

impl MemoryHistory {
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AddressBar for MemoryHistory {
    fn push(&self, url: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.last().map(String::as_str) != Some(url) {
            entries.push(url.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_url_is_recorded_once() {
        let history = MemoryHistory::default();
        history.push("/a");
        history.push("/a");
        history.push("/b?target=x");
        assert_eq!(history.entries(), vec!["/a", "/b?target=x"]);
    }
}
