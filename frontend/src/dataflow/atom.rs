//! Local UI state Atom
//!
//! Atom wraps a `Mutable<T>` for small pieces of UI state (companion panes,
//! bookmarks). Unlike Actor, writes are applied synchronously so that a
//! toggle can be observed by the very next statement.

use futures_signals::signal::{Mutable, Signal};

#[derive(Clone, Debug)]
pub struct Atom<T>
where
    T: Clone + Send + Sync + 'static,
{
    state: Mutable<T>,
}

impl<T> Atom<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        Self {
            state: Mutable::new(initial),
        }
    }

    pub fn set(&self, value: T) {
        self.state.set(value);
    }

    /// Mutate in place; subscribers are notified once.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut lock = self.state.lock_mut();
        f(&mut lock)
    }

    pub fn get_cloned(&self) -> T {
        self.state.get_cloned()
    }

    pub fn signal(&self) -> impl Signal<Item = T> + Send + use<T> {
        self.state.signal_cloned()
    }
}

impl<T> Default for Atom<T>
where
    T: Clone + Send + Sync + Default + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use futures_signals::signal::SignalExt;

    #[tokio::test]
    async fn test_atom_basic_functionality() {
        let atom = Atom::new(42);
        assert_eq!(atom.signal().to_stream().next().await, Some(42));

        atom.set(100);
        assert_eq!(atom.get_cloned(), 100);
        assert_eq!(atom.signal().to_stream().next().await, Some(100));
    }

    #[test]
    fn test_atom_update_returns_closure_result() {
        let atom = Atom::new(vec![1, 2]);
        let len = atom.update(|values| {
            values.push(3);
            values.len()
        });
        assert_eq!(len, 3);
        assert_eq!(atom.get_cloned(), vec![1, 2, 3]);
    }
}
