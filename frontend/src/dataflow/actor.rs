//! Single-value Actor implementation for reactive state management
//!
//! Actor owns a `Mutable<T>` and processes events from Relays to update it.
//! It is the replay-latest data source of the navigation core: late
//! subscribers get the current value immediately, then every later one.

use futures::future;
use futures::stream::{BoxStream, StreamExt};
use futures_signals::signal::{Mutable, Signal, SignalExt};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Aborts the processing task once the last Actor handle is gone.
#[derive(Debug)]
struct TaskHandle(JoinHandle<()>);

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Single-value reactive state container for Actor+Relay architecture.
///
/// - **Single Point of Mutation**: only the processor task writes the state
/// - **Sequential Processing**: events are handled one at a time, in order
/// - **Replay Latest**: `signal()` starts with the current value
///
/// ```rust,ignore
/// let (status_received_relay, mut status_stream) = relay();
///
/// let status = Actor::new(EnvironmentStatus::default(), |state| async move {
///     while let Some(snapshot) = status_stream.next().await {
///         state.set(snapshot);
///     }
/// });
///
/// status_received_relay.send(snapshot);
/// status.signal() // current snapshot, then each replacement
/// ```
#[derive(Clone, Debug)]
pub struct Actor<T>
where
    T: Clone + Send + Sync + 'static,
{
    state: Mutable<T>,
    #[allow(dead_code)]
    task_handle: Option<Arc<TaskHandle>>,
}

impl<T> Actor<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an Actor with initial state and its event processing loop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new<F, Fut>(initial_state: T, processor: F) -> Self
    where
        F: FnOnce(Mutable<T>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let state = Mutable::new(initial_state);
        let task_handle = Arc::new(TaskHandle(tokio::spawn(processor(state.clone()))));
        Self {
            state,
            task_handle: Some(task_handle),
        }
    }

    /// Actor without processor; its value never changes.
    pub fn constant(value: T) -> Self {
        Self {
            state: Mutable::new(value),
            task_handle: None,
        }
    }

    /// Actor mirroring a signal, e.g. the combination of other Actors.
    pub fn derived<S>(initial_state: T, signal: S) -> Self
    where
        S: Signal<Item = T> + Send + 'static,
    {
        Self::new(initial_state, move |state| async move {
            signal
                .for_each(move |value| {
                    state.set(value);
                    future::ready(())
                })
                .await;
        })
    }

    pub fn signal(&self) -> impl Signal<Item = T> + Send + use<T> {
        self.state.signal_cloned()
    }

    /// Latest value, without subscribing.
    ///
    /// Synchronous lookups (route resolution, `get_node`) read the replayed
    /// value through this; reactive consumers use `signal()`.
    pub fn latest(&self) -> T {
        self.state.get_cloned()
    }

    /// One `()` per emission, the first one immediately.
    pub fn changes(&self) -> BoxStream<'static, ()> {
        self.state.signal_ref(|_| ()).to_stream().boxed()
    }

    /// Resolves with the first value (current one included) matching `predicate`.
    pub async fn wait_until(&self, mut predicate: impl FnMut(&T) -> bool) -> T {
        let matching = self
            .state
            .signal_cloned()
            .to_stream()
            .filter(|value| future::ready(predicate(value)))
            .next()
            .await;
        matching.unwrap_or_else(|| self.latest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataflow::relay;
    use futures::select;

    /// `update_mut` as provided by Zoon's `MutableExt`, which this crate does not depend on.
    trait UpdateMut<T> {
        fn update_mut(&self, f: impl FnOnce(&mut T));
    }

    impl<T> UpdateMut<T> for Mutable<T> {
        fn update_mut(&self, f: impl FnOnce(&mut T)) {
            f(&mut self.lock_mut());
        }
    }

    #[tokio::test]
    async fn test_actor_basic_functionality() {
        let (increment_relay, mut increment_stream) = relay();

        let counter = Actor::new(0, |state| async move {
            while let Some(amount) = increment_stream.next().await {
                state.update_mut(|current| *current += amount);
            }
        });

        increment_relay.send(5);
        increment_relay.send(3);

        assert_eq!(counter.wait_until(|value| *value == 8).await, 8);
        assert_eq!(counter.latest(), 8);
    }

    #[tokio::test]
    async fn test_actor_multiple_streams() {
        let (increment_relay, mut increment_stream) = relay();
        let (decrement_relay, mut decrement_stream) = relay();

        let counter = Actor::new(10, |state| async move {
            loop {
                select! {
                    amount = increment_stream.next() => match amount {
                        Some(amount) => state.update_mut(|current| *current += amount),
                        None => break,
                    },
                    amount = decrement_stream.next() => match amount {
                        Some(amount) => state.update_mut(|current: &mut u32| {
                            *current = current.saturating_sub(amount)
                        }),
                        None => break,
                    },
                }
            }
        });

        increment_relay.send(5);
        decrement_relay.send(3);

        assert_eq!(counter.wait_until(|value| *value == 12).await, 12);
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_latest_value() {
        let (value_relay, mut value_stream) = relay();
        let actor = Actor::new("initial".to_string(), |state| async move {
            while let Some(value) = value_stream.next().await {
                state.set(value);
            }
        });

        value_relay.send("second".to_string());
        actor.wait_until(|value| value == "second").await;

        let replayed = actor.signal().to_stream().next().await;
        assert_eq!(replayed.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_changes_emit_immediately_then_per_update() {
        let (value_relay, mut value_stream) = relay();
        let actor = Actor::new(0u8, |state| async move {
            while let Some(value) = value_stream.next().await {
                state.set(value);
            }
        });
        let mut changes = actor.changes();

        assert_eq!(changes.next().await, Some(()));
        value_relay.send(1);
        assert_eq!(changes.next().await, Some(()));
        assert_eq!(actor.latest(), 1);
    }

    #[tokio::test]
    async fn test_derived_actor_follows_source() {
        let (value_relay, mut value_stream) = relay();
        let source = Actor::new(1u32, |state| async move {
            while let Some(value) = value_stream.next().await {
                state.set(value);
            }
        });
        let doubled = Actor::derived(0, source.signal().map(|value| value * 2));

        assert_eq!(doubled.wait_until(|value| *value == 2).await, 2);
        value_relay.send(21);
        assert_eq!(doubled.wait_until(|value| *value == 42).await, 42);
    }
}
