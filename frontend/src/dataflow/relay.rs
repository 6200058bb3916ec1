//! Event streaming Relay
//!
//! Relay carries events from the outside world (server pushes, user actions)
//! into the Actor that owns the corresponding state.

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

/// Type-safe event streaming relay for Actor+Relay architecture.
///
/// Relays follow the `{source}_{event}_relay` naming pattern:
/// - `status_received_relay` - server pushed a new environment snapshot
/// - `path_mounted_relay` - user mounted a host folder
///
/// ```rust,ignore
/// let (status_received_relay, mut stream) = relay::<EnvironmentStatus>();
/// status_received_relay.send(status);
/// while let Some(status) = stream.next().await { /* ... */ }
/// ```
#[derive(Clone, Debug)]
pub struct Relay<T>
where
    T: Send + 'static,
{
    sender: UnboundedSender<T>,
}

impl<T> Relay<T>
where
    T: Send + 'static,
{
    pub fn new() -> (Self, UnboundedReceiver<T>) {
        let (sender, receiver) = unbounded();
        (Relay { sender }, receiver)
    }

    /// Send an event; silently discarded when nobody listens anymore.
    pub fn send(&self, value: T) {
        if self.sender.unbounded_send(value).is_err() {
            log::debug!("relay event dropped, receiver is gone");
        }
    }
}

impl<T> Default for Relay<T>
where
    T: Send + 'static,
{
    /// Disconnected relay: every event is discarded.
    fn default() -> Self {
        let (relay, _receiver) = Self::new();
        relay
    }
}

/// Creates a new Relay with its receiver stream.
pub fn relay<T>() -> (Relay<T>, UnboundedReceiver<T>)
where
    T: Send + 'static,
{
    Relay::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_relay_basic_functionality() {
        let (relay, mut receiver) = Relay::new();

        relay.send("test_event".to_string());

        assert_eq!(receiver.next().await, Some("test_event".to_string()));
    }

    #[tokio::test]
    async fn test_send_after_receiver_dropped() {
        let (relay, mut receiver) = relay::<String>();

        relay.send("test".to_string());
        assert_eq!(receiver.next().await, Some("test".to_string()));

        drop(receiver);
        relay.send("discarded".to_string());
    }

    #[test]
    fn test_default_relay_discards_events() {
        let relay = Relay::<u32>::default();
        relay.send(1);
        relay.clone().send(2);
    }
}
