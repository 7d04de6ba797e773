//! Named event fan-out between the backend and its listeners

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::BackendError;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    listeners: HashMap<String, Vec<(u64, mpsc::UnboundedSender<Value>)>>,
}

/// Fan-out of JSON payloads to every listener registered on a channel name.
///
/// Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BusInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new listener on `channel`
    pub fn listen(&self, channel: &str) -> Listener {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut inner = self.lock();
            inner.next_id += 1;
            let id = inner.next_id;
            inner
                .listeners
                .entry(channel.to_string())
                .or_default()
                .push((id, tx));
            id
        };

        tracing::debug!("Listener {} registered on '{}'", id, channel);

        Listener {
            channel: channel.to_string(),
            id,
            rx,
            bus: self.clone(),
        }
    }

    /// Emit a payload to every live listener on `channel`.
    ///
    /// Returns the number of listeners the payload was handed to.
    pub fn emit<P: Serialize>(&self, channel: &str, payload: &P) -> Result<usize, BackendError> {
        let value = serde_json::to_value(payload)?;
        let mut inner = self.lock();

        let Some(listeners) = inner.listeners.get_mut(channel) else {
            tracing::debug!("No listeners for '{}', dropping {}", channel, value);
            return Ok(0);
        };

        listeners.retain(|(_, tx)| tx.send(value.clone()).is_ok());
        Ok(listeners.len())
    }

    /// Number of listeners currently registered on `channel`
    #[cfg(test)]
    pub fn listener_count(&self, channel: &str) -> usize {
        self.lock().listeners.get(channel).map_or(0, Vec::len)
    }

    fn remove(&self, channel: &str, id: u64) {
        let mut inner = self.lock();
        if let Some(listeners) = inner.listeners.get_mut(channel) {
            listeners.retain(|(listener_id, _)| *listener_id != id);
            if listeners.is_empty() {
                inner.listeners.remove(channel);
            }
        }
    }
}

/// A live registration on one channel.
///
/// Dropping the listener unregisters it; events still buffered are discarded with it.
pub struct Listener {
    channel: String,
    id: u64,
    rx: mpsc::UnboundedReceiver<Value>,
    bus: EventBus,
}

impl Listener {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Take the next buffered payload without waiting
    pub fn try_next(&mut self) -> Option<Value> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next payload
    pub async fn next(&mut self) -> Option<Value> {
        self.rx.recv().await
    }

    /// Release the registration
    pub fn unlisten(self) {}
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.bus.remove(&self.channel, self.id);
        tracing::debug!("Listener {} released from '{}'", self.id, self.channel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_every_listener_on_channel() {
        let bus = EventBus::new();
        let mut first = bus.listen("game-state");
        let mut second = bus.listen("game-state");
        let mut other = bus.listen("wizard-step");

        let delivered = bus.emit("game-state", &"GameRunning").unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(first.try_next(), Some(Value::from("GameRunning")));
        assert_eq!(second.try_next(), Some(Value::from("GameRunning")));
        assert_eq!(other.try_next(), None);
    }

    #[test]
    fn test_emit_without_listeners() {
        let bus = EventBus::new();
        assert_eq!(bus.emit("wizard-step", &"Cleanup").unwrap(), 0);
    }

    #[test]
    fn test_drop_unregisters() {
        let bus = EventBus::new();
        let listener = bus.listen("game-state");
        assert_eq!(bus.listener_count("game-state"), 1);

        listener.unlisten();
        assert_eq!(bus.listener_count("game-state"), 0);
        assert_eq!(bus.emit("game-state", &"GameStopped").unwrap(), 0);
    }

    #[test]
    fn test_events_keep_emission_order() {
        let bus = EventBus::new();
        let mut listener = bus.listen("wizard-step");

        for step in ["Cleanup", "SetupFolders", "DownloadLauncher"] {
            bus.emit("wizard-step", &step).unwrap();
        }

        let received: Vec<Value> = std::iter::from_fn(|| listener.try_next()).collect();
        assert_eq!(
            received,
            vec![
                Value::from("Cleanup"),
                Value::from("SetupFolders"),
                Value::from("DownloadLauncher"),
            ]
        );
    }
}
