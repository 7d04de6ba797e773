//! Typed subscription to one backend event stream

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::backend::{Listener, SharedBackend};
use crate::error::BackendError;
use crate::task::{PollResult, poll_task};

/// What a channel observed since the last poll
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelUpdate<T> {
    /// The subscribe call finished and events will now be delivered
    Subscribed,
    /// A payload decoded into `T`
    Event(T),
    /// A payload outside `T`'s vocabulary
    Invalid { raw: Value, error: String },
    /// The subscribe call was rejected; it is not retried
    SubscribeFailed(String),
}

/// Owns at most one subscription to a named event stream.
///
/// Subscribing spawns `Backend::listen`; the resulting [`Listener`] is kept
/// until [`EventChannel::unsubscribe`] or drop. A subscribe still in flight
/// at teardown is released as soon as its handle exists.
pub struct EventChannel<T> {
    name: &'static str,
    pending: Option<JoinHandle<Result<Listener, BackendError>>>,
    active: Option<Listener>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> EventChannel<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            pending: None,
            active: None,
            _payload: PhantomData,
        }
    }

    /// Whether a listener is registered
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether a subscribe call is still in flight
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a fresh subscription, releasing any previous one first
    pub fn subscribe(&mut self, backend: &SharedBackend) {
        self.unsubscribe();

        let backend = backend.clone();
        let name = self.name;
        tracing::debug!("Subscribing to '{}'", name);
        self.pending = Some(tokio::spawn(async move { backend.listen(name).await }));
    }

    /// Release the subscription, including one that has not resolved yet
    pub fn unsubscribe(&mut self) {
        if let Some(listener) = self.active.take() {
            tracing::debug!("Unsubscribing from '{}'", listener.channel());
            listener.unlisten();
        }

        let Some(task) = self.pending.take() else {
            return;
        };

        let name = self.name;
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Ok(Ok(listener)) = task.await {
                        tracing::debug!("Releasing late subscription to '{}'", name);
                        listener.unlisten();
                    }
                });
            }
            Err(_) => task.abort(),
        }
    }
}

impl<T: DeserializeOwned> EventChannel<T> {
    /// Collect the subscribe outcome and every buffered event, in delivery order
    pub fn poll(&mut self) -> Vec<ChannelUpdate<T>> {
        let mut updates = Vec::new();

        match poll_task(&mut self.pending) {
            PollResult::Complete(Ok(Ok(listener))) => {
                tracing::debug!("Subscribed to '{}'", self.name);
                self.active = Some(listener);
                updates.push(ChannelUpdate::Subscribed);
            }
            PollResult::Complete(Ok(Err(e))) => {
                tracing::error!("Subscribing to '{}' failed: {}", self.name, e);
                updates.push(ChannelUpdate::SubscribeFailed(e.to_string()));
            }
            PollResult::Complete(Err(e)) => {
                tracing::error!("Subscribe task for '{}' panicked: {}", self.name, e);
                updates.push(ChannelUpdate::SubscribeFailed(e.to_string()));
            }
            PollResult::Pending | PollResult::NoTask => {}
        }

        if let Some(listener) = &mut self.active {
            while let Some(raw) = listener.try_next() {
                match serde_json::from_value::<T>(raw.clone()) {
                    Ok(event) => updates.push(ChannelUpdate::Event(event)),
                    Err(e) => updates.push(ChannelUpdate::Invalid {
                        raw,
                        error: e.to_string(),
                    }),
                }
            }
        }

        updates
    }
}

impl<T> Drop for EventChannel<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::state::testing::{MockBackend, settle};

    #[derive(Debug, Clone, PartialEq, serde::Deserialize)]
    enum Light {
        Red,
        Green,
    }

    fn setup() -> (Arc<MockBackend>, SharedBackend) {
        let mock = Arc::new(MockBackend::new());
        let backend: SharedBackend = mock.clone();
        (mock, backend)
    }

    async fn subscribed(channel: &mut EventChannel<Light>, backend: &SharedBackend) {
        channel.subscribe(backend);
        settle().await;
        assert_eq!(channel.poll(), vec![ChannelUpdate::Subscribed]);
    }

    #[tokio::test]
    async fn test_events_arrive_in_delivery_order() {
        let (mock, backend) = setup();
        let mut channel = EventChannel::<Light>::new("light");
        subscribed(&mut channel, &backend).await;

        mock.emit("light", "Green");
        mock.emit("light", "Red");
        mock.emit("light", "Green");

        assert_eq!(
            channel.poll(),
            vec![
                ChannelUpdate::Event(Light::Green),
                ChannelUpdate::Event(Light::Red),
                ChannelUpdate::Event(Light::Green),
            ]
        );
        assert!(channel.poll().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_payload_is_reported_not_dropped_silently() {
        let (mock, backend) = setup();
        let mut channel = EventChannel::<Light>::new("light");
        subscribed(&mut channel, &backend).await;

        mock.emit("light", "Blue");

        match channel.poll().as_slice() {
            [ChannelUpdate::Invalid { raw, .. }] => assert_eq!(raw, &Value::from("Blue")),
            other => panic!("unexpected updates: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resubscribe_never_double_delivers() {
        let (mock, backend) = setup();
        let mut channel = EventChannel::<Light>::new("light");
        subscribed(&mut channel, &backend).await;

        channel.unsubscribe();
        subscribed(&mut channel, &backend).await;
        assert_eq!(mock.bus.listener_count("light"), 1);

        mock.emit("light", "Red");
        assert_eq!(channel.poll(), vec![ChannelUpdate::Event(Light::Red)]);
    }

    #[tokio::test]
    async fn test_subscribe_twice_replaces_previous() {
        let (mock, backend) = setup();
        let mut channel = EventChannel::<Light>::new("light");
        subscribed(&mut channel, &backend).await;
        subscribed(&mut channel, &backend).await;

        assert_eq!(mock.bus.listener_count("light"), 1);
        assert_eq!(mock.emit("light", "Green"), 1);
    }

    #[tokio::test]
    async fn test_teardown_during_pending_subscribe_releases_late_handle() {
        let (mock, backend) = setup();
        mock.hold_listen();

        let mut channel = EventChannel::<Light>::new("light");
        channel.subscribe(&backend);
        settle().await;
        assert!(channel.is_pending());

        channel.unsubscribe();
        mock.release_listen();
        settle().await;

        assert!(!channel.is_active());
        assert_eq!(mock.bus.listener_count("light"), 0);
    }

    #[tokio::test]
    async fn test_drop_releases_subscription() {
        let (mock, backend) = setup();
        let mut channel = EventChannel::<Light>::new("light");
        subscribed(&mut channel, &backend).await;
        assert_eq!(mock.bus.listener_count("light"), 1);

        drop(channel);
        assert_eq!(mock.bus.listener_count("light"), 0);
    }

    #[tokio::test]
    async fn test_subscribe_failure_is_reported_once() {
        let (mock, backend) = setup();
        mock.fail_listen(true);

        let mut channel = EventChannel::<Light>::new("light");
        channel.subscribe(&backend);
        settle().await;

        let updates = channel.poll();
        assert!(matches!(updates.as_slice(), [ChannelUpdate::SubscribeFailed(_)]));
        assert!(channel.poll().is_empty());
        assert_eq!(mock.count("listen"), 1);
    }
}
