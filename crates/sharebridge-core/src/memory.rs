//! In-process host channels.
//!
//! These stand in for the native side of the bridge: replies are registered
//! per method, events are pushed with [`MemoryEventChannel::emit`], and the
//! listen bookkeeping is observable so callers can check when the host source
//! is active.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::{mpsc, watch};

use crate::bridge::SharingIntent;
use crate::channel::{EventChannel, MethodChannel, RawEvent};
use crate::config::{BridgeConfig, ChannelNames};
use crate::error::TransportError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

type Reply = Result<Option<String>, TransportError>;

#[derive(Clone)]
pub struct MemoryMethodChannel {
    inner: Arc<MethodState>,
}

struct MethodState {
    name: String,
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
}

impl MemoryMethodChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(MethodState {
                name: name.into(),
                replies: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Registers the reply returned for every call to `method`.
    pub fn reply(&self, method: &str, reply: Option<&str>) {
        lock(&self.inner.replies).insert(method.to_string(), Ok(reply.map(str::to_string)));
    }

    /// Makes every call to `method` fail with `error`.
    pub fn fail(&self, method: &str, error: TransportError) {
        lock(&self.inner.replies).insert(method.to_string(), Err(error));
    }

    /// Removes the handler for `method`; later calls fail as not implemented.
    pub fn clear(&self, method: &str) {
        lock(&self.inner.replies).remove(method);
    }

    /// Methods invoked so far, oldest first.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.inner.calls).clone()
    }
}

impl MethodChannel for MemoryMethodChannel {
    fn name(&self) -> &str {
        &self.inner.name
    }

    async fn invoke_method(&self, method: &str) -> Result<Option<String>, TransportError> {
        lock(&self.inner.calls).push(method.to_string());
        lock(&self.inner.replies)
            .get(method)
            .cloned()
            .unwrap_or_else(|| Err(TransportError::not_implemented(method)))
    }
}

#[derive(Clone)]
pub struct MemoryEventChannel {
    inner: Arc<EventState>,
}

struct EventState {
    name: String,
    sinks: Mutex<Vec<mpsc::UnboundedSender<RawEvent>>>,
    active: watch::Sender<usize>,
    opened: AtomicUsize,
}

impl MemoryEventChannel {
    pub fn new(name: impl Into<String>) -> Self {
        let (active, _) = watch::channel(0);
        Self {
            inner: Arc::new(EventState {
                name: name.into(),
                sinks: Mutex::new(Vec::new()),
                active,
                opened: AtomicUsize::new(0),
            }),
        }
    }

    /// Publishes a payload to every active listen. Returns how many received it;
    /// with nothing listening the event is dropped.
    pub fn emit(&self, payload: Option<&str>) -> usize {
        self.publish(Ok(payload.map(str::to_string)))
    }

    /// Publishes a host-side failure to every active listen.
    pub fn emit_error(&self, error: TransportError) -> usize {
        self.publish(Err(error))
    }

    fn publish(&self, event: RawEvent) -> usize {
        let mut sinks = lock(&self.inner.sinks);
        sinks.retain(|sink| sink.send(event.clone()).is_ok());
        sinks.len()
    }

    /// Listens currently open on this source.
    pub fn active_listens(&self) -> usize {
        *self.inner.active.borrow()
    }

    /// Listens ever opened on this source.
    pub fn total_listens(&self) -> usize {
        self.inner.opened.load(Ordering::Relaxed)
    }

    /// Watches the active listen count.
    pub fn watch_listens(&self) -> watch::Receiver<usize> {
        self.inner.active.subscribe()
    }
}

impl EventChannel for MemoryEventChannel {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn listen(&self) -> BoxStream<'static, RawEvent> {
        let (sink, receiver) = mpsc::unbounded_channel();
        lock(&self.inner.sinks).push(sink);
        self.inner.opened.fetch_add(1, Ordering::Relaxed);
        self.inner.active.send_modify(|count| *count += 1);
        tracing::debug!(channel = %self.inner.name, "host source listened");

        let listen = ActiveListen {
            receiver,
            owner: Arc::clone(&self.inner),
        };
        stream::unfold(listen, |mut listen| async move {
            let event = listen.receiver.recv().await?;
            Some((event, listen))
        })
        .boxed()
    }
}

struct ActiveListen {
    receiver: mpsc::UnboundedReceiver<RawEvent>,
    owner: Arc<EventState>,
}

impl Drop for ActiveListen {
    fn drop(&mut self) {
        self.owner
            .active
            .send_modify(|count| *count = count.saturating_sub(1));
        tracing::debug!(channel = %self.owner.name, "host source cancelled");
    }
}

/// The three host channels a [`SharingIntent`] talks to, kept together so
/// callers can drive the host side while the bridge consumes it.
#[derive(Clone)]
pub struct MemoryHost {
    pub methods: MemoryMethodChannel,
    pub media_events: MemoryEventChannel,
    pub text_events: MemoryEventChannel,
}

impl MemoryHost {
    pub fn new(names: &ChannelNames) -> Self {
        Self {
            methods: MemoryMethodChannel::new(names.method.clone()),
            media_events: MemoryEventChannel::new(names.media_events.clone()),
            text_events: MemoryEventChannel::new(names.text_events.clone()),
        }
    }

    pub fn bridge(
        &self,
        config: &BridgeConfig,
    ) -> SharingIntent<MemoryMethodChannel, MemoryEventChannel> {
        SharingIntent::with_config(
            self.methods.clone(),
            self.media_events.clone(),
            self.text_events.clone(),
            config,
        )
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new(&ChannelNames::default())
    }
}

#[cfg(test)]
mod tests {
    use sharebridge_models::wire;

    use super::*;

    #[tokio::test]
    async fn unregistered_method_is_not_implemented() {
        let methods = MemoryMethodChannel::new(wire::METHOD_CHANNEL);
        let err = methods.invoke_method("getInitialMedia").await.unwrap_err();
        assert_eq!(err.code, "NOT_IMPLEMENTED");
        assert_eq!(methods.calls(), vec!["getInitialMedia".to_string()]);
    }

    #[tokio::test]
    async fn replies_and_failures_are_returned_per_method() {
        let methods = MemoryMethodChannel::new(wire::METHOD_CHANNEL);
        methods.reply(wire::METHOD_GET_INITIAL_TEXT, Some("hello"));
        methods.fail(wire::METHOD_GET_INITIAL_MEDIA, TransportError::new("IO", "disk full"));

        assert_eq!(
            methods.invoke_method(wire::METHOD_GET_INITIAL_TEXT).await.unwrap().as_deref(),
            Some("hello")
        );
        let err = methods.invoke_method(wire::METHOD_GET_INITIAL_MEDIA).await.unwrap_err();
        assert_eq!(err.message, "disk full");

        methods.clear(wire::METHOD_GET_INITIAL_TEXT);
        assert!(methods.invoke_method(wire::METHOD_GET_INITIAL_TEXT).await.is_err());
    }

    #[tokio::test]
    async fn events_reach_active_listens_only() {
        let events = MemoryEventChannel::new(wire::TEXT_EVENT_CHANNEL);
        assert_eq!(events.emit(Some("dropped")), 0);

        let mut listen = events.listen();
        assert_eq!(events.active_listens(), 1);
        assert_eq!(events.emit(Some("kept")), 1);
        assert_eq!(events.emit(None), 1);

        assert_eq!(listen.next().await.unwrap().unwrap().as_deref(), Some("kept"));
        assert_eq!(listen.next().await.unwrap().unwrap(), None);

        drop(listen);
        assert_eq!(events.active_listens(), 0);
        assert_eq!(events.emit(Some("gone")), 0);
        assert_eq!(events.total_listens(), 1);
    }
}
