//! Host channel seams and the broadcast feed layered over event sources.

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::{BridgeError, TransportError};

/// One raw element from a host event source: a payload (possibly null) or a
/// host-side failure.
pub type RawEvent = Result<Option<String>, TransportError>;

/// Named single-request/single-reply channel to a host handler.
#[allow(async_fn_in_trait)]
pub trait MethodChannel: Send + Sync {
    fn name(&self) -> &str;

    /// Sends `method` and waits for the reply. `Ok(None)` is a null reply.
    async fn invoke_method(&self, method: &str) -> Result<Option<String>, TransportError>;
}

/// Named publish/subscribe source on the host side.
pub trait EventChannel: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Activates the host source. Dropping the returned stream cancels it.
    fn listen(&self) -> BoxStream<'static, RawEvent>;
}

type Opener<T> = Box<dyn Fn() -> BoxStream<'static, Result<T, BridgeError>> + Send + Sync>;

/// Multi-subscriber feed over one host event source.
///
/// The source is opened when the listener count goes from 0 to 1 and
/// cancelled when it drops back to 0. Every attached listener receives each
/// element published while it is attached; nothing is replayed to listeners
/// that attach later. A listener that falls more than `capacity` elements
/// behind gets a [`BridgeError::Lagged`] element in place of the ones it
/// missed. Handles are cheap to clone and share one source.
pub struct BroadcastFeed<T> {
    inner: Arc<FeedInner<T>>,
}

impl<T> Clone for BroadcastFeed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct FeedInner<T> {
    name: String,
    sender: broadcast::Sender<Result<T, BridgeError>>,
    open: Opener<T>,
    state: Mutex<FeedState>,
}

#[derive(Default)]
struct FeedState {
    listeners: usize,
    pump: Option<JoinHandle<()>>,
}

impl<T> BroadcastFeed<T>
where
    T: Clone + Send + 'static,
{
    /// `open` is called once per 0→1 listener transition to activate the source.
    pub fn new<F>(name: impl Into<String>, capacity: usize, open: F) -> Self
    where
        F: Fn() -> BoxStream<'static, Result<T, BridgeError>> + Send + Sync + 'static,
    {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(FeedInner {
                name: name.into(),
                sender,
                open: Box::new(open),
                state: Mutex::new(FeedState::default()),
            }),
        }
    }

    /// Attaches a listener. Must be called from within a Tokio runtime.
    ///
    /// The listener detaches when the returned stream is dropped.
    pub fn subscribe(&self) -> BoxStream<'static, Result<T, BridgeError>> {
        let receiver = self.inner.attach();
        let listener = Listener {
            receiver,
            guard: ListenerGuard {
                feed: Arc::clone(&self.inner),
            },
        };

        stream::unfold(listener, |mut listener| async move {
            // A lag is reported to the listener as an error element.
            match listener.receiver.recv().await {
                Ok(item) => Some((item, listener)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        feed = %listener.guard.feed.name,
                        skipped,
                        "feed listener lagged, reporting gap"
                    );
                    Some((Err(BridgeError::Lagged(skipped)), listener))
                }
                Err(broadcast::error::RecvError::Closed) => None,
            }
        })
        .boxed()
    }
}

impl<T> BroadcastFeed<T> {
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock_state().listeners
    }

    /// Whether both handles share the same underlying source.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl<T> FeedInner<T> {
    fn lock_state(&self) -> MutexGuard<'_, FeedState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn detach(&self) {
        let mut state = self.lock_state();
        state.listeners = state.listeners.saturating_sub(1);
        if state.listeners == 0 {
            if let Some(pump) = state.pump.take() {
                pump.abort();
                tracing::debug!(feed = %self.name, "last listener detached, host source cancelled");
            }
        }
    }
}

impl<T> FeedInner<T>
where
    T: Clone + Send + 'static,
{
    fn attach(&self) -> broadcast::Receiver<Result<T, BridgeError>> {
        let mut state = self.lock_state();
        // Subscribe before the pump starts so the first element is not missed.
        let receiver = self.sender.subscribe();
        state.listeners += 1;
        if state.listeners == 1 {
            tracing::debug!(feed = %self.name, "first listener attached, opening host source");
            let mut upstream = (self.open)();
            let sender = self.sender.clone();
            let name = self.name.clone();
            state.pump = Some(tokio::spawn(async move {
                while let Some(item) = upstream.next().await {
                    // Ignore error if no receivers
                    let _ = sender.send(item);
                }
                tracing::debug!(feed = %name, "host source ended");
            }));
        }
        receiver
    }
}

struct Listener<T> {
    receiver: broadcast::Receiver<Result<T, BridgeError>>,
    guard: ListenerGuard<T>,
}

struct ListenerGuard<T> {
    feed: Arc<FeedInner<T>>,
}

impl<T> Drop for ListenerGuard<T> {
    fn drop(&mut self) {
        self.feed.detach();
    }
}
