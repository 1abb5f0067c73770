use std::sync::{Arc, OnceLock};

use futures_util::stream::{BoxStream, StreamExt};
use sharebridge_models::media::SharedMediaFile;
use sharebridge_models::wire;
use crate::channel::{BroadcastFeed, EventChannel, MethodChannel};
use crate::codec::{self, SharedUri};
use crate::config::{BridgeConfig, DEFAULT_FEED_CAPACITY};
use crate::error::BridgeError;

/// Client-side view of the content other apps shared with this one.
///
/// Content that launched the process is only available through the
/// `get_initial_*` calls; the feeds carry shares that arrive afterwards.
/// Each feed is created on first access and reused for the lifetime of the
/// bridge, so every caller shares one host subscription.
pub struct SharingIntent<M, E> {
    methods: M,
    media_events: Arc<E>,
    text_events: Arc<E>,
    feed_capacity: usize,
    media_feed: OnceLock<BroadcastFeed<Vec<SharedMediaFile>>>,
    text_feed: OnceLock<BroadcastFeed<Option<String>>>,
}

impl<M, E> SharingIntent<M, E>
where
    M: MethodChannel,
    E: EventChannel,
{
    pub fn new(methods: M, media_events: E, text_events: E) -> Self {
        Self {
            methods,
            media_events: Arc::new(media_events),
            text_events: Arc::new(text_events),
            feed_capacity: DEFAULT_FEED_CAPACITY,
            media_feed: OnceLock::new(),
            text_feed: OnceLock::new(),
        }
    }

    pub fn with_config(
        methods: M,
        media_events: E,
        text_events: E,
        config: &BridgeConfig,
    ) -> Self {
        let mut bridge = Self::new(methods, media_events, text_events);
        bridge.feed_capacity = config.feed_capacity;
        bridge
    }

    /// Media shared when the app was launched. A null host reply is an
    /// empty list.
    pub async fn get_initial_media(&self) -> Result<Vec<SharedMediaFile>, BridgeError> {
        let reply = self.invoke(wire::METHOD_GET_INITIAL_MEDIA).await?;
        codec::decode_media_list(reply.as_deref())
    }

    /// Text shared when the app was launched, exactly as the host sent it.
    pub async fn get_initial_text(&self) -> Result<Option<String>, BridgeError> {
        self.invoke(wire::METHOD_GET_INITIAL_TEXT).await
    }

    pub async fn get_initial_text_as_uri(&self) -> Result<Option<SharedUri>, BridgeError> {
        uri_from_text(self.get_initial_text().await?)
    }

    /// Feed of media lists shared while the app is running.
    ///
    /// Null events become empty lists. Host failures and undecodable
    /// payloads are delivered as error elements and do not end the feed.
    pub fn get_media_stream(&self) -> BroadcastFeed<Vec<SharedMediaFile>> {
        self.media_feed
            .get_or_init(|| {
                let source = Arc::clone(&self.media_events);
                tracing::info!(channel = %source.name(), "creating media feed");
                BroadcastFeed::new(source.name().to_string(), self.feed_capacity, move || {
                    source
                        .listen()
                        .map(|event| {
                            event
                                .map_err(BridgeError::from)
                                .and_then(|payload| codec::decode_media_list(payload.as_deref()))
                        })
                        .boxed()
                })
            })
            .clone()
    }

    /// Feed of text shared while the app is running. Payloads, including
    /// nulls, are passed through untouched.
    pub fn get_text_stream(&self) -> BroadcastFeed<Option<String>> {
        self.text_feed
            .get_or_init(|| {
                let source = Arc::clone(&self.text_events);
                tracing::info!(channel = %source.name(), "creating text feed");
                BroadcastFeed::new(source.name().to_string(), self.feed_capacity, move || {
                    source
                        .listen()
                        .map(|event| event.map_err(BridgeError::from))
                        .boxed()
                })
            })
            .clone()
    }

    /// Attaches a listener to the text feed and parses each element as a URI.
    ///
    /// Elements map one to one: unparseable text yields a format error
    /// element and a null event yields `None`.
    pub fn get_text_stream_as_uri(
        &self,
    ) -> BoxStream<'static, Result<Option<SharedUri>, BridgeError>> {
        self.get_text_stream()
            .subscribe()
            .map(|event| event.and_then(uri_from_text))
            .boxed()
    }

    /// Asks the host to forget the share it last reported, so the next
    /// launch is not mistaken for a stale one. Failures are logged and dropped.
    pub async fn reset(&self) {
        if let Err(err) = self.invoke(wire::METHOD_RESET).await {
            tracing::warn!("ignoring failed reset: {err}");
        }
    }

    async fn invoke(&self, method: &str) -> Result<Option<String>, BridgeError> {
        tracing::debug!(channel = %self.methods.name(), method, "invoking host method");
        Ok(self.methods.invoke_method(method).await?)
    }
}

fn uri_from_text(text: Option<String>) -> Result<Option<SharedUri>, BridgeError> {
    text.as_deref().map(codec::parse_uri).transpose()
}
