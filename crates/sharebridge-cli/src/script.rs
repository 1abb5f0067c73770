//! Replay scripts: what the host reports at launch and which shares arrive later.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use sharebridge_core::memory::MemoryHost;
use sharebridge_core::TransportError;
use sharebridge_models::wire;

#[derive(Debug, Default, Deserialize)]
pub struct ReplayScript {
    /// Raw `getInitialMedia` reply. Omitted means a null reply.
    #[serde(default)]
    pub initial_media: Option<String>,
    /// Raw `getInitialText` reply. Omitted means a null reply.
    #[serde(default)]
    pub initial_text: Option<String>,
    #[serde(default)]
    pub events: Vec<ReplayEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Media,
    Text,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayEvent {
    pub feed: FeedKind,
    /// Omitted means a null event.
    #[serde(default)]
    pub payload: Option<String>,
    /// When set, the host reports this failure instead of a payload.
    #[serde(default)]
    pub error: Option<HostFailure>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostFailure {
    pub code: String,
    pub message: String,
}

impl ReplayScript {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading replay script {}", path.display()))?;
        let script = toml::from_str(&content)
            .with_context(|| format!("parsing replay script {}", path.display()))?;
        Ok(script)
    }

    /// Registers the launch-time replies on the host's method channel.
    pub fn install(&self, host: &MemoryHost) {
        host.methods
            .reply(wire::METHOD_GET_INITIAL_MEDIA, self.initial_media.as_deref());
        host.methods
            .reply(wire::METHOD_GET_INITIAL_TEXT, self.initial_text.as_deref());
        host.methods.reply(wire::METHOD_RESET, None);
    }
}

impl ReplayEvent {
    /// Pushes this event through the matching host source.
    pub fn publish(&self, host: &MemoryHost) -> usize {
        let source = match self.feed {
            FeedKind::Media => &host.media_events,
            FeedKind::Text => &host.text_events,
        };
        match &self.error {
            Some(failure) => source.emit_error(TransportError::new(
                failure.code.clone(),
                failure.message.clone(),
            )),
            None => source.emit(self.payload.as_deref()),
        }
    }
}
