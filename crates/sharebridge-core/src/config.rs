use serde::{Deserialize, Serialize};
use sharebridge_models::wire;

pub const DEFAULT_FEED_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub channels: ChannelNames,
    /// Elements buffered per feed before slow listeners start lagging.
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channels: ChannelNames::default(),
            feed_capacity: default_feed_capacity(),
        }
    }
}

/// Host channel names. The defaults are what the native plugins register.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChannelNames {
    #[serde(default = "default_method_channel")]
    pub method: String,
    #[serde(default = "default_media_events")]
    pub media_events: String,
    #[serde(default = "default_text_events")]
    pub text_events: String,
}

impl Default for ChannelNames {
    fn default() -> Self {
        Self {
            method: default_method_channel(),
            media_events: default_media_events(),
            text_events: default_text_events(),
        }
    }
}

fn default_feed_capacity() -> usize {
    DEFAULT_FEED_CAPACITY
}

fn default_method_channel() -> String {
    wire::METHOD_CHANNEL.into()
}

fn default_media_events() -> String {
    wire::MEDIA_EVENT_CHANNEL.into()
}

fn default_text_events() -> String {
    wire::TEXT_EVENT_CHANNEL.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_plugin_channel_names() {
        let config = BridgeConfig::default();
        assert_eq!(config.channels.method, "receive_sharing_intent/messages");
        assert_eq!(config.channels.media_events, "receive_sharing_intent/events-media");
        assert_eq!(config.channels.text_events, "receive_sharing_intent/events-text");
        assert_eq!(config.feed_capacity, DEFAULT_FEED_CAPACITY);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"channels":{"method":"custom/messages"}}"#).unwrap();
        assert_eq!(config.channels.method, "custom/messages");
        assert_eq!(config.channels.text_events, wire::TEXT_EVENT_CHANNEL);
        assert_eq!(config.feed_capacity, DEFAULT_FEED_CAPACITY);
    }
}
