use anyhow::Result;
use serde::{Deserialize, Serialize};
use sharebridge_core::config::BridgeConfig;
use std::fs;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub bridge: BridgeConfig,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let mut config = if std::path::Path::new(path).exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            tracing::info!("Config file not found at '{}', using defaults", path);
            Config::default()
        };

        // Environment variable overrides
        if let Ok(value) = std::env::var("SHAREBRIDGE_METHOD_CHANNEL") {
            config.bridge.channels.method = value;
        }
        if let Ok(value) = std::env::var("SHAREBRIDGE_MEDIA_CHANNEL") {
            config.bridge.channels.media_events = value;
        }
        if let Ok(value) = std::env::var("SHAREBRIDGE_TEXT_CHANNEL") {
            config.bridge.channels.text_events = value;
        }
        if let Ok(value) = std::env::var("SHAREBRIDGE_FEED_CAPACITY") {
            match value.parse::<usize>() {
                Ok(capacity) => config.bridge.feed_capacity = capacity,
                Err(_) => tracing::warn!(
                    "Ignoring SHAREBRIDGE_FEED_CAPACITY='{}': not a number",
                    value
                ),
            }
        }

        if config.bridge.feed_capacity == 0 {
            anyhow::bail!("bridge.feed_capacity must be at least 1");
        }
        Ok(config)
    }
}
