use std::sync::Arc;

use thiserror::Error;

/// Failure signalled by the host side of a channel.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("host error {code}: {message}")]
pub struct TransportError {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl TransportError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The host has no handler registered for `method`.
    pub fn not_implemented(method: &str) -> Self {
        Self::new("NOT_IMPLEMENTED", format!("no host handler for {method}"))
    }
}

/// Errors surfaced by the bridge. Cloneable so feeds can fan them out.
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("decode error: {0}")]
    Decode(#[source] Arc<serde_json::Error>),
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    #[error("feed listener fell behind and missed {0} elements")]
    Lagged(u64),
}

/// Why shared text could not be read as a URI.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("not a URI reference: {0}")]
    Reference(#[from] uriparse::URIReferenceError),
    #[error("invalid absolute URI: {0}")]
    Absolute(#[from] url::ParseError),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(Arc::new(err))
    }
}
