//! Typed client side of the share-intent bridge.
//!
//! The host platform delivers shared content through one request channel and
//! two event channels. [`SharingIntent`] decodes those payloads into
//! [`sharebridge_models::media::SharedMediaFile`] lists, plain text and URI references.

pub mod bridge;
pub mod channel;
pub mod codec;
pub mod config;
pub mod error;
pub mod memory;

pub use bridge::SharingIntent;
pub use channel::{BroadcastFeed, EventChannel, MethodChannel, RawEvent};
pub use codec::SharedUri;
pub use error::{BridgeError, FormatError, TransportError};
