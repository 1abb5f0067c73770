// Request channel and its methods
pub const METHOD_CHANNEL: &str = "receive_sharing_intent/messages";
pub const METHOD_GET_INITIAL_MEDIA: &str = "getInitialMedia";
pub const METHOD_GET_INITIAL_TEXT: &str = "getInitialText";
pub const METHOD_RESET: &str = "reset";

// Broadcast sources
pub const MEDIA_EVENT_CHANNEL: &str = "receive_sharing_intent/events-media";
pub const TEXT_EVENT_CHANNEL: &str = "receive_sharing_intent/events-text";
