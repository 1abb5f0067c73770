//! Payload decoding shared by the request and event paths.

use std::fmt;

use sharebridge_models::media::SharedMediaFile;
use uriparse::URIReference;
use url::Url;

use crate::error::{BridgeError, FormatError};

/// Decodes a media payload. A null payload is an empty list; anything else
/// must be a JSON array of media objects, decoded in order.
pub fn decode_media_list(payload: Option<&str>) -> Result<Vec<SharedMediaFile>, BridgeError> {
    match payload {
        None => Ok(Vec::new()),
        Some(raw) => Ok(serde_json::from_str(raw)?),
    }
}

/// Encodes media items in the host wire format.
pub fn encode_media_list(files: &[SharedMediaFile]) -> Result<String, BridgeError> {
    Ok(serde_json::to_string(files)?)
}

/// Shared text parsed as an RFC 3986 URI reference.
#[derive(Debug, Clone, PartialEq)]
pub enum SharedUri {
    Absolute(Url),
    /// No scheme: a path, query or fragment reference, kept unresolved.
    Relative(URIReference<'static>),
}

impl SharedUri {
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            SharedUri::Absolute(url) => Some(url),
            SharedUri::Relative(_) => None,
        }
    }

    pub fn scheme(&self) -> Option<&str> {
        self.as_url().map(Url::scheme)
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, SharedUri::Relative(_))
    }
}

impl fmt::Display for SharedUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharedUri::Absolute(url) => fmt::Display::fmt(url, f),
            SharedUri::Relative(reference) => fmt::Display::fmt(reference, f),
        }
    }
}

/// Parses shared text as a URI or relative reference.
///
/// The RFC 3986 grammar decides validity; references with a scheme are then
/// resolved into a [`Url`].
pub fn parse_uri(text: &str) -> Result<SharedUri, BridgeError> {
    let reference = URIReference::try_from(text).map_err(FormatError::from)?;
    if reference.scheme().is_some() {
        let url = Url::parse(text).map_err(FormatError::from)?;
        Ok(SharedUri::Absolute(url))
    } else {
        Ok(SharedUri::Relative(reference.into_owned()))
    }
}
