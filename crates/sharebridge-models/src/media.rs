use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid media type ordinal: {0}")]
pub struct MediaTypeError(pub u64);

/// Kind of a shared media item.
///
/// Encoded on the wire by ordinal: 0 = image, 1 = video, 2 = file.
/// The ordinals are part of the host protocol and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u8")]
pub enum SharedMediaType {
    Image,
    Video,
    File,
}

impl SharedMediaType {
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Image => 0,
            Self::Video => 1,
            Self::File => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::File => "file",
        }
    }
}

impl TryFrom<u64> for SharedMediaType {
    type Error = MediaTypeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Image),
            1 => Ok(Self::Video),
            2 => Ok(Self::File),
            other => Err(MediaTypeError(other)),
        }
    }
}

impl From<SharedMediaType> for u8 {
    fn from(t: SharedMediaType) -> Self {
        t.ordinal()
    }
}

impl std::fmt::Display for SharedMediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One item handed over by a share intent.
///
/// `path` points at the (possibly copied) resource on the local filesystem.
/// Removing any temporary copy is up to whoever receives the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedMediaFile {
    pub path: String,
    /// Preview image path, when the host generated one.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Playback length in milliseconds. Only set for videos.
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(rename = "type")]
    pub media_type: SharedMediaType,
}

impl SharedMediaFile {
    pub fn new(path: impl Into<String>, media_type: SharedMediaType) -> Self {
        Self {
            path: path.into(),
            thumbnail: None,
            duration: None,
            media_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_match_wire_protocol() {
        assert_eq!(SharedMediaType::Image.ordinal(), 0);
        assert_eq!(SharedMediaType::Video.ordinal(), 1);
        assert_eq!(SharedMediaType::File.ordinal(), 2);
        assert_eq!(SharedMediaType::try_from(1u64), Ok(SharedMediaType::Video));
        assert_eq!(SharedMediaType::try_from(3u64), Err(MediaTypeError(3)));
    }

    #[test]
    fn decodes_image_with_null_optionals() {
        let file: SharedMediaFile = serde_json::from_str(
            r#"{"path":"/a.jpg","thumbnail":null,"duration":null,"type":0}"#,
        )
        .unwrap();
        assert_eq!(file.path, "/a.jpg");
        assert_eq!(file.media_type, SharedMediaType::Image);
        assert!(file.thumbnail.is_none());
        assert!(file.duration.is_none());
    }

    #[test]
    fn decodes_video_with_thumbnail_and_duration() {
        let file: SharedMediaFile = serde_json::from_str(
            r#"{"path":"/v.mp4","thumbnail":"/v.jpg","duration":4200,"type":1}"#,
        )
        .unwrap();
        assert_eq!(file.media_type, SharedMediaType::Video);
        assert_eq!(file.thumbnail.as_deref(), Some("/v.jpg"));
        assert_eq!(file.duration, Some(4200));
    }

    #[test]
    fn rejects_out_of_range_type() {
        let err = serde_json::from_str::<SharedMediaFile>(r#"{"path":"/x","type":99}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid media type ordinal: 99"));
    }

    #[test]
    fn rejects_missing_path_and_type() {
        assert!(serde_json::from_str::<SharedMediaFile>(r#"{"type":2}"#).is_err());
        assert!(serde_json::from_str::<SharedMediaFile>(r#"{"path":"/x"}"#).is_err());
        assert!(serde_json::from_str::<SharedMediaFile>(r#"{"path":7,"type":2}"#).is_err());
    }

    #[test]
    fn encodes_type_as_ordinal() {
        let file = SharedMediaFile::new("/doc.pdf", SharedMediaType::File);
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "path": "/doc.pdf",
                "thumbnail": null,
                "duration": null,
                "type": 2,
            })
        );
    }
}
