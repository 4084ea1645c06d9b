//! Core types for Chirp

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A deferred post waiting in the queue document.
///
/// A post is "pending" iff present in the store; delivery or cancellation
/// removes it. The serialized field names and types are the on-disk contract
/// and must round-trip exactly under load/save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduledPost {
    pub id: String,
    pub text: String,
    /// Path to an image file to attach, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Due time, local to the process. Serializes ISO-8601, e.g.
    /// `2024-06-01T18:00:00`.
    pub schedule_time: NaiveDateTime,
}

impl ScheduledPost {
    pub fn new(text: String, image: Option<String>, schedule_time: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text,
            image,
            schedule_time,
        }
    }

    /// Whether this post is due at the given instant.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.schedule_time <= now
    }
}

// ============================================================================
// Attachment MIME detection
// ============================================================================

/// Image MIME types accepted for media upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMimeType {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl ImageMimeType {
    /// Detect MIME type from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Sniff MIME type from leading magic bytes. Fallback for files with a
    /// missing or unrecognized extension.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Some(Self::WebP)
        } else {
            None
        }
    }

    /// Detect MIME type for a file path and its contents, extension first,
    /// content sniffing as fallback.
    pub fn detect(path: &std::path::Path, data: &[u8]) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .or_else(|| Self::from_bytes(data))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
        }
    }
}

impl std::fmt::Display for ImageMimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_new_post_has_unique_ids() {
        let a = ScheduledPost::new("a".to_string(), None, at(18, 0));
        let b = ScheduledPost::new("a".to_string(), None, at(18, 0));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_is_due_at_or_before_now() {
        let post = ScheduledPost::new("x".to_string(), None, at(18, 0));
        assert!(!post.is_due(at(17, 59)));
        assert!(post.is_due(at(18, 0)));
        assert!(post.is_due(at(18, 1)));
    }

    #[test]
    fn test_serialized_field_names_match_document_contract() {
        let post = ScheduledPost {
            id: "abc".to_string(),
            text: "hello".to_string(),
            image: Some("/tmp/pic.png".to_string()),
            schedule_time: at(18, 0),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["id"], "abc");
        assert_eq!(json["text"], "hello");
        assert_eq!(json["image"], "/tmp/pic.png");
        assert_eq!(json["schedule_time"], "2024-06-01T18:00:00");
    }

    #[test]
    fn test_image_field_omitted_when_absent() {
        let post = ScheduledPost::new("hello".to_string(), None, at(18, 0));
        let json = serde_json::to_string(&post).unwrap();
        assert!(!json.contains("image"));
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(ImageMimeType::from_extension("JPG"), Some(ImageMimeType::Jpeg));
        assert_eq!(ImageMimeType::from_extension("png"), Some(ImageMimeType::Png));
        assert_eq!(ImageMimeType::from_extension("webp"), Some(ImageMimeType::WebP));
        assert_eq!(ImageMimeType::from_extension("pdf"), None);
    }

    #[test]
    fn test_mime_sniffing_fallback() {
        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        let path = std::path::Path::new("upload.bin");
        assert_eq!(ImageMimeType::detect(path, &png_magic), Some(ImageMimeType::Png));

        let jpeg_magic = [0xFF, 0xD8, 0xFF, 0xE0];
        assert_eq!(ImageMimeType::from_bytes(&jpeg_magic), Some(ImageMimeType::Jpeg));
        assert_eq!(ImageMimeType::from_bytes(b"plain text"), None);
    }

    #[test]
    fn test_extension_takes_priority_over_content() {
        // A gif extension wins even if the bytes look like a png
        let png_magic = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        let path = std::path::Path::new("anim.gif");
        assert_eq!(ImageMimeType::detect(path, &png_magic), Some(ImageMimeType::Gif));
    }
}
