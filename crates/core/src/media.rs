//! Media attachment rules: kinds, MIME allow-lists, size and count caps.
//!
//! Validation is per file and names the offending file in the error so a
//! rejection in the middle of an upload batch tells the operator exactly
//! which file to fix. Batch-level atomicity is intentionally NOT provided
//! here; callers validate inside their upload loop.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum number of media items a single project may carry.
pub const MAX_MEDIA_ITEMS: usize = 10;

/// Per-file upload size ceiling: 100 MiB.
pub const MAX_FILE_SIZE_BYTES: u64 = 100 * 1024 * 1024;

/// Image MIME types accepted for upload.
pub const ALLOWED_IMAGE_MIMES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// Video MIME types accepted for upload.
pub const ALLOWED_VIDEO_MIMES: &[&str] = &[
    "video/mp4",
    "video/webm",
    "video/quicktime",
    "video/ogg",
];

/// Discriminator for a media attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// A single media attachment owned by a project.
///
/// Stored as a JSONB array element on the project row; the order of the
/// array is the display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Public URL of the object in the blob store.
    pub url: String,
    pub kind: MediaKind,
    /// Free-text caption, if any.
    #[serde(default)]
    pub description: Option<String>,
}

/// Classify a MIME type against the allow-lists.
pub fn kind_for_mime(content_type: &str) -> Option<MediaKind> {
    if ALLOWED_IMAGE_MIMES.contains(&content_type) {
        Some(MediaKind::Image)
    } else if ALLOWED_VIDEO_MIMES.contains(&content_type) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// Validate one file for upload: size ceiling and MIME allow-list.
///
/// The returned error names the file so the caller can surface it directly.
pub fn validate_media_file(
    filename: &str,
    content_type: &str,
    size_bytes: u64,
) -> Result<MediaKind, CoreError> {
    if size_bytes > MAX_FILE_SIZE_BYTES {
        return Err(CoreError::Validation(format!(
            "File '{filename}' exceeds the {} MiB size limit",
            MAX_FILE_SIZE_BYTES / (1024 * 1024)
        )));
    }
    kind_for_mime(content_type).ok_or_else(|| {
        CoreError::Validation(format!(
            "File '{filename}' has unsupported type '{content_type}'. \
             Allowed: images ({}) and videos ({})",
            ALLOWED_IMAGE_MIMES.join(", "),
            ALLOWED_VIDEO_MIMES.join(", ")
        ))
    })
}

/// Enforce the per-project media cap before accepting new attachments.
pub fn validate_media_count(existing: usize, adding: usize) -> Result<(), CoreError> {
    if existing + adding > MAX_MEDIA_ITEMS {
        return Err(CoreError::Validation(format!(
            "A project may have at most {MAX_MEDIA_ITEMS} media items \
             ({existing} present, {adding} being added)"
        )));
    }
    Ok(())
}
