//! Blob-store object key derivation.
//!
//! Keys are `{prefix}/{millis}-{filename}`. Two uploads of the same
//! filename in the same millisecond collide; accepted, matching the
//! upload path's documented weak spot.

/// Default key prefix for portfolio uploads.
pub const UPLOAD_PREFIX: &str = "portfolio";

/// Build the storage key for an uploaded file.
///
/// Any path components in the client-supplied filename are stripped so a
/// crafted name cannot escape the prefix.
pub fn object_key(prefix: &str, timestamp_ms: i64, filename: &str) -> String {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    format!("{prefix}/{timestamp_ms}-{basename}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_embeds_timestamp_and_filename() {
        assert_eq!(
            object_key("portfolio", 1700000000123, "shot.png"),
            "portfolio/1700000000123-shot.png"
        );
    }

    #[test]
    fn path_components_are_stripped() {
        assert_eq!(
            object_key("portfolio", 1, "../../etc/passwd"),
            "portfolio/1-passwd"
        );
        assert_eq!(
            object_key("portfolio", 1, "dir\\evil.png"),
            "portfolio/1-evil.png"
        );
    }
}
