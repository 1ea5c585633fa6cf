//! Disk storage for uploaded files (product images, avatars).
//!
//! Files land under the configured upload directory with a millisecond
//! timestamp prefixed to a sanitized original name, mirroring how the public
//! image URLs are stored on their owning rows.

use std::path::Path;

use chrono::Utc;
use thiserror::Error;

/// Errors from upload storage.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Filesystem error while persisting the upload.
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),

    /// The multipart field carried no usable file name.
    #[error("upload is missing a file name")]
    MissingFileName,
}

/// Build the stored file name for an upload: `<millis>_<sanitized original>`.
///
/// Path separators and other non-portable characters in the original name are
/// replaced so the result is always a bare file name.
#[must_use]
pub fn stored_file_name(original: &str, timestamp_millis: i64) -> String {
    let sanitized: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{timestamp_millis}_{sanitized}")
}

/// Persist an uploaded file and return its stored name.
///
/// The upload directory is created if it doesn't exist yet.
///
/// # Errors
///
/// Returns `UploadError::MissingFileName` if `original` is empty.
/// Returns `UploadError::Io` if the write fails.
pub async fn save_file(dir: &Path, original: &str, data: &[u8]) -> Result<String, UploadError> {
    if original.is_empty() {
        return Err(UploadError::MissingFileName);
    }

    tokio::fs::create_dir_all(dir).await?;

    let name = stored_file_name(original, Utc::now().timestamp_millis());
    tokio::fs::write(dir.join(&name), data).await?;

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_file_name_keeps_safe_chars() {
        assert_eq!(
            stored_file_name("photo-1.final_v2.png", 1_700_000_000_000),
            "1700000000000_photo-1.final_v2.png"
        );
    }

    #[test]
    fn test_stored_file_name_strips_path_separators() {
        let name = stored_file_name("../../etc/passwd", 42);
        assert!(!name.contains('/'));
        assert_eq!(name, "42_.._.._etc_passwd");
    }

    #[test]
    fn test_stored_file_name_replaces_spaces() {
        assert_eq!(stored_file_name("my photo.jpg", 1), "1_my_photo.jpg");
    }
}
