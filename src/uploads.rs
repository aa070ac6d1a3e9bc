//! Author portrait uploads.

use crate::error::{AppError, Result};
use image::ImageFormat;
use std::path::Path;

/// Public URL prefix under which the upload directory is served.
pub const PUBLIC_PREFIX: &str = "/uploads/";

/// Accepted portrait types: declared MIME type, sniffed format, file extension.
const ACCEPTED: &[(&str, ImageFormat, &str)] = &[
    ("image/jpeg", ImageFormat::Jpeg, "jpg"),
    ("image/png", ImageFormat::Png, "png"),
    ("image/gif", ImageFormat::Gif, "gif"),
    ("image/webp", ImageFormat::WebP, "webp"),
];

/// Check a portrait's declared type against its content.
///
/// Returns the file extension to store it under.
pub fn image_extension(content_type: &str, data: &[u8]) -> Result<&'static str> {
    let declared = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let (_, format, ext) = ACCEPTED
        .iter()
        .find(|(mime, _, _)| *mime == declared)
        .ok_or_else(|| {
            AppError::Validation("Portrait must be a JPEG, PNG, GIF or WebP image".to_string())
        })?;

    match image::guess_format(data) {
        Ok(sniffed) if sniffed == *format => Ok(*ext),
        _ => Err(AppError::Validation(format!(
            "Portrait content is not a valid {} image",
            ext.to_uppercase()
        ))),
    }
}

/// Store a portrait and return its public path.
pub async fn save_image(dir: &Path, content_type: &str, data: &[u8]) -> Result<String> {
    let ext = image_extension(content_type, data)?;
    let file_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(&file_name), data).await?;

    tracing::info!(file = %file_name, bytes = data.len(), "Stored author portrait");
    Ok(format!("{}{}", PUBLIC_PREFIX, file_name))
}

/// Remove a previously stored portrait. Failures are logged, not returned.
pub async fn remove_image(dir: &Path, public_path: &str) {
    let Some(file_name) = public_path.strip_prefix(PUBLIC_PREFIX) else {
        return;
    };
    // Stored names never contain separators.
    if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.starts_with('.') {
        return;
    }

    if let Err(e) = tokio::fs::remove_file(dir.join(file_name)).await {
        tracing::warn!(file = %file_name, error = %e, "Failed to remove old portrait");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0";

    #[test]
    fn declared_type_must_match_content() {
        assert_eq!(image_extension("image/png", PNG_MAGIC).unwrap(), "png");
        assert_eq!(image_extension("IMAGE/JPEG; q=1", JPEG_MAGIC).unwrap(), "jpg");
        assert!(image_extension("image/png", JPEG_MAGIC).is_err());
        assert!(image_extension("text/html", b"<html></html>").is_err());
        assert!(image_extension("image/svg+xml", b"<svg/>").is_err());
    }

    #[tokio::test]
    async fn save_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_image(dir.path(), "image/png", PNG_MAGIC).await.unwrap();
        assert!(path.starts_with(PUBLIC_PREFIX) && path.ends_with(".png"));

        let file = dir.path().join(path.trim_start_matches(PUBLIC_PREFIX));
        assert!(file.exists());

        remove_image(dir.path(), &path).await;
        assert!(!file.exists());

        // Paths outside the upload directory are ignored.
        remove_image(dir.path(), "/uploads/../config.toml").await;
    }
}
