//! Reading local images into request payloads.

use crate::error::{Result, VeoClipError};
use crate::image::types::{EncodedImage, ImageFormat, DEFAULT_MIME_TYPE};
use std::path::Path;

/// Guesses an image MIME type from the file extension, defaulting to `image/png`.
pub fn guess_mime_type(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .map(|f| f.mime_type())
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// Reads the whole file at `path` and base64-encodes it.
///
/// Fails with [`VeoClipError::NotFound`] when the file does not exist. No
/// network access happens here.
pub fn encode_image(path: impl AsRef<Path>) -> Result<EncodedImage> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => VeoClipError::NotFound {
            path: path.to_path_buf(),
        },
        _ => VeoClipError::Encode {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mime_type = guess_mime_type(path);
    if let Some(detected) = ImageFormat::from_magic_bytes(&data) {
        if detected.mime_type() != mime_type {
            tracing::debug!(
                path = %path.display(),
                extension_mime = mime_type,
                content_mime = detected.mime_type(),
                "image extension disagrees with content; using extension"
            );
        }
    }

    Ok(EncodedImage::from_bytes(&data, mime_type))
}
