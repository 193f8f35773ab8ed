//! Core types for input images.

use serde::{Deserialize, Serialize};

/// MIME type used when the extension is missing or unknown.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

/// Image formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
    /// GIF format.
    Gif,
    /// Windows bitmap.
    Bmp,
    /// TIFF format.
    Tiff,
    /// HEIC format.
    Heic,
    /// HEIF format.
    Heif,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Heic => "image/heic",
            Self::Heif => "image/heif",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" | "jpe" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "heic" => Some(Self::Heic),
            "heif" => Some(Self::Heif),
            _ => None,
        }
    }

    /// Detects common image formats from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        if data.starts_with(b"BM") && data.len() >= 14 {
            return Some(Self::Bmp);
        }
        if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
            return Some(Self::Tiff);
        }
        None
    }
}

/// An image ready to embed in a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedImage {
    /// Standard base64 of the file contents.
    #[serde(rename = "bytesBase64Encoded")]
    pub payload: String,
    /// MIME type guessed from the file extension.
    pub mime_type: String,
}

impl EncodedImage {
    /// Encodes raw bytes with the given MIME type.
    pub fn from_bytes(data: &[u8], mime_type: impl Into<String>) -> Self {
        use base64::Engine;
        Self {
            payload: base64::engine::general_purpose::STANDARD.encode(data),
            mime_type: mime_type.into(),
        }
    }

    /// Decodes the payload back to the original bytes.
    pub fn decode(&self) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.decode(&self.payload)
    }

    /// Size of the decoded image in bytes.
    pub fn decoded_len(&self) -> usize {
        let padding = self.payload.bytes().rev().take_while(|b| *b == b'=').count();
        self.payload.len() / 4 * 3 - padding
    }
}
