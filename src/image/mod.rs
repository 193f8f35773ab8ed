//! Input image handling.

mod encode;
mod types;

pub use encode::{encode_image, guess_mime_type};
pub use types::{EncodedImage, ImageFormat, DEFAULT_MIME_TYPE};
