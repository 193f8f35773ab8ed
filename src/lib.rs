#![warn(missing_docs)]
//! veoclip - image-to-video generation with Google Veo.
//!
//! Submits a starting frame plus a prompt, polls the long-running operation
//! at a fixed interval, and writes the finished video to disk.
//!
//! # Quick Start
//!
//! ```no_run
//! use veoclip::GenerationClient;
//!
//! #[tokio::main]
//! async fn main() -> veoclip::Result<()> {
//!     // Reads GEMINI_API_KEY when no key is given.
//!     let client = GenerationClient::builder().build()?;
//!     let video = client
//!         .generate_and_download("start.png", None, "zoom in slowly", "out/clip.mp4")
//!         .await?;
//!     println!("saved {} ({} bytes)", video.path.display(), video.size_bytes);
//!     Ok(())
//! }
//! ```
//!
//! # Step by step
//!
//! ```no_run
//! use veoclip::{GenerationClient, PollOptions, DEFAULT_MODEL};
//!
//! # async fn run() -> veoclip::Result<()> {
//! let client = GenerationClient::new(Some("my-api-key".into()))?;
//! let handle = client.create_task("start.png", None, "pan left", DEFAULT_MODEL).await?;
//! let handle = client.await_completion(handle, PollOptions::default()).await?;
//! client.download_video(&handle, "clip.mp4").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Known limitations
//!
//! - An ending frame is accepted but not sent: `veo-3.1-generate-preview`
//!   does not support end-frame interpolation, so the video is generated from
//!   the starting frame alone. A warning is logged when one is given.
//! - The timeout is checked between sleeps only, so the worst case wait is
//!   `timeout + poll_interval + one status request`.
//! - A job whose polling times out or fails keeps running on the service; it
//!   is never cancelled.
//!
//! # Features
//!
//! - `cli` (default): the `veoclip` command-line binary.

mod credential;
mod error;
pub mod image;
pub mod video;

pub use credential::{Credential, API_KEY_ENV};
pub use error::{Result, Stage, VeoClipError};

pub use image::{encode_image, EncodedImage, ImageFormat};
pub use video::providers::GeminiVeoService;
pub use video::{
    GenerationClient, GenerationClientBuilder, GenerationRequest, GenerationService,
    OperationHandle, OperationOutcome, PollOptions, VideoArtifact, VideoReference,
    DEFAULT_MODEL,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{Result, VeoClipError};
    pub use crate::video::{
        GenerationClient, GenerationService, OperationHandle, PollOptions, VideoArtifact,
    };
}
