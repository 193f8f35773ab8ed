//! Video generation module.

mod client;
pub mod providers;
mod service;
mod types;

pub use client::{GenerationClient, GenerationClientBuilder};
pub use service::GenerationService;
pub use types::{
    GenerationRequest, OperationHandle, OperationOutcome, PollOptions, VideoArtifact,
    VideoReference, DEFAULT_MODEL,
};
