//! The remote generation service seam.

use crate::error::Result;
use crate::video::types::{GenerationRequest, OperationHandle, VideoReference};
use async_trait::async_trait;

/// A remote service that runs video generation as a long-running operation.
///
/// Implementations map their own failures onto the matching stage:
/// `submit` → [`VeoClipError::Submission`](crate::VeoClipError::Submission),
/// `refresh` → [`VeoClipError::Poll`](crate::VeoClipError::Poll),
/// `fetch` → [`VeoClipError::Download`](crate::VeoClipError::Download).
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Submits a request and returns the service's handle for it.
    async fn submit(&self, request: &GenerationRequest) -> Result<OperationHandle>;

    /// Fetches a fresh snapshot of the given operation.
    async fn refresh(&self, handle: &OperationHandle) -> Result<OperationHandle>;

    /// Downloads the bytes behind a result reference.
    async fn fetch(&self, video: &VideoReference) -> Result<Vec<u8>>;

    /// Returns the name of this service for display.
    fn name(&self) -> &str;
}
