//! Core types for video generation.

use crate::image::EncodedImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Model used when none is given.
pub const DEFAULT_MODEL: &str = "veo-3.1-generate-preview";

/// A request to generate a video from a starting frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Model identifier, e.g. `veo-3.1-generate-preview`.
    pub model: String,
    /// Text prompt describing the motion or transition.
    pub prompt: String,
    /// The first frame. Always present.
    pub start_image: EncodedImage,
    /// The intended last frame.
    ///
    /// Not sent to the service: the targeted Veo preview does not support
    /// end-frame interpolation, so this has no effect on the output.
    pub end_image: Option<EncodedImage>,
}

impl GenerationRequest {
    /// Creates a request with the default model and no ending frame.
    pub fn new(prompt: impl Into<String>, start_image: EncodedImage) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            prompt: prompt.into(),
            start_image,
            end_image: None,
        }
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Attaches an ending frame. See [`GenerationRequest::end_image`].
    pub fn with_end_image(mut self, image: EncodedImage) -> Self {
        self.end_image = Some(image);
        self
    }
}

/// A reference to one generated video held by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    /// Download URI.
    pub uri: String,
}

/// What a completed operation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// Generation finished; `videos` may still be empty.
    Videos {
        /// Generated video references in service order.
        videos: Vec<VideoReference>,
        /// Number of results removed by safety filters.
        filtered_count: u32,
    },
    /// The service reported a failure.
    Failed {
        /// Service error code, if any.
        code: Option<i32>,
        /// Service error message.
        message: String,
    },
}

/// A snapshot of a long-running remote operation.
///
/// Handles are values: refreshing one yields a new handle and leaves the old
/// one untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    name: String,
    done: bool,
    outcome: Option<OperationOutcome>,
}

impl OperationHandle {
    /// A handle for an operation that is still running.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            outcome: None,
        }
    }

    /// A handle for a completed operation.
    pub fn completed(name: impl Into<String>, outcome: OperationOutcome) -> Self {
        Self {
            name: name.into(),
            done: true,
            outcome: Some(outcome),
        }
    }

    /// Server-assigned operation name, e.g. `models/veo/operations/abc`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the service reported completion.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The outcome, present once the operation is done.
    pub fn outcome(&self) -> Option<&OperationOutcome> {
        self.outcome.as_ref()
    }

    /// Generated videos, empty unless the operation completed successfully.
    pub fn videos(&self) -> &[VideoReference] {
        match &self.outcome {
            Some(OperationOutcome::Videos { videos, .. }) => videos,
            _ => &[],
        }
    }
}

/// A video written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoArtifact {
    /// Where the video was saved.
    pub path: PathBuf,
    /// Size of the saved file in bytes.
    pub size_bytes: u64,
}

impl VideoArtifact {
    /// Size in mebibytes, for display.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Timing for the completion poll loop.
///
/// The timeout is only checked between sleeps, so the real wall-clock bound is
/// `timeout + poll_interval + one status request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Give up once this much time has elapsed.
    pub timeout: Duration,
    /// Fixed delay before each status refresh.
    pub poll_interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            poll_interval: Duration::from_secs(10),
        }
    }
}

impl PollOptions {
    /// Sets the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req = GenerationRequest::new("zoom in", EncodedImage::from_bytes(b"x", "image/png"));
        assert_eq!(req.model, "veo-3.1-generate-preview");
        assert!(req.end_image.is_none());
    }

    #[test]
    fn test_pending_handle_has_no_videos() {
        let handle = OperationHandle::pending("operations/1");
        assert!(!handle.is_done());
        assert!(handle.outcome().is_none());
        assert!(handle.videos().is_empty());
    }

    #[test]
    fn test_failed_handle_has_no_videos() {
        let handle = OperationHandle::completed(
            "operations/1",
            OperationOutcome::Failed {
                code: Some(3),
                message: "bad prompt".into(),
            },
        );
        assert!(handle.is_done());
        assert!(handle.videos().is_empty());
    }

    #[test]
    fn test_poll_options_default() {
        let opts = PollOptions::default();
        assert_eq!(opts.timeout, Duration::from_secs(600));
        assert_eq!(opts.poll_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_artifact_size_mb() {
        let artifact = VideoArtifact {
            path: "out.mp4".into(),
            size_bytes: 3 * 1024 * 1024,
        };
        assert!((artifact.size_mb() - 3.0).abs() < f64::EPSILON);
    }
}
