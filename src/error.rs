//! Error types for video generation.

use std::path::PathBuf;

/// The stage of the submit → poll → download workflow an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Client construction (credential lookup).
    Configure,
    /// Reading and encoding a local image.
    Encode,
    /// Submitting the generation request.
    Submit,
    /// Waiting on the long-running operation.
    Poll,
    /// Fetching and writing the result.
    Download,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configure => write!(f, "configure"),
            Self::Encode => write!(f, "encode"),
            Self::Submit => write!(f, "submit"),
            Self::Poll => write!(f, "poll"),
            Self::Download => write!(f, "download"),
        }
    }
}

/// Errors that can occur while generating a video.
#[derive(Debug, thiserror::Error)]
pub enum VeoClipError {
    /// No credential available, or the configuration is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A local input file does not exist.
    #[error("input file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// A local input file exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote service rejected or failed the initial request.
    #[error("submission failed{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Submission { status: Option<u16>, message: String },

    /// Refreshing the operation status failed.
    #[error("polling operation {operation} failed: {message}")]
    Poll { operation: String, message: String },

    /// The operation did not complete within the configured budget.
    #[error("operation {operation} timed out after {elapsed_secs}s")]
    Timeout { operation: String, elapsed_secs: u64 },

    /// The operation completed without a usable result.
    #[error("operation {operation} returned no usable result: {reason}")]
    Result { operation: String, reason: String },

    /// Fetching the video or writing it to disk failed.
    ///
    /// `target` is the remote URI for fetch failures and the local path for
    /// write failures.
    #[error("failed to download video ({target}): {reason}")]
    Download { target: String, reason: String },
}

impl VeoClipError {
    /// Returns the workflow stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Configuration(_) => Stage::Configure,
            Self::NotFound { .. } | Self::Encode { .. } => Stage::Encode,
            Self::Submission { .. } => Stage::Submit,
            Self::Poll { .. } | Self::Timeout { .. } => Stage::Poll,
            Self::Result { .. } | Self::Download { .. } => Stage::Download,
        }
    }

    pub(crate) fn download(target: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        Self::Download {
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for video generation operations.
pub type Result<T> = std::result::Result<T, VeoClipError>;

const MAX_ERROR_LEN: usize = 500;

/// Redacts API keys from a remote error body and truncates it for display.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let mut out = String::with_capacity(text.len().min(MAX_ERROR_LEN));
    let mut rest = text;
    while let Some(idx) = rest.find("key=") {
        let (head, tail) = rest.split_at(idx + 4);
        out.push_str(head);
        out.push_str("[REDACTED]");
        let end = tail
            .find(|c: char| c == '&' || c == '"' || c.is_whitespace())
            .unwrap_or(tail.len());
        rest = &tail[end..];
    }
    out.push_str(rest);

    let out = out.trim();
    if out.chars().count() > MAX_ERROR_LEN {
        let truncated: String = out.chars().take(MAX_ERROR_LEN).collect();
        format!("{truncated}...")
    } else {
        out.to_string()
    }
}

/// Parses a `Retry-After` header expressed in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
