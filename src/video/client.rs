//! The submit → poll → download workflow.

use crate::credential::{Credential, API_KEY_ENV};
use crate::error::{Result, VeoClipError};
use crate::image::encode_image;
use crate::video::providers::{GeminiVeoService, DEFAULT_BASE_URL};
use crate::video::service::GenerationService;
use crate::video::types::{
    GenerationRequest, OperationHandle, OperationOutcome, PollOptions, VideoArtifact,
    DEFAULT_MODEL,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;

/// Builder for [`GenerationClient`] backed by the Gemini API.
#[derive(Debug, Clone)]
pub struct GenerationClientBuilder {
    api_key: Option<String>,
    base_url: String,
    model: String,
    poll: PollOptions,
}

impl Default for GenerationClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            poll: PollOptions::default(),
        }
    }
}

impl GenerationClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GEMINI_API_KEY` when not given.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the default model for [`GenerationClient::generate_and_download`].
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the delay between status checks.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll.poll_interval = interval;
        self
    }

    /// Sets the maximum time to wait for generation.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.poll.timeout = timeout;
        self
    }

    /// Resolves the credential and builds the client.
    ///
    /// Does not contact the service.
    pub fn build(self) -> Result<GenerationClient<GeminiVeoService>> {
        let credential = Credential::resolve(self.api_key, std::env::var(API_KEY_ENV).ok())?;
        tracing::info!(api_key = %credential.masked(), "Veo client initialised");

        let service = GeminiVeoService::with_base_url(credential, self.base_url);
        Ok(GenerationClient::with_service(service)
            .with_model(self.model)
            .with_poll_options(self.poll))
    }
}

/// Turns a starting frame and a prompt into a video file on disk.
///
/// Every call runs to completion or fails; nothing is retried and a remote job
/// left behind by a failure is not cancelled.
#[derive(Debug, Clone)]
pub struct GenerationClient<S> {
    service: S,
    model: String,
    poll: PollOptions,
}

impl GenerationClient<GeminiVeoService> {
    /// Creates a new [`GenerationClientBuilder`].
    pub fn builder() -> GenerationClientBuilder {
        GenerationClientBuilder::new()
    }

    /// Creates a Gemini-backed client from an explicit key, or
    /// `GEMINI_API_KEY` when `api_key` is `None`.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let mut builder = GenerationClientBuilder::new();
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        builder.build()
    }
}

impl<S: GenerationService> GenerationClient<S> {
    /// Wraps an existing service with default model and poll options.
    pub fn with_service(service: S) -> Self {
        Self {
            service,
            model: DEFAULT_MODEL.to_string(),
            poll: PollOptions::default(),
        }
    }

    /// Sets the model used by [`generate_and_download`](Self::generate_and_download).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the poll options used by [`generate_and_download`](Self::generate_and_download).
    pub fn with_poll_options(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    /// Returns the underlying service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Returns the configured poll options.
    pub fn poll_options(&self) -> PollOptions {
        self.poll
    }

    /// Encodes the frames and submits a generation request.
    ///
    /// `end_image` is read and validated but has no effect on the output: the
    /// targeted Veo preview does not support end-frame interpolation.
    pub async fn create_task(
        &self,
        start_image: impl AsRef<Path>,
        end_image: Option<&Path>,
        prompt: &str,
        model: &str,
    ) -> Result<OperationHandle> {
        let start_image = start_image.as_ref();
        tracing::info!(path = %start_image.display(), "encoding start frame");
        let mut request = GenerationRequest::new(prompt, encode_image(start_image)?).with_model(model);

        if let Some(end) = end_image {
            request = request.with_end_image(encode_image(end)?);
            tracing::warn!(
                path = %end.display(),
                model,
                "end frame is not supported by this Veo version; it will not be sent \
                 and the video is generated from the start frame only"
            );
        }

        let preview: String = prompt.chars().take(100).collect();
        let mode = if request.end_image.is_some() {
            "start/end transition"
        } else {
            "single frame"
        };
        tracing::info!(
            service = self.service.name(),
            model,
            mode,
            prompt = %preview,
            "submitting video generation task"
        );

        let handle = self.service.submit(&request).await?;
        tracing::info!(operation = %handle.name(), "task created");
        Ok(handle)
    }

    /// Polls until the operation reports done or `options.timeout` elapses.
    ///
    /// The timeout is checked before every sleep, so a zero timeout fails
    /// without sleeping. Refreshes run one at a time, each after a full
    /// `poll_interval`.
    pub async fn await_completion(
        &self,
        handle: OperationHandle,
        options: PollOptions,
    ) -> Result<OperationHandle> {
        let start = Instant::now();
        let mut handle = handle;
        tracing::info!(operation = %handle.name(), "waiting for video generation");

        while !handle.is_done() {
            let elapsed = start.elapsed();
            if elapsed >= options.timeout {
                return Err(VeoClipError::Timeout {
                    operation: handle.name().to_string(),
                    elapsed_secs: elapsed.as_secs(),
                });
            }

            tracing::info!(
                operation = %handle.name(),
                elapsed_secs = elapsed.as_secs(),
                "generation in progress"
            );
            tokio::time::sleep(options.poll_interval).await;

            handle = self.service.refresh(&handle).await?;
        }

        tracing::info!(
            operation = %handle.name(),
            elapsed_secs = start.elapsed().as_secs(),
            "video generation complete"
        );
        Ok(handle)
    }

    /// Downloads the first generated video of a completed operation to `save_path`.
    ///
    /// Parent directories are created as needed and an existing file is
    /// overwritten. Nothing touches the filesystem unless the operation has a
    /// video to download.
    pub async fn download_video(
        &self,
        handle: &OperationHandle,
        save_path: impl AsRef<Path>,
    ) -> Result<VideoArtifact> {
        let save_path = save_path.as_ref();
        let no_result = |reason: String| VeoClipError::Result {
            operation: handle.name().to_string(),
            reason,
        };

        let video = match handle.outcome() {
            None => return Err(no_result("operation has not completed".into())),
            Some(OperationOutcome::Failed { code, message }) => {
                return Err(no_result(match code {
                    Some(code) => format!("generation failed ({code}): {message}"),
                    None => format!("generation failed: {message}"),
                }))
            }
            Some(OperationOutcome::Videos {
                videos,
                filtered_count,
            }) => match videos.first() {
                Some(video) => video,
                None if *filtered_count > 0 => {
                    return Err(no_result(format!(
                        "{filtered_count} video(s) removed by safety filters"
                    )))
                }
                None => return Err(no_result("result contains no generated videos".into())),
            },
        };

        tracing::info!(path = %save_path.display(), "downloading video");
        let data = self.service.fetch(video).await?;
        write_file(save_path, &data).await?;

        let size_bytes = tokio::fs::metadata(save_path)
            .await
            .map_err(|e| VeoClipError::download(save_path.display(), e))?
            .len();
        let artifact = VideoArtifact {
            path: save_path.to_path_buf(),
            size_bytes,
        };
        tracing::info!(
            path = %artifact.path.display(),
            size_bytes,
            size_mb = artifact.size_mb(),
            "video saved"
        );
        Ok(artifact)
    }

    /// Runs [`create_task`](Self::create_task), [`await_completion`](Self::await_completion)
    /// and [`download_video`](Self::download_video) in order with the
    /// client's model and poll options.
    pub async fn generate_and_download(
        &self,
        start_image: impl AsRef<Path>,
        end_image: Option<&Path>,
        prompt: &str,
        output_path: impl Into<PathBuf>,
    ) -> Result<VideoArtifact> {
        let output_path = output_path.into();
        let handle = self
            .create_task(start_image, end_image, prompt, &self.model)
            .await?;
        let handle = self.await_completion(handle, self.poll).await?;
        self.download_video(&handle, &output_path).await
    }
}

async fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let write_err = |e: std::io::Error| VeoClipError::download(path.display(), e);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut file = tokio::fs::File::create(path).await.map_err(write_err)?;
    file.write_all(data).await.map_err(write_err)?;
    file.flush().await.map_err(write_err)?;
    Ok(())
}
