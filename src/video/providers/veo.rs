//! Veo over the Gemini Developer API.

use crate::credential::Credential;
use crate::error::{parse_retry_after, sanitize_error_message, Result, VeoClipError};
use crate::image::EncodedImage;
use crate::video::service::GenerationService;
use crate::video::types::{
    GenerationRequest, OperationHandle, OperationOutcome, VideoReference,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Gemini Developer API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Veo video generation through `generativelanguage.googleapis.com`.
///
/// Speaks the three calls the client needs: `predictLongRunning` to submit,
/// `GET operations/...` to refresh, and a plain `GET` on the result URI.
#[derive(Debug, Clone)]
pub struct GeminiVeoService {
    client: reqwest::Client,
    credential: Credential,
    base_url: String,
}

impl GeminiVeoService {
    /// Creates a service against the public Gemini endpoint.
    pub fn new(credential: Credential) -> Self {
        Self::with_base_url(credential, DEFAULT_BASE_URL)
    }

    /// Creates a service against a custom endpoint (proxies, tests).
    pub fn with_base_url(credential: Credential, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            credential,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn submission_error(
        &self,
        status: u16,
        text: &str,
        headers: &reqwest::header::HeaderMap,
    ) -> VeoClipError {
        let message = match status {
            401 | 403 => format!(
                "API key rejected: {}",
                sanitize_error_message(text)
            ),
            402 => "Veo billing issue: enable billing at https://aistudio.google.com".to_string(),
            404 => "Veo API not available. Veo requires a paid-tier API key with billing enabled. \
                    Enable it at https://aistudio.google.com by selecting a Google Cloud project with billing."
                .to_string(),
            429 => match parse_retry_after(headers) {
                Some(secs) => format!("rate limited, retry after {secs}s"),
                None => "rate limited".to_string(),
            },
            _ => sanitize_error_message(text),
        };
        VeoClipError::Submission {
            status: Some(status),
            message,
        }
    }

    fn download_url(&self, uri: &str) -> String {
        let key = self.credential.expose();
        if uri.contains('?') {
            format!("{uri}&key={key}")
        } else {
            format!("{uri}?key={key}")
        }
    }
}

#[async_trait]
impl GenerationService for GeminiVeoService {
    async fn submit(&self, request: &GenerationRequest) -> Result<OperationHandle> {
        let url = format!(
            "{}/models/{}:predictLongRunning",
            self.base_url, request.model
        );
        let body = VeoRequest::from_request(request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| VeoClipError::Submission {
                status: None,
                message: sanitize_error_message(&e.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.submission_error(status.as_u16(), &text, &headers));
        }

        let operation: VeoOperationResponse =
            response.json().await.map_err(|e| VeoClipError::Submission {
                status: Some(status.as_u16()),
                message: format!("unexpected response: {e}"),
            })?;
        if operation.name.is_empty() {
            return Err(VeoClipError::Submission {
                status: Some(status.as_u16()),
                message: "response did not include an operation name".into(),
            });
        }
        Ok(operation.into_handle(None))
    }

    async fn refresh(&self, handle: &OperationHandle) -> Result<OperationHandle> {
        let url = format!("{}/{}", self.base_url, handle.name());
        let poll_error = |message: String| VeoClipError::Poll {
            operation: handle.name().to_string(),
            message,
        };

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", self.credential.expose())
            .send()
            .await
            .map_err(|e| poll_error(sanitize_error_message(&e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(poll_error(format!(
                "{}: {}",
                status.as_u16(),
                sanitize_error_message(&text)
            )));
        }

        let operation: VeoOperationResponse = response
            .json()
            .await
            .map_err(|e| poll_error(format!("unexpected response: {e}")))?;
        Ok(operation.into_handle(Some(handle.name())))
    }

    async fn fetch(&self, video: &VideoReference) -> Result<Vec<u8>> {
        if video.uri.starts_with("gs://") {
            return Err(VeoClipError::download(
                &video.uri,
                "Veo returned a Google Cloud Storage URI which cannot be downloaded directly. \
                 Use `gsutil cp` or the Google Cloud Storage API to download the video.",
            ));
        }

        let response = self
            .client
            .get(self.download_url(&video.uri))
            .header("x-goog-api-key", self.credential.expose())
            .send()
            .await
            .map_err(|e| VeoClipError::download(&video.uri, sanitize_error_message(&e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VeoClipError::download(
                &video.uri,
                format!("server returned {}", status.as_u16()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VeoClipError::download(&video.uri, sanitize_error_message(&e.to_string())))?;
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &str {
        "Veo (Gemini API)"
    }
}

// ── Request wire format ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoRequest {
    instances: Vec<VeoInstance>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoInstance {
    prompt: String,
    image: VeoMediaData,
}

/// `{"inlineData": {"mimeType": "...", "data": "..."}}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoMediaData {
    inline_data: VeoInlineData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoInlineData {
    mime_type: String,
    data: String,
}

impl From<&EncodedImage> for VeoMediaData {
    fn from(image: &EncodedImage) -> Self {
        Self {
            inline_data: VeoInlineData {
                mime_type: image.mime_type.clone(),
                data: image.payload.clone(),
            },
        }
    }
}

impl VeoRequest {
    /// Builds the body. The ending frame is never included; the preview
    /// model does not support `lastFrame`.
    fn from_request(req: &GenerationRequest) -> Self {
        Self {
            instances: vec![VeoInstance {
                prompt: req.prompt.clone(),
                image: VeoMediaData::from(&req.start_image),
            }],
        }
    }
}

// ── Response wire format ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct VeoOperationResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    response: Option<VeoVideoResponse>,
    #[serde(default)]
    error: Option<VeoError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VeoVideoResponse {
    #[serde(default)]
    generate_video_response: Option<VeoGenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VeoGenerateVideoResponse {
    #[serde(default)]
    generated_samples: Option<Vec<VeoGeneratedSample>>,
    #[serde(default)]
    rai_media_filtered_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct VeoGeneratedSample {
    #[serde(default)]
    video: Option<VeoVideo>,
}

#[derive(Debug, Deserialize)]
struct VeoVideo {
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VeoError {
    #[serde(default)]
    code: Option<i32>,
    #[serde(default)]
    message: Option<String>,
}

impl VeoOperationResponse {
    /// Converts to a handle. `fallback_name` covers refresh responses that
    /// omit the name.
    fn into_handle(self, fallback_name: Option<&str>) -> OperationHandle {
        let name = if self.name.is_empty() {
            fallback_name.unwrap_or_default().to_string()
        } else {
            self.name
        };

        if !self.done.unwrap_or(false) {
            return OperationHandle::pending(name);
        }

        if let Some(err) = self.error {
            return OperationHandle::completed(
                name,
                OperationOutcome::Failed {
                    code: err.code,
                    message: err.message.unwrap_or_else(|| "Unknown error".into()),
                },
            );
        }

        let gen_resp = self.response.and_then(|r| r.generate_video_response);
        let filtered_count = gen_resp
            .as_ref()
            .and_then(|g| g.rai_media_filtered_count)
            .unwrap_or(0);
        let videos = gen_resp
            .and_then(|g| g.generated_samples)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|s| s.video.and_then(|v| v.uri))
            .map(|uri| VideoReference { uri })
            .collect();

        OperationHandle::completed(
            name,
            OperationOutcome::Videos {
                videos,
                filtered_count,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> GeminiVeoService {
        GeminiVeoService::new(Credential::new("test-key").unwrap())
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            "zoom in slowly",
            EncodedImage::from_bytes(&[0x89, 0x50, 0x4E, 0x47], "image/png"),
        )
    }

    fn parse(json: &str) -> OperationHandle {
        serde_json::from_str::<VeoOperationResponse>(json)
            .unwrap()
            .into_handle(Some("operations/fallback"))
    }

    #[test]
    fn test_request_uses_inline_data() {
        let body = VeoRequest::from_request(&request());
        let json = serde_json::to_value(&body).unwrap();

        let instance = &json["instances"][0];
        assert_eq!(instance["prompt"], "zoom in slowly");
        assert_eq!(instance["image"]["inlineData"]["mimeType"], "image/png");
        assert_eq!(instance["image"]["inlineData"]["data"], "iVBORw==");
        assert!(instance["image"]["bytesBase64Encoded"].is_null());
    }

    #[test]
    fn test_request_never_sends_end_frame() {
        let req = request().with_end_image(EncodedImage::from_bytes(b"end", "image/jpeg"));
        let json = serde_json::to_value(VeoRequest::from_request(&req)).unwrap();

        assert!(json.get("parameters").is_none());
        assert!(json["instances"][0].get("lastFrame").is_none());
        assert_eq!(json["instances"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_operation_not_done() {
        let handle = parse(r#"{"name": "operations/123", "done": false}"#);
        assert_eq!(handle.name(), "operations/123");
        assert!(!handle.is_done());
        assert!(handle.outcome().is_none());
    }

    #[test]
    fn test_operation_missing_done_is_pending() {
        let handle = parse(r#"{"name": "operations/123"}"#);
        assert!(!handle.is_done());
    }

    #[test]
    fn test_operation_done_with_video() {
        let handle = parse(
            r#"{
                "name": "operations/123",
                "done": true,
                "response": {
                    "generateVideoResponse": {
                        "generatedSamples": [{
                            "video": {"uri": "https://example.com/video.mp4"}
                        }]
                    }
                }
            }"#,
        );
        assert!(handle.is_done());
        assert_eq!(
            handle.videos(),
            &[VideoReference {
                uri: "https://example.com/video.mp4".into()
            }]
        );
    }

    #[test]
    fn test_operation_done_filtered() {
        let handle = parse(
            r#"{
                "name": "operations/123",
                "done": true,
                "response": {"generateVideoResponse": {"raiMediaFilteredCount": 1}}
            }"#,
        );
        assert_eq!(
            handle.outcome(),
            Some(&OperationOutcome::Videos {
                videos: vec![],
                filtered_count: 1
            })
        );
    }

    #[test]
    fn test_operation_done_with_error() {
        let handle = parse(
            r#"{
                "name": "operations/123",
                "done": true,
                "error": {"code": 3, "message": "Quota exceeded"}
            }"#,
        );
        assert_eq!(
            handle.outcome(),
            Some(&OperationOutcome::Failed {
                code: Some(3),
                message: "Quota exceeded".into()
            })
        );
    }

    #[test]
    fn test_refresh_without_name_keeps_previous_name() {
        let handle = parse(r#"{"done": false}"#);
        assert_eq!(handle.name(), "operations/fallback");
    }

    #[test]
    fn test_submission_error_404_gives_billing_hint() {
        let headers = reqwest::header::HeaderMap::new();
        match service().submission_error(404, "Not Found", &headers) {
            VeoClipError::Submission { status, message } => {
                assert_eq!(status, Some(404));
                assert!(message.contains("billing"), "got: {message}");
            }
            other => panic!("expected Submission error, got {other:?}"),
        }
    }

    #[test]
    fn test_submission_error_429_reports_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "12".parse().unwrap());
        let err = service().submission_error(429, "", &headers);
        assert!(err.to_string().contains("retry after 12s"), "got: {err}");
    }

    #[test]
    fn test_download_url_appends_key() {
        let svc = service();
        assert_eq!(
            svc.download_url("https://x/files/abc:download"),
            "https://x/files/abc:download?key=test-key"
        );
        assert_eq!(
            svc.download_url("https://x/files/abc:download?alt=media"),
            "https://x/files/abc:download?alt=media&key=test-key"
        );
    }

    #[tokio::test]
    async fn test_gs_uri_is_rejected() {
        let err = service()
            .fetch(&VideoReference {
                uri: "gs://my-bucket/video.mp4".into(),
            })
            .await
            .unwrap_err();
        assert!(
            err.to_string().contains("Google Cloud Storage"),
            "expected GCS error, got: {err}"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let svc = GeminiVeoService::with_base_url(
            Credential::new("k").unwrap(),
            "http://localhost:1234/v1beta/",
        );
        assert_eq!(svc.base_url(), "http://localhost:1234/v1beta");
    }
}
