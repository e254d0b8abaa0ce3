//! Core `OperationGateway` trait and `ApiClient` implementation.
//!
//! `ApiClient` speaks the platform's REST surface: multipart uploads for the
//! image operations, JSON for the text operations, raw bytes for synthesized
//! audio. All connection details come from [`ApiConfig`]; nothing is
//! hardcoded.

use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use thiserror::Error;

use crate::api::types::{
    CaptionData, ExtractionData, HealthReport, LanguageInfo, OperationData, OperationOutcome,
    OperationRequest, SpeechAudio, TranslationData, VoiceInfo,
};
use crate::config::ApiConfig;
use crate::media::image::SourceImage;

// ---------------------------------------------------------------------------
// GatewayError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the platform backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP transport or connection error.
    #[error("request failed: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The backend reported a failure (non-2xx status or `success: false`).
    #[error("{0}")]
    Service(String),

    /// The response body could not be parsed as expected.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The synthesizer returned a 2xx response with no audio bytes.
    #[error("synthesizer returned empty audio")]
    EmptyAudio,
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// OperationGateway trait
// ---------------------------------------------------------------------------

/// Async trait through which every remote operation is issued.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn OperationGateway>`).
///
/// `invoke` never fails in the `Result` sense: expected failures (network
/// down, bad status, malformed body) come back inside the
/// [`OperationOutcome`] envelope so callers always receive a recordable
/// result for the requested kind.
#[async_trait]
pub trait OperationGateway: Send + Sync {
    async fn invoke(&self, request: OperationRequest) -> OperationOutcome;
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// 2xx envelope wrapper: `{ "success": true, "data": { ... } }`.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
}

/// Catalog wrapper: `{ "voices": [...] }`.
#[derive(Debug, Deserialize)]
struct VoiceCatalog {
    voices: Vec<VoiceInfo>,
}

/// Catalog wrapper: `{ "languages": [...] }`.
#[derive(Debug, Deserialize)]
struct LanguageCatalog {
    languages: Vec<LanguageInfo>,
}

/// Calls the platform backend over HTTP.
///
/// # No hardcoded URLs
/// The base URL and the optional timeout come exclusively from the
/// [`ApiConfig`] passed to [`ApiClient::from_config`].
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build an `ApiClient` from application config.
    ///
    /// When `config.timeout_secs` is set, the HTTP client is pre-configured
    /// with that per-request timeout; otherwise the transport default
    /// applies. A plain client is used as a last-resort fallback if the
    /// builder fails (should never happen in practice).
    pub fn from_config(config: &ApiConfig) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder.build().unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Convert a non-2xx response into a `Service` error, preferring the
    /// backend's `{"detail": "..."}` message when the body carries one.
    async fn service_error(response: reqwest::Response) -> GatewayError {
        let status = response.status();
        let fallback = format!("server returned status {}", status.as_u16());
        match response.json::<serde_json::Value>().await {
            Ok(body) => {
                let detail = body.get("detail").and_then(|d| d.as_str());
                GatewayError::Service(detail.map(str::to_string).unwrap_or(fallback))
            }
            Err(_) => GatewayError::Service(fallback),
        }
    }

    /// Unwrap the `{success, data}` envelope of a 2xx JSON response.
    async fn parse_envelope<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        if !envelope.success {
            return Err(GatewayError::Service("operation reported failure".into()));
        }
        envelope
            .data
            .ok_or_else(|| GatewayError::Parse("response envelope has no data".into()))
    }

    /// POST `image` as a multipart form with one extra text field.
    async fn post_image(
        &self,
        path: &str,
        image: &SourceImage,
        field: &str,
        value: String,
    ) -> Result<reqwest::Response, GatewayError> {
        let part = multipart::Part::bytes(image.to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.content_type())?;

        let form = multipart::Form::new()
            .part("file", part)
            .text(field.to_string(), value);

        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await?;
        Ok(response)
    }

    async fn extract_text(
        &self,
        image: &SourceImage,
        languages: &[String],
    ) -> Result<ExtractionData, GatewayError> {
        let response = self
            .post_image("/api/ocr", image, "languages", languages.join(","))
            .await?;

        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        Self::parse_envelope(response).await
    }

    async fn generate_caption(
        &self,
        image: &SourceImage,
        mode: &str,
    ) -> Result<CaptionData, GatewayError> {
        let response = self
            .post_image("/api/caption", image, "mode", mode.to_string())
            .await?;

        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        Self::parse_envelope(response).await
    }

    async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<TranslationData, GatewayError> {
        let body = serde_json::json!({
            "text": text,
            "target_language": target_language,
        });

        let response = self
            .client
            .post(self.url("/api/translate"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        Self::parse_envelope(response).await
    }

    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        rate: u32,
    ) -> Result<SpeechAudio, GatewayError> {
        let body = serde_json::json!({
            "text": text,
            "language": language,
            "rate": rate,
        });

        let response = self
            .client
            .post(self.url("/api/tts"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/wav")
            .to_string();

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(GatewayError::EmptyAudio);
        }

        Ok(SpeechAudio::new(bytes.to_vec(), content_type))
    }

    // ── Collaborator queries (no envelope) ───────────────────────────────

    /// Backend health check, used for the startup connectivity notice.
    pub async fn health(&self) -> Result<HealthReport, GatewayError> {
        let response = self.client.get(self.url("/api/health")).send().await?;
        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))
    }

    /// Voices offered by the synthesizer.
    pub async fn voices(&self) -> Result<Vec<VoiceInfo>, GatewayError> {
        let response = self.client.get(self.url("/api/voices")).send().await?;
        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        let catalog: VoiceCatalog = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;
        Ok(catalog.voices)
    }

    /// Languages supported by the text recognizer.
    pub async fn ocr_languages(&self) -> Result<Vec<LanguageInfo>, GatewayError> {
        self.language_catalog("/api/languages/ocr").await
    }

    /// Languages supported by the translator.
    pub async fn translation_languages(&self) -> Result<Vec<LanguageInfo>, GatewayError> {
        self.language_catalog("/api/languages/translation").await
    }

    async fn language_catalog(&self, path: &str) -> Result<Vec<LanguageInfo>, GatewayError> {
        let response = self.client.get(self.url(path)).send().await?;
        if !response.status().is_success() {
            return Err(Self::service_error(response).await);
        }
        let catalog: LanguageCatalog = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;
        Ok(catalog.languages)
    }
}

#[async_trait]
impl OperationGateway for ApiClient {
    /// Dispatch `request` to the matching endpoint and normalize the result.
    ///
    /// Every [`GatewayError`] is folded into a failure envelope here;
    /// callers never see the transport layer.
    async fn invoke(&self, request: OperationRequest) -> OperationOutcome {
        let kind = request.kind();
        log::debug!("api: invoking {}", kind.label());

        let result = match request {
            OperationRequest::TextExtraction { image, languages } => self
                .extract_text(&image, &languages)
                .await
                .map(OperationData::TextExtraction),
            OperationRequest::Captioning { image, mode } => self
                .generate_caption(&image, &mode)
                .await
                .map(OperationData::Captioning),
            OperationRequest::Translation {
                text,
                target_language,
            } => self
                .translate(&text, &target_language)
                .await
                .map(OperationData::Translation),
            OperationRequest::SpeechSynthesis {
                text,
                language,
                rate,
            } => self
                .synthesize(&text, &language, rate)
                .await
                .map(OperationData::SpeechSynthesis),
        };

        match result {
            Ok(data) => {
                log::debug!("api: {} succeeded", kind.label());
                OperationOutcome::ok(data)
            }
            Err(e) => {
                log::warn!("api: {} failed: {}", kind.label(), e);
                OperationOutcome::failed(kind, e.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(timeout_secs: Option<u64>) -> ApiConfig {
        ApiConfig {
            base_url: "http://localhost:8000".into(),
            timeout_secs,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _client = ApiClient::from_config(&make_config(None));
    }

    #[test]
    fn from_config_accepts_explicit_timeout() {
        let _client = ApiClient::from_config(&make_config(Some(30)));
    }

    #[test]
    fn url_joins_without_double_slash() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/".into(),
            timeout_secs: None,
        };
        let client = ApiClient::from_config(&config);
        assert_eq!(client.url("/api/ocr"), "http://localhost:8000/api/ocr");
    }

    /// Verify that `ApiClient` is object-safe (usable as `dyn OperationGateway`).
    #[test]
    fn gateway_is_object_safe() {
        let client: Box<dyn OperationGateway> = Box::new(ApiClient::from_config(&make_config(None)));
        // Just holding the trait object is sufficient to verify object-safety.
        drop(client);
    }

    #[test]
    fn envelope_parses_success_shape() {
        let json = r#"{"success": true, "data": {"code": "en", "name": "English"}, "timestamp": "2024-01-01T00:00:00"}"#;
        let envelope: ApiEnvelope<LanguageInfo> = serde_json::from_str(json).expect("parse");
        assert!(envelope.success);
        assert_eq!(envelope.data.expect("data").code, "en");
    }

    #[test]
    fn envelope_tolerates_missing_data() {
        let json = r#"{"success": false}"#;
        let envelope: ApiEnvelope<LanguageInfo> = serde_json::from_str(json).expect("parse");
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn catalog_wrappers_parse() {
        let voices: VoiceCatalog = serde_json::from_str(
            r#"{"voices": [{"code": "en", "name": "English", "voice": "com.apple.Samantha"}]}"#,
        )
        .expect("voices");
        assert_eq!(voices.voices.len(), 1);
        assert_eq!(voices.voices[0].voice.as_deref(), Some("com.apple.Samantha"));

        let languages: LanguageCatalog =
            serde_json::from_str(r#"{"languages": [{"code": "es", "name": "Spanish"}]}"#)
                .expect("languages");
        assert_eq!(languages.languages[0].name, "Spanish");
    }
}
