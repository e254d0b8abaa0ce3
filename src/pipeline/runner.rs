//! Pipeline orchestrator — drives the image → operation → result → audio loop.
//!
//! [`PipelineOrchestrator`] owns the [`SharedState`], the audio slot and the
//! playback controller, and dispatches every user-triggered operation
//! through the [`OperationGateway`].
//!
//! # Operation flow
//!
//! ```text
//! run(params)
//!   ├─ reject while another operation is in flight          [Busy]
//!   ├─ image ops: resolve the active image                  [NoImage]
//!   ├─ text ops:  explicit text, else best available text   [EmptyText]
//!   ├─ mark in-flight → gateway.invoke(request) → unmark
//!   ├─ record the outcome in the result store
//!   └─ successful synthesis → install audio handle → playback Ready
//! ```
//!
//! Gateway failures are never fatal: they come back inside the outcome
//! envelope, the in-flight marker is cleared on every path, and the user
//! may retry any operation indefinitely.

use std::sync::Arc;

use crate::api::client::OperationGateway;
use crate::api::types::{OperationData, OperationKind, OperationOutcome, OperationRequest};
use crate::config::CaptionMode;
use crate::media::audio::{AudioHandle, AudioSlot};
use crate::media::image::SourceImage;
use crate::media::playback::PlaybackController;
use crate::media::sink::AudioSink;

use super::state::{SessionState, SharedState};

// ---------------------------------------------------------------------------
// RunError
// ---------------------------------------------------------------------------

/// Local precondition failures.
///
/// These are rejected before any network call is issued and the in-flight
/// marker is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// An image-consuming operation was requested with no image loaded.
    #[error("no image loaded; load an image first")]
    NoImage,

    /// A text-consuming operation was requested with no explicit text and
    /// nothing usable in the result store.
    #[error("no input text available; extract, caption or provide text first")]
    EmptyText,

    /// Another operation is still in flight.
    #[error("another operation is already in progress")]
    Busy,
}

// ---------------------------------------------------------------------------
// OperationParams
// ---------------------------------------------------------------------------

/// What the view supplies to [`PipelineOrchestrator::run`].
///
/// Text is optional for the text-consuming operations: `None` (or blank)
/// falls back to the store's best available text.
#[derive(Debug, Clone)]
pub enum OperationParams {
    TextExtraction {
        languages: Vec<String>,
    },
    Captioning {
        mode: CaptionMode,
    },
    Translation {
        text: Option<String>,
        target_language: String,
    },
    SpeechSynthesis {
        text: Option<String>,
        language: String,
        rate: u32,
    },
}

impl OperationParams {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::TextExtraction { .. } => OperationKind::TextExtraction,
            Self::Captioning { .. } => OperationKind::Captioning,
            Self::Translation { .. } => OperationKind::Translation,
            Self::SpeechSynthesis { .. } => OperationKind::SpeechSynthesis,
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineOrchestrator
// ---------------------------------------------------------------------------

/// Coordinates the four operations over one active image.
///
/// Create with [`PipelineOrchestrator::new`], then drive it from the host
/// thread's command loop.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use image_to_speech::media::NoDeviceSink;
/// use image_to_speech::pipeline::{new_shared_state, OperationParams, PipelineOrchestrator};
///
/// # async fn example() {
/// # use image_to_speech::api::OperationGateway;
/// # fn make_gateway() -> Arc<dyn OperationGateway> { unimplemented!() }
/// let shared_state = new_shared_state();
///
/// let mut orchestrator = PipelineOrchestrator::new(
///     Arc::clone(&shared_state),
///     make_gateway(),
///     Box::new(NoDeviceSink::new("example")),
/// );
///
/// let outcome = orchestrator
///     .run(OperationParams::Translation {
///         text: Some("a dog in the park".into()),
///         target_language: "es".into(),
///     })
///     .await;
/// # let _ = outcome;
/// # }
/// ```
pub struct PipelineOrchestrator {
    state: SharedState,
    gateway: Arc<dyn OperationGateway>,
    audio: AudioSlot,
    playback: PlaybackController,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Arguments
    ///
    /// * `state`   — shared session state (also read by the view).
    /// * `gateway` — remote operation gateway (e.g. `ApiClient`).
    /// * `sink`    — audio output (e.g. `RodioSink`, or `NoDeviceSink` on
    ///   headless hosts).
    pub fn new(
        state: SharedState,
        gateway: Arc<dyn OperationGateway>,
        sink: Box<dyn AudioSink>,
    ) -> Self {
        Self {
            state,
            gateway,
            audio: AudioSlot::new(),
            playback: PlaybackController::new(sink),
        }
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackController {
        &mut self.playback
    }

    /// The live synthesized-audio handle, if one is installed.
    pub fn current_audio(&self) -> Option<&AudioHandle> {
        self.audio.current()
    }

    // -----------------------------------------------------------------------
    // Image and session boundaries
    // -----------------------------------------------------------------------

    /// Replace the active image and clear everything derived from the old
    /// one: all results, the audio handle, and the playback state.
    pub fn set_image(&mut self, image: SourceImage) {
        log::debug!(
            "pipeline: new image {} ({} bytes), clearing derived state",
            image.file_name(),
            image.len()
        );

        self.audio.release();
        self.playback.reset();

        let mut st = self.state.lock().unwrap();
        st.image = Some(image);
        st.results.clear_all();
        st.error_message = None;
    }

    /// Record the signed-in user.
    pub fn begin_session(&mut self, username: impl Into<String>) {
        let username = username.into();
        log::info!("pipeline: session started for {}", username);
        self.state.lock().unwrap().user = Some(username);
    }

    /// Full teardown: user, image, results, audio and playback all go.
    pub fn end_session(&mut self) {
        self.audio.release();
        self.playback.reset();

        let mut st = self.state.lock().unwrap();
        if let Some(user) = st.user.take() {
            log::info!("pipeline: session ended for {}", user);
        }
        st.image = None;
        st.results.clear_all();
        st.in_flight = None;
        st.error_message = None;
    }

    // -----------------------------------------------------------------------
    // Operation dispatch
    // -----------------------------------------------------------------------

    /// Run one operation end to end.
    ///
    /// Returns `Err(RunError)` for local precondition failures (nothing was
    /// sent); otherwise returns the recorded [`OperationOutcome`], which
    /// carries remote failures inside the envelope.
    pub async fn run(&mut self, params: OperationParams) -> Result<OperationOutcome, RunError> {
        let kind = params.kind();

        // ── 1. Preconditions, then claim the in-flight marker ────────────
        let request = {
            let mut st = self.state.lock().unwrap();
            if st.is_busy() {
                log::debug!("pipeline: {} rejected, busy", kind.label());
                return Err(RunError::Busy);
            }
            match Self::build_request(&st, params) {
                Ok(request) => {
                    st.in_flight = Some(kind);
                    st.error_message = None;
                    request
                }
                Err(e) => {
                    log::debug!("pipeline: {} rejected: {}", kind.label(), e);
                    st.error_message = Some(e.to_string());
                    return Err(e);
                }
            }
        };

        // ── 2. Remote call (lock released while awaiting) ────────────────
        log::debug!("pipeline: dispatching {}", kind.label());
        let outcome = self.gateway.invoke(request).await;

        // ── 3. Unmark and record ─────────────────────────────────────────
        {
            let mut st = self.state.lock().unwrap();
            st.in_flight = None;
            if let Some(message) = outcome.error() {
                st.error_message = Some(message.to_string());
            }
            st.results.record(outcome.clone());
        }

        // ── 4. Successful synthesis feeds the audio slot ─────────────────
        if let Some(OperationData::SpeechSynthesis(audio)) = outcome.data() {
            let handle = self
                .audio
                .install(Arc::clone(&audio.bytes), audio.content_type.clone());
            self.playback.on_handle_ready(handle);
        }

        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Resolve `params` into a fully-specified gateway request, or reject.
    fn build_request(
        st: &SessionState,
        params: OperationParams,
    ) -> Result<OperationRequest, RunError> {
        match params {
            OperationParams::TextExtraction { languages } => {
                let image = st.image.clone().ok_or(RunError::NoImage)?;
                Ok(OperationRequest::TextExtraction { image, languages })
            }
            OperationParams::Captioning { mode } => {
                let image = st.image.clone().ok_or(RunError::NoImage)?;
                Ok(OperationRequest::Captioning {
                    image,
                    mode: mode.as_str().to_string(),
                })
            }
            OperationParams::Translation {
                text,
                target_language,
            } => {
                let text = Self::resolve_text(st, text)?;
                Ok(OperationRequest::Translation {
                    text,
                    target_language,
                })
            }
            OperationParams::SpeechSynthesis {
                text,
                language,
                rate,
            } => {
                let text = Self::resolve_text(st, text)?;
                Ok(OperationRequest::SpeechSynthesis {
                    text,
                    language,
                    rate,
                })
            }
        }
    }

    /// Explicit non-blank text wins; otherwise fall back to the store's
    /// best available text.
    fn resolve_text(st: &SessionState, explicit: Option<String>) -> Result<String, RunError> {
        if let Some(text) = explicit {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Ok(trimmed.to_string());
            }
        }
        st.results
            .best_available_text()
            .map(str::to_string)
            .ok_or(RunError::EmptyText)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
