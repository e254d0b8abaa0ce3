//! Operation kinds, wire payloads and the normalized result envelope.
//!
//! Every remote call resolves to an [`OperationOutcome`]: the operation kind
//! plus either a kind-specific [`OperationData`] payload or a human-readable
//! error string. Expected failures (network, bad status, malformed body)
//! never escape as raw errors — callers branch on the envelope.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::media::image::SourceImage;

// ---------------------------------------------------------------------------
// OperationKind
// ---------------------------------------------------------------------------

/// The four server-side operations an image can be run through.
///
/// | Kind            | Input        | Output            |
/// |-----------------|--------------|-------------------|
/// | TextExtraction  | image        | recognized text   |
/// | Captioning      | image        | caption text      |
/// | Translation     | text         | translated text   |
/// | SpeechSynthesis | text         | audio bytes       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// OCR text recognition over the active image.
    TextExtraction,
    /// AI caption generation over the active image.
    Captioning,
    /// Text translation into a target language.
    Translation,
    /// Text-to-speech audio generation.
    SpeechSynthesis,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        Self::TextExtraction,
        Self::Captioning,
        Self::Translation,
        Self::SpeechSynthesis,
    ];

    /// Human-readable label for logs and status output.
    pub fn label(self) -> &'static str {
        match self {
            Self::TextExtraction => "text extraction",
            Self::Captioning => "captioning",
            Self::Translation => "translation",
            Self::SpeechSynthesis => "speech synthesis",
        }
    }
}

// ---------------------------------------------------------------------------
// Success payloads (per kind)
// ---------------------------------------------------------------------------

/// Payload of a successful text-extraction call.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionData {
    /// Recognized text, possibly empty when the image contains none.
    pub text: String,
    #[serde(default)]
    pub languages_detected: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub word_count: u64,
    #[serde(default)]
    pub character_count: u64,
}

/// Structured scene analysis attached to cloud captions when available.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptionInsights {
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub setting: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Payload of a successful captioning call.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptionData {
    pub caption: String,
    /// Longer narrative description — cloud mode only, and optional there.
    #[serde(default)]
    pub detailed_description: Option<String>,
    #[serde(default)]
    pub insights: Option<CaptionInsights>,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub model: Option<String>,
}

/// Payload of a successful translation call.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationData {
    pub original_text: String,
    pub translated_text: String,
    #[serde(default)]
    pub source_language: String,
    pub target_language: String,
    #[serde(default)]
    pub word_count: u64,
}

/// Payload of a successful speech-synthesis call: raw audio, not JSON.
///
/// The bytes are reference-counted so the result snapshot and the playback
/// slot can share one allocation.
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub bytes: Arc<Vec<u8>>,
    /// `audio/wav` or `audio/aiff` depending on the synthesizer backend.
    pub content_type: String,
}

impl SpeechAudio {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// OperationData
// ---------------------------------------------------------------------------

/// Kind-tagged success payload of one operation.
#[derive(Debug, Clone)]
pub enum OperationData {
    TextExtraction(ExtractionData),
    Captioning(CaptionData),
    Translation(TranslationData),
    SpeechSynthesis(SpeechAudio),
}

impl OperationData {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::TextExtraction(_) => OperationKind::TextExtraction,
            Self::Captioning(_) => OperationKind::Captioning,
            Self::Translation(_) => OperationKind::Translation,
            Self::SpeechSynthesis(_) => OperationKind::SpeechSynthesis,
        }
    }

    /// The textual output that can feed a downstream operation, if any.
    ///
    /// Speech synthesis produces audio, not text, so it yields `None`.
    pub fn primary_text(&self) -> Option<&str> {
        match self {
            Self::TextExtraction(d) => Some(d.text.as_str()),
            Self::Captioning(d) => Some(d.caption.as_str()),
            Self::Translation(d) => Some(d.translated_text.as_str()),
            Self::SpeechSynthesis(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// OperationOutcome — the normalized result envelope
// ---------------------------------------------------------------------------

/// Uniform result of one operation invocation.
///
/// A failed call is still an `OperationOutcome` — the error string is part
/// of the envelope, so callers handle "the service said no" and "the
/// service said yes" through the same type.
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub kind: OperationKind,
    pub result: Result<OperationData, String>,
}

impl OperationOutcome {
    /// Successful outcome; the kind is taken from the payload.
    pub fn ok(data: OperationData) -> Self {
        Self {
            kind: data.kind(),
            result: Ok(data),
        }
    }

    /// Failed outcome carrying a human-readable message.
    pub fn failed(kind: OperationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            result: Err(message.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    pub fn data(&self) -> Option<&OperationData> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&str> {
        self.result.as_ref().err().map(String::as_str)
    }

    /// Trimmed, non-empty chainable text of a successful outcome.
    pub fn usable_text(&self) -> Option<&str> {
        let text = self.data()?.primary_text()?.trim();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ---------------------------------------------------------------------------
// OperationRequest — fully-resolved gateway input
// ---------------------------------------------------------------------------

/// One ready-to-send operation request.
///
/// The orchestrator resolves the active image and the input text before
/// building one of these; the gateway only maps it onto the wire.
#[derive(Debug, Clone)]
pub enum OperationRequest {
    TextExtraction {
        image: SourceImage,
        /// Recognizer language codes, joined with commas on the wire.
        languages: Vec<String>,
    },
    Captioning {
        image: SourceImage,
        /// `"local"` or `"cloud"`.
        mode: String,
    },
    Translation {
        text: String,
        target_language: String,
    },
    SpeechSynthesis {
        text: String,
        language: String,
        /// Words per minute.
        rate: u32,
    },
}

impl OperationRequest {
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
// Collaborator queries (outside the envelope contract)
// ---------------------------------------------------------------------------

/// Backend health report.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub version: String,
    /// Per-engine readiness, e.g. `{"ocr": "ready", "tts": "ready"}`.
    #[serde(default)]
    pub engines: BTreeMap<String, String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// One synthesizer voice offered by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceInfo {
    pub code: String,
    pub name: String,
    /// Backend-internal voice identifier when the platform exposes one.
    #[serde(default)]
    pub voice: Option<String>,
}

/// One language supported by a backend engine.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
