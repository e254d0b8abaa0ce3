//! Per-kind result store and the best-available-text precedence rule.
//!
//! One slot per operation kind; a new result fully replaces the previous
//! one (latest wins, failures included, so the view can always show what
//! happened most recently). [`ResultStore::best_available_text`] feeds the
//! downstream operations: translated text outranks extracted text, which
//! outranks caption text — the most refined output wins. Only successful
//! results with non-empty text participate.

use crate::api::types::{OperationKind, OperationOutcome};

/// Holds the most recent outcome of each operation kind.
#[derive(Default)]
pub struct ResultStore {
    extraction: Option<OperationOutcome>,
    caption: Option<OperationOutcome>,
    translation: Option<OperationOutcome>,
    speech: Option<OperationOutcome>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `outcome`, replacing any previous result of the same kind.
    pub fn record(&mut self, outcome: OperationOutcome) {
        let slot = match outcome.kind {
            OperationKind::TextExtraction => &mut self.extraction,
            OperationKind::Captioning => &mut self.caption,
            OperationKind::Translation => &mut self.translation,
            OperationKind::SpeechSynthesis => &mut self.speech,
        };
        *slot = Some(outcome);
    }

    /// The most recent outcome of `kind`, successful or not.
    pub fn get(&self, kind: OperationKind) -> Option<&OperationOutcome> {
        match kind {
            OperationKind::TextExtraction => self.extraction.as_ref(),
            OperationKind::Captioning => self.caption.as_ref(),
            OperationKind::Translation => self.translation.as_ref(),
            OperationKind::SpeechSynthesis => self.speech.as_ref(),
        }
    }

    /// Drop every stored result. Called when the active image is replaced
    /// or the session ends.
    pub fn clear_all(&mut self) {
        self.extraction = None;
        self.caption = None;
        self.translation = None;
        self.speech = None;
    }

    pub fn is_empty(&self) -> bool {
        self.extraction.is_none()
            && self.caption.is_none()
            && self.translation.is_none()
            && self.speech.is_none()
    }

    /// Recognized text of the latest successful extraction, if usable.
    pub fn extracted_text(&self) -> Option<&str> {
        self.extraction.as_ref().and_then(|o| o.usable_text())
    }

    /// Caption of the latest successful captioning, if usable.
    pub fn caption_text(&self) -> Option<&str> {
        self.caption.as_ref().and_then(|o| o.usable_text())
    }

    /// Output of the latest successful translation, if usable.
    pub fn translated_text(&self) -> Option<&str> {
        self.translation.as_ref().and_then(|o| o.usable_text())
    }

    /// The text auto-fed into translation and speech synthesis.
    ///
    /// Precedence: translated > extracted > caption.
    pub fn best_available_text(&self) -> Option<&str> {
        self.translated_text()
            .or_else(|| self.extracted_text())
            .or_else(|| self.caption_text())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{
        CaptionData, ExtractionData, OperationData, SpeechAudio, TranslationData,
    };

    fn extraction_ok(text: &str) -> OperationOutcome {
        OperationOutcome::ok(OperationData::TextExtraction(ExtractionData {
            text: text.into(),
            languages_detected: vec!["en".into()],
            confidence: 0.95,
            word_count: 1,
            character_count: text.len() as u64,
        }))
    }

    fn caption_ok(text: &str) -> OperationOutcome {
        OperationOutcome::ok(OperationData::Captioning(CaptionData {
            caption: text.into(),
            detailed_description: None,
            insights: None,
            mode: "cloud".into(),
            confidence: 0.9,
            model: None,
        }))
    }

    fn translation_ok(text: &str) -> OperationOutcome {
        OperationOutcome::ok(OperationData::Translation(TranslationData {
            original_text: "hello".into(),
            translated_text: text.into(),
            source_language: "en".into(),
            target_language: "fr".into(),
            word_count: 1,
        }))
    }

    fn speech_ok() -> OperationOutcome {
        OperationOutcome::ok(OperationData::SpeechSynthesis(SpeechAudio::new(
            vec![0u8; 4],
            "audio/wav",
        )))
    }

    #[test]
    fn starts_empty() {
        let store = ResultStore::new();
        assert!(store.is_empty());
        for kind in OperationKind::ALL {
            assert!(store.get(kind).is_none());
        }
        assert!(store.best_available_text().is_none());
    }

    #[test]
    fn record_and_get_round_trip() {
        let mut store = ResultStore::new();
        store.record(extraction_ok("STOP"));

        let stored = store.get(OperationKind::TextExtraction).expect("stored");
        assert!(stored.succeeded());
        assert_eq!(stored.usable_text(), Some("STOP"));
        assert!(store.get(OperationKind::Captioning).is_none());
    }

    #[test]
    fn latest_result_replaces_the_previous_one() {
        let mut store = ResultStore::new();
        store.record(extraction_ok("first"));
        store.record(extraction_ok("second"));

        assert_eq!(store.extracted_text(), Some("second"));

        // A failure also replaces: the view shows the most recent attempt.
        store.record(OperationOutcome::failed(
            OperationKind::TextExtraction,
            "engine offline",
        ));
        let stored = store.get(OperationKind::TextExtraction).expect("stored");
        assert!(!stored.succeeded());
        assert!(store.extracted_text().is_none());
    }

    #[test]
    fn precedence_most_refined_text_wins() {
        let mut store = ResultStore::new();

        store.record(caption_ok("a cat on a mat"));
        assert_eq!(store.best_available_text(), Some("a cat on a mat"));

        store.record(extraction_ok("hello"));
        assert_eq!(store.best_available_text(), Some("hello"));

        store.record(translation_ok("bonjour"));
        assert_eq!(store.best_available_text(), Some("bonjour"));
    }

    #[test]
    fn failed_results_never_feed_downstream_text() {
        let mut store = ResultStore::new();
        store.record(extraction_ok("hello"));
        store.record(OperationOutcome::failed(
            OperationKind::Translation,
            "service unavailable",
        ));

        // The failed translation does not mask the extraction.
        assert_eq!(store.best_available_text(), Some("hello"));
    }

    #[test]
    fn empty_text_falls_through_to_the_next_source() {
        let mut store = ResultStore::new();
        store.record(caption_ok("a city street"));
        store.record(extraction_ok("   "));

        // Whitespace-only extraction is not usable text.
        assert!(store.extracted_text().is_none());
        assert_eq!(store.best_available_text(), Some("a city street"));
    }

    #[test]
    fn speech_results_are_stored_but_never_feed_text() {
        let mut store = ResultStore::new();
        store.record(speech_ok());

        assert!(store.get(OperationKind::SpeechSynthesis).is_some());
        assert!(store.best_available_text().is_none());
    }

    #[test]
    fn clear_all_empties_every_slot() {
        let mut store = ResultStore::new();
        store.record(extraction_ok("a"));
        store.record(caption_ok("b"));
        store.record(translation_ok("c"));
        store.record(speech_ok());

        store.clear_all();

        assert!(store.is_empty());
        assert!(store.best_available_text().is_none());
    }
}
