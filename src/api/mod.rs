//! Platform API module for Image-to-Speech.
//!
//! This module provides:
//! * [`OperationGateway`] — async trait implemented by all gateway backends.
//! * [`ApiClient`] — REST client for the platform backend (production gateway).
//! * [`OperationKind`] / [`OperationRequest`] / [`OperationOutcome`] — the
//!   operation vocabulary and the normalized result envelope.
//! * [`GatewayError`] — error variants for remote calls.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use image_to_speech::api::{ApiClient, OperationGateway, OperationRequest};
//! use image_to_speech::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let client = ApiClient::from_config(&config.api);
//!
//!     let outcome = client
//!         .invoke(OperationRequest::Translation {
//!             text: "a dog in the park".into(),
//!             target_language: "es".into(),
//!         })
//!         .await;
//!
//!     match outcome.usable_text() {
//!         Some(text) => println!("{}", text),
//!         None => eprintln!("{}", outcome.error().unwrap_or("unknown failure")),
//!     }
//! }
//! ```

pub mod client;
pub mod types;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{ApiClient, GatewayError, OperationGateway};
pub use types::{
    CaptionData, CaptionInsights, ExtractionData, HealthReport, LanguageInfo, OperationData,
    OperationKind, OperationOutcome, OperationRequest, SpeechAudio, TranslationData, VoiceInfo,
};
