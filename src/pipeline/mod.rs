//! Pipeline orchestration for the image-to-speech client.
//!
//! This module wires the image → remote operation → result → audio loop and
//! exposes the shared state that the console view reads between commands.
//!
//! # Architecture
//!
//! ```text
//! user command
//!      │
//!      ▼
//! PipelineOrchestrator::run(params)      ← async, one operation at a time
//!      │
//!      ├─ preconditions (image? text? busy?)
//!      ├─ OperationGateway::invoke(request)   → backend HTTP call
//!      ├─ ResultStore::record(outcome)
//!      └─ speech success → AudioSlot::install → PlaybackController Ready
//!
//! SharedState (Arc<Mutex<SessionState>>) ←── read by the view for status
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use image_to_speech::api::ApiClient;
//! use image_to_speech::config::AppConfig;
//! use image_to_speech::media::NoDeviceSink;
//! use image_to_speech::pipeline::{new_shared_state, OperationParams, PipelineOrchestrator};
//!
//! fn main() {
//!     let config = AppConfig::default();
//!     let shared_state = new_shared_state();
//!     let gateway = Arc::new(ApiClient::from_config(&config.api));
//!
//!     let mut orchestrator = PipelineOrchestrator::new(
//!         shared_state.clone(),
//!         gateway,
//!         Box::new(NoDeviceSink::new("doc example")),
//!     );
//!
//!     let runtime = tokio::runtime::Builder::new_current_thread()
//!         .enable_all()
//!         .build()
//!         .unwrap();
//!
//!     runtime.block_on(async {
//!         let _ = orchestrator
//!             .run(OperationParams::Translation {
//!                 text: Some("a dog in the park".into()),
//!                 target_language: "es".into(),
//!             })
//!             .await;
//!     });
//! }
//! ```

pub mod results;
pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use results::ResultStore;
pub use runner::{OperationParams, PipelineOrchestrator, RunError};
pub use state::{new_shared_state, SessionState, SharedState};
