//! Media lifecycle — source image, synthesized-audio slot, playback FSM.
//!
//! # Audio flow
//!
//! ```text
//! SpeechAudio bytes → AudioSlot::install (revokes prior handle)
//!                  → AudioHandle → PlaybackController → AudioSink (rodio)
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use image_to_speech::media::{AudioSlot, NoDeviceSink, PlaybackController};
//!
//! let mut slot = AudioSlot::new();
//! let mut playback = PlaybackController::new(Box::new(NoDeviceSink::new("demo")));
//!
//! let handle = slot.install(Arc::new(vec![0u8; 4]), "audio/wav");
//! playback.on_handle_ready(handle);
//! if let Err(e) = playback.play() {
//!     eprintln!("{}", e);
//! }
//! ```

pub mod audio;
pub mod image;
pub mod playback;
pub mod sink;

pub use audio::{AudioHandle, AudioSlot};
pub use image::SourceImage;
pub use playback::{PlaybackController, PlaybackState};
pub use sink::{AudioSink, NoDeviceSink, PlaybackError, RodioSink};
