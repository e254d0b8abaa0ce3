//! Audio output seam.
//!
//! [`AudioSink`] is the narrow interface the playback controller drives.
//! [`RodioSink`] is the production implementation over a rodio output
//! stream; [`NoDeviceSink`] stands in when no output device can be opened
//! (headless hosts), keeping everything except audible playback working.

use std::io::Cursor;
use std::sync::Arc;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use thiserror::Error;

use crate::media::audio::AudioHandle;

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors raised while loading or driving an audio sink.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No source is loaded into the sink.
    #[error("no audio loaded")]
    NoAudio,

    /// The audio output device is missing or could not be opened.
    #[error("audio device unavailable: {0}")]
    Device(String),

    /// The audio bytes could not be decoded.
    #[error("could not decode audio: {0}")]
    Decode(String),

    /// The start attempt itself failed.
    #[error("playback failed to start: {0}")]
    Start(String),
}

// ---------------------------------------------------------------------------
// AudioSink trait
// ---------------------------------------------------------------------------

/// Minimal playback surface the controller needs.
///
/// Implementations are driven from the host thread only, so no `Send`
/// bound is required (the production sink holds a `!Send` output stream).
pub trait AudioSink {
    /// Discard any loaded source and decode `handle` into the sink, paused.
    fn load(&mut self, handle: &AudioHandle) -> Result<(), PlaybackError>;

    /// Begin or resume playback of the loaded source.
    fn start(&mut self) -> Result<(), PlaybackError>;

    /// Pause playback; always succeeds.
    fn pause(&mut self);

    /// Stop playback and discard the loaded source.
    fn stop(&mut self);

    /// `true` once the loaded source has run to its end (or nothing is
    /// loaded at all).
    fn is_finished(&self) -> bool;
}

// ---------------------------------------------------------------------------
// RodioSink
// ---------------------------------------------------------------------------

/// Adapter so a shared payload can back a rodio decoder without copying.
struct SharedBytes(Arc<Vec<u8>>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Plays audio through the default output device.
///
/// The output stream must outlive the sink, so it is kept as a field.
pub struct RodioSink {
    sink: Sink,
    loaded: bool,
    _stream: OutputStream,
}

impl RodioSink {
    /// Open the default output device.
    pub fn open() -> Result<Self, PlaybackError> {
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlaybackError::Device(e.to_string()))?;
        let sink = Sink::connect_new(stream.mixer());
        sink.pause();

        Ok(Self {
            sink,
            loaded: false,
            _stream: stream,
        })
    }
}

impl AudioSink for RodioSink {
    fn load(&mut self, handle: &AudioHandle) -> Result<(), PlaybackError> {
        self.sink.stop();
        self.loaded = false;

        let cursor = Cursor::new(SharedBytes(handle.share_bytes()));
        let source =
            Decoder::new(cursor).map_err(|e| PlaybackError::Decode(e.to_string()))?;

        self.sink.append(source);
        self.sink.pause();
        self.loaded = true;
        Ok(())
    }

    fn start(&mut self) -> Result<(), PlaybackError> {
        if !self.loaded || self.sink.empty() {
            return Err(PlaybackError::NoAudio);
        }
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.loaded = false;
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }
}

// ---------------------------------------------------------------------------
// NoDeviceSink
// ---------------------------------------------------------------------------

/// Stub sink used when no output device can be opened.
///
/// Loading succeeds so synthesis, results and audio export keep working;
/// starting playback reports the device error that prevented real output.
pub struct NoDeviceSink {
    reason: String,
    loaded: bool,
}

impl NoDeviceSink {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            loaded: false,
        }
    }
}

impl AudioSink for NoDeviceSink {
    fn load(&mut self, _handle: &AudioHandle) -> Result<(), PlaybackError> {
        self.loaded = true;
        Ok(())
    }

    fn start(&mut self) -> Result<(), PlaybackError> {
        Err(PlaybackError::Device(self.reason.clone()))
    }

    fn pause(&mut self) {}

    fn stop(&mut self) {
        self.loaded = false;
    }

    fn is_finished(&self) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use crate::media::audio::AudioSlot;

    // The slot is returned alongside the handle so it is not dropped (and
    // the handle revoked) before the test runs.
    fn slot_with_audio() -> (AudioSlot, AudioHandle) {
        let mut slot = AudioSlot::new();
        let handle = slot.install(Arc::new(vec![0u8; 16]), "audio/wav");
        (slot, handle)
    }

    #[test]
    fn shared_bytes_exposes_the_payload() {
        let bytes = Arc::new(vec![1u8, 2, 3]);
        let shared = SharedBytes(Arc::clone(&bytes));
        assert_eq!(shared.as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn no_device_sink_accepts_loads() {
        let (_slot, handle) = slot_with_audio();
        let mut sink = NoDeviceSink::new("no default output device");
        assert!(sink.load(&handle).is_ok());
        assert!(sink.is_finished());
    }

    #[test]
    fn no_device_sink_reports_the_device_error_on_start() {
        let (_slot, handle) = slot_with_audio();
        let mut sink = NoDeviceSink::new("no default output device");
        sink.load(&handle).expect("load");

        match sink.start() {
            Err(PlaybackError::Device(reason)) => {
                assert_eq!(reason, "no default output device");
            }
            other => panic!("expected device error, got {:?}", other.err()),
        }
    }

    #[test]
    fn no_device_sink_pause_and_stop_are_noops() {
        let mut sink = NoDeviceSink::new("headless");
        sink.pause();
        sink.stop();
        assert!(sink.is_finished());
    }
}
