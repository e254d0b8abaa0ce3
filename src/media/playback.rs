//! Playback state machine over a single audio sink.
//!
//! [`PlaybackState`] drives the controller's state machine:
//!
//! ```text
//! Idle ──handle ready──▶ Ready
//! Ready / Paused ──play ok──▶ Playing
//! Playing ──pause / end of media──▶ Paused
//! Ready / Paused ──start fails──▶ Recovering
//!                                 ──reload + retry ok──▶ Playing
//!                                 ──retry fails──▶ Paused (error surfaced)
//! any state ──reset──▶ Idle
//! ```
//!
//! Recovery is bounded: one reload of the media source and one retried
//! start per play request. A failed recovery settles in `Paused` with the
//! error recorded; the user can always request play again, which begins a
//! fresh bounded attempt.

use crate::media::audio::AudioHandle;
use crate::media::sink::{AudioSink, PlaybackError};

// ---------------------------------------------------------------------------
// PlaybackState
// ---------------------------------------------------------------------------

/// States of the audio playback controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No audio handle is attached.
    Idle,

    /// A handle is attached and loaded; playback has not started yet.
    Ready,

    /// The sink is producing audio.
    Playing,

    /// Playback is suspended — by request, by reaching the end of the
    /// media, or after a failed recovery.
    Paused,

    /// A start attempt failed; the controller is reloading the source for
    /// its single retry.
    Recovering,
}

impl PlaybackState {
    /// A short human-readable label for status output.
    pub fn label(self) -> &'static str {
        match self {
            PlaybackState::Idle => "Idle",
            PlaybackState::Ready => "Ready",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Recovering => "Recovering",
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState::Idle
    }
}

// ---------------------------------------------------------------------------
// PlaybackController
// ---------------------------------------------------------------------------

/// Drives play/pause/retry over one [`AudioSink`].
///
/// The controller is owned by the host thread; all methods are synchronous
/// and the state is only ever observed between calls.
pub struct PlaybackController {
    sink: Box<dyn AudioSink>,
    handle: Option<AudioHandle>,
    state: PlaybackState,
    last_error: Option<String>,
}

impl PlaybackController {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            handle: None,
            state: PlaybackState::Idle,
            last_error: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn handle(&self) -> Option<&AudioHandle> {
        self.handle.as_ref()
    }

    /// Error recorded by the most recent failed operation, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Attach freshly synthesized audio and preload it into the sink.
    ///
    /// A load failure here is remembered but not fatal: the next `play`
    /// goes through the bounded recovery path, which reloads the source.
    pub fn on_handle_ready(&mut self, handle: AudioHandle) {
        log::debug!("playback: audio handle #{} ready", handle.id());

        if let Err(e) = self.sink.load(&handle) {
            log::warn!("playback: preload failed: {}", e);
            self.last_error = Some(e.to_string());
        } else {
            self.last_error = None;
        }

        self.handle = Some(handle);
        self.state = PlaybackState::Ready;
    }

    /// Start or resume playback.
    ///
    /// On a start failure the controller reloads the source once and
    /// retries once; a second failure settles in `Paused` with the error
    /// surfaced. Automatic retries never go further than that.
    pub fn play(&mut self) -> Result<(), PlaybackError> {
        match self.state {
            PlaybackState::Playing => return Ok(()),
            PlaybackState::Idle => return Err(PlaybackError::NoAudio),
            PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Recovering => {}
        }

        let handle = match &self.handle {
            Some(h) if h.is_valid() => h.clone(),
            _ => {
                // The audio was revoked underneath us; do not drive a dead
                // source.
                self.reset();
                return Err(PlaybackError::NoAudio);
            }
        };

        match self.sink.start() {
            Ok(()) => {
                log::debug!("playback: playing handle #{}", handle.id());
                self.state = PlaybackState::Playing;
                self.last_error = None;
                Ok(())
            }
            Err(first) => {
                log::warn!("playback: start failed ({}), reloading once", first);
                self.state = PlaybackState::Recovering;
                self.retry_once(&handle)
            }
        }
    }

    /// The single reload-and-retry allowed per play request.
    fn retry_once(&mut self, handle: &AudioHandle) -> Result<(), PlaybackError> {
        if let Err(e) = self.sink.load(handle) {
            log::warn!("playback: reload failed: {}", e);
            self.state = PlaybackState::Paused;
            self.last_error = Some(e.to_string());
            return Err(e);
        }

        match self.sink.start() {
            Ok(()) => {
                log::debug!("playback: recovered, playing handle #{}", handle.id());
                self.state = PlaybackState::Playing;
                self.last_error = None;
                Ok(())
            }
            Err(second) => {
                log::warn!("playback: retry failed ({}), giving up", second);
                self.state = PlaybackState::Paused;
                self.last_error = Some(second.to_string());
                Err(second)
            }
        }
    }

    /// Suspend playback. A no-op outside the `Playing` state.
    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.sink.pause();
            self.state = PlaybackState::Paused;
            log::debug!("playback: paused");
        }
    }

    /// Pause when playing, play otherwise.
    pub fn toggle(&mut self) -> Result<(), PlaybackError> {
        if self.state == PlaybackState::Playing {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Host-polled end-of-media detection.
    ///
    /// When the sink reports the source has run out during `Playing`, the
    /// controller settles in `Paused` — restartable, not terminal. The next
    /// `play` re-decodes the handle through the recovery path.
    pub fn refresh(&mut self) {
        if self.state == PlaybackState::Playing && self.sink.is_finished() {
            log::debug!("playback: reached end of media");
            self.state = PlaybackState::Paused;
        }
    }

    /// Detach the current handle and return to `Idle`.
    pub fn reset(&mut self) {
        if self.handle.is_some() {
            log::debug!("playback: reset");
        }
        self.sink.stop();
        self.handle = None;
        self.state = PlaybackState::Idle;
        self.last_error = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
