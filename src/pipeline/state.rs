//! Shared session state.
//!
//! [`SessionState`] is the single source of truth for everything the view
//! needs: the active image, the per-kind results, the in-flight marker, the
//! signed-in user and any error message.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<SessionState>>` — cheap to
//! clone and safe to share. The orchestrator is the only writer; the view
//! reads it between commands.

use std::sync::{Arc, Mutex};

use crate::api::types::OperationKind;
use crate::media::image::SourceImage;
use crate::pipeline::results::ResultStore;

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Shared session state — the single source of truth for the view.
///
/// Held behind [`SharedState`]. The pipeline orchestrator mutates it; the
/// command loop reads it to render status.
pub struct SessionState {
    /// The active image, if one has been loaded.
    ///
    /// Replacing it clears `results` — derived results never outlive the
    /// image they were computed from.
    pub image: Option<SourceImage>,

    /// Latest outcome per operation kind.
    pub results: ResultStore,

    /// The operation currently being dispatched, if any.
    ///
    /// At most one operation runs at a time; `run` rejects while this is
    /// set and clears it on every completion path.
    pub in_flight: Option<OperationKind>,

    /// Username of the signed-in account, `None` when logged out.
    pub user: Option<String>,

    /// Message describing the most recent failure, for status display.
    pub error_message: Option<String>,
}

impl SessionState {
    /// Create a new `SessionState` with nothing loaded.
    pub fn new() -> Self {
        Self {
            image: None,
            results: ResultStore::new(),
            in_flight: None,
            user: None,
            error_message: None,
        }
    }

    /// `true` while an operation is being dispatched.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SessionState`].
///
/// Cheap to clone (`Arc` clone). Lock with `.lock().unwrap()` for a short
/// critical section; do **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<SessionState>>;

/// Construct a new [`SharedState`] wrapping a fresh [`SessionState`].
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(SessionState::new()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_nothing_loaded() {
        let state = SessionState::new();
        assert!(state.image.is_none());
        assert!(state.results.is_empty());
        assert!(state.in_flight.is_none());
        assert!(state.user.is_none());
        assert!(state.error_message.is_none());
        assert!(!state.is_busy());
    }

    #[test]
    fn busy_tracks_the_in_flight_marker() {
        let mut state = SessionState::default();
        state.in_flight = Some(OperationKind::Captioning);
        assert!(state.is_busy());

        state.in_flight = None;
        assert!(!state.is_busy());
    }

    #[test]
    fn shared_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedState>();
    }

    #[test]
    fn shared_state_can_be_cloned_and_mutated() {
        let state = new_shared_state();
        let state2 = Arc::clone(&state);

        state.lock().unwrap().in_flight = Some(OperationKind::Translation);
        assert!(state2.lock().unwrap().is_busy());
    }
}
