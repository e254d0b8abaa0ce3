//! Synthesized-audio lifecycle: the single-slot arena.
//!
//! Each successful speech synthesis yields one playable [`AudioHandle`].
//! The [`AudioSlot`] owns at most one live handle at a time: installing a
//! replacement revokes the previous handle first, and every discard path
//! (new audio, new image, session end, slot drop) funnels through
//! [`AudioSlot::release`]. A revoked handle stays safely readable through
//! outstanding clones but reports itself invalid, so holders know not to
//! drive it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// AudioHandle
// ---------------------------------------------------------------------------

struct HandleInner {
    id: u64,
    bytes: Arc<Vec<u8>>,
    content_type: String,
    valid: AtomicBool,
}

/// A reference to one piece of playable synthesized audio.
///
/// Clones share the payload and the validity flag; revoking the handle
/// through its slot invalidates every clone at once.
#[derive(Clone)]
pub struct AudioHandle {
    inner: Arc<HandleInner>,
}

impl AudioHandle {
    fn new(id: u64, bytes: Arc<Vec<u8>>, content_type: String) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id,
                bytes,
                content_type,
                valid: AtomicBool::new(true),
            }),
        }
    }

    /// Slot-issued id, strictly increasing across installs.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// `false` once the owning slot has revoked this audio.
    pub fn is_valid(&self) -> bool {
        self.inner.valid.load(Ordering::Acquire)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.inner.bytes
    }

    /// Shared reference to the payload (no copy).
    pub fn share_bytes(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.inner.bytes)
    }

    pub fn content_type(&self) -> &str {
        &self.inner.content_type
    }

    pub fn len(&self) -> usize {
        self.inner.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.bytes.is_empty()
    }

    fn revoke(&self) {
        self.inner.valid.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for AudioHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioHandle")
            .field("id", &self.inner.id)
            .field("content_type", &self.inner.content_type)
            .field("len", &self.inner.bytes.len())
            .field("valid", &self.is_valid())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// AudioSlot
// ---------------------------------------------------------------------------

/// Owner of the one live audio handle.
///
/// Install/release discipline:
/// * `install` revokes and drops the previous handle before the new one
///   exists, so two valid handles to superseded audio never coexist.
/// * `release` is idempotent — releasing an empty slot is a no-op.
/// * Dropping the slot releases whatever is installed.
pub struct AudioSlot {
    current: Option<AudioHandle>,
    next_id: u64,
}

impl AudioSlot {
    pub fn new() -> Self {
        Self {
            current: None,
            next_id: 1,
        }
    }

    /// Install freshly synthesized audio, revoking any previous handle.
    ///
    /// Returns a clone of the newly installed handle for the caller to
    /// hand to playback.
    pub fn install(&mut self, bytes: Arc<Vec<u8>>, content_type: impl Into<String>) -> AudioHandle {
        self.release();

        let handle = AudioHandle::new(self.next_id, bytes, content_type.into());
        self.next_id += 1;

        log::debug!(
            "media: installed audio handle #{} ({} bytes, {})",
            handle.id(),
            handle.len(),
            handle.content_type()
        );

        self.current = Some(handle.clone());
        handle
    }

    /// Revoke and drop the current handle, if any.
    pub fn release(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.revoke();
            log::debug!("media: released audio handle #{}", handle.id());
        }
    }

    pub fn current(&self) -> Option<&AudioHandle> {
        self.current.as_ref()
    }

    pub fn has_audio(&self) -> bool {
        self.current.is_some()
    }
}

impl Default for AudioSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AudioSlot {
    fn drop(&mut self) {
        self.release();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes() -> Arc<Vec<u8>> {
        Arc::new(vec![0x52, 0x49, 0x46, 0x46])
    }

    #[test]
    fn install_returns_a_valid_handle() {
        let mut slot = AudioSlot::new();
        let handle = slot.install(wav_bytes(), "audio/wav");

        assert!(handle.is_valid());
        assert_eq!(handle.content_type(), "audio/wav");
        assert_eq!(handle.len(), 4);
        assert!(slot.has_audio());
        assert_eq!(slot.current().map(|h| h.id()), Some(handle.id()));
    }

    #[test]
    fn install_revokes_the_previous_handle() {
        let mut slot = AudioSlot::new();
        let first = slot.install(wav_bytes(), "audio/wav");
        let second = slot.install(wav_bytes(), "audio/aiff");

        assert!(!first.is_valid());
        assert!(second.is_valid());
        assert!(second.id() > first.id());
    }

    #[test]
    fn exactly_one_handle_survives_many_installs() {
        let mut slot = AudioSlot::new();
        let handles: Vec<AudioHandle> =
            (0..5).map(|_| slot.install(wav_bytes(), "audio/wav")).collect();

        let valid: Vec<&AudioHandle> = handles.iter().filter(|h| h.is_valid()).collect();
        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].id(), handles.last().map(|h| h.id()).unwrap());
    }

    #[test]
    fn release_is_idempotent() {
        let mut slot = AudioSlot::new();
        slot.release(); // empty slot: no-op

        let handle = slot.install(wav_bytes(), "audio/wav");
        slot.release();
        slot.release(); // already released: no-op

        assert!(!handle.is_valid());
        assert!(!slot.has_audio());
        assert!(slot.current().is_none());
    }

    #[test]
    fn stale_clone_observes_revocation() {
        let mut slot = AudioSlot::new();
        let handle = slot.install(wav_bytes(), "audio/wav");
        let stale = handle.clone();

        slot.release();

        assert!(!stale.is_valid());
        // Payload stays readable even after revocation.
        assert_eq!(stale.bytes().len(), 4);
    }

    #[test]
    fn dropping_the_slot_revokes_outstanding_clones() {
        let escaped = {
            let mut slot = AudioSlot::new();
            slot.install(wav_bytes(), "audio/wav")
        };
        assert!(!escaped.is_valid());
    }

    #[test]
    fn payload_is_shared_not_copied() {
        let bytes = wav_bytes();
        let mut slot = AudioSlot::new();
        let handle = slot.install(Arc::clone(&bytes), "audio/wav");

        assert!(std::ptr::eq(bytes.as_ptr(), handle.bytes().as_ptr()));
        assert!(std::ptr::eq(
            bytes.as_ptr(),
            handle.share_bytes().as_ptr()
        ));
    }
}
