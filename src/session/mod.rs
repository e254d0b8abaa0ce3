//! User session support: the persisted local account store.

pub mod accounts;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use accounts::{AccountError, AccountStore, DEFAULT_PASSWORD, DEFAULT_USERNAME};
