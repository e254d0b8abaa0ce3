//! Local user accounts for the console client.
//!
//! [`AccountStore`] persists registered users and the signed-in user as JSON
//! in the platform-appropriate config directory:
//!
//! | Platform | Path |
//! |----------|------|
//! | Windows  | `%APPDATA%\image-to-speech\accounts.json` |
//! | macOS    | `~/Library/Application Support/image-to-speech/accounts.json` |
//! | Linux    | `~/.config/image-to-speech/accounts.json` |
//!
//! Passwords are never stored in plain text: each account keeps a random
//! salt and the hex-encoded SHA-256 of `salt + password`. A default
//! `admin` account is seeded the first time the store is created so the
//! client is usable out of the box.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::AppPaths;

/// Seeded on first run so the client works without prior registration.
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "12345";

const MIN_PASSWORD_CHARS: usize = 5;

// ---------------------------------------------------------------------------
// AccountError
// ---------------------------------------------------------------------------

/// Login/registration failures surfaced to the view.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("username and password are required")]
    MissingCredentials,

    #[error("password must be at least 5 characters")]
    PasswordTooShort,

    #[error("username already exists")]
    UsernameTaken,

    #[error("invalid username or password")]
    InvalidCredentials,
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// One registered user. Only the salted hash of the password is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    username: String,
    salt: String,
    password_hash: String,
}

impl Account {
    fn new(username: String, password: &str) -> Self {
        let salt = uuid::Uuid::new_v4().to_string();
        let password_hash = hash_password(&salt, password);
        Self {
            username,
            salt,
            password_hash,
        }
    }

    fn verify(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.password_hash
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// On-disk document: the user list plus the signed-in user.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountFile {
    accounts: Vec<Account>,
    current_user: Option<String>,
}

// ---------------------------------------------------------------------------
// AccountStore
// ---------------------------------------------------------------------------

/// Manages registration, sign-in and sign-out.
///
/// The store is persisted to JSON after every mutation, so both the account
/// list and the signed-in user survive restarts.
pub struct AccountStore {
    accounts: Vec<Account>,
    current_user: Option<String>,
    path: PathBuf,
}

impl AccountStore {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Load accounts from the platform config directory, seeding the
    /// default account when the file does not exist yet.
    pub fn load_or_default() -> Self {
        Self::load_from(AppPaths::new().accounts_file)
    }

    /// Load accounts from an explicit path (useful for tests).
    pub fn load_from(path: PathBuf) -> Self {
        let file = Self::load_file(&path);
        let mut store = Self {
            accounts: file.accounts,
            current_user: file.current_user,
            path,
        };
        if store.accounts.is_empty() {
            store.seed_default();
        }
        store
    }

    fn load_file(path: &PathBuf) -> AccountFile {
        if path.exists() {
            let data = std::fs::read_to_string(path).unwrap_or_default();
            serde_json::from_str(&data).unwrap_or_default()
        } else {
            AccountFile::default()
        }
    }

    fn seed_default(&mut self) {
        log::info!("session: seeding default account '{}'", DEFAULT_USERNAME);
        self.accounts
            .push(Account::new(DEFAULT_USERNAME.into(), DEFAULT_PASSWORD));
        self.save();
    }

    // -----------------------------------------------------------------------
    // Registration and sign-in
    // -----------------------------------------------------------------------

    /// Register a new account and sign it in.
    ///
    /// Both fields are required, the password must be at least five
    /// characters and the username must be unused.
    pub fn register(&mut self, username: &str, password: &str) -> Result<(), AccountError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AccountError::MissingCredentials);
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AccountError::PasswordTooShort);
        }
        if self.find(username).is_some() {
            return Err(AccountError::UsernameTaken);
        }

        log::info!("session: registered account '{}'", username);
        self.accounts.push(Account::new(username.into(), password));
        self.current_user = Some(username.into());
        self.save();
        Ok(())
    }

    /// Verify the credentials and record the signed-in user.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), AccountError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AccountError::MissingCredentials);
        }

        match self.find(username) {
            Some(account) if account.verify(password) => {
                log::info!("session: '{}' signed in", username);
                self.current_user = Some(username.into());
                self.save();
                Ok(())
            }
            _ => Err(AccountError::InvalidCredentials),
        }
    }

    /// Clear the signed-in user.
    pub fn logout(&mut self) {
        if let Some(user) = self.current_user.take() {
            log::info!("session: '{}' signed out", user);
            self.save();
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The signed-in user, restored across restarts.
    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current_user.is_some()
    }

    /// Number of registered accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn find(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn save(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let file = AccountFile {
            accounts: self.accounts.clone(),
            current_user: self.current_user.clone(),
        };
        if let Ok(data) = serde_json::to_string_pretty(&file) {
            let _ = std::fs::write(&self.path, data);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in_temp() -> (AccountStore, tempfile::TempDir) {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("accounts.json");
        let store = AccountStore::load_from(path);
        (store, dir)
    }

    #[test]
    fn fresh_store_seeds_the_default_account() {
        let (store, _dir) = store_in_temp();
        assert_eq!(store.len(), 1);
        assert!(store.current_user().is_none());
    }

    #[test]
    fn default_credentials_sign_in() {
        let (mut store, _dir) = store_in_temp();
        store
            .login(DEFAULT_USERNAME, DEFAULT_PASSWORD)
            .expect("default login");
        assert_eq!(store.current_user(), Some(DEFAULT_USERNAME));
    }

    #[test]
    fn register_requires_both_fields() {
        let (mut store, _dir) = store_in_temp();
        assert_eq!(
            store.register("", "longenough"),
            Err(AccountError::MissingCredentials)
        );
        assert_eq!(
            store.register("alice", ""),
            Err(AccountError::MissingCredentials)
        );
    }

    #[test]
    fn register_rejects_short_passwords() {
        let (mut store, _dir) = store_in_temp();
        assert_eq!(
            store.register("alice", "1234"),
            Err(AccountError::PasswordTooShort)
        );
        store.register("alice", "12345").expect("five chars is enough");
    }

    #[test]
    fn register_rejects_taken_usernames() {
        let (mut store, _dir) = store_in_temp();
        store.register("alice", "secret-pw").expect("register");
        assert_eq!(
            store.register("alice", "other-pw"),
            Err(AccountError::UsernameTaken)
        );
        assert_eq!(
            store.register(DEFAULT_USERNAME, "other-pw"),
            Err(AccountError::UsernameTaken)
        );
    }

    #[test]
    fn register_signs_the_new_account_in() {
        let (mut store, _dir) = store_in_temp();
        store.register("alice", "secret-pw").expect("register");
        assert_eq!(store.current_user(), Some("alice"));
    }

    #[test]
    fn login_rejects_bad_credentials() {
        let (mut store, _dir) = store_in_temp();
        store.register("alice", "secret-pw").expect("register");
        store.logout();

        assert_eq!(
            store.login("alice", "wrong-pw"),
            Err(AccountError::InvalidCredentials)
        );
        assert_eq!(
            store.login("nobody", "secret-pw"),
            Err(AccountError::InvalidCredentials)
        );
        assert!(store.current_user().is_none());
    }

    #[test]
    fn passwords_are_stored_salted_and_hashed() {
        let (mut store, _dir) = store_in_temp();
        store.register("alice", "secret-pw").expect("register");

        let account = store.find("alice").expect("stored");
        assert_ne!(account.password_hash, "secret-pw");
        assert!(!account.password_hash.contains("secret"));
        assert_eq!(account.password_hash.len(), 64); // hex-encoded SHA-256
        assert_eq!(
            account.password_hash,
            hash_password(&account.salt, "secret-pw")
        );
    }

    #[test]
    fn equal_passwords_hash_differently_per_account() {
        let (mut store, _dir) = store_in_temp();
        store.register("alice", "same-pw").expect("register alice");
        store.register("bob", "same-pw").expect("register bob");

        let alice = store.find("alice").expect("alice").clone();
        let bob = store.find("bob").expect("bob").clone();
        assert_ne!(alice.salt, bob.salt);
        assert_ne!(alice.password_hash, bob.password_hash);
    }

    #[test]
    fn signed_in_user_survives_a_reload() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("accounts.json");

        {
            let mut store = AccountStore::load_from(path.clone());
            store.register("alice", "secret-pw").expect("register");
        }

        let reloaded = AccountStore::load_from(path.clone());
        assert_eq!(reloaded.len(), 2); // admin + alice
        assert_eq!(reloaded.current_user(), Some("alice"));

        {
            let mut store = AccountStore::load_from(path.clone());
            store.logout();
        }

        let reloaded = AccountStore::load_from(path);
        assert!(reloaded.current_user().is_none());
    }

    #[test]
    fn corrupt_file_falls_back_to_the_seeded_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("accounts.json");
        std::fs::write(&path, "{ not json").expect("write");

        let store = AccountStore::load_from(path);
        assert_eq!(store.len(), 1);
        assert_eq!(store.accounts[0].username, DEFAULT_USERNAME);
    }
}
