//! Key-value storage capability standing in for browser storage.
//!
//! The session reads the auth token from here and writes transient
//! session flags, which are cleared on every mount.

use dashmap::DashMap;

/// Bearer token written by the login flow
pub const AUTH_TOKEN_KEY: &str = "token";
/// Session token of the play-through in progress
pub const SESSION_TOKEN_KEY: &str = "puzzle_session_token";
/// Nickname the current session was started with
pub const SESSION_NICKNAME_KEY: &str = "puzzle_session_nickname";
/// Hotlink token the current session belongs to
pub const SESSION_PUZZLE_KEY: &str = "puzzle_session_puzzle";

/// Every key owned by a play session
pub const SESSION_KEYS: [&str; 3] = [SESSION_TOKEN_KEY, SESSION_NICKNAME_KEY, SESSION_PUZZLE_KEY];

pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);

    /// Drop all session flags. Does not touch the auth token.
    fn clear_session(&self) {
        for key in SESSION_KEYS {
            self.remove(key);
        }
    }
}

/// In-memory storage, shared between the session and the front end
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}
