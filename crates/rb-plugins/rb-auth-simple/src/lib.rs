//! # rb-auth-simple
//!
//! Local-only implementation of `AuthProvider`.
//! Tokens are random opaque markers; passwords are compared in plaintext
//! against the stored account, with the board-wide default password
//! accepted for every account.

use log::warn;
use rb_core::traits::{AuthProvider, PasswordCheck};

const TOKEN_PREFIX: &str = "local_token_";

pub struct SimpleAuthProvider {
    /// Password assigned to accounts created without one. Also unlocks any account.
    default_password: String,
}

impl SimpleAuthProvider {
    pub fn new(default_password: &str) -> Self {
        Self {
            default_password: default_password.to_string(),
        }
    }
}

impl AuthProvider for SimpleAuthProvider {
    fn issue_token(&self) -> String {
        let mut bytes = [0u8; 16];
        if let Err(e) = getrandom::getrandom(&mut bytes) {
            // The token only marks "logged in", so a clock-derived one will do.
            warn!("OS randomness unavailable ({e}), falling back to a time-based token");
            let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
            bytes[..8].copy_from_slice(&nanos.to_le_bytes());
        }
        format!("{TOKEN_PREFIX}{}", hex::encode(bytes))
    }

    fn default_password(&self) -> &str {
        &self.default_password
    }

    fn check_password(&self, stored: &str, supplied: &str) -> PasswordCheck {
        if supplied.is_empty() {
            PasswordCheck::Rejected
        } else if supplied == stored {
            PasswordCheck::Matched
        } else if supplied == self.default_password {
            PasswordCheck::MasterKey
        } else {
            PasswordCheck::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_prefixed_and_unique() {
        let auth = SimpleAuthProvider::new("1234567");
        let a = auth.issue_token();
        let b = auth.issue_token();
        assert!(a.starts_with(TOKEN_PREFIX));
        assert_eq!(a.len(), TOKEN_PREFIX.len() + 32);
        assert_ne!(a, b);
    }

    #[test]
    fn own_password_matches() {
        let auth = SimpleAuthProvider::new("1234567");
        assert_eq!(auth.check_password("hunter2", "hunter2"), PasswordCheck::Matched);
        assert_eq!(auth.check_password("1234567", "1234567"), PasswordCheck::Matched);
    }

    #[test]
    fn default_password_unlocks_any_account() {
        let auth = SimpleAuthProvider::new("1234567");
        assert_eq!(auth.check_password("hunter2", "1234567"), PasswordCheck::MasterKey);
    }

    #[test]
    fn wrong_password_is_rejected() {
        let auth = SimpleAuthProvider::new("1234567");
        assert_eq!(auth.check_password("hunter2", "hunter3"), PasswordCheck::Rejected);
        assert_eq!(auth.check_password("1234567", ""), PasswordCheck::Rejected);
    }

    #[test]
    fn blank_password_never_matches() {
        let auth = SimpleAuthProvider::new("1234567");
        assert_eq!(auth.check_password("", ""), PasswordCheck::Rejected);
        assert_eq!(SimpleAuthProvider::new("").check_password("hunter2", ""), PasswordCheck::Rejected);
    }
}
