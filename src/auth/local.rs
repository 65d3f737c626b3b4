//! In-process accounts for the memory backend.

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::session::Session;
use crate::auth::{AuthError, AuthResult};
use crate::store::Account;

const MIN_PASSWORD_LEN: usize = 6;

/// Local accounts with salted SHA-256 password digests and opaque bearer tokens.
///
/// Sessions live only in memory; a restart signs everyone out but keeps
/// their accounts when the table is shared with a persisted `MemoryStore`.
#[derive(Clone, Default)]
pub struct LocalAuth {
    accounts: Arc<DashMap<String, Account>>,
    sessions: Arc<DashMap<String, Session>>,
}

impl LocalAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate against an existing account table.
    pub fn with_accounts(accounts: Arc<DashMap<String, Account>>) -> Self {
        Self {
            accounts,
            sessions: Arc::default(),
        }
    }

    pub fn sign_up(&self, email: &str, password: &str) -> AuthResult<Session> {
        let email = normalize_email(email)?;
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
        }

        let salt = Uuid::new_v4().simple().to_string();
        let account = Account {
            user_id: Uuid::new_v4(),
            email: email.clone(),
            digest: digest(&salt, password),
            salt,
        };

        match self.accounts.entry(email.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => return Err(AuthError::AlreadyRegistered(email)),
            dashmap::mapref::entry::Entry::Vacant(v) => {
                v.insert(account.clone());
            }
        }

        Ok(self.open_session(&account))
    }

    pub fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let email = normalize_email(email)?;
        let account = self
            .accounts
            .get(&email)
            .map(|a| a.value().clone())
            .ok_or(AuthError::InvalidCredentials)?;

        if !digests_match(&digest(&account.salt, password), &account.digest) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(self.open_session(&account))
    }

    pub fn sign_out(&self, token: &str) -> AuthResult<Session> {
        self.sessions
            .remove(token)
            .map(|(_, s)| s)
            .ok_or(AuthError::InvalidToken)
    }

    pub fn session(&self, token: &str) -> AuthResult<Session> {
        self.sessions
            .get(token)
            .map(|s| s.value().clone())
            .ok_or(AuthError::InvalidToken)
    }

    fn open_session(&self, account: &Account) -> Session {
        let session = Session {
            access_token: Uuid::new_v4().simple().to_string(),
            user_id: account.user_id,
            email: account.email.clone(),
            expires_at: None,
        };
        self.sessions.insert(session.access_token.clone(), session.clone());
        session
    }
}

fn normalize_email(email: &str) -> AuthResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AuthError::InvalidEmail(email)),
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compares every byte regardless of where the first mismatch is.
fn digests_match(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digests_match() {
        let d = digest("salt", "hunter22");
        assert!(digests_match(&d, &digest("salt", "hunter22")));
        assert!(!digests_match(&d, &digest("salt", "hunter23")));
        assert!(!digests_match(&d, &d[..10]));
    }

    #[test]
    fn test_accounts_outlive_the_provider() {
        let accounts = Arc::new(DashMap::new());
        let first = LocalAuth::with_accounts(accounts.clone());
        let created = first.sign_up("seller@example.com", "hunter22").unwrap();
        drop(first);

        let restarted = LocalAuth::with_accounts(accounts);
        assert!(matches!(restarted.session(&created.access_token), Err(AuthError::InvalidToken)));
        let session = restarted.sign_in("seller@example.com", "hunter22").unwrap();
        assert_eq!(session.user_id, created.user_id);
    }

    #[test]
    fn test_sign_up_then_sign_in() {
        let auth = LocalAuth::new();
        let created = auth.sign_up("Seller@Example.com", "hunter22").unwrap();
        assert_eq!(created.email, "seller@example.com");

        let session = auth.sign_in("seller@example.com", "hunter22").unwrap();
        assert_eq!(session.user_id, created.user_id);
        assert_ne!(session.access_token, created.access_token);
        assert_eq!(auth.session(&session.access_token).unwrap().user_id, created.user_id);
    }

    #[test]
    fn test_rejects_bad_credentials() {
        let auth = LocalAuth::new();
        auth.sign_up("seller@example.com", "hunter22").unwrap();

        assert!(matches!(
            auth.sign_in("seller@example.com", "wrong-password"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_up("seller@example.com", "another1"),
            Err(AuthError::AlreadyRegistered(_))
        ));
        assert!(matches!(auth.sign_up("nobody", "hunter22"), Err(AuthError::InvalidEmail(_))));
        assert!(matches!(auth.sign_up("a@b.co", "123"), Err(AuthError::WeakPassword(6))));
    }

    #[test]
    fn test_sign_out_revokes_token() {
        let auth = LocalAuth::new();
        let session = auth.sign_up("seller@example.com", "hunter22").unwrap();
        auth.sign_out(&session.access_token).unwrap();
        assert!(matches!(auth.session(&session.access_token), Err(AuthError::InvalidToken)));
    }
}
