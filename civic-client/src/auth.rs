use civic_types::User;
use thiserror::Error;

use crate::session::SessionData;
use crate::storage::StorageAdapter;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Session token cannot be empty")]
    EmptyToken,

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Storage(format!("{:#}", err))
    }
}

/// The client's auth slice: who is signed in and with which token.
///
/// Every change is written through to the storage adapter so a later run
/// can [`restore`](AuthState::restore) it.
pub struct AuthState {
    storage: Box<dyn StorageAdapter>,
    session: Option<SessionData>,
}

impl AuthState {
    pub fn new(storage: Box<dyn StorageAdapter>) -> Self {
        Self {
            storage,
            session: None,
        }
    }

    /// Record a successful login and persist it
    pub fn set_credentials(&mut self, user: User, token: String) -> Result<(), AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::EmptyToken);
        }
        let session = SessionData { token, user };
        self.storage.store(&session)?;
        log::info!("Signed in as {}", session.user.email);
        self.session = Some(session);
        Ok(())
    }

    /// Forget the stored session, then sign out locally.
    ///
    /// If storage cannot be cleared the slice stays signed in, matching what
    /// a later [`restore`](AuthState::restore) would find.
    pub fn clear(&mut self) -> Result<(), AuthError> {
        self.storage.clear()?;
        self.session = None;
        Ok(())
    }

    /// Load whatever session storage holds; returns whether one was found
    pub fn restore(&mut self) -> Result<bool, AuthError> {
        self.session = self.storage.load()?;
        Ok(self.session.is_some())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    /// Token for calls that must not proceed anonymously
    pub fn require_token(&self) -> Result<&str, AuthError> {
        self.token().ok_or(AuthError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::sample_session;
    use crate::storage::MemoryStorageAdapter;
    use std::sync::Arc;

    /// Shares one memory slot between two AuthState instances
    struct Shared(Arc<MemoryStorageAdapter>);

    impl StorageAdapter for Shared {
        fn store(&self, session: &SessionData) -> anyhow::Result<()> {
            self.0.store(session)
        }
        fn load(&self) -> anyhow::Result<Option<SessionData>> {
            self.0.load()
        }
        fn clear(&self) -> anyhow::Result<()> {
            self.0.clear()
        }
    }

    #[test]
    fn test_starts_signed_out() {
        let auth = AuthState::new(Box::new(MemoryStorageAdapter::new()));
        assert!(!auth.is_authenticated());
        assert!(auth.token().is_none());
        assert!(auth.user().is_none());
        assert!(matches!(auth.require_token(), Err(AuthError::NotAuthenticated)));
    }

    #[test]
    fn test_set_credentials_then_restore_elsewhere() {
        let slot = Arc::new(MemoryStorageAdapter::new());
        let session = sample_session();

        let mut first = AuthState::new(Box::new(Shared(slot.clone())));
        first
            .set_credentials(session.user.clone(), session.token.clone())
            .unwrap();
        assert!(first.is_authenticated());
        assert_eq!(first.token(), Some(session.token.as_str()));

        let mut second = AuthState::new(Box::new(Shared(slot)));
        assert!(second.restore().unwrap());
        assert_eq!(second.user().map(|u| u.id), Some(session.user.id));
    }

    #[test]
    fn test_clear_forgets_everywhere() {
        let slot = Arc::new(MemoryStorageAdapter::new());
        let session = sample_session();

        let mut auth = AuthState::new(Box::new(Shared(slot.clone())));
        auth.set_credentials(session.user, session.token).unwrap();
        auth.clear().unwrap();

        assert!(!auth.is_authenticated());
        let mut other = AuthState::new(Box::new(Shared(slot)));
        assert!(!other.restore().unwrap());
    }

    /// Storage whose clear always fails, as when the session file is read-only
    struct StuckStorage(MemoryStorageAdapter);

    impl StorageAdapter for StuckStorage {
        fn store(&self, session: &SessionData) -> anyhow::Result<()> {
            self.0.store(session)
        }
        fn load(&self) -> anyhow::Result<Option<SessionData>> {
            self.0.load()
        }
        fn clear(&self) -> anyhow::Result<()> {
            anyhow::bail!("permission denied")
        }
    }

    #[test]
    fn test_failed_clear_stays_signed_in() {
        let session = sample_session();
        let mut auth = AuthState::new(Box::new(StuckStorage(MemoryStorageAdapter::new())));
        auth.set_credentials(session.user, session.token.clone())
            .unwrap();

        let result = auth.clear();
        assert!(matches!(result, Err(AuthError::Storage(_))));
        assert!(auth.is_authenticated());
        assert_eq!(auth.token(), Some(session.token.as_str()));

        // Memory and storage still agree
        assert!(auth.restore().unwrap());
    }

    #[test]
    fn test_empty_token_rejected() {
        let mut auth = AuthState::new(Box::new(MemoryStorageAdapter::new()));
        let session = sample_session();
        let result = auth.set_credentials(session.user, "   ".to_string());
        assert!(matches!(result, Err(AuthError::EmptyToken)));
        assert!(!auth.is_authenticated());
    }
}
