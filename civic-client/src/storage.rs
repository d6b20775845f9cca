use anyhow::Result;
use std::sync::Mutex;

use crate::session::{SessionData, SessionStore};

/// Durable key-value slot for the signed-in session
pub trait StorageAdapter: Send + Sync {
    /// Store the session, replacing any previous one
    fn store(&self, session: &SessionData) -> Result<()>;

    /// Load the stored session, if any
    fn load(&self) -> Result<Option<SessionData>>;

    /// Forget the stored session
    fn clear(&self) -> Result<()>;
}

/// File-based storage in `~/.civic/session`
#[derive(Debug, Clone)]
pub struct FileStorageAdapter {
    session_store: SessionStore,
}

impl FileStorageAdapter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            session_store: SessionStore::new()?,
        })
    }

    pub fn with_store(session_store: SessionStore) -> Self {
        Self { session_store }
    }
}

impl StorageAdapter for FileStorageAdapter {
    fn store(&self, session: &SessionData) -> Result<()> {
        self.session_store.save(session)
    }

    fn load(&self) -> Result<Option<SessionData>> {
        self.session_store.load()
    }

    fn clear(&self) -> Result<()> {
        self.session_store.delete()
    }
}

/// Process-local storage; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryStorageAdapter {
    slot: Mutex<Option<SessionData>>,
}

impl MemoryStorageAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageAdapter for MemoryStorageAdapter {
    fn store(&self, session: &SessionData) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Session storage lock poisoned"))?;
        *slot = Some(session.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<SessionData>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Session storage lock poisoned"))?;
        Ok(slot.clone())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("Session storage lock poisoned"))?;
        *slot = None;
        Ok(())
    }
}
