use crate::db::Database;
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Default session lifetime in days
pub const DEFAULT_TTL_DAYS: i64 = 30;

/// Database-backed session manager for token authentication
///
/// Tokens are UUID v4 strings stored with an expiry; expired sessions are
/// rejected on validation and removed by [`SessionManager::cleanup_expired_sessions`].
#[derive(Clone)]
pub struct SessionManager {
    db: Database,
    ttl: Duration,
}

impl SessionManager {
    /// Create a new session manager with the default lifetime
    pub fn new(db: Database) -> Self {
        Self::with_ttl_days(db, DEFAULT_TTL_DAYS)
    }

    pub fn with_ttl_days(db: Database, ttl_days: i64) -> Self {
        Self {
            db,
            ttl: Duration::days(ttl_days.max(1)),
        }
    }

    /// Create a new session for a user and return its token
    pub fn create_session(&self, user_id: Uuid) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let expires_at = created_at + self.ttl;

        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                token,
                user_id.to_string(),
                created_at.to_rfc3339(),
                expires_at.to_rfc3339(),
            ],
        )
        .context("Failed to create session")?;

        tracing::info!("Created session for user {}", user_id);
        Ok(token)
    }

    /// Validate a session token and return the associated user ID
    pub fn validate_session(&self, token: &str) -> Result<Uuid> {
        let conn = self.db.connection()?;

        let (user_id_str, expires_at_str): (String, String) = conn
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                rusqlite::params![token],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .context("Session not found")?;

        let expires_at = DateTime::parse_from_rfc3339(&expires_at_str)
            .context("Failed to parse expiry time")?
            .with_timezone(&Utc);

        if Utc::now() > expires_at {
            self.delete_session(token)?;
            anyhow::bail!("Session has expired");
        }

        let user_id = Uuid::parse_str(&user_id_str).context("Failed to parse user ID")?;

        Ok(user_id)
    }

    /// Delete a session (logout). Unknown tokens are not an error.
    pub fn delete_session(&self, token: &str) -> Result<()> {
        let conn = self.db.connection()?;
        let rows_affected = conn
            .execute(
                "DELETE FROM sessions WHERE token = ?1",
                rusqlite::params![token],
            )
            .context("Failed to delete session")?;

        if rows_affected > 0 {
            tracing::info!("Deleted session");
        }

        Ok(())
    }

    /// Remove all expired sessions, returning how many were deleted
    pub fn cleanup_expired_sessions(&self) -> Result<usize> {
        let conn = self.db.connection()?;
        let now = Utc::now().to_rfc3339();

        let rows_affected = conn
            .execute(
                "DELETE FROM sessions WHERE expires_at < ?1",
                rusqlite::params![now],
            )
            .context("Failed to cleanup expired sessions")?;

        if rows_affected > 0 {
            tracing::info!("Cleaned up {} expired sessions", rows_affected);
        }

        Ok(rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::UserRepository;

    fn setup_test_db() -> (Database, Uuid) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let user = UserRepository::new(db.pool.clone())
            .create("voter@civic.test", "Voter", "pw-voter-1")
            .expect("Failed to create test user");
        (db, user.id)
    }

    #[test]
    fn test_create_and_validate_session() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::new(db);

        let token = manager.create_session(user_id).expect("Failed to create session");
        assert!(Uuid::parse_str(&token).is_ok(), "Token should be a valid UUID");
        assert_eq!(manager.validate_session(&token).unwrap(), user_id);
    }

    #[test]
    fn test_validate_invalid_session() {
        let (db, _) = setup_test_db();
        let manager = SessionManager::new(db);
        assert!(manager.validate_session("invalid-token").is_err());
    }

    #[test]
    fn test_delete_session() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::new(db);

        let token = manager.create_session(user_id).unwrap();
        manager.delete_session(&token).unwrap();
        assert!(manager.validate_session(&token).is_err());
        // Deleting again is a no-op
        manager.delete_session(&token).unwrap();
    }

    #[test]
    fn test_expired_session_is_rejected_and_removed() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::new(db.clone());
        let token = manager.create_session(user_id).unwrap();

        let conn = db.connection().unwrap();
        let expired_time = (Utc::now() - Duration::days(1)).to_rfc3339();
        conn.execute(
            "UPDATE sessions SET expires_at = ?1 WHERE token = ?2",
            rusqlite::params![expired_time, token],
        )
        .unwrap();

        assert!(manager.validate_session(&token).is_err());
        let remaining: i32 = conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn test_cleanup_expired_sessions() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::new(db.clone());
        let expired = manager.create_session(user_id).unwrap();
        let live = manager.create_session(user_id).unwrap();

        let conn = db.connection().unwrap();
        conn.execute(
            "UPDATE sessions SET expires_at = ?1 WHERE token = ?2",
            rusqlite::params![(Utc::now() - Duration::hours(1)).to_rfc3339(), expired],
        )
        .unwrap();

        assert_eq!(manager.cleanup_expired_sessions().unwrap(), 1);
        assert!(manager.validate_session(&live).is_ok());
    }

    #[test]
    fn test_ttl_is_at_least_one_day() {
        let (db, user_id) = setup_test_db();
        let manager = SessionManager::with_ttl_days(db, 0);
        let token = manager.create_session(user_id).unwrap();
        assert!(manager.validate_session(&token).is_ok());
    }
}
