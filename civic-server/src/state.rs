use crate::db::Database;
use crate::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub session_manager: SessionManager,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        let session_manager = SessionManager::new(db.clone());
        Self {
            db,
            session_manager,
        }
    }

    pub fn with_session_ttl(db: Database, ttl_days: i64) -> Self {
        let session_manager = SessionManager::with_ttl_days(db.clone(), ttl_days);
        Self {
            db,
            session_manager,
        }
    }

    /// Get authenticated user ID from session token
    pub fn get_authenticated_user_id_from_token(&self, token: &str) -> Option<uuid::Uuid> {
        self.session_manager.validate_session(token).ok()
    }
}
