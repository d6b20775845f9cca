use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use civic_types::User;

use super::{timestamp_column, uuid_column, UpsertOutcome};
use crate::db::DbPool;
use crate::password;

const USER_COLUMNS: &str = "id, email, name, is_admin, created_at";

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: uuid_column(row, 0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            is_admin: row.get::<_, i32>(3)? == 1,
            created_at: timestamp_column(row, 4)?,
        })
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let user = conn
            .query_row(&sql, [user_id.to_string()], Self::map_row)
            .optional()?;
        Ok(user)
    }

    /// Get user by email (case-insensitive)
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM users WHERE email = ? COLLATE NOCASE",
            USER_COLUMNS
        );
        let user = conn.query_row(&sql, [email], Self::map_row).optional()?;
        Ok(user)
    }

    /// Look up an account and check its password.
    ///
    /// Returns `None` for an unknown email and for a wrong password alike.
    pub fn authenticate(&self, email: &str, password_attempt: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {}, password_hash FROM users WHERE email = ? COLLATE NOCASE",
            USER_COLUMNS
        );
        let found = conn
            .query_row(&sql, [email], |row| {
                Ok((Self::map_row(row)?, row.get::<_, String>(5)?))
            })
            .optional()?;

        Ok(found.and_then(|(user, hash)| {
            password::verify_password(password_attempt, &hash).then_some(user)
        }))
    }

    /// Create a regular (non-admin) account
    pub fn create(&self, email: &str, name: &str, password_plain: &str) -> Result<User> {
        let conn = self.pool.get()?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            is_admin: false,
            created_at: now,
        };
        let hash = password::hash_password(password_plain)?;
        conn.execute(
            "INSERT INTO users (id, email, password_hash, name, is_admin, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
            params![user.id.to_string(), email, hash, name, now.to_rfc3339()],
        )
        .context("Failed to create user")?;
        Ok(user)
    }

    /// Ensure a privileged operator account exists for this email.
    ///
    /// The password is hashed only when the stored hash no longer verifies it
    /// or was produced with outdated parameters.
    pub fn upsert_operator(&self, email: &str, name: &str, password_plain: &str) -> Result<UpsertOutcome> {
        let conn = self.pool.get()?;
        let now = Utc::now().to_rfc3339();

        let existing = conn
            .query_row(
                "SELECT id, name, is_admin, password_hash FROM users WHERE email = ? COLLATE NOCASE",
                [email],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i32>(2)? == 1,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()
            .with_context(|| format!("Failed to look up operator {}", email))?;

        match existing {
            None => {
                let hash = password::hash_password(password_plain)?;
                conn.execute(
                    "INSERT INTO users (id, email, password_hash, name, is_admin, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
                    params![Uuid::new_v4().to_string(), email, hash, name, now],
                )
                .with_context(|| format!("Failed to insert operator {}", email))?;
                Ok(UpsertOutcome::Inserted)
            }
            Some((id, stored_name, is_admin, stored_hash)) => {
                let hash_is_current = password::verify_password(password_plain, &stored_hash)
                    && password::uses_current_params(&stored_hash);

                if hash_is_current && is_admin && stored_name == name {
                    return Ok(UpsertOutcome::Unchanged);
                }

                let hash = if hash_is_current {
                    stored_hash
                } else {
                    password::hash_password(password_plain)?
                };
                conn.execute(
                    "UPDATE users SET name = ?2, password_hash = ?3, is_admin = 1, updated_at = ?4
                     WHERE id = ?1",
                    params![id, name, hash, now],
                )
                .with_context(|| format!("Failed to update operator {}", email))?;
                Ok(UpsertOutcome::Updated)
            }
        }
    }

    pub fn count_admins(&self) -> Result<i64> {
        let conn = self.pool.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE is_admin = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup() -> (Database, UserRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let repo = UserRepository::new(db.pool.clone());
        (db, repo)
    }

    fn stored_hash(db: &Database, email: &str) -> String {
        db.connection()
            .unwrap()
            .query_row("SELECT password_hash FROM users WHERE email = ?", [email], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_operator_insert_then_unchanged() {
        let (db, repo) = setup();
        let first = repo.upsert_operator("admin@civic.test", "Admin", "s3cret-pass").unwrap();
        assert_eq!(first, UpsertOutcome::Inserted);
        let hash = stored_hash(&db, "admin@civic.test");
        assert_ne!(hash, "s3cret-pass");

        let second = repo.upsert_operator("admin@civic.test", "Admin", "s3cret-pass").unwrap();
        assert_eq!(second, UpsertOutcome::Unchanged);
        assert_eq!(stored_hash(&db, "admin@civic.test"), hash);
        assert_eq!(repo.count_admins().unwrap(), 1);
    }

    #[test]
    fn test_operator_password_rotation_rehashes() {
        let (db, repo) = setup();
        repo.upsert_operator("admin@civic.test", "Admin", "old-password").unwrap();
        let old_hash = stored_hash(&db, "admin@civic.test");

        let outcome = repo.upsert_operator("admin@civic.test", "Admin", "new-password").unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_ne!(stored_hash(&db, "admin@civic.test"), old_hash);
        assert!(repo.authenticate("admin@civic.test", "new-password").unwrap().is_some());
        assert!(repo.authenticate("admin@civic.test", "old-password").unwrap().is_none());
    }

    #[test]
    fn test_operator_rename_keeps_hash() {
        let (db, repo) = setup();
        repo.upsert_operator("admin@civic.test", "Admin", "pw-12345").unwrap();
        let hash = stored_hash(&db, "admin@civic.test");

        let outcome = repo.upsert_operator("admin@civic.test", "Site Operator", "pw-12345").unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(stored_hash(&db, "admin@civic.test"), hash);
        let user = repo.get_by_email("admin@civic.test").unwrap().unwrap();
        assert_eq!(user.name, "Site Operator");
        assert!(user.is_admin);
    }

    #[test]
    fn test_existing_user_is_promoted() {
        let (_db, repo) = setup();
        let user = repo.create("editor@civic.test", "Editor", "pw-12345").unwrap();
        assert!(!user.is_admin);

        let outcome = repo.upsert_operator("editor@civic.test", "Editor", "pw-12345").unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert!(repo.get_by_id(&user.id).unwrap().unwrap().is_admin);
    }

    #[test]
    fn test_authenticate_unknown_email() {
        let (_db, repo) = setup();
        assert!(repo.authenticate("nobody@civic.test", "pw").unwrap().is_none());
    }

    #[test]
    fn test_email_lookup_is_case_insensitive() {
        let (_db, repo) = setup();
        repo.create("Mixed@Civic.Test", "Mixed", "pw-12345").unwrap();
        assert!(repo.get_by_email("mixed@civic.test").unwrap().is_some());
        assert!(repo.authenticate("MIXED@civic.test", "pw-12345").unwrap().is_some());
    }
}
