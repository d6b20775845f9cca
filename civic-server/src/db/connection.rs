use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

use super::schema::{REQUIRED_TABLES, SCHEMA};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let in_memory = Self::is_memory_path(path.as_ref());
        let manager = Self::create_connection_manager(path)?.with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        });

        let mut builder = Pool::builder();
        if in_memory {
            // A shared-cache memory database is gone once its last connection closes
            builder = builder.max_lifetime(None).idle_timeout(None);
        }
        let pool = builder
            .build(manager)
            .context("Failed to create database connection pool")?;
        Ok(Self { pool })
    }

    fn is_memory_path(path: &Path) -> bool {
        path.to_string_lossy().trim().eq_ignore_ascii_case(MEMORY_DB_PATH)
    }

    /// Create appropriate connection manager based on path
    ///
    /// `:memory:` maps to a uniquely named shared-cache database so that every
    /// pooled connection sees the same tables.
    fn create_connection_manager<P: AsRef<Path>>(path: P) -> Result<SqliteConnectionManager> {
        if Self::is_memory_path(path.as_ref()) {
            let uri = format!("file:civic-{}?mode=memory&cache=shared", Uuid::new_v4());
            Ok(SqliteConnectionManager::file(uri))
        } else {
            Ok(SqliteConnectionManager::file(path))
        }
    }

    /// Create an in-memory database pool.
    ///
    /// Pooled connections are never recycled, so the database lives as long
    /// as the pool does.
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Initialize the database schema
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Names of required tables missing from the database
    pub fn missing_tables(&self) -> Result<Vec<&'static str>> {
        let conn = self.connection()?;
        let mut missing = Vec::new();
        for table in REQUIRED_TABLES {
            let exists: bool = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get::<_, i32>(0).map(|count| count > 0),
                )
                .with_context(|| format!("Failed to check for {} table", table))?;
            if !exists {
                missing.push(*table);
            }
        }
        Ok(missing)
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_creation() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let conn = db.connection().expect("Failed to get connection");
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .expect("Failed to prepare statement");

        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .expect("Failed to query tables")
            .collect::<Result<Vec<_>, _>>()
            .expect("Failed to collect tables");

        for table in REQUIRED_TABLES {
            assert!(tables.contains(&table.to_string()), "missing {}", table);
        }
    }

    #[test]
    fn test_initialize_is_repeatable() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("first initialize");
        db.initialize().expect("second initialize");
        assert!(db.missing_tables().unwrap().is_empty());
    }

    #[test]
    fn test_missing_tables_before_initialize() {
        let db = Database::in_memory().expect("Failed to create database");
        let missing = db.missing_tables().unwrap();
        assert_eq!(missing.len(), REQUIRED_TABLES.len());
    }

    #[test]
    fn test_pooled_connections_share_memory_database() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let first = db.connection().unwrap();
        let second = db.connection().unwrap();
        first
            .execute(
                "INSERT INTO regions (id, code, name, region_group, created_at, updated_at)
                 VALUES ('r1', 'XX', 'Test', 'Group', 'now', 'now')",
                [],
            )
            .unwrap();
        let count: i32 = second
            .query_row("SELECT COUNT(*) FROM regions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_separate_memory_databases_are_isolated() {
        let a = Database::in_memory().unwrap();
        let b = Database::in_memory().unwrap();
        a.initialize().unwrap();
        assert!(a.missing_tables().unwrap().is_empty());
        assert!(!b.missing_tables().unwrap().is_empty());
    }

    #[test]
    fn test_memory_pool_never_recycles_connections() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.pool.max_lifetime(), None);
        assert_eq!(db.pool.idle_timeout(), None);

        let dir = tempfile::tempdir().unwrap();
        let file_db = Database::new(dir.path().join("civic.db")).unwrap();
        assert!(file_db.pool.max_lifetime().is_some());
    }

    #[test]
    fn test_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("civic.db");
        let db = Database::new(&path).expect("Failed to create file database");
        db.initialize().expect("Failed to initialize file schema");
        assert!(path.exists());
    }
}
