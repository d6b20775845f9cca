use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use civic_types::Region;

use super::{timestamp_column, uuid_column, UpsertOutcome};
use crate::db::DbPool;

const REGION_COLUMNS: &str = "id, code, name, region_group, created_at, updated_at";

pub struct RegionRepository {
    pool: DbPool,
}

impl RegionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Region> {
        Ok(Region {
            id: uuid_column(row, 0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            group: row.get(3)?,
            created_at: timestamp_column(row, 4)?,
            updated_at: timestamp_column(row, 5)?,
        })
    }

    /// Update the region with this code, or insert it if absent.
    ///
    /// Rows whose attributes already match are left untouched, including
    /// `updated_at`.
    pub fn upsert(&self, code: &str, name: &str, group: &str) -> Result<UpsertOutcome> {
        let conn = self.pool.get()?;
        let now = Utc::now().to_rfc3339();

        let updated = conn
            .execute(
                "UPDATE regions SET name = ?2, region_group = ?3, updated_at = ?4
                 WHERE code = ?1 AND (name IS NOT ?2 OR region_group IS NOT ?3)",
                params![code, name, group, now],
            )
            .with_context(|| format!("Failed to update region {}", code))?;
        if updated > 0 {
            return Ok(UpsertOutcome::Updated);
        }

        let inserted = conn
            .execute(
                "INSERT INTO regions (id, code, name, region_group, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT(code) DO NOTHING",
                params![Uuid::new_v4().to_string(), code, name, group, now],
            )
            .with_context(|| format!("Failed to insert region {}", code))?;

        Ok(if inserted > 0 {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Unchanged
        })
    }

    /// Get region by its code
    pub fn get_by_code(&self, code: &str) -> Result<Option<Region>> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM regions WHERE code = ?", REGION_COLUMNS);
        let region = conn
            .query_row(&sql, [code], Self::map_row)
            .optional()?;
        Ok(region)
    }

    /// List regions ordered by group then code, optionally restricted to one group
    pub fn list(&self, group: Option<&str>) -> Result<Vec<Region>> {
        let conn = self.pool.get()?;
        let regions = match group {
            Some(group) => {
                let sql = format!(
                    "SELECT {} FROM regions WHERE region_group = ? COLLATE NOCASE ORDER BY code",
                    REGION_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([group], Self::map_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let sql = format!("SELECT {} FROM regions ORDER BY region_group, code", REGION_COLUMNS);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], Self::map_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(regions)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.pool.get()?;
        let count = conn.query_row("SELECT COUNT(*) FROM regions", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup() -> RegionRepository {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        RegionRepository::new(db.pool)
    }

    #[test]
    fn test_upsert_inserts_then_reports_unchanged() {
        let repo = setup();
        assert_eq!(repo.upsert("OR", "Oregon", "West").unwrap(), UpsertOutcome::Inserted);
        assert_eq!(repo.upsert("OR", "Oregon", "West").unwrap(), UpsertOutcome::Unchanged);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_upsert_updates_attributes_but_keeps_identity() {
        let repo = setup();
        repo.upsert("DC", "Washington", "South").unwrap();
        let before = repo.get_by_code("DC").unwrap().unwrap();

        let outcome = repo.upsert("DC", "District of Columbia", "South").unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);

        let after = repo.get_by_code("DC").unwrap().unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.name, "District of Columbia");
        assert!(after.updated_at >= before.updated_at);
    }

    #[test]
    fn test_list_filters_by_group() {
        let repo = setup();
        repo.upsert("ME", "Maine", "Northeast").unwrap();
        repo.upsert("CA", "California", "West").unwrap();
        repo.upsert("WA", "Washington", "West").unwrap();

        let west = repo.list(Some("west")).unwrap();
        let codes: Vec<_> = west.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["CA", "WA"]);
        assert_eq!(repo.list(None).unwrap().len(), 3);
    }

    #[test]
    fn test_list_keeps_groups_contiguous() {
        let repo = setup();
        repo.upsert("WA", "Washington", "West").unwrap();
        repo.upsert("AL", "Alabama", "South").unwrap();
        repo.upsert("CA", "California", "West").unwrap();
        repo.upsert("TX", "Texas", "South").unwrap();

        let codes: Vec<_> = repo
            .list(None)
            .unwrap()
            .into_iter()
            .map(|r| r.code)
            .collect();
        assert_eq!(codes, vec!["AL", "TX", "CA", "WA"]);
    }

    #[test]
    fn test_get_unknown_code() {
        let repo = setup();
        assert!(repo.get_by_code("ZZ").unwrap().is_none());
    }
}
