use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use uuid::Uuid;

use civic_types::{JurisdictionLevel, Office, OfficeCategory};

use super::{enum_column, timestamp_column, uuid_column, UpsertOutcome};
use crate::db::DbPool;

const OFFICE_COLUMNS: &str = "id, name, category, level, description, created_at, updated_at";

pub struct OfficeRepository {
    pool: DbPool,
}

impl OfficeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Office> {
        Ok(Office {
            id: uuid_column(row, 0)?,
            name: row.get(1)?,
            category: enum_column(row, 2, OfficeCategory::parse)?,
            level: enum_column(row, 3, JurisdictionLevel::parse)?,
            description: row.get(4)?,
            created_at: timestamp_column(row, 5)?,
            updated_at: timestamp_column(row, 6)?,
        })
    }

    /// Update the office with this name, or insert it if absent
    pub fn upsert(
        &self,
        name: &str,
        category: OfficeCategory,
        level: JurisdictionLevel,
        description: &str,
    ) -> Result<UpsertOutcome> {
        let conn = self.pool.get()?;
        let now = Utc::now().to_rfc3339();

        let updated = conn
            .execute(
                "UPDATE offices SET category = ?2, level = ?3, description = ?4, updated_at = ?5
                 WHERE name = ?1
                   AND (category IS NOT ?2 OR level IS NOT ?3 OR description IS NOT ?4)",
                params![name, category.as_str(), level.as_str(), description, now],
            )
            .with_context(|| format!("Failed to update office '{}'", name))?;
        if updated > 0 {
            return Ok(UpsertOutcome::Updated);
        }

        let inserted = conn
            .execute(
                "INSERT INTO offices (id, name, category, level, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                 ON CONFLICT(name) DO NOTHING",
                params![
                    Uuid::new_v4().to_string(),
                    name,
                    category.as_str(),
                    level.as_str(),
                    description,
                    now
                ],
            )
            .with_context(|| format!("Failed to insert office '{}'", name))?;

        Ok(if inserted > 0 {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Unchanged
        })
    }

    pub fn get_by_name(&self, name: &str) -> Result<Option<Office>> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {} FROM offices WHERE name = ?", OFFICE_COLUMNS);
        let office = conn.query_row(&sql, [name], Self::map_row).optional()?;
        Ok(office)
    }

    /// List offices grouped by level then name, optionally for one level
    pub fn list(&self, level: Option<JurisdictionLevel>) -> Result<Vec<Office>> {
        let conn = self.pool.get()?;
        let order = "ORDER BY CASE level WHEN 'federal' THEN 0 WHEN 'state' THEN 1 ELSE 2 END, name";
        let offices = match level {
            Some(level) => {
                let sql = format!("SELECT {} FROM offices WHERE level = ? {}", OFFICE_COLUMNS, order);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([level.as_str()], Self::map_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let sql = format!("SELECT {} FROM offices {}", OFFICE_COLUMNS, order);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], Self::map_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(offices)
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.pool.get()?;
        let count = conn.query_row("SELECT COUNT(*) FROM offices", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup() -> OfficeRepository {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        OfficeRepository::new(db.pool)
    }

    #[test]
    fn test_upsert_roundtrip() {
        let repo = setup();
        let outcome = repo
            .upsert(
                "Governor",
                OfficeCategory::Executive,
                JurisdictionLevel::State,
                "Chief executive of a state",
            )
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);

        let office = repo.get_by_name("Governor").unwrap().unwrap();
        assert_eq!(office.category, OfficeCategory::Executive);
        assert_eq!(office.level, JurisdictionLevel::State);
        assert_eq!(office.created_at, office.updated_at);
    }

    #[test]
    fn test_upsert_changes_description() {
        let repo = setup();
        repo.upsert("Mayor", OfficeCategory::Executive, JurisdictionLevel::Local, "old")
            .unwrap();
        let outcome = repo
            .upsert("Mayor", OfficeCategory::Executive, JurisdictionLevel::Local, "new")
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(repo.get_by_name("Mayor").unwrap().unwrap().description, "new");
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_list_orders_by_level() {
        let repo = setup();
        repo.upsert("Mayor", OfficeCategory::Executive, JurisdictionLevel::Local, "m")
            .unwrap();
        repo.upsert("U.S. Senator", OfficeCategory::Legislative, JurisdictionLevel::Federal, "s")
            .unwrap();
        repo.upsert("Governor", OfficeCategory::Executive, JurisdictionLevel::State, "g")
            .unwrap();

        let names: Vec<_> = repo.list(None).unwrap().into_iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["U.S. Senator", "Governor", "Mayor"]);

        let local = repo.list(Some(JurisdictionLevel::Local)).unwrap();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].name, "Mayor");
    }
}
