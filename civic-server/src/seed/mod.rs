//! Reference data loader.
//!
//! Writes regions, office types and the operator account by natural key.
//! Every tuple is an independent upsert, so a partially failed run can be
//! repeated safely.

mod catalog;

pub use catalog::{OfficeSeed, OperatorSeed, ReferenceCatalog, RegionSeed};

use anyhow::{anyhow, Result};

use crate::db::repositories::{OfficeRepository, RegionRepository, UpsertOutcome, UserRepository};
use crate::db::Database;

/// Per-entity upsert counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EntityStats {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl EntityStats {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.inserted + self.updated + self.unchanged
    }
}

/// A tuple that could not be written
#[derive(Debug, Clone)]
pub struct SeedFailure {
    pub entity: &'static str,
    pub key: String,
    pub cause: String,
}

impl std::fmt::Display for SeedFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}': {}", self.entity, self.key, self.cause)
    }
}

/// Outcome of one loader run
#[derive(Debug, Default)]
pub struct SeedReport {
    pub regions: EntityStats,
    pub offices: EntityStats,
    pub operator: Option<UpsertOutcome>,
    pub failures: Vec<SeedFailure>,
    /// Set when fail-fast stopped the run before every tuple was attempted
    pub aborted: bool,
}

impl SeedReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn a report with failures into an error carrying every cause
    pub fn into_result(self) -> Result<SeedReport> {
        if self.is_success() {
            return Ok(self);
        }
        let causes: Vec<String> = self.failures.iter().map(|f| f.to_string()).collect();
        Err(anyhow!(
            "Reference data load failed for {} tuple(s): {}",
            self.failures.len(),
            causes.join("; ")
        ))
    }
}

/// Applies a [`ReferenceCatalog`] and operator account to the store
pub struct Loader {
    regions: RegionRepository,
    offices: OfficeRepository,
    users: UserRepository,
    fail_fast: bool,
}

impl Loader {
    pub fn new(db: &Database) -> Self {
        Self {
            regions: RegionRepository::new(db.pool.clone()),
            offices: OfficeRepository::new(db.pool.clone()),
            users: UserRepository::new(db.pool.clone()),
            fail_fast: false,
        }
    }

    /// Stop at the first failing tuple instead of attempting the rest
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn run(&self, catalog: &ReferenceCatalog, operator: &OperatorSeed) -> SeedReport {
        let mut report = SeedReport::default();

        for code in catalog.duplicate_region_codes() {
            tracing::warn!("Region code {} appears more than once; last entry wins", code);
        }
        for name in catalog.duplicate_office_names() {
            tracing::warn!("Office '{}' appears more than once; last entry wins", name);
        }

        for region in &catalog.regions {
            match self.regions.upsert(&region.code, &region.name, &region.group) {
                Ok(outcome) => {
                    tracing::debug!("Region {} {:?}", region.code, outcome);
                    report.regions.record(outcome);
                }
                Err(e) => {
                    if self.record_failure(&mut report, "region", &region.code, e) {
                        return report;
                    }
                }
            }
        }

        for office in &catalog.offices {
            match self
                .offices
                .upsert(&office.name, office.category, office.level, &office.description)
            {
                Ok(outcome) => {
                    tracing::debug!("Office '{}' {:?}", office.name, outcome);
                    report.offices.record(outcome);
                }
                Err(e) => {
                    if self.record_failure(&mut report, "office", &office.name, e) {
                        return report;
                    }
                }
            }
        }

        let operator_result = operator
            .validate()
            .map_err(|msg| anyhow!(msg))
            .and_then(|_| {
                self.users
                    .upsert_operator(&operator.email, &operator.name, &operator.password)
            });
        match operator_result {
            Ok(outcome) => {
                tracing::info!("Operator account {} {:?}", operator.email, outcome);
                report.operator = Some(outcome);
            }
            Err(e) => {
                self.record_failure(&mut report, "operator", &operator.email, e);
            }
        }

        tracing::info!(
            "Seeded regions (+{} ~{} ={}) offices (+{} ~{} ={})",
            report.regions.inserted,
            report.regions.updated,
            report.regions.unchanged,
            report.offices.inserted,
            report.offices.updated,
            report.offices.unchanged,
        );
        report
    }

    /// Returns true when the run should stop
    fn record_failure(
        &self,
        report: &mut SeedReport,
        entity: &'static str,
        key: &str,
        error: anyhow::Error,
    ) -> bool {
        tracing::error!("Failed to seed {} '{}': {:#}", entity, key, error);
        report.failures.push(SeedFailure {
            entity,
            key: key.to_string(),
            cause: format!("{:#}", error),
        });
        if self.fail_fast {
            report.aborted = true;
        }
        self.fail_fast
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Database {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        db
    }

    fn operator() -> OperatorSeed {
        OperatorSeed::new("admin@civic.test", "Administrator", "change-me-please")
    }

    #[test]
    fn test_standard_catalog_first_run_inserts_everything() {
        let db = setup();
        let catalog = ReferenceCatalog::standard();
        let report = Loader::new(&db).run(&catalog, &operator());

        assert!(report.is_success());
        assert_eq!(report.regions.inserted, catalog.regions.len());
        assert_eq!(report.offices.inserted, catalog.offices.len());
        assert_eq!(report.operator, Some(UpsertOutcome::Inserted));
    }

    #[test]
    fn test_second_run_reports_unchanged() {
        let db = setup();
        let catalog = ReferenceCatalog::standard();
        let loader = Loader::new(&db);
        loader.run(&catalog, &operator());
        let report = loader.run(&catalog, &operator());

        assert!(report.is_success());
        assert_eq!(report.regions.unchanged, catalog.regions.len());
        assert_eq!(report.regions.inserted + report.regions.updated, 0);
        assert_eq!(report.offices.unchanged, catalog.offices.len());
        assert_eq!(report.operator, Some(UpsertOutcome::Unchanged));
    }

    #[test]
    fn test_duplicate_region_code_last_write_wins() {
        let db = setup();
        let catalog = ReferenceCatalog {
            regions: vec![
                RegionSeed { code: "GU".into(), name: "Guam (old)".into(), group: "Pacific".into() },
                RegionSeed { code: "GU".into(), name: "Guam".into(), group: "Territories".into() },
            ],
            offices: vec![],
        };
        let report = Loader::new(&db).run(&catalog, &operator());
        assert!(report.is_success());
        assert_eq!(report.regions.inserted, 1);
        assert_eq!(report.regions.updated, 1);

        let regions = RegionRepository::new(db.pool.clone());
        assert_eq!(regions.count().unwrap(), 1);
        let guam = regions.get_by_code("GU").unwrap().unwrap();
        assert_eq!(guam.name, "Guam");
        assert_eq!(guam.group, "Territories");
    }

    #[test]
    fn test_invalid_operator_fails_run_but_keeps_reference_rows() {
        let db = setup();
        let catalog = ReferenceCatalog::standard();
        let bad = OperatorSeed::new("", "Administrator", "change-me-please");
        let report = Loader::new(&db).run(&catalog, &bad);

        assert!(!report.is_success());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].entity, "operator");
        assert_eq!(report.regions.inserted, catalog.regions.len());
        assert!(report.into_result().is_err());

        let regions = RegionRepository::new(db.pool.clone());
        assert_eq!(regions.count().unwrap() as usize, catalog.regions.len());
    }

    #[test]
    fn test_failures_continue_without_fail_fast() {
        // No schema: every tuple fails
        let db = Database::in_memory().unwrap();
        let catalog = ReferenceCatalog::standard();
        let report = Loader::new(&db).run(&catalog, &operator());

        assert!(!report.aborted);
        assert_eq!(
            report.failures.len(),
            catalog.regions.len() + catalog.offices.len() + 1
        );
    }

    #[test]
    fn test_fail_fast_stops_at_first_failure() {
        let db = Database::in_memory().unwrap();
        let catalog = ReferenceCatalog::standard();
        let report = Loader::new(&db).fail_fast(true).run(&catalog, &operator());

        assert!(report.aborted);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].entity, "region");
        let message = report.into_result().unwrap_err().to_string();
        assert!(message.contains("region"));
    }
}
