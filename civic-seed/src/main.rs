use anyhow::{Context, Result};
use clap::Parser;
use civic_server::config::Settings;
use civic_server::db::Database;
use civic_server::seed::{Loader, OperatorSeed, ReferenceCatalog, SeedReport};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Civic reference data loader
///
/// Writes the region and office catalog plus the operator account. Safe to
/// run any number of times; rows already matching the catalog are left alone.
#[derive(Parser, Debug)]
#[command(name = "civic-seed")]
#[command(about = "Load reference data into a Civic database", long_about = None)]
struct Args {
    /// Path to the SQLite database file (defaults to the configured path)
    #[arg(short, long)]
    database: Option<String>,

    /// Settings file to read instead of settings.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON catalog to load instead of the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Validate the catalog and connection without writing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Stop at the first failing tuple
    #[arg(long)]
    fail_fast: bool,
}

/// Read a catalog file, falling back to the built-in tuples
fn load_catalog(path: Option<&Path>) -> Result<ReferenceCatalog> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read catalog {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse catalog {}", path.display()))
        }
        None => Ok(ReferenceCatalog::standard()),
    }
}

/// Build the operator account from settings; a missing password is fatal
fn operator_from_settings(settings: &Settings) -> Result<OperatorSeed> {
    let password = settings
        .seed
        .admin_password
        .clone()
        .filter(|p| !p.is_empty())
        .context("No operator password configured; set CIVIC_ADMIN_PASSWORD or seed.admin_password")?;

    let operator = OperatorSeed::new(
        settings.seed.admin_email.clone(),
        settings.seed.admin_name.clone(),
        password,
    );
    operator.validate().map_err(anyhow::Error::msg)?;
    Ok(operator)
}

/// Check the catalog for blank keys and report repeats
fn validate_catalog(catalog: &ReferenceCatalog) -> Result<()> {
    let blanks = catalog.blank_entries();
    if !blanks.is_empty() {
        anyhow::bail!("Catalog has blank entries: {}", blanks.join(", "));
    }
    for code in catalog.duplicate_region_codes() {
        println!("Warning: region code {} repeats; the last entry wins", code);
    }
    for name in catalog.duplicate_office_names() {
        println!("Warning: office '{}' repeats; the last entry wins", name);
    }
    Ok(())
}

/// Open the database, creating the schema unless this is a dry run
fn connect_database(path: &str, dry_run: bool) -> Result<Database> {
    println!("Connecting to database: {}", path);

    if dry_run && !Path::new(path).exists() {
        anyhow::bail!("Database file not found: {}", path);
    }

    let db = Database::new(path).context("Failed to open database connection")?;

    if dry_run {
        let missing = db.missing_tables()?;
        if !missing.is_empty() {
            anyhow::bail!("Database schema is incomplete - missing tables: {}", missing.join(", "));
        }
    } else {
        db.initialize().context("Failed to initialize database schema")?;
    }

    println!("Database connection successful - schema validated");
    Ok(db)
}

fn display_report(report: &SeedReport) {
    println!();
    println!("Seed Summary");
    println!("============");
    println!();
    println!(
        "Regions: {} inserted, {} updated, {} unchanged",
        report.regions.inserted, report.regions.updated, report.regions.unchanged
    );
    println!(
        "Offices: {} inserted, {} updated, {} unchanged",
        report.offices.inserted, report.offices.updated, report.offices.unchanged
    );
    match report.operator {
        Some(outcome) => println!("Operator: {:?}", outcome),
        None => println!("Operator: not written"),
    }

    if !report.failures.is_empty() {
        println!();
        println!("Errors encountered: {}", report.failures.len());
        for (i, failure) in report.failures.iter().enumerate() {
            println!("  {}. {}", i + 1, failure);
        }
        if report.aborted {
            println!("Stopped at the first failure (--fail-fast).");
        }
    }
}

fn run(args: Args) -> Result<()> {
    let settings = Settings::load(args.config.clone()).context("Failed to load settings")?;
    let database = args
        .database
        .clone()
        .unwrap_or_else(|| settings.database.path.clone());

    println!("Civic Reference Data Loader");
    println!("===========================");
    println!();
    println!("Database: {}", database);
    println!("Dry run: {}", args.dry_run);
    println!();

    let catalog = load_catalog(args.catalog.as_deref())?;
    validate_catalog(&catalog)?;
    println!(
        "Catalog: {} regions, {} offices",
        catalog.regions.len(),
        catalog.offices.len()
    );

    let operator = operator_from_settings(&settings)?;
    let db = connect_database(&database, args.dry_run)?;

    if args.dry_run {
        println!();
        println!("This was a dry run - no changes were made to the database.");
        return Ok(());
    }

    let report = Loader::new(&db).fail_fast(args.fail_fast).run(&catalog, &operator);
    display_report(&report);
    report.into_result()?;

    println!();
    println!("Reference data loaded successfully!");
    Ok(())
}

fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civic_server=info,civic_seed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(Args::parse()) {
        tracing::error!("Seeding failed: {:#}", e);
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn settings_with_password(password: Option<&str>) -> Settings {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let password_line = password
            .map(|p| format!("admin_password = \"{}\"\n", p))
            .unwrap_or_default();
        writeln!(
            file,
            "[seed]\nadmin_email = \"ops@civic.test\"\nadmin_name = \"Ops\"\n{}",
            password_line
        )
        .unwrap();
        Settings::load(Some(file.path().to_path_buf())).unwrap()
    }

    #[test]
    fn test_missing_password_is_a_configuration_error() {
        if std::env::var("CIVIC_ADMIN_PASSWORD").is_ok() {
            return;
        }
        let settings = settings_with_password(None);
        let err = operator_from_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("CIVIC_ADMIN_PASSWORD"));
    }

    #[test]
    fn test_operator_built_from_settings() {
        if std::env::var("CIVIC_ADMIN_PASSWORD").is_ok() {
            return;
        }
        let settings = settings_with_password(Some("long-enough-pw"));
        let operator = operator_from_settings(&settings).unwrap();
        assert_eq!(operator.password, "long-enough-pw");
    }

    #[test]
    fn test_catalog_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"regions": [{{"code": "GU", "name": "Guam", "group": "Territories"}}]}}"#
        )
        .unwrap();
        let catalog = load_catalog(Some(file.path())).unwrap();
        assert_eq!(catalog.regions.len(), 1);
        assert!(catalog.offices.is_empty());
    }

    #[test]
    fn test_blank_catalog_entry_is_rejected() {
        let catalog = ReferenceCatalog {
            regions: vec![civic_server::seed::RegionSeed {
                code: " ".into(),
                name: "Nowhere".into(),
                group: "None".into(),
            }],
            offices: vec![],
        };
        assert!(validate_catalog(&catalog).is_err());
    }

    #[test]
    fn test_dry_run_requires_existing_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("civic.db");
        let path = path.to_str().unwrap();

        assert!(connect_database(path, true).is_err());
        connect_database(path, false).unwrap();
        assert!(connect_database(path, true).is_ok());
    }

    #[test]
    fn test_full_run_against_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("civic.db");
        let db = connect_database(path.to_str().unwrap(), false).unwrap();
        let operator = OperatorSeed::new("ops@civic.test", "Ops", "long-enough-pw");

        let first = Loader::new(&db).run(&ReferenceCatalog::standard(), &operator);
        assert!(first.into_result().is_ok());
        let second = Loader::new(&db).run(&ReferenceCatalog::standard(), &operator);
        assert_eq!(second.regions.inserted, 0);
    }
}
