use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub ttl_days: i64,
}

/// Operator account written by the reference data loader
#[derive(Debug, Deserialize)]
pub struct Seed {
    pub admin_email: String,
    pub admin_name: String,
    #[serde(default)]
    pub admin_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub session: Session,
    pub seed: Seed,
}

/// Environment variables that override file settings
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DATABASE_PATH", "database.path"),
    ("PORT", "server.port"),
    ("HOST", "server.host"),
    ("SESSION_TTL_DAYS", "session.ttl_days"),
    ("CIVIC_ADMIN_EMAIL", "seed.admin_email"),
    ("CIVIC_ADMIN_NAME", "seed.admin_name"),
    ("CIVIC_ADMIN_PASSWORD", "seed.admin_password"),
];

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load settings, reading `explicit_file` instead of the default
    /// `settings.toml` search when given
    pub fn load(explicit_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // 1. Settings file
        match explicit_file {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                let config_file_name = "settings.toml";

                let current_dir_path = PathBuf::from(config_file_name);
                if current_dir_path.exists() {
                    builder = builder.add_source(File::from(current_dir_path).required(false));
                }

                // Development layout
                let dev_path = PathBuf::from("civic-server").join(config_file_name);
                if dev_path.exists() {
                    builder = builder.add_source(File::from(dev_path).required(false));
                }
            }
        }

        // 2. Defaults
        builder = builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.path", "civic.db")?
            .set_default("session.ttl_days", 30)?
            .set_default("seed.admin_email", "admin@civic.local")?
            .set_default("seed.admin_name", "Administrator")?;

        // 3. Environment variables (highest priority)
        for (var, key) in ENV_OVERRIDES {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(*key, value)?;
            }
        }

        let s = builder.build()?;
        s.try_deserialize()
    }
}
