use log::LevelFilter;
use simplelog::*;
use std::fs::File;
use std::path::PathBuf;

/// File logging for the civic client; stdout is kept for rendered output
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Master switch to enable/disable all logging
    pub enabled: bool,
    /// Path to the log file
    pub log_file: PathBuf,
    /// Whether to truncate the log file on startup
    pub clear_on_startup: bool,
    pub level: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: PathBuf::from("civic_client.log"),
            clear_on_startup: true,
            level: LevelFilter::Info,
        }
    }
}

impl LogConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Only warnings and errors
    pub fn minimal() -> Self {
        Self {
            level: LevelFilter::Warn,
            ..Default::default()
        }
    }

    /// Everything, including request tracing
    pub fn verbose() -> Self {
        Self {
            level: LevelFilter::Trace,
            ..Default::default()
        }
    }

    pub fn with_file(mut self, log_file: impl Into<PathBuf>) -> Self {
        self.log_file = log_file.into();
        self
    }
}

/// Initialize the logging system with the given configuration
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    if !config.enabled {
        let _ = WriteLogger::init(LevelFilter::Off, Config::default(), std::io::sink());
        return Ok(());
    }

    if config.clear_on_startup {
        let _ = File::create(&config.log_file)?;
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_time_offset_to_local()
        .unwrap_or_else(|builder| builder)
        .build();

    WriteLogger::init(config.level, log_config, log_file)?;

    log::info!(
        "Logging initialized: file={}, level={:?}",
        config.log_file.display(),
        config.level
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(!LogConfig::disabled().enabled);
        assert_eq!(LogConfig::minimal().level, LevelFilter::Warn);
        assert_eq!(LogConfig::verbose().level, LevelFilter::Trace);
        assert_eq!(
            LogConfig::default().with_file("/tmp/x.log").log_file,
            PathBuf::from("/tmp/x.log")
        );
    }
}
