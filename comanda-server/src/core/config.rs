use std::path::PathBuf;

/// Server configuration
///
/// # Environment variables
///
/// Every setting can be overridden through the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | Directory holding the database and log files |
/// | ENVIRONMENT | development | development \| production |
/// | LOG_LEVEL | info | Default tracing filter when RUST_LOG is unset |
/// | LOG_TO_FILE | false | Write daily-rolling logs under work_dir/logs |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/comanda LOG_LEVEL=debug cargo run -p comanda-server --example quickstart
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory, holds the database file and logs
    pub work_dir: String,
    /// Runtime environment: development | production
    pub environment: String,
    /// Default log level when RUST_LOG is not set
    pub log_level: String,
    /// Enable daily-rolling file logs
    pub log_to_file: bool,
}

impl Config {
    /// Load the configuration from environment variables
    ///
    /// Unset variables fall back to their defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_to_file: std::env::var("LOG_TO_FILE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Override the work dir, keeping everything else from the environment
    ///
    /// Used by tests and examples
    pub fn with_overrides(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config
    }

    /// Create the work dir layout (database/, logs/) if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    /// Directory holding the embedded database file
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Directory holding rolling log files
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Full path of the embedded database file
    pub fn db_path(&self) -> PathBuf {
        self.database_dir().join("comanda.redb")
    }

    /// Whether this is a production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether this is a development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
