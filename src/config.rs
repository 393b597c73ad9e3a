use crate::command::DEFAULT_MAX_DEPTH;
use crate::error::{ReelError, ReelResult};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the catalog.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    /// Undo steps kept per session.
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                path: PathBuf::from("movies.json"),
            },
            history: HistoryConfig {
                max_depth: DEFAULT_MAX_DEPTH,
            },
            logging: LoggingConfig {
                filter: "info".to_string(),
                json: false,
            },
        }
    }
}

/// Load configuration from defaults, an optional `reel.*` file in the working
/// directory, an optional explicit file, and `REEL__*` environment variables,
/// in increasing precedence.
pub fn load_config(path: Option<&Path>) -> ReelResult<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = Config::builder()
        .set_default(
            "storage.path",
            defaults.storage.path.to_string_lossy().to_string(),
        )
        .and_then(|b| b.set_default("history.max_depth", defaults.history.max_depth as u64))
        .and_then(|b| b.set_default("logging.filter", defaults.logging.filter.clone()))
        .and_then(|b| b.set_default("logging.json", defaults.logging.json))
        .map_err(|err| ReelError::Config(err.to_string()))?
        .add_source(File::with_name("reel").required(false));

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("REEL").separator("__"));

    let config = builder
        .build()
        .map_err(|err| ReelError::Config(err.to_string()))?;

    let parsed: AppConfig = config
        .try_deserialize()
        .map_err(|err| ReelError::Config(err.to_string()))?;

    if parsed.history.max_depth == 0 {
        return Err(ReelError::Config(
            "history.max_depth must be at least 1".to_string(),
        ));
    }

    Ok(parsed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
