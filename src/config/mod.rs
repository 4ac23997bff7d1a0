use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Snapshot store selection.
    pub storage: StorageConfig,
    /// SQLite database settings.
    pub database: DatabaseConfig,
    /// Log filter and format.
    pub logging: LoggingConfig,
    /// Session startup behaviour.
    pub session: SessionConfig,
}

/// Where authoring snapshots are saved and loaded
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Which store the session saves to.
    pub backend: StorageBackend,
    /// JSON file used by the file backend.
    pub snapshot_path: PathBuf,
}

/// Snapshot store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// JSON flat file.
    #[default]
    File,
    /// Snapshot row in the SQLite database.
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(AppError::Config {
                message: format!("Unknown storage backend: {}", other),
            }),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database file, created if missing.
    pub path: PathBuf,
    /// Pool size.
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Authoring session behaviour
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Load the stored snapshot before showing the first menu.
    pub load_on_start: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage = StorageConfig {
            backend: env::var("STORY_BACKEND")
                .ok()
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
            snapshot_path: PathBuf::from(
                env::var("STORY_FILE").unwrap_or_else(|_| "./data/story.json".to_string()),
            ),
        };

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/stories.db".to_string()),
            ),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let session = SessionConfig {
            load_on_start: env::var("STORY_LOAD_ON_START")
                .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        };

        Ok(Config {
            storage,
            database,
            logging,
            session,
        })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            snapshot_path: PathBuf::from("./data/story.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}
