use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::scoring::ScoringTables;

/// Application configuration loaded from environment variables.
/// Everything is optional; defaults give an in-memory, default-table setup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub rust_log: String,
    pub scoring_tables_path: Option<PathBuf>,
    pub history_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            scoring_tables_path: optional_env("SCORING_TABLES_PATH").map(PathBuf::from),
            history_limit: std::env::var("HISTORY_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<usize>()
                .context("HISTORY_LIMIT must be a non-negative integer")?,
        })
    }

    /// Scoring tables from `SCORING_TABLES_PATH`, or the built-in defaults.
    pub fn load_tables(&self) -> Result<ScoringTables> {
        match &self.scoring_tables_path {
            Some(path) => {
                let tables = ScoringTables::from_json_file(path)?;
                info!(
                    "Loaded scoring tables v{} from {}",
                    tables.version,
                    path.display()
                );
                Ok(tables)
            }
            None => Ok(ScoringTables::default()),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
