// Service configuration.
// Loaded from an optional TOML file; every key has a default matching the stock
// `input/` layout next to the binary.

use crate::common::errors::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "PAGER_REPORT_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Interface the HTTP server binds to
    pub bind: String,

    /// HTTP port; `PORT` in the environment wins over the file
    pub port: u16,

    /// Report template whose first two sheets receive the writes
    pub template_path: PathBuf,

    /// Workbook with the "ER Channels" and "CPRP Channels" reference sheets
    pub reference_path: PathBuf,

    /// Directory receiving decoded uploads (one temp dir per request inside it)
    pub upload_dir: PathBuf,

    pub ratings: RatingsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingsConfig {
    /// SQLite ratings store; ratings are skipped (zeros) when unset
    pub database: Option<PathBuf>,

    /// Attempts per region query, each on a fresh connection
    pub attempts: u32,

    /// Lock wait applied to every ratings connection
    pub busy_timeout_ms: u64,

    /// When set, every successful fetch is exported as an audit workbook here
    pub export_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let input = PathBuf::from("input");
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            template_path: input.join("Skeleton Output.xlsx"),
            reference_path: input.join("ER and CPRP Channels TV and Digital CTV-Mobile CPM.xlsx"),
            upload_dir: input.join("non_cricket_input"),
            ratings: RatingsConfig::default(),
        }
    }
}

impl Default for RatingsConfig {
    fn default() -> Self {
        Self {
            database: None,
            attempts: 3,
            busy_timeout_ms: 30_000,
            export_dir: None,
        }
    }
}

impl ServiceConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Ok(port) = std::env::var("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("PORT is not a valid port: '{port}'")))?;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, AppError> {
        let config: Self = toml::from_str(text).map_err(|e| AppError::Config(e.to_string()))?;
        if config.ratings.attempts == 0 {
            return Err(AppError::Config(
                "ratings.attempts must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
