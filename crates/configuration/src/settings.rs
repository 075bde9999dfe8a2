use crate::error::ConfigError;
use core_types::Platform;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub report: ReportSettings,
    pub logging: LoggingSettings,
    pub store: StoreSettings,
}

impl Settings {
    /// Rejects settings that would make every report empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.report.platforms.is_empty() {
            return Err(ConfigError::ValidationError(
                "report.platforms must name at least one platform".to_string(),
            ));
        }
        if self.report.top_products == 0 {
            return Err(ConfigError::ValidationError(
                "report.top_products must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// What period reports include.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Platforms shown in reports and exports, e.g. `["woocommerce", "facebook_ads"]`.
    pub platforms: Vec<Platform>,
    /// Length of the top-product rankings.
    pub top_products: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            platforms: Platform::ALL.to_vec(),
            top_products: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level; `RUST_LOG` takes precedence when set.
    pub level: LogLevel,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

/// Where snapshots are read from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// A JSON fixture to serve from memory instead of connecting to Postgres.
    pub fixture: Option<PathBuf>,
}
