use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{LogLevel, LoggingSettings, ReportSettings, Settings, StoreSettings};

/// Prefix of environment overrides, e.g. `PULSE__REPORT__TOP_PRODUCTS=5`.
pub const ENV_PREFIX: &str = "PULSE";

/// Loads the application configuration from an optional `config.toml` and the environment.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from(None)
}

/// Loads configuration, reading `path` instead of `config.toml` when given.
///
/// A missing default file is fine (every setting has a default); an explicitly named
/// file must exist.
pub fn load_config_from(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config.toml").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("report.platforms"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Platform;

    fn from_toml(toml: &str) -> Result<Settings, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?;
        settings.validate()?;
        Ok(settings)
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings = from_toml("").unwrap();
        assert_eq!(settings.report.platforms, Platform::ALL.to_vec());
        assert_eq!(settings.report.top_products, 10);
        assert_eq!(settings.logging.level, LogLevel::Info);
        assert!(settings.store.fixture.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let settings = from_toml(
            r#"
            [report]
            platforms = ["woocommerce", "facebook_ads"]
            top_products = 3

            [logging]
            level = "debug"
            directory = "logs"

            [store]
            fixture = "fixtures/demo.json"
            "#,
        )
        .unwrap();
        assert_eq!(settings.report.platforms, vec![Platform::WooCommerce, Platform::FacebookAds]);
        assert_eq!(settings.report.top_products, 3);
        assert_eq!(settings.logging.level, LogLevel::Debug);
        assert!(settings.logging.directory.is_some());
        assert!(settings.store.fixture.is_some());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            from_toml("[report]\ntop_products = 0"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            from_toml("[report]\nplatforms = []"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            from_toml("[report]\nplatforms = [\"myspace\"]"),
            Err(ConfigError::LoadError(_))
        ));
    }
}
