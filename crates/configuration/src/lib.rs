use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{ApiSettings, CacheSettings, LoggingSettings, PersistenceSettings, Settings};

/// The settings file read when no other path is given.
pub const DEFAULT_SETTINGS_FILE: &str = "bankiq.toml";

/// Command-line flag selecting the settings file, flattened into a binary's own `clap` parser.
#[cfg(feature = "clap")]
#[derive(Debug, Clone, clap::Args)]
pub struct SettingsArgs {
    /// Path to the TOML settings file.
    #[arg(long = "config", global = true, default_value = DEFAULT_SETTINGS_FILE)]
    pub config_path: std::path::PathBuf,
}

/// Loads the application settings.
///
/// Sources are layered: built-in defaults, then the TOML file at `path` (which
/// may be absent), then `BANKIQ__`-prefixed environment variables, e.g.
/// `BANKIQ__API__BASE_URL`. The result is validated before it is returned.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("BANKIQ")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;
    tracing::debug!(?settings, "Settings loaded.");

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.cache.stale_secs, 300);
        assert_eq!(settings.api.timeout_secs, 30);
        assert_eq!(settings.persistence.path.to_str(), Some("bankiq-state.json"));
    }

    #[test]
    fn file_overrides_only_what_it_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bankiq.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[api]\nbase_url = \"https://reports.example\"\n\n[cache]\nstale_secs = 60").unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.api.base_url, "https://reports.example");
        assert_eq!(settings.api.timeout_secs, 30);
        assert_eq!(settings.cache.stale_after().as_secs(), 60);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut settings = Settings::default();
        settings.api.timeout_secs = 0;
        assert!(matches!(settings.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let mut settings = Settings::default();
        settings.api.base_url = "  ".to_string();
        assert!(settings.validate().is_err());
    }
}
