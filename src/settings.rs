//! Runtime settings with layered sources.
//!
//! Resolution order: built-in defaults, then an optional TOML settings
//! file, then `RELAY_DOCTOR_*` environment variables, then explicit CLI
//! overrides.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// Backend base URL.
    pub endpoint: String,
    /// Seconds between refresh cycles.
    pub refresh_secs: u64,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            refresh_secs: 5,
            timeout_secs: 10,
        }
    }
}

/// Values given on the command line. Set fields win over every other
/// source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub refresh_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl Settings {
    /// Load settings from all sources.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default("endpoint", defaults.endpoint)?
            .set_default("refresh_secs", defaults.refresh_secs)?
            .set_default("timeout_secs", defaults.timeout_secs)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path.to_path_buf()).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("RELAY_DOCTOR").try_parsing(true),
        );

        let mut settings: Settings = builder
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .context("failed to load settings")?;

        if let Some(endpoint) = &overrides.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(refresh) = overrides.refresh_secs {
            settings.refresh_secs = refresh;
        }
        if let Some(timeout) = overrides.timeout_secs {
            settings.timeout_secs = timeout;
        }

        ensure!(settings.refresh_secs > 0, "refresh interval must be positive");
        ensure!(settings.timeout_secs > 0, "request timeout must be positive");

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_sources() {
        let settings = Settings::load(None, &Overrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "endpoint = \"http://relay.local:9000\"").unwrap();
        writeln!(file, "refresh_secs = 2").unwrap();
        file.flush().unwrap();

        let settings = Settings::load(Some(file.path()), &Overrides::default()).unwrap();
        assert_eq!(settings.endpoint, "http://relay.local:9000");
        assert_eq!(settings.refresh_secs, 2);
        assert_eq!(settings.timeout_secs, 10);
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "endpoint = \"http://relay.local:9000\"").unwrap();
        file.flush().unwrap();

        let overrides = Overrides {
            endpoint: Some("http://cli.local:1234".to_string()),
            refresh_secs: Some(30),
            timeout_secs: None,
        };
        let settings = Settings::load(Some(file.path()), &overrides).unwrap();
        assert_eq!(settings.endpoint, "http://cli.local:1234");
        assert_eq!(settings.refresh_secs, 30);
    }

    #[test]
    fn test_zero_refresh_rejected() {
        let overrides = Overrides {
            refresh_secs: Some(0),
            ..Overrides::default()
        };
        assert!(Settings::load(None, &overrides).is_err());
    }
}
