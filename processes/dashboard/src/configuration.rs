use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use config::{Case, Config, Environment, File, FileFormat};
use serde::Deserialize;

/// Dashboard configuration (from TOML, environment and flags).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DashboardConfig {
    pub window_capacity: usize,
    pub rate_interval_ms: u64,
    pub forest_refresh_ms: u64,
    pub tf_echo_interval_ms: u64,
    pub poll_timeout_ms: u64,
    pub log_file: PathBuf,
    pub log_filter: String,
    #[serde(default)]
    pub source: SourceConfig,
}

/// Where bus data comes from. `connect` wins over `file` when both are set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SourceConfig {
    pub file: Option<PathBuf>,
    pub connect: Option<String>,
}

/// Values given on the command line, applied over every other layer
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub connect: Option<String>,
    pub window_capacity: Option<u64>,
    pub forest_refresh_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl DashboardConfig {
    /// Embedded defaults, then the optional config file, then `ROSWATCH_*`
    /// environment variables, then command line overrides
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let mut builder = Config::builder().add_source(File::from_str(
            include_str!("../config.default.toml"),
            FileFormat::Toml,
        ));
        if let Some(path) = &overrides.config_file {
            builder = builder.add_source(File::from(path.as_path()));
        }

        let config = builder
            .add_source(Environment::with_prefix("ROSWATCH").convert_case(Case::Kebab))
            .set_override_option("window-capacity", overrides.window_capacity)?
            .set_override_option("forest-refresh-ms", overrides.forest_refresh_ms)?
            .set_override_option(
                "log-file",
                overrides.log_file.as_ref().map(|p| p.display().to_string()),
            )?
            .set_override_option(
                "source.file",
                overrides.file.as_ref().map(|p| p.display().to_string()),
            )?
            .set_override_option("source.connect", overrides.connect.clone())?
            .build()?;

        let config: DashboardConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_capacity == 0 {
            bail!("window-capacity must be at least 1");
        }
        for (key, value) in [
            ("rate-interval-ms", self.rate_interval_ms),
            ("forest-refresh-ms", self.forest_refresh_ms),
            ("tf-echo-interval-ms", self.tf_echo_interval_ms),
            ("poll-timeout-ms", self.poll_timeout_ms),
        ] {
            if value == 0 {
                bail!("{key} must be greater than zero");
            }
        }
        Ok(())
    }

    pub fn rate_interval(&self) -> Duration {
        Duration::from_millis(self.rate_interval_ms)
    }

    pub fn forest_refresh(&self) -> Duration {
        Duration::from_millis(self.forest_refresh_ms)
    }

    pub fn tf_echo_interval(&self) -> Duration {
        Duration::from_millis(self.tf_echo_interval_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            window_capacity: defaults::WINDOW_CAPACITY,
            rate_interval_ms: defaults::RATE_INTERVAL_MS,
            forest_refresh_ms: defaults::FOREST_REFRESH_MS,
            tf_echo_interval_ms: defaults::TF_ECHO_INTERVAL_MS,
            poll_timeout_ms: defaults::POLL_TIMEOUT_MS,
            log_file: PathBuf::from(defaults::LOG_FILE),
            log_filter: "info".to_string(),
            source: SourceConfig::default(),
        }
    }
}

mod defaults {
    pub const WINDOW_CAPACITY: usize = roswatch_common::DEFAULT_WINDOW_CAPACITY;
    pub const RATE_INTERVAL_MS: u64 = 1000;
    pub const FOREST_REFRESH_MS: u64 = 1000;
    pub const TF_ECHO_INTERVAL_MS: u64 = 100;
    pub const POLL_TIMEOUT_MS: u64 = 100;
    pub const LOG_FILE: &str = "/tmp/roswatch.log";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_defaults_match_code_defaults() {
        let config = DashboardConfig::load(&Overrides::default()).unwrap();
        let defaults = DashboardConfig::default();
        assert_eq!(config.window_capacity, defaults.window_capacity);
        assert_eq!(config.rate_interval(), Duration::from_secs(1));
        assert_eq!(config.tf_echo_interval(), Duration::from_millis(100));
        assert_eq!(config.log_file, defaults.log_file);
        assert_eq!(config.source.file, Some(PathBuf::from("bus.json")));
        assert_eq!(config.source.connect, None);
    }

    #[test]
    fn config_file_then_flags() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "window-capacity = 10\nrate-interval-ms = 500").unwrap();
        writeln!(file, "[source]\nconnect = \"robot:9090\"").unwrap();

        let overrides = Overrides {
            config_file: Some(file.path().to_path_buf()),
            window_capacity: Some(20),
            ..Default::default()
        };
        let config = DashboardConfig::load(&overrides).unwrap();
        assert_eq!(config.window_capacity, 20);
        assert_eq!(config.rate_interval_ms, 500);
        assert_eq!(config.source.connect.as_deref(), Some("robot:9090"));
    }

    #[test]
    fn zero_window_is_rejected() {
        let overrides = Overrides {
            window_capacity: Some(0),
            ..Default::default()
        };
        let err = DashboardConfig::load(&overrides).unwrap_err();
        assert!(err.to_string().contains("window-capacity"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = DashboardConfig {
            tf_echo_interval_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "tf-echo-interval-ms must be greater than zero");
    }
}
