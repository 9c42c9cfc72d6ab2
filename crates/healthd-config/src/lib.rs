//! Configuration management for healthd
//!
//! The daemon reads one TOML file describing where the battery, charger and
//! boot disk attributes live, plus how often to poll them. Any key can be
//! overridden from the environment as `HEALTHD_<SECTION>__<KEY>`, e.g.
//! `HEALTHD_SERVICE__POLL_INTERVAL_SECS=10`.

use healthd_telemetry::{BatteryConfig, DiskConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Standard configuration directory
pub const CONFIG_DIR: &str = "/etc/healthd";

/// Configuration file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "healthd.toml";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "HEALTHD";

/// Polling behaviour of the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Seconds between two polls
    pub poll_interval_secs: u64,
    /// Log every sampled record at debug level
    pub log_snapshots: bool,
}

impl ServiceConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            log_snapshots: true,
        }
    }
}

/// Main healthd configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthdConfig {
    #[serde(default)]
    pub battery: BatteryConfig,

    #[serde(default)]
    pub disk: DiskConfig,

    #[serde(default)]
    pub service: ServiceConfig,
}

impl HealthdConfig {
    /// Load configuration from a file, applying environment overrides
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Self::build(Some(path), ENV_PREFIX)
    }

    /// Load from the default location, falling back to built-in defaults
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            return Self::load(&path);
        }

        tracing::warn!("No configuration file found, using defaults");
        Self::build(None, ENV_PREFIX)
    }

    pub fn default_path() -> PathBuf {
        Path::new(CONFIG_DIR).join(CONFIG_FILE)
    }

    fn build(path: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            let file = config::File::from(path).format(config::FileFormat::Toml);
            builder = builder.add_source(file);
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the samplers cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "service.poll_interval_secs must be greater than zero".into(),
            ));
        }

        let names = [
            ("battery.battery", &self.battery.battery),
            ("battery.ac_charger", &self.battery.ac_charger),
            ("battery.usb_charger", &self.battery.usb_charger),
        ];
        for (key, name) in names {
            if name.is_empty() || name.contains('/') {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a plain device name, got {:?}",
                    key, name
                )));
            }
        }

        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Sampler configuration
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            battery: self.battery.clone(),
            disk: self.disk.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthd_telemetry::BootDevice;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = HealthdConfig::default();
        assert_eq!(config.service.poll_interval(), Duration::from_secs(60));
        assert!(config.service.log_snapshots);
        assert_eq!(config.battery.battery, "dummy-battery");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
[battery]
power_supply_root = "/tmp/power_supply"
battery = "bq27441-0"

[disk]
device = "emmc"

[service]
poll_interval_secs = 10
"#;
        write!(temp_file, "{}", config_content).unwrap();

        let config = HealthdConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.battery.battery, "bq27441-0");
        assert_eq!(config.battery.ac_charger, "dummy-charger-ac");
        assert_eq!(
            config.battery.power_supply_root,
            PathBuf::from("/tmp/power_supply")
        );
        assert_eq!(config.disk.device, BootDevice::Emmc);
        assert!(config.disk.is_boot_device);
        assert_eq!(config.service.poll_interval_secs, 10);
        assert!(config.service.log_snapshots);
    }

    #[test]
    fn test_load_missing_file() {
        let err = HealthdConfig::load(Path::new("/nonexistent/healthd.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
        assert!(format!("{}", err).contains("not found"));
    }

    #[test]
    fn test_save_config() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut config = HealthdConfig::default();
        config.disk.device = BootDevice::Emmc;
        config.service.poll_interval_secs = 5;

        config.save(temp_file.path()).unwrap();

        let loaded = HealthdConfig::load(temp_file.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = HealthdConfig::default();
        config.service.poll_interval_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_path_names() {
        let mut config = HealthdConfig::default();
        config.battery.usb_charger = "../usb".into();
        let err = config.validate().unwrap_err();
        assert!(format!("{}", err).contains("battery.usb_charger"));

        config.battery.usb_charger = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "[service]\npoll_interval_secs = 0\n").unwrap();
        assert!(matches!(
            HealthdConfig::load(temp_file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "[service]\npoll_interval_secs = 30\n").unwrap();

        // Unique prefix so parallel tests never see this variable
        let prefix = "HEALTHD_TEST_OVERLAY";
        unsafe {
            std::env::set_var("HEALTHD_TEST_OVERLAY_SERVICE__POLL_INTERVAL_SECS", "7");
        }

        let config = HealthdConfig::build(Some(temp_file.path()), prefix).unwrap();
        assert_eq!(config.service.poll_interval_secs, 7);

        unsafe {
            std::env::remove_var("HEALTHD_TEST_OVERLAY_SERVICE__POLL_INTERVAL_SECS");
        }
    }

    #[test]
    fn test_telemetry_config() {
        let config = HealthdConfig::default();
        let telemetry = config.telemetry();
        assert_eq!(telemetry.battery, config.battery);
        assert_eq!(telemetry.disk.stats_path(), config.disk.stats_path());
    }
}
