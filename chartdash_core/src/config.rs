//! Dashboard configuration
//!
//! Settings are an explicit object handed to the service constructors, not a
//! global lookup. Layered loading follows defaults < config file < `CHARTDASH_`
//! environment variables, and `reload` re-extracts so a changed cache duration
//! is visible at the next cache operation.

use crate::error::{Error, Result, ValidationError};
use crate::timewindow::TimeRange;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::RwLock;
use std::time::Duration;

/// Dashboard core settings
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    /// Whether computed datasets are cached at all
    pub enable_caching: bool,
    /// Cache entry time-to-live, in minutes
    pub cache_duration_minutes: u64,
    /// Range preselected by consumers that do not pass one
    pub default_time_range: TimeRange,
    /// Upper bound presentation layers use when thinning series
    pub max_data_points: usize,
    /// Whether alert dispatch is enabled
    pub enable_alerts: bool,
    /// Default alert recipient
    pub alert_email: Option<String>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            enable_caching: true,
            cache_duration_minutes: 15,
            default_time_range: TimeRange::Last7Days,
            max_data_points: 100,
            enable_alerts: false,
            alert_email: None,
        }
    }
}

impl DashboardSettings {
    /// Create a test configuration
    pub fn test() -> Self {
        Self {
            enable_caching: true,
            cache_duration_minutes: 15,
            default_time_range: TimeRange::Last7Days,
            max_data_points: 50,
            enable_alerts: true,
            alert_email: Some("alerts@example.org".to_string()),
        }
    }

    /// Cache TTL as a duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_duration_minutes * 60)
    }

    /// Reject settings the dashboard cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.cache_duration_minutes == 0 {
            return Err(Error::Validation(ValidationError::invalid_configuration(
                "cache_duration_minutes must be at least 1",
            )));
        }
        if self.max_data_points == 0 {
            return Err(Error::Validation(ValidationError::invalid_configuration(
                "max_data_points must be at least 1",
            )));
        }
        Ok(())
    }
}

/// Settings provider with layered loading and explicit reload
pub struct SettingsProvider {
    config_path: Option<PathBuf>,
    inner: RwLock<DashboardSettings>,
}

impl SettingsProvider {
    /// Create a provider reading the default config path
    pub fn new() -> Result<Self> {
        Self::with_path(Self::default_config_path())
    }

    /// Create a provider reading a specific config file
    pub fn with_path(path: PathBuf) -> Result<Self> {
        let provider = Self {
            config_path: Some(path),
            inner: RwLock::new(DashboardSettings::default()),
        };
        provider.reload()?;
        Ok(provider)
    }

    /// Create a provider over fixed settings, with no file layer
    pub fn from_settings(settings: DashboardSettings) -> Self {
        Self {
            config_path: None,
            inner: RwLock::new(settings),
        }
    }

    /// Get the default XDG-compliant configuration path
    fn default_config_path() -> PathBuf {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("chartdash/config.toml");
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config/chartdash/config.toml")
    }

    /// Load configuration with layered priority: ENV > File > Defaults
    fn load(&self) -> Result<DashboardSettings> {
        let mut figment = Figment::new().merge(Serialized::defaults(DashboardSettings::default()));

        if let Some(path) = &self.config_path
            && path.exists()
        {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("CHARTDASH_").split("__"));

        let settings: DashboardSettings = figment
            .extract()
            .map_err(|e| Error::Validation(ValidationError::invalid_configuration(e.to_string())))?;
        settings.validate()?;

        Ok(settings)
    }

    /// Re-extract settings from all layers
    ///
    /// A provider constructed from fixed settings has no layers to re-read;
    /// reload keeps them as-is.
    pub fn reload(&self) -> Result<()> {
        if self.config_path.is_none() {
            return Ok(());
        }

        let settings = self.load()?;
        match self.inner.write() {
            Ok(mut guard) => *guard = settings,
            Err(poisoned) => *poisoned.into_inner() = settings,
        }
        Ok(())
    }

    /// Current settings snapshot
    pub fn current(&self) -> DashboardSettings {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
