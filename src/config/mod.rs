use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::catalog::Field;
use crate::errors::ConfigError;
use crate::form::{FormSettings, ValidationPolicy};
use crate::form::controller::DEFAULT_NOTIFICATION_MS;
use crate::form::validation::DEFAULT_SENTINELS;
use crate::services::StaticOptionSource;
use crate::utils::{app_data_dir, config_file_in, ensure_dir, outbox_dir_in, write_atomic};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub notification_duration_ms: u64,
    /// Placeholder values rejected in required fields.
    pub sentinels: Vec<String>,
    pub crop_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outbox_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notification_duration_ms: DEFAULT_NOTIFICATION_MS,
            sentinels: DEFAULT_SENTINELS.iter().map(|s| s.to_string()).collect(),
            crop_types: ["Maize", "Wheat", "Soybean", "Grapes", "Olives"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            outbox_dir: None,
        }
    }
}

impl Config {
    pub fn validation_policy(&self) -> ValidationPolicy {
        ValidationPolicy::new(self.sentinels.iter().cloned())
    }

    pub fn form_settings(&self) -> FormSettings {
        FormSettings {
            policy: self.validation_policy(),
            notification_duration_ms: self.notification_duration_ms,
        }
    }

    /// Crop types served to the production wizard.
    pub fn option_source(&self) -> StaticOptionSource {
        StaticOptionSource::new().with(Field::CropType, self.crop_types.clone())
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Outbox directory from `config`, or the default under the data dir.
    pub fn outbox_dir(&self, config: &Config) -> PathBuf {
        config
            .outbox_dir
            .clone()
            .unwrap_or_else(|| outbox_dir_in(&self.base))
    }
}
