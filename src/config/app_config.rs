use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::adapters::gpg::gpg_engine::{GpgConfig, PinentryMode};
use crate::core::errors::{PgpError, Result};

/// Top-level pgpkit configuration, read from a TOML file.
///
/// Every section is optional; missing values fall back to defaults
/// suitable for unattended use in a throwaway keyring.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub keygen: KeygenSection,
}

impl AppConfig {
    /// Load a configuration file, failing if it is missing or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PgpError::InvalidConfig {
                detail: format!("config file not found: {}", path.display()),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| PgpError::InvalidConfig {
            detail: format!("Failed to parse {}: {e}", path.display()),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Use `custom` if given, else the per-user config file if it exists,
    /// else built-in defaults.
    pub fn discover(custom: Option<&Path>) -> Result<Self> {
        if let Some(path) = custom {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.keygen.key_length == 0 {
            return Err(PgpError::InvalidConfig {
                detail: "[keygen] key_length must be greater than zero".into(),
            });
        }
        if self.keygen.key_type.trim().is_empty() {
            return Err(PgpError::InvalidConfig {
                detail: "[keygen] key_type must not be empty".into(),
            });
        }
        if self
            .engine
            .homedir
            .as_ref()
            .is_some_and(|h| h.as_os_str().is_empty())
        {
            return Err(PgpError::InvalidConfig {
                detail: "[engine] homedir must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Gateway configuration for this file's `[engine]` section.
    pub fn gpg_config(&self) -> GpgConfig {
        GpgConfig {
            gpg_path: self.engine.gpg_path.clone(),
            homedir: self.engine.homedir.clone(),
            batch: self.engine.batch,
            pinentry_mode: self.engine.pinentry_mode,
            always_trust: self.engine.always_trust,
            extra_args: self.engine.extra_args.clone(),
        }
    }
}

/// `<config_dir>/pgpkit/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pgpkit").join("config.toml"))
}

/// The `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSection {
    pub gpg_path: PathBuf,
    pub homedir: Option<PathBuf>,
    pub batch: bool,
    pub pinentry_mode: PinentryMode,
    pub always_trust: bool,
    pub extra_args: Vec<String>,
}

impl Default for EngineSection {
    fn default() -> Self {
        let gpg = GpgConfig::default();
        Self {
            gpg_path: gpg.gpg_path,
            homedir: gpg.homedir,
            batch: gpg.batch,
            pinentry_mode: gpg.pinentry_mode,
            always_trust: gpg.always_trust,
            extra_args: gpg.extra_args,
        }
    }
}

/// The `[keygen]` section: defaults for `pgpkit generate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeygenSection {
    pub key_type: String,
    pub key_length: u32,
    /// `0` means the key never expires.
    pub expire_date: String,
}

impl Default for KeygenSection {
    fn default() -> Self {
        Self {
            key_type: "RSA".into(),
            key_length: 2048,
            expire_date: "0".into(),
        }
    }
}
