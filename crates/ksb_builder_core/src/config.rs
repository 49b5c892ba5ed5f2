//! Builder configuration.
//!
//! # Responsibility
//! - Hold tunables that were fixed constants in earlier builders: autosave
//!   cadence and synthesis seeding caps.
//! - Load them from TOML with per-field defaults.
//!
//! # Invariants
//! - `autosave_interval_secs`, `module_seed_cap` and `lesson_seed_cap` are
//!   all greater than zero after successful loading.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MODULE_SEED_CAP: usize = 5;
pub const DEFAULT_LESSON_SEED_CAP: usize = 3;

/// Configuration loading failure.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read builder config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse builder config: {err}"),
            Self::Invalid(message) => write!(f, "invalid builder config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Seeding caps applied by the structure synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedLimits {
    /// Max reference ids seeded onto a generated module.
    pub module: usize,
    /// Max reference ids seeded onto a generated lesson.
    pub lesson: usize,
}

impl Default for SeedLimits {
    fn default() -> Self {
        Self {
            module: DEFAULT_MODULE_SEED_CAP,
            lesson: DEFAULT_LESSON_SEED_CAP,
        }
    }
}

/// Builder session tunables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    pub autosave_enabled: bool,
    pub autosave_interval_secs: u64,
    pub module_seed_cap: usize,
    pub lesson_seed_cap: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            autosave_enabled: true,
            autosave_interval_secs: DEFAULT_AUTOSAVE_INTERVAL_SECS,
            module_seed_cap: DEFAULT_MODULE_SEED_CAP,
            lesson_seed_cap: DEFAULT_LESSON_SEED_CAP,
        }
    }
}

impl BuilderConfig {
    /// Parses and validates a TOML document. Missing keys use defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.autosave_interval_secs == 0 {
            return Err(ConfigError::Invalid("autosave_interval_secs must be > 0"));
        }
        if self.module_seed_cap == 0 {
            return Err(ConfigError::Invalid("module_seed_cap must be > 0"));
        }
        if self.lesson_seed_cap == 0 {
            return Err(ConfigError::Invalid("lesson_seed_cap must be > 0"));
        }
        Ok(())
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    pub fn seed_limits(&self) -> SeedLimits {
        SeedLimits {
            module: self.module_seed_cap,
            lesson: self.lesson_seed_cap,
        }
    }
}
