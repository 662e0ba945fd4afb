//! Configuration system
//!
//! Device configuration can be built in code, read from the environment, or
//! loaded from TOML/RON files through the [`Config`] trait.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

use crate::foundation::logging;

/// On-disk encodings understood by [`Config`], picked by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Format for `path`, or [`ConfigError::UnsupportedFormat`]
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Serializable settings that can round-trip through a file
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Read and parse a file; fields missing from it keep their defaults
    /// when the implementor uses `#[serde(default)]`
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        let parsed = match format {
            ConfigFormat::Toml => toml::from_str(&text).map_err(|e| e.to_string()),
            ConfigFormat::Ron => ron::from_str(&text).map_err(|e| e.to_string()),
        };
        parsed.map_err(ConfigError::Parse)
    }

    /// Write `self` in the format named by the extension of `path`
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| e.to_string()),
            ConfigFormat::Ron => {
                ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| e.to_string())
            }
        }
        .map_err(ConfigError::Serialize)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

/// Errors from loading, saving or validating configuration
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The file contents did not deserialize
    #[error("could not parse config: {0}")]
    Parse(String),

    /// The value did not serialize
    #[error("could not serialize config: {0}")]
    Serialize(String),

    /// Neither `.toml` nor `.ron`
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside its valid range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// # Device Configuration
///
/// Settings read when a [`Device`](crate::device::Device) is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Numeric verbosity level (0 = least verbose)
    ///
    /// `None` defers to [`logging::LOG_LEVEL_ENV`] when the device is built.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<u32>,
    /// Swap chain depth used by demos and tools that do not pick one
    pub default_swap_chain_depth: usize,
    /// Worker threads requested from the compute kernel (0 = kernel decides)
    pub kernel_threads: usize,
}

impl DeviceConfig {
    /// Create a new device configuration with defaults
    pub fn new() -> Self {
        Self {
            log_level: None,
            default_swap_chain_depth: 2,
            kernel_threads: 0,
        }
    }

    /// Create a configuration whose log level comes from the environment
    ///
    /// Reads [`logging::LOG_LEVEL_ENV`]; absent or unparseable values give 0.
    pub fn from_env() -> Self {
        Self::new().with_log_level(logging::verbosity_from_env())
    }

    /// Set log level
    pub fn with_log_level(mut self, level: u32) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Level to install: the explicit one, otherwise the environment's
    pub fn resolved_log_level(&self) -> u32 {
        self.log_level.unwrap_or_else(logging::verbosity_from_env)
    }

    /// Set default swap chain depth
    pub fn with_swap_chain_depth(mut self, depth: usize) -> Self {
        self.default_swap_chain_depth = depth;
        self
    }

    /// Set kernel worker thread count
    pub fn with_kernel_threads(mut self, threads: usize) -> Self {
        self.kernel_threads = threads;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_swap_chain_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "default_swap_chain_depth",
                reason: "swap chain depth must be at least 1".to_string(),
            });
        }
        if let Some(level) = self.log_level.filter(|&level| level > logging::MAX_VERBOSITY) {
            return Err(ConfigError::Invalid {
                field: "log_level",
                reason: format!("expected 0..={}, got {}", logging::MAX_VERBOSITY, level),
            });
        }
        Ok(())
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for DeviceConfig {}
