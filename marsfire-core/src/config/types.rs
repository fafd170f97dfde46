//! Configuration type definitions

use marsfire_protocol::Checksum;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bytes pulled from the source per poll when not configured
pub const DEFAULT_MAX_BYTES_PER_POLL: u16 = 64;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `max_bytes_per_poll` must be at least 1
    ZeroPollBudget,
    /// `idle_timeout_ms`, when set, must be at least 1
    ZeroIdleTimeout,
    /// Configuration text could not be parsed
    Parse,
    /// Output buffer too small for encoding
    BufferTooSmall,
    /// Stored bytes are not a valid configuration
    Corrupt,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ConfigError::ZeroPollBudget => "max_bytes_per_poll must be at least 1",
            ConfigError::ZeroIdleTimeout => "idle_timeout_ms must be at least 1",
            ConfigError::Parse => "invalid configuration document",
            ConfigError::BufferTooSmall => "buffer too small for configuration",
            ConfigError::Corrupt => "stored configuration is corrupt",
        };
        f.write_str(msg)
    }
}

/// Serial reader configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReaderConfig {
    /// Checksum algorithm used by the remote producer
    pub checksum: Checksum,
    /// Upper bound on bytes processed by a single poll
    pub max_bytes_per_poll: u16,
    /// Abandon a partial packet after this long without a byte (ms)
    pub idle_timeout_ms: Option<u32>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            checksum: Checksum::Sum8,
            max_bytes_per_poll: DEFAULT_MAX_BYTES_PER_POLL,
            idle_timeout_ms: None,
        }
    }
}

impl ReaderConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes_per_poll == 0 {
            return Err(ConfigError::ZeroPollBudget);
        }
        if self.idle_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroIdleTimeout);
        }
        Ok(())
    }

    /// Serialize to postcard bytes for flash storage
    ///
    /// Returns the used prefix of `buf`.
    #[cfg(feature = "serde")]
    pub fn to_postcard<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::BufferTooSmall)
    }

    /// Load a configuration previously written with [`Self::to_postcard`]
    #[cfg(feature = "serde")]
    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupt)?;
        config.validate()?;
        Ok(config)
    }
}
