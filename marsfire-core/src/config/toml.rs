//! TOML loading for the reader configuration
//!
//! Only the `[reader]` table is read; other tables are ignored so the reader
//! settings can live in a larger machine configuration file.
//!
//! ```toml
//! [reader]
//! checksum = "xor8"
//! max_bytes_per_poll = 32
//! idle_timeout_ms = 100
//! ```

use serde::Deserialize;

use super::types::{ConfigError, ReaderConfig};

#[derive(Deserialize)]
struct Document {
    #[serde(default)]
    reader: ReaderConfig,
}

impl ReaderConfig {
    /// Parse and validate the `[reader]` table of a TOML document
    ///
    /// Missing keys (or a missing table) take their default values.
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let document: Document = ::toml::from_str(input).map_err(|_| ConfigError::Parse)?;
        document.reader.validate()?;
        Ok(document.reader)
    }
}
