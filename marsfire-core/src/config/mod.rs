//! Reader configuration
//!
//! Configuration can be built in code, stored as postcard bytes (feature
//! `serde`), or parsed from the `[reader]` table of a TOML document
//! (feature `toml`).

mod types;

#[cfg(feature = "toml")]
mod toml;

pub use types::{ConfigError, ReaderConfig, DEFAULT_MAX_BYTES_PER_POLL};
