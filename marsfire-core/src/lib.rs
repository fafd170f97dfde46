//! Board-agnostic glue between a byte source and the packet decoder
//!
//! This crate contains everything around the framing state machine that
//! does not depend on a specific serial peripheral:
//!
//! - [`reader::SerialReader`] - Polls a byte source into the decoder
//! - [`traits::PayloadConsumer`] - Receives verified payloads
//! - [`config::ReaderConfig`] - Reader configuration and its storage formats

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod reader;
pub mod traits;

pub use config::{ConfigError, ReaderConfig};
pub use reader::{ReadError, SerialReader};
pub use traits::{Handled, PayloadConsumer};

// Re-export the protocol types readers expose
pub use marsfire_protocol::{Checksum, DecodeEvent, DecodeState, DecoderStats, FrameDecoder};
