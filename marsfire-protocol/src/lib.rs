//! Marsfire Serial Packet Protocol
//!
//! This crate turns a raw serial byte stream into checksum-validated payloads.
//! Bytes are fed one at a time; the decoder never blocks and never allocates.
//!
//! # Packet Format
//!
//! ```text
//! ┌──────┬──────┬────────┬─────────────┬──────────┐
//! │ 0xAA │ 0xAA │ LENGTH │ PAYLOAD     │ CHECKSUM │
//! │ 1B   │ 1B   │ 1B     │ 0–255B      │ 1B       │
//! └──────┴──────┴────────┴─────────────┴──────────┘
//! ```
//!
//! The checksum covers the payload bytes only. Once a payload is complete the
//! decoder holds it until the consumer calls
//! [`FrameDecoder::payload_handled`]; only then does framing resume.

#![no_std]
#![deny(unsafe_code)]

pub mod checksum;
pub mod events;
pub mod frame;
pub mod stats;

pub use checksum::Checksum;
pub use events::{DecodeEvent, DropReason};
pub use frame::{DecodeState, FrameDecoder, HEADER_BYTE, MAX_PAYLOAD_SIZE};
pub use stats::DecoderStats;
