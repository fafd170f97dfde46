//! Marsfire Hardware Abstraction Layer
//!
//! This crate defines the byte source capability the packet framer is fed
//! from. The framer never talks to a serial peripheral directly: anything that
//! can hand over "the next received byte, if there is one" can drive it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  marsfire-core (SerialReader)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  marsfire-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │   IoSource    │       │  SliceSource  │
//! │ (embedded-io) │       │  (in memory)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`source::ByteSource`] - Non-blocking byte-at-a-time input

#![no_std]
#![deny(unsafe_code)]

pub mod source;

pub use source::{ByteSource, IoSource, SliceSource};
