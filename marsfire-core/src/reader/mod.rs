//! Polling a byte source into the frame decoder
//!
//! The reader is cooperative: each poll processes a bounded number of bytes
//! and returns immediately when the source runs dry.

mod idle;
mod serial;

pub use idle::IdleTimer;
pub use serial::{ReadError, SerialReader};
