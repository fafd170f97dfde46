//! Traits implemented by the application side

pub mod consumer;

pub use consumer::{Handled, PayloadConsumer};
