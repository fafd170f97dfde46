//! Payload checksum algorithms

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Checksum carried in the last byte of every packet
///
/// Both variants cover the payload bytes only; header and length bytes are
/// not included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Checksum {
    /// 8-bit sum, overflow truncated
    #[default]
    Sum8,
    /// 8-bit XOR
    Xor8,
}

impl Checksum {
    /// Accumulator value before any payload byte
    pub const fn initial(self) -> u8 {
        0
    }

    /// Fold one payload byte into the accumulator
    #[inline]
    pub const fn update(self, acc: u8, byte: u8) -> u8 {
        match self {
            Checksum::Sum8 => acc.wrapping_add(byte),
            Checksum::Xor8 => acc ^ byte,
        }
    }

    /// Checksum of a whole payload
    pub fn compute(self, payload: &[u8]) -> u8 {
        payload
            .iter()
            .fold(self.initial(), |acc, &byte| self.update(acc, byte))
    }
}
