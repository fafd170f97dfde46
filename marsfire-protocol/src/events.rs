//! Events produced by the frame decoder

/// Outcome of feeding a byte that finished (or aborted) a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeEvent {
    /// A checksum-verified payload is ready to be read
    PayloadComplete {
        /// Payload length in bytes
        len: usize,
    },
    /// A packet was abandoned; the decoder is back to header search
    Dropped(DropReason),
}

/// Why a packet was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DropReason {
    /// Trailing checksum byte did not match the payload
    ChecksumMismatch { expected: u8, received: u8 },
    /// Declared length does not fit the payload buffer
    Oversized { declared: u8, capacity: usize },
}

impl DecodeEvent {
    /// Returns true if this event signals a ready payload
    pub fn is_complete(&self) -> bool {
        matches!(self, DecodeEvent::PayloadComplete { .. })
    }
}

impl core::fmt::Display for DropReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DropReason::ChecksumMismatch { expected, received } => write!(
                f,
                "checksum mismatch: expected {:#04x}, received {:#04x}",
                expected, received
            ),
            DropReason::Oversized { declared, capacity } => write!(
                f,
                "declared length {} exceeds capacity {}",
                declared, capacity
            ),
        }
    }
}
