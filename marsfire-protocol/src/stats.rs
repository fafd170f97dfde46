//! Decoder error counters

/// Running counters kept by the decoder
///
/// None of these conditions is fatal; they exist so a link can be monitored.
/// All counters saturate instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecoderStats {
    /// Packets that passed checksum validation
    pub packets_ok: u32,
    /// Header sequences broken by an unexpected byte
    pub framing_errors: u32,
    /// Packets dropped on checksum mismatch
    pub checksum_errors: u32,
    /// Packets rejected for a length larger than the buffer
    pub oversized_errors: u32,
    /// Bytes dropped because a payload was still awaiting acknowledgment
    pub overrun_bytes: u32,
}

impl DecoderStats {
    /// Total number of packets lost to any error
    pub fn dropped_packets(&self) -> u32 {
        self.checksum_errors.saturating_add(self.oversized_errors)
    }

    /// Returns true if no error of any kind has been recorded
    pub fn is_clean(&self) -> bool {
        self.framing_errors == 0 && self.dropped_packets() == 0 && self.overrun_bytes == 0
    }
}

pub(crate) fn bump(counter: &mut u32) {
    *counter = counter.saturating_add(1);
}
