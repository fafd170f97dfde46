//! Byte-at-a-time packet decoding.
//!
//! Packet format:
//! - HEADER (2 bytes): 0xAA 0xAA synchronization bytes
//! - LENGTH (1 byte): payload length (0-255)
//! - PAYLOAD (0-255 bytes): application data
//! - CHECKSUM (1 byte): checksum of the PAYLOAD bytes only

use heapless::Vec;

use crate::checksum::Checksum;
use crate::events::{DecodeEvent, DropReason};
use crate::stats::{bump, DecoderStats};

/// Packet synchronization byte, sent twice
pub const HEADER_BYTE: u8 = 0xAA;

/// Largest payload a single LENGTH byte can declare
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize;

/// Decoder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeState {
    /// Waiting for the first header byte
    WaitingForHeader1,
    /// Got one header byte, waiting for the second
    WaitingForHeader2,
    /// Got both header bytes, waiting for LENGTH
    ReadingLength,
    /// Reading payload bytes
    ReadingPayload,
    /// Waiting for CHECKSUM
    ReadingChecksum,
    /// Payload complete and verified, waiting for acknowledgment
    PayloadReady,
}

impl DecodeState {
    /// Returns true while part of a packet has been received
    pub fn in_packet(&self) -> bool {
        matches!(
            self,
            DecodeState::WaitingForHeader2
                | DecodeState::ReadingLength
                | DecodeState::ReadingPayload
                | DecodeState::ReadingChecksum
        )
    }
}

/// State machine for decoding incoming packets
///
/// `N` is the payload buffer capacity. Packets declaring a longer payload are
/// rejected before a single payload byte is stored.
#[derive(Debug, Clone)]
pub struct FrameDecoder<const N: usize = MAX_PAYLOAD_SIZE> {
    state: DecodeState,
    buffer: Vec<u8, N>,
    expected_length: u8,
    accumulator: u8,
    checksum: Checksum,
    stats: DecoderStats,
}

impl FrameDecoder {
    /// Create a decoder with a full-size buffer and the default checksum
    pub const fn new() -> Self {
        Self::with_checksum(Checksum::Sum8)
    }
}

impl<const N: usize> Default for FrameDecoder<N> {
    fn default() -> Self {
        Self::with_checksum(Checksum::Sum8)
    }
}

impl<const N: usize> FrameDecoder<N> {
    /// Create a decoder using the given checksum algorithm
    pub const fn with_checksum(checksum: Checksum) -> Self {
        Self {
            state: DecodeState::WaitingForHeader1,
            buffer: Vec::new(),
            expected_length: 0,
            accumulator: 0,
            checksum,
            stats: DecoderStats {
                packets_ok: 0,
                framing_errors: 0,
                checksum_errors: 0,
                oversized_errors: 0,
                overrun_bytes: 0,
            },
        }
    }

    /// Payload buffer capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Current decoder state
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Checksum algorithm in use
    pub fn checksum(&self) -> Checksum {
        self.checksum
    }

    /// Returns true while a verified payload awaits acknowledgment
    pub fn is_ready(&self) -> bool {
        self.state == DecodeState::PayloadReady
    }

    /// The verified payload, available only until [`Self::payload_handled`]
    pub fn payload(&self) -> Option<&[u8]> {
        match self.state {
            DecodeState::PayloadReady => Some(self.buffer.as_slice()),
            _ => None,
        }
    }

    /// Length of the ready payload
    pub fn payload_len(&self) -> Option<usize> {
        self.payload().map(<[u8]>::len)
    }

    /// Error counters
    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// Zero all error counters
    pub fn reset_stats(&mut self) {
        self.stats = DecoderStats::default();
    }

    /// Abandon any partial or ready packet and go back to header search
    ///
    /// Counters are kept.
    pub fn reset(&mut self) {
        self.state = DecodeState::WaitingForHeader1;
        self.buffer.clear();
        self.expected_length = 0;
        self.accumulator = self.checksum.initial();
    }

    /// Acknowledge the ready payload so framing can resume
    ///
    /// Does nothing unless a payload is ready, so calling it twice is harmless
    /// and never disturbs a packet that is still being received.
    pub fn payload_handled(&mut self) {
        if self.state == DecodeState::PayloadReady {
            self.reset();
        }
    }

    /// Feed a single byte to the decoder
    ///
    /// Returns `Some(DecodeEvent::PayloadComplete { .. })` exactly once per
    /// verified packet, `Some(DecodeEvent::Dropped(_))` when a packet is
    /// abandoned, and `None` otherwise. While a payload is ready the byte is
    /// discarded and counted as an overrun.
    pub fn process_byte(&mut self, byte: u8) -> Option<DecodeEvent> {
        match self.state {
            DecodeState::WaitingForHeader1 => {
                // Line noise between packets is not an error
                if byte == HEADER_BYTE {
                    self.state = DecodeState::WaitingForHeader2;
                }
                None
            }
            DecodeState::WaitingForHeader2 => {
                if byte == HEADER_BYTE {
                    self.state = DecodeState::ReadingLength;
                } else {
                    bump(&mut self.stats.framing_errors);
                    self.state = DecodeState::WaitingForHeader1;
                }
                None
            }
            DecodeState::ReadingLength => {
                if byte as usize > N {
                    return Some(self.drop_oversized(byte));
                }

                self.buffer.clear();
                self.accumulator = self.checksum.initial();
                self.expected_length = byte;
                self.state = if byte == 0 {
                    DecodeState::ReadingChecksum
                } else {
                    DecodeState::ReadingPayload
                };
                None
            }
            DecodeState::ReadingPayload => {
                if self.buffer.push(byte).is_err() {
                    // Unreachable while the length check above holds
                    return Some(self.drop_oversized(self.expected_length));
                }
                self.accumulator = self.checksum.update(self.accumulator, byte);
                if self.buffer.len() == self.expected_length as usize {
                    self.state = DecodeState::ReadingChecksum;
                }
                None
            }
            DecodeState::ReadingChecksum => {
                if byte != self.accumulator {
                    let reason = DropReason::ChecksumMismatch {
                        expected: self.accumulator,
                        received: byte,
                    };
                    bump(&mut self.stats.checksum_errors);
                    self.reset();
                    return Some(DecodeEvent::Dropped(reason));
                }

                bump(&mut self.stats.packets_ok);
                self.state = DecodeState::PayloadReady;
                Some(DecodeEvent::PayloadComplete {
                    len: self.buffer.len(),
                })
            }
            DecodeState::PayloadReady => {
                bump(&mut self.stats.overrun_bytes);
                None
            }
        }
    }

    fn drop_oversized(&mut self, declared: u8) -> DecodeEvent {
        bump(&mut self.stats.oversized_errors);
        self.reset();
        DecodeEvent::Dropped(DropReason::Oversized {
            declared,
            capacity: N,
        })
    }

    /// Feed bytes until a payload becomes ready or the input runs out
    ///
    /// Returns how many bytes were consumed and the last event seen. Bytes
    /// after a completed packet are left unconsumed so the caller can hand
    /// them over again after acknowledging the payload.
    pub fn feed(&mut self, bytes: &[u8]) -> (usize, Option<DecodeEvent>) {
        let mut last = None;
        for (i, &byte) in bytes.iter().enumerate() {
            if self.is_ready() {
                return (i, last);
            }
            if let Some(event) = self.process_byte(byte) {
                last = Some(event);
                if event.is_complete() {
                    return (i + 1, last);
                }
            }
        }
        (bytes.len(), last)
    }
}
