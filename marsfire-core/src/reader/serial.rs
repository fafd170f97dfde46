//! Serial reader
//!
//! Drains a [`ByteSource`] into a [`FrameDecoder`] and hands verified
//! payloads to the application.

use marsfire_hal::ByteSource;
use marsfire_protocol::{DecodeEvent, DecoderStats, FrameDecoder, MAX_PAYLOAD_SIZE};

use super::idle::IdleTimer;
use crate::config::{ConfigError, ReaderConfig};
use crate::traits::{Handled, PayloadConsumer};

/// Errors returned while polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError<E> {
    /// The byte source reported an error
    Source(E),
}

impl<E: core::fmt::Display> core::fmt::Display for ReadError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReadError::Source(e) => write!(f, "byte source error: {}", e),
        }
    }
}

/// Reads packets from a byte source
///
/// While a payload is waiting for acknowledgment the reader pulls nothing
/// from the source, so bytes that arrive in the meantime stay queued in the
/// source instead of being dropped by the decoder.
#[derive(Debug)]
pub struct SerialReader<S, const N: usize = MAX_PAYLOAD_SIZE> {
    source: S,
    decoder: FrameDecoder<N>,
    config: ReaderConfig,
    idle: IdleTimer,
    idle_resets: u32,
}

impl<S: ByteSource> SerialReader<S> {
    /// Create a reader with a full-size payload buffer
    ///
    /// Fails if `config` does not pass [`ReaderConfig::validate`].
    pub fn new(source: S, config: ReaderConfig) -> Result<Self, ConfigError> {
        Self::bounded(source, config)
    }
}

impl<S: ByteSource, const N: usize> SerialReader<S, N> {
    /// Create a reader whose payload buffer holds at most `N` bytes
    ///
    /// Packets declaring a longer payload are rejected. Fails if `config`
    /// does not pass [`ReaderConfig::validate`].
    pub fn bounded(source: S, config: ReaderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            source,
            decoder: FrameDecoder::with_checksum(config.checksum),
            config,
            idle: IdleTimer::new(config.idle_timeout_ms),
            idle_resets: 0,
        })
    }

    /// Pull available bytes into the decoder
    ///
    /// Processes at most `max_bytes_per_poll` bytes, stopping early when the
    /// source has nothing more or a payload completes. Returns the length of
    /// the ready payload, if there is one.
    pub fn read_update(&mut self) -> Result<Option<usize>, ReadError<S::Error>> {
        if let Some(len) = self.decoder.payload_len() {
            return Ok(Some(len));
        }

        for _ in 0..self.config.max_bytes_per_poll {
            let byte = match self.source.read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => break,
                Err(e) => {
                    warn!("Byte source read failed");
                    return Err(ReadError::Source(e));
                }
            };
            self.idle.byte_received();

            match self.decoder.process_byte(byte) {
                Some(DecodeEvent::PayloadComplete { len }) => {
                    debug!("Payload ready: {} bytes", len);
                    return Ok(Some(len));
                }
                Some(DecodeEvent::Dropped(reason)) => {
                    warn!("Packet dropped: {}", reason);
                }
                None => {}
            }
        }

        Ok(None)
    }

    /// Poll once and offer any ready payload to `consumer`
    ///
    /// Returns true if a payload was offered.
    pub fn poll<C>(&mut self, consumer: &mut C) -> Result<bool, ReadError<S::Error>>
    where
        C: PayloadConsumer + ?Sized,
    {
        if self.read_update()?.is_none() {
            return Ok(false);
        }

        let handled = match self.decoder.payload() {
            Some(payload) => consumer.on_payload(payload),
            None => return Ok(false),
        };

        match handled {
            Handled::Done => self.decoder.payload_handled(),
            Handled::Later => trace!("Payload deferred by consumer"),
        }
        Ok(true)
    }

    /// Advance the idle timer
    ///
    /// When a packet has been partially received and no byte has arrived for
    /// the configured idle timeout, the partial packet is abandoned. Returns
    /// true if that happened.
    ///
    /// Byte arrival times within an interval are not known, so an interval in
    /// which any byte arrived restarts the silence count instead of adding to
    /// it. A stalled packet is therefore abandoned between `timeout` and
    /// `timeout + elapsed_ms` after its last byte.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        if !self.decoder.state().in_packet() {
            self.idle.clear();
            return false;
        }

        if !self.idle.advance(elapsed_ms) {
            return false;
        }

        warn!(
            "Partial packet abandoned after {} ms idle",
            self.idle.idle_ms()
        );
        self.decoder.reset();
        self.idle.clear();
        self.idle_resets = self.idle_resets.saturating_add(1);
        true
    }

    /// The ready payload, if any
    pub fn payload(&self) -> Option<&[u8]> {
        self.decoder.payload()
    }

    /// Acknowledge the ready payload
    pub fn payload_handled(&mut self) {
        self.decoder.payload_handled();
    }

    /// The underlying decoder
    pub fn decoder(&self) -> &FrameDecoder<N> {
        &self.decoder
    }

    /// Decoder error counters
    pub fn stats(&self) -> &DecoderStats {
        self.decoder.stats()
    }

    /// Partial packets abandoned by the idle timeout
    pub fn idle_resets(&self) -> u32 {
        self.idle_resets
    }

    /// Active configuration
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Mutably borrow the byte source
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Release the byte source
    pub fn into_inner(self) -> S {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marsfire_hal::SliceSource;
    use marsfire_protocol::{Checksum, DecodeState, HEADER_BYTE};

    extern crate std;
    use std::vec::Vec;

    fn encode(payload: &[u8]) -> Vec<u8> {
        let mut out = std::vec![HEADER_BYTE, HEADER_BYTE, payload.len() as u8];
        out.extend_from_slice(payload);
        out.push(Checksum::Sum8.compute(payload));
        out
    }

    /// Source that releases bytes only when told to, like a UART FIFO
    struct Trickle {
        data: Vec<u8>,
        released: usize,
        pos: usize,
    }

    impl Trickle {
        fn new(data: Vec<u8>) -> Self {
            Self {
                data,
                released: 0,
                pos: 0,
            }
        }

        fn release(&mut self, n: usize) {
            self.released = (self.released + n).min(self.data.len());
        }
    }

    impl ByteSource for Trickle {
        type Error = ();

        fn read_byte(&mut self) -> Result<Option<u8>, ()> {
            if self.pos < self.released {
                self.pos += 1;
                Ok(Some(self.data[self.pos - 1]))
            } else {
                Ok(None)
            }
        }
    }

    struct Broken;

    impl ByteSource for Broken {
        type Error = &'static str;

        fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
            Err("framing error")
        }
    }

    #[test]
    fn test_read_update_returns_payload_len() {
        let stream = encode(&[1, 2, 3]);
        let mut reader =
            SerialReader::new(SliceSource::new(&stream), ReaderConfig::default()).unwrap();

        assert_eq!(reader.read_update(), Ok(Some(3)));
        assert_eq!(reader.payload(), Some(&[1, 2, 3][..]));
        // Still ready until acknowledged
        assert_eq!(reader.read_update(), Ok(Some(3)));

        reader.payload_handled();
        assert_eq!(reader.read_update(), Ok(None));
        assert_eq!(reader.payload(), None);
    }

    #[test]
    fn test_packet_assembled_across_polls() {
        let mut reader = SerialReader::new(
            Trickle::new(encode(&[0x10, 0x20])),
            ReaderConfig::default(),
        )
        .unwrap();

        reader.source_mut().release(3);
        assert_eq!(reader.read_update(), Ok(None));
        assert_eq!(reader.decoder().state(), DecodeState::ReadingPayload);

        reader.source_mut().release(2);
        assert_eq!(reader.read_update(), Ok(None));
        assert_eq!(reader.decoder().state(), DecodeState::ReadingChecksum);

        reader.source_mut().release(1);
        assert_eq!(reader.read_update(), Ok(Some(2)));
    }

    #[test]
    fn test_poll_budget_limits_bytes_per_call() {
        let mut stream = std::vec![0u8; 10];
        stream.extend(encode(&[5]));
        let config = ReaderConfig {
            max_bytes_per_poll: 4,
            ..ReaderConfig::default()
        };
        let mut reader = SerialReader::new(SliceSource::new(&stream), config).unwrap();

        assert_eq!(reader.read_update(), Ok(None));
        assert_eq!(reader.source_mut().remaining().len(), stream.len() - 4);

        let mut polls = 1;
        loop {
            polls += 1;
            if reader.read_update() != Ok(None) {
                break;
            }
        }
        assert_eq!(polls, 4);
        assert_eq!(reader.payload(), Some(&[5][..]));
    }

    #[test]
    fn test_bytes_stay_in_source_while_ready() {
        let mut stream = encode(&[1]);
        stream.extend(encode(&[2]));
        let mut reader =
            SerialReader::new(SliceSource::new(&stream), ReaderConfig::default()).unwrap();

        assert_eq!(reader.read_update(), Ok(Some(1)));
        assert_eq!(reader.read_update(), Ok(Some(1)));
        assert_eq!(reader.source_mut().remaining().len(), 5);

        reader.payload_handled();
        assert_eq!(reader.read_update(), Ok(Some(1)));
        assert_eq!(reader.payload(), Some(&[2][..]));
        assert_eq!(reader.stats().overrun_bytes, 0);
    }

    #[test]
    fn test_poll_hands_payloads_to_consumer() {
        let mut stream = std::vec![0x00, 0xAA, 0x13];
        stream.extend(encode(b"hi"));
        stream.extend(encode(b""));
        stream.extend(encode(b"there"));
        let mut reader =
            SerialReader::new(SliceSource::new(&stream), ReaderConfig::default()).unwrap();

        let mut seen: Vec<Vec<u8>> = Vec::new();
        let mut consumer = |payload: &[u8]| {
            seen.push(payload.to_vec());
            Handled::Done
        };
        while reader.poll(&mut consumer) == Ok(true) {}

        assert_eq!(seen, std::vec![b"hi".to_vec(), Vec::new(), b"there".to_vec()]);
        assert_eq!(reader.stats().packets_ok, 3);
        assert_eq!(reader.stats().framing_errors, 1);
    }

    #[test]
    fn test_poll_later_keeps_payload() {
        let stream = encode(&[9]);
        let mut reader =
            SerialReader::new(SliceSource::new(&stream), ReaderConfig::default()).unwrap();

        let mut offers = 0;
        let mut consumer = |_: &[u8]| {
            offers += 1;
            if offers < 3 {
                Handled::Later
            } else {
                Handled::Done
            }
        };

        assert_eq!(reader.poll(&mut consumer), Ok(true));
        assert_eq!(reader.poll(&mut consumer), Ok(true));
        assert!(reader.decoder().is_ready());
        assert_eq!(reader.poll(&mut consumer), Ok(true));
        assert!(!reader.decoder().is_ready());
        assert_eq!(reader.poll(&mut consumer), Ok(false));
        assert_eq!(offers, 3);
    }

    #[test]
    fn test_source_error_propagates() {
        let mut reader = SerialReader::new(Broken, ReaderConfig::default()).unwrap();
        assert_eq!(reader.read_update(), Err(ReadError::Source("framing error")));
    }

    #[test]
    fn test_idle_timeout_abandons_partial_packet() {
        let config = ReaderConfig {
            idle_timeout_ms: Some(50),
            ..ReaderConfig::default()
        };
        let mut stream = std::vec![HEADER_BYTE, HEADER_BYTE, 0x04, 0x01];
        stream.extend(encode(&[7, 7]));
        let mut source = Trickle::new(stream);
        source.release(4);
        let mut reader = SerialReader::new(source, config).unwrap();

        assert_eq!(reader.read_update(), Ok(None));
        // The first interval saw bytes, so silence is counted from the next one
        assert!(!reader.tick(30));
        assert!(!reader.tick(30));
        assert!(reader.tick(30));
        assert_eq!(reader.decoder().state(), DecodeState::WaitingForHeader1);
        assert_eq!(reader.idle_resets(), 1);

        // Without the reset this packet would have been swallowed as payload
        reader.source_mut().release(6);
        assert_eq!(reader.read_update(), Ok(Some(2)));
        assert_eq!(reader.payload(), Some(&[7, 7][..]));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let stream = encode(&[1]);

        let config = ReaderConfig {
            idle_timeout_ms: Some(0),
            ..ReaderConfig::default()
        };
        assert_eq!(
            SerialReader::new(SliceSource::new(&stream), config).err(),
            Some(ConfigError::ZeroIdleTimeout)
        );

        let config = ReaderConfig {
            max_bytes_per_poll: 0,
            ..ReaderConfig::default()
        };
        assert_eq!(
            SerialReader::new(SliceSource::new(&stream), config).err(),
            Some(ConfigError::ZeroPollBudget)
        );

        let config = ReaderConfig {
            max_bytes_per_poll: 0,
            idle_timeout_ms: Some(0),
            ..ReaderConfig::default()
        };
        let reader: Result<SerialReader<_, 8>, _> =
            SerialReader::bounded(SliceSource::new(&stream), config);
        assert!(reader.is_err());
    }

    #[test]
    fn test_byte_within_tick_interval_keeps_packet() {
        let config = ReaderConfig {
            idle_timeout_ms: Some(50),
            ..ReaderConfig::default()
        };
        let mut source = Trickle::new(encode(&[1, 2, 3]));
        source.release(4);
        let mut reader = SerialReader::new(source, config).unwrap();

        assert_eq!(reader.read_update(), Ok(None));
        // Ticks are coarser than the timeout, but a byte arrived in each interval
        assert!(!reader.tick(60));
        reader.source_mut().release(1);
        assert_eq!(reader.read_update(), Ok(None));
        assert!(!reader.tick(60));
        assert_eq!(reader.decoder().state(), DecodeState::ReadingPayload);

        // A whole interval of silence abandons it
        assert!(reader.tick(60));
        assert_eq!(reader.idle_resets(), 1);
    }

    #[test]
    fn test_idle_timeout_ignored_between_packets() {
        let config = ReaderConfig {
            idle_timeout_ms: Some(10),
            ..ReaderConfig::default()
        };
        let stream = encode(&[1]);
        let mut reader = SerialReader::new(SliceSource::new(&stream), config).unwrap();

        assert!(!reader.tick(1000));
        assert_eq!(reader.read_update(), Ok(Some(1)));
        // A ready payload is never timed out
        assert!(!reader.tick(1000));
        assert!(reader.decoder().is_ready());
        assert_eq!(reader.idle_resets(), 0);
    }

    #[test]
    fn test_bounded_reader_rejects_long_packets() {
        let mut stream = encode(&[0; 8]);
        stream.extend(encode(&[1, 2]));
        let mut reader: SerialReader<_, 4> =
            SerialReader::bounded(SliceSource::new(&stream), ReaderConfig::default())
                .unwrap();

        while reader.read_update() == Ok(None) && !reader.source_mut().is_empty() {}
        assert_eq!(reader.payload(), Some(&[1, 2][..]));
        assert_eq!(reader.stats().oversized_errors, 1);
    }

    #[test]
    fn test_xor_config_selects_checksum() {
        let payload = [0x0F, 0xF0];
        let mut stream = std::vec![HEADER_BYTE, HEADER_BYTE, 2];
        stream.extend_from_slice(&payload);
        stream.push(Checksum::Xor8.compute(&payload));

        let config = ReaderConfig {
            checksum: Checksum::Xor8,
            ..ReaderConfig::default()
        };
        let mut reader = SerialReader::new(SliceSource::new(&stream), config).unwrap();
        assert_eq!(reader.read_update(), Ok(Some(2)));
        assert_eq!(reader.decoder().checksum(), Checksum::Xor8);
    }
}
