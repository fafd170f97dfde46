//! Byte source abstractions
//!
//! A [`ByteSource`] yields whatever bytes have already arrived and returns
//! immediately when there are none. It never blocks.

use embedded_io::{Read, ReadReady};

/// Non-blocking source of received bytes
///
/// Bytes must be delivered in the order they were transmitted. A byte, once
/// returned, is never handed out again.
pub trait ByteSource {
    /// Error type for read operations
    type Error;

    /// Read the next available byte
    ///
    /// Returns `Ok(None)` when no byte is available right now.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    type Error = S::Error;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        (**self).read_byte()
    }
}

/// Adapter turning an `embedded-io` reader into a [`ByteSource`]
///
/// Only calls [`Read::read`] after [`ReadReady::read_ready`] reports pending
/// data, so a blocking UART driver is never left waiting on an empty line.
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
}

impl<R> IoSource<R> {
    /// Wrap a reader
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped reader
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the wrapped reader
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Release the wrapped reader
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + ReadReady> ByteSource for IoSource<R> {
    type Error = R::Error;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if !self.inner.read_ready()? {
            return Ok(None);
        }

        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

/// In-memory byte source replaying a fixed slice
///
/// Useful for replaying captured traffic and for host-side testing.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Create a source over `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes not yet read
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Returns true once every byte has been read
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }
}

impl ByteSource for SliceSource<'_> {
    type Error = core::convert::Infallible;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        let byte = self.data.get(self.pos).copied();
        if byte.is_some() {
            self.pos += 1;
        }
        Ok(byte)
    }
}
