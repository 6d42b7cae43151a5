//! Fixed-width integer encoding
//!
//! Multi-byte fields are always little-endian on the wire, independent of the
//! host byte order.
//!
//! The free functions write or read exactly 2, 4 or 8 bytes at the start of
//! the given slice and do not check its length; a short slice panics. The
//! [`Writer`] and [`Reader`] cursors are what the codec uses: every access is
//! checked against the remaining length first.

use crate::error::DecodeError;

/// Write 2 bytes
#[inline]
pub fn write16(value: u16, buffer: &mut [u8]) {
    buffer[..2].copy_from_slice(&value.to_le_bytes());
}

/// Write 4 bytes
#[inline]
pub fn write32(value: u32, buffer: &mut [u8]) {
    buffer[..4].copy_from_slice(&value.to_le_bytes());
}

/// Write 8 bytes
#[inline]
pub fn write64(value: u64, buffer: &mut [u8]) {
    buffer[..8].copy_from_slice(&value.to_le_bytes());
}

/// Read 2 bytes
#[inline]
pub fn read16(buffer: &[u8]) -> u16 {
    u16::from_le_bytes([buffer[0], buffer[1]])
}

/// Read 4 bytes
#[inline]
pub fn read32(buffer: &[u8]) -> u32 {
    u32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]])
}

/// Read 8 bytes
#[inline]
pub fn read64(buffer: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buffer[..8]);
    u64::from_le_bytes(bytes)
}

/// Write cursor over a caller-owned buffer
pub(crate) struct Writer<'a> {
    buffer: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    /// Bytes written so far
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Everything written so far
    pub(crate) fn written(&self) -> &[u8] {
        &self.buffer[..self.pos]
    }

    /// Reserve `n` bytes and advance. Callers size the buffer from the
    /// payload shape before writing, so running out is a logic error.
    fn advance(&mut self, n: usize) -> &mut [u8] {
        debug_assert!(self.pos + n <= self.buffer.len());
        let start = self.pos;
        self.pos += n;
        &mut self.buffer[start..self.pos]
    }

    pub(crate) fn u8(&mut self, value: u8) {
        self.advance(1)[0] = value;
    }

    pub(crate) fn u16(&mut self, value: u16) {
        write16(value, self.advance(2));
    }

    pub(crate) fn i16(&mut self, value: i16) {
        self.u16(value as u16);
    }

    pub(crate) fn u32(&mut self, value: u32) {
        write32(value, self.advance(4));
    }

    pub(crate) fn i32(&mut self, value: i32) {
        self.u32(value as u32);
    }

    pub(crate) fn u64(&mut self, value: u64) {
        write64(value, self.advance(8));
    }
}

/// Bounds-checked read cursor
pub(crate) struct Reader<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, pos: 0 }
    }

    /// Bytes consumed so far
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buffer.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::BufferTooShort);
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.buffer[start..self.pos])
    }

    pub(crate) fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, DecodeError> {
        Ok(read16(self.take(2)?))
    }

    pub(crate) fn i16(&mut self) -> Result<i16, DecodeError> {
        Ok(self.u16()? as i16)
    }

    pub(crate) fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(read32(self.take(4)?))
    }

    pub(crate) fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.u32()? as i32)
    }

    pub(crate) fn u64(&mut self) -> Result<u64, DecodeError> {
        Ok(read64(self.take(8)?))
    }
}
