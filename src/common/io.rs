//! Big-endian data streams
//!
//! `DataInputStream` and `DataOutputStream` read and write the primitive
//! values the BEE key, certificate and keystore formats are built from:
//! single bytes, 32/64-bit signed big-endian integers and length-prefixed
//! UTF-8 strings.

use std::io::{self, Read};

use bytes::{BufMut, BytesMut};

use crate::common::{Result, SecurityError};

/// Upper bound on the up-front allocation of `read_bytes`
const INITIAL_READ_CAPACITY: usize = 8 * 1024;

/// Reader of big-endian primitives on top of any `Read`
pub struct DataInputStream<R: Read> {
    inner: R,
}

impl<R: Read> DataInputStream<R> {
    /// Wrap a reader
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Give back the wrapped reader
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Borrow the wrapped reader
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Fill `buf` completely or fail with `UnexpectedEof`
    pub fn read_fully(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf)?;
        Ok(())
    }

    /// Read exactly `len` bytes into a fresh vector
    ///
    /// The buffer grows with the data actually read, so a corrupt length
    /// prefix fails with `UnexpectedEof` instead of allocating `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(len.min(INITIAL_READ_CAPACITY));
        (&mut self.inner).take(len as u64).read_to_end(&mut buf)?;
        if buf.len() != len {
            return Err(SecurityError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes, stream ended after {}", len, buf.len()),
            )));
        }
        Ok(buf)
    }

    /// Read one unsigned byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut b = [0u8; 1];
        self.read_fully(&mut b)?;
        Ok(b[0])
    }

    /// Read a 32-bit signed big-endian integer
    pub fn read_i32(&mut self) -> Result<i32> {
        let mut b = [0u8; 4];
        self.read_fully(&mut b)?;
        Ok(i32::from_be_bytes(b))
    }

    /// Read a 64-bit signed big-endian integer
    pub fn read_i64(&mut self) -> Result<i64> {
        let mut b = [0u8; 8];
        self.read_fully(&mut b)?;
        Ok(i64::from_be_bytes(b))
    }

    /// Read a string written by [`DataOutputStream::write_utf`]
    pub fn read_utf(&mut self) -> Result<String> {
        let mut len = [0u8; 2];
        self.read_fully(&mut len)?;
        let raw = self.read_bytes(u16::from_be_bytes(len) as usize)?;
        String::from_utf8(raw).map_err(|e| {
            SecurityError::Io(io::Error::new(io::ErrorKind::InvalidData, e))
        })
    }

    /// Read everything left in the stream
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut rest = Vec::new();
        self.inner.read_to_end(&mut rest)?;
        Ok(rest)
    }
}

impl DataInputStream<&[u8]> {
    /// Number of bytes not yet consumed
    pub fn available(&self) -> usize {
        self.inner.len()
    }
}

/// Writer of big-endian primitives into a growable buffer
#[derive(Debug, Default)]
pub struct DataOutputStream {
    buf: BytesMut,
}

impl DataOutputStream {
    /// Create an empty stream
    pub fn new() -> Self {
        Self { buf: BytesMut::new() }
    }

    /// Create an empty stream with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: BytesMut::with_capacity(capacity) }
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View of the bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the stream and return its content
    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    pub fn write_u8(&mut self, b: u8) {
        self.buf.put_u8(b);
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.put_i32(v);
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.put_i64(v);
    }

    /// Write raw bytes
    pub fn write(&mut self, data: &[u8]) {
        self.buf.put_slice(data);
    }

    /// Write a 32-bit length followed by `data`
    pub fn write_sized(&mut self, data: &[u8]) -> Result<()> {
        let len = i32::try_from(data.len())
            .map_err(|_| SecurityError::invalid_data("block too large"))?;
        self.write_i32(len);
        self.write(data);
        Ok(())
    }

    /// Write a 16-bit length followed by the UTF-8 bytes of `s`
    ///
    /// Fails when the encoded form exceeds 65535 bytes.
    pub fn write_utf(&mut self, s: &str) -> Result<()> {
        let raw = s.as_bytes();
        let len = u16::try_from(raw.len()).map_err(|_| {
            SecurityError::invalid_data(format!("encoded string too long: {} bytes", raw.len()))
        })?;
        self.buf.put_u16(len);
        self.buf.put_slice(raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives() {
        let mut out = DataOutputStream::new();
        out.write_u8(0xab);
        out.write_i32(-2);
        out.write_i64(0x0102030405060708);
        out.write_utf("BEE").unwrap();
        let bytes = out.into_vec();

        assert_eq!(&bytes[..5], &[0xab, 0xff, 0xff, 0xff, 0xfe]);

        let mut input = DataInputStream::new(bytes.as_slice());
        assert_eq!(input.read_u8().unwrap(), 0xab);
        assert_eq!(input.read_i32().unwrap(), -2);
        assert_eq!(input.read_i64().unwrap(), 0x0102030405060708);
        assert_eq!(input.read_utf().unwrap(), "BEE");
        assert_eq!(input.available(), 0);
    }

    #[test]
    fn test_eof() {
        let data = [0u8, 0, 1];
        let mut input = DataInputStream::new(&data[..]);
        match input.read_i32() {
            Err(SecurityError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("Expected EOF, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_length_prefix() {
        let data = [1u8, 2, 3];
        let mut input = DataInputStream::new(&data[..]);
        match input.read_bytes(i32::MAX as usize) {
            Err(SecurityError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("Expected EOF, got {:?}", other),
        }

        let mut input = DataInputStream::new(&data[..]);
        assert_eq!(input.read_bytes(2).unwrap(), vec![1, 2]);
        assert_eq!(input.read_bytes(1).unwrap(), vec![3]);
        assert_eq!(input.read_bytes(0).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_utf_too_long() {
        let long = "x".repeat(65536);
        let mut out = DataOutputStream::new();
        assert!(out.write_utf(&long).is_err(), "65536-byte string must be rejected");
        assert!(out.is_empty());

        let max = "y".repeat(65535);
        assert!(out.write_utf(&max).is_ok());
        assert_eq!(out.len(), 65537);
    }
}
