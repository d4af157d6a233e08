//! DER encoding of DSA signatures
//!
//! A DSA signature travels as `SEQUENCE { INTEGER r, INTEGER s }` in
//! definite-length DER. Lengths use the short form below 0x80 and the
//! long form with one to four length bytes above it.

use num_bigint_dig::BigUint;

use crate::common::{Result, SecurityError};
use crate::crypto::mp;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_INTEGER: u8 = 0x02;

/// Number of bytes a length prefix of `len` occupies
fn length_size(len: usize) -> usize {
    match len {
        0..=0x7f => 1,
        0x80..=0xff => 2,
        0x100..=0xffff => 3,
        0x1_0000..=0xff_ffff => 4,
        _ => 5,
    }
}

fn write_length(out: &mut Vec<u8>, len: usize) {
    let size = length_size(len);
    if size == 1 {
        out.push(len as u8);
        return;
    }
    let count = size - 1;
    out.push(0x80 | count as u8);
    for i in (0..count).rev() {
        out.push((len >> (8 * i)) as u8);
    }
}

fn write_integer(out: &mut Vec<u8>, n: &BigUint) {
    let content = mp::unsigned_bytes(n);
    out.push(TAG_INTEGER);
    write_length(out, content.len());
    out.extend_from_slice(&content);
}

/// Encode `(r, s)` as a DER sequence of two integers
pub fn encode_signature(r: &BigUint, s: &BigUint) -> Vec<u8> {
    let r_len = mp::unsigned_bytes(r).len();
    let s_len = mp::unsigned_bytes(s).len();
    let body = 1 + length_size(r_len) + r_len + 1 + length_size(s_len) + s_len;

    let mut out = Vec::with_capacity(1 + length_size(body) + body);
    out.push(TAG_SEQUENCE);
    write_length(&mut out, body);
    write_integer(&mut out, r);
    write_integer(&mut out, s);
    out
}

/// Cursor over DER input
struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn byte(&mut self) -> Result<u8> {
        let (&b, rest) = self
            .data
            .split_first()
            .ok_or_else(|| SecurityError::invalid_data("not enough data"))?;
        self.data = rest;
        Ok(b)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.data.len() < len {
            return Err(SecurityError::invalid_data("not enough data"));
        }
        let (head, rest) = self.data.split_at(len);
        self.data = rest;
        Ok(head)
    }

    fn length(&mut self) -> Result<usize> {
        let first = self.byte()?;
        if first < 0x80 {
            return Ok(first as usize);
        }
        if first == 0x80 {
            return Err(SecurityError::invalid_data("implicit length not supported"));
        }
        let count = (first & 0x7f) as usize;
        if count > 4 {
            return Err(SecurityError::invalid_data("length too long"));
        }
        let mut len = 0usize;
        for _ in 0..count {
            len = (len << 8) | self.byte()? as usize;
        }
        Ok(len)
    }

    fn expect_tag(&mut self, tag: u8) -> Result<()> {
        let found = self.byte()?;
        if found != tag {
            return Err(SecurityError::invalid_data(format!(
                "format error: expected tag 0x{:02x}, found 0x{:02x}",
                tag, found
            )));
        }
        Ok(())
    }

    fn integer(&mut self) -> Result<BigUint> {
        self.expect_tag(TAG_INTEGER)?;
        let len = self.length()?;
        if len == 0 {
            return Err(SecurityError::invalid_data("format error: empty integer"));
        }
        Ok(mp::os2ip(self.take(len)?))
    }
}

/// Decode a DER sequence of two integers
///
/// Any structural problem (truncation, wrong tag, indefinite or over-long
/// length, bytes left over inside or after the sequence) is an error.
pub fn decode_signature(data: &[u8]) -> Result<(BigUint, BigUint)> {
    let mut outer = Reader { data };
    outer.expect_tag(TAG_SEQUENCE)?;
    let len = outer.length()?;
    let body = outer.take(len)?;
    if !outer.data.is_empty() {
        return Err(SecurityError::invalid_data("trailing bytes after sequence"));
    }

    let mut inner = Reader { data: body };
    let r = inner.integer()?;
    let s = inner.integer()?;
    if !inner.data.is_empty() {
        return Err(SecurityError::invalid_data("trailing bytes in sequence"));
    }
    Ok((r, s))
}
