//! Minimal BER (X.690 Basic Encoding Rules) support
//!
//! Covers what CLDAP needs: single-byte tags, definite lengths and the
//! INTEGER / ENUMERATED / BOOLEAN / OCTET STRING primitives.
//!
//! ```text
//! +-------+----------------------+---------------------+
//! |  tag  | length (1..=5 bytes) |  contents (length)  |
//! +-------+----------------------+---------------------+
//! ```

use crate::error::DecodeError;
use bytes::{BufMut, Bytes, BytesMut};

/// Universal BOOLEAN
pub const TAG_BOOLEAN: u8 = 0x01;
/// Universal INTEGER
pub const TAG_INTEGER: u8 = 0x02;
/// Universal OCTET STRING
pub const TAG_OCTET_STRING: u8 = 0x04;
/// Universal ENUMERATED
pub const TAG_ENUMERATED: u8 = 0x0a;
/// Universal SEQUENCE (constructed)
pub const TAG_SEQUENCE: u8 = 0x30;
/// Universal SET (constructed)
pub const TAG_SET: u8 = 0x31;

/// Constructed bit of the identifier octet
pub const CONSTRUCTED: u8 = 0x20;
/// Low five bits all set: tag number continues in following octets
const HIGH_TAG_NUMBER: u8 = 0x1f;
/// Longest long-form length we accept (4 length octets)
const MAX_LENGTH_OCTETS: usize = 4;

/// Encode a definite-form length
pub fn encode_length(buf: &mut BytesMut, len: usize) {
    if len < 0x80 {
        buf.put_u8(len as u8);
        return;
    }
    let octets = len.to_be_bytes();
    let skip = octets.iter().take_while(|b| **b == 0).count();
    buf.put_u8(0x80 | (octets.len() - skip) as u8);
    buf.put_slice(&octets[skip..]);
}

/// Minimal two's-complement contents octets of an integer
fn integer_contents(value: i64) -> Vec<u8> {
    let octets = value.to_be_bytes();
    let mut start = 0;
    while start < octets.len() - 1 {
        let redundant = (octets[start] == 0x00 && octets[start + 1] & 0x80 == 0)
            || (octets[start] == 0xff && octets[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    octets[start..].to_vec()
}

/// Builder for BER-encoded values
///
/// Constructed values are written through a closure receiving a nested
/// writer; the nested contents are measured and prefixed on return.
#[derive(Debug, Default)]
pub struct BerWriter {
    buf: BytesMut,
}

impl BerWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a primitive TLV with raw contents
    pub fn write_primitive(&mut self, tag: u8, contents: &[u8]) -> &mut Self {
        self.buf.put_u8(tag);
        encode_length(&mut self.buf, contents.len());
        self.buf.put_slice(contents);
        self
    }

    pub fn write_integer(&mut self, value: i64) -> &mut Self {
        self.write_primitive(TAG_INTEGER, &integer_contents(value))
    }

    pub fn write_enumerated(&mut self, value: i64) -> &mut Self {
        self.write_primitive(TAG_ENUMERATED, &integer_contents(value))
    }

    pub fn write_boolean(&mut self, value: bool) -> &mut Self {
        self.write_primitive(TAG_BOOLEAN, &[if value { 0xff } else { 0x00 }])
    }

    pub fn write_octet_string(&mut self, value: &[u8]) -> &mut Self {
        self.write_primitive(TAG_OCTET_STRING, value)
    }

    /// Write a constructed value whose contents are produced by `f`
    pub fn write_constructed<F>(&mut self, tag: u8, f: F) -> &mut Self
    where
        F: FnOnce(&mut BerWriter),
    {
        let mut inner = BerWriter::new();
        f(&mut inner);
        self.buf.put_u8(tag);
        encode_length(&mut self.buf, inner.buf.len());
        self.buf.put_slice(&inner.buf);
        self
    }

    pub fn write_sequence<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut BerWriter),
    {
        self.write_constructed(TAG_SEQUENCE, f)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

/// One decoded TLV, borrowing its contents from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BerElement<'a> {
    pub tag: u8,
    pub contents: &'a [u8],
}

impl<'a> BerElement<'a> {
    pub fn is_constructed(&self) -> bool {
        self.tag & CONSTRUCTED != 0
    }

    /// Reader over the contents of a constructed element
    pub fn children(&self) -> Result<BerReader<'a>, DecodeError> {
        if !self.is_constructed() {
            return Err(DecodeError::envelope(format!(
                "expected constructed element, found primitive tag 0x{:02x}",
                self.tag
            )));
        }
        Ok(BerReader::new(self.contents))
    }
}

/// Sequential TLV reader over a byte slice
///
/// Every read is bounds-checked against the slice; malformed input yields
/// `DecodeError::Envelope`.
#[derive(Debug, Clone)]
pub struct BerReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BerReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn next_byte(&mut self, what: &str) -> Result<u8, DecodeError> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| DecodeError::envelope(format!("unexpected end of data reading {}", what)))?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_length(&mut self) -> Result<usize, DecodeError> {
        let first = self.next_byte("length")?;
        if first & 0x80 == 0 {
            return Ok(first as usize);
        }
        let count = (first & 0x7f) as usize;
        if count == 0 {
            return Err(DecodeError::envelope("indefinite length not supported"));
        }
        if count > MAX_LENGTH_OCTETS {
            return Err(DecodeError::envelope(format!(
                "length uses {} octets, at most {} supported",
                count, MAX_LENGTH_OCTETS
            )));
        }
        let mut len = 0usize;
        for _ in 0..count {
            len = (len << 8) | self.next_byte("length")? as usize;
        }
        Ok(len)
    }

    /// Read the next TLV
    pub fn read_element(&mut self) -> Result<BerElement<'a>, DecodeError> {
        let tag = self.next_byte("tag")?;
        if tag & HIGH_TAG_NUMBER == HIGH_TAG_NUMBER {
            return Err(DecodeError::envelope(format!(
                "multi-byte tag 0x{:02x} not supported",
                tag
            )));
        }
        let len = self.read_length()?;
        if len > self.remaining() {
            return Err(DecodeError::envelope(format!(
                "element with tag 0x{:02x} needs {} bytes, have {}",
                tag,
                len,
                self.remaining()
            )));
        }
        let data = self.data;
        let contents = &data[self.pos..self.pos + len];
        self.pos += len;
        Ok(BerElement { tag, contents })
    }

    /// Skip one element of any type
    pub fn skip(&mut self) -> Result<(), DecodeError> {
        self.read_element().map(|_| ())
    }

    /// Read a constructed element and return a reader over its contents
    pub fn enter(&mut self) -> Result<(u8, BerReader<'a>), DecodeError> {
        let element = self.read_element()?;
        Ok((element.tag, element.children()?))
    }

    pub fn read_octet_string(&mut self) -> Result<&'a [u8], DecodeError> {
        let element = self.read_element()?;
        if element.tag != TAG_OCTET_STRING {
            return Err(DecodeError::envelope(format!(
                "expected OCTET STRING, found tag 0x{:02x}",
                element.tag
            )));
        }
        Ok(element.contents)
    }
}
