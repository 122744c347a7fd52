//! Fixed-layout little-endian struct decoding
//!
//! Wire structures are decoded field by field from a byte slice. The length
//! check happens once, up front, so field reads can never run past the
//! slice; any bytes after the fixed size are left for the caller.

use crate::error::DecodeError;

/// A fixed-size little-endian record
pub trait WireStruct: Sized {
    /// Name used in truncation errors
    const NAME: &'static str;

    /// Encoded size in bytes
    const SIZE: usize;

    /// Read every field from `buf`, which holds exactly `SIZE` bytes
    fn read_fields(buf: &mut &[u8]) -> Self;

    /// Decode from the leading `SIZE` bytes of `data`
    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < Self::SIZE {
            return Err(DecodeError::Truncated {
                structure: Self::NAME,
                needed: Self::SIZE,
                have: data.len(),
            });
        }
        let mut buf = &data[..Self::SIZE];
        Ok(Self::read_fields(&mut buf))
    }
}
