//! Little-endian field codec used by the extras wire format.
//!
//! The encoder is a by-value builder (`Encoder::new().u32(a).str(b).finish()`); the decoder
//! is a cursor that reports truncation and bad enum/bool/utf-8 values as [`DecodeError`]s.
//! Length and count prefixes are validated against the remaining input before anything is
//! allocated.

use crate::error::DecodeError;
use crate::resource_id::ResourceId;

#[derive(Debug, Default, Clone)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.buf.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u64(mut self, v: u64) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn bool(self, v: bool) -> Self {
        self.u8(v as u8)
    }

    /// Sequence/byte lengths are written as `u32`. Larger inputs are not representable; debug
    /// builds panic on them and release builds write `u32::MAX`, which the decoder rejects as
    /// out of bounds.
    pub fn len_prefix(self, len: usize) -> Self {
        debug_assert!(
            u32::try_from(len).is_ok(),
            "length {len} does not fit the u32 wire prefix"
        );
        let len = u32::try_from(len).unwrap_or(u32::MAX);
        self.u32(len)
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self = self.len_prefix(bytes.len());
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn str(self, s: &str) -> Self {
        self.bytes(s.as_bytes())
    }

    pub fn resource_id(mut self, id: &ResourceId) -> Self {
        self.buf.extend_from_slice(id.as_bytes());
        self
    }

    /// Appends pre-encoded bytes without a length prefix.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::UnexpectedEof {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let out = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    pub fn bool(&mut self) -> Result<bool, DecodeError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::InvalidBool(other)),
        }
    }

    /// Reads a `u32` element count. Every element occupies at least `min_elem_size` bytes, so
    /// counts that cannot possibly fit in the remaining input are rejected up front.
    pub fn count(&mut self, min_elem_size: usize) -> Result<usize, DecodeError> {
        let count = self.u32()? as usize;
        let needed = count.saturating_mul(min_elem_size.max(1));
        if needed > self.remaining() {
            return Err(DecodeError::LengthOutOfBounds {
                len: count as u64,
                remaining: self.remaining(),
            });
        }
        Ok(count)
    }

    pub fn bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.count(1)?;
        self.take(len)
    }

    pub fn string(&mut self) -> Result<String, DecodeError> {
        let bytes = self.bytes()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
    }

    pub fn resource_id(&mut self) -> Result<ResourceId, DecodeError> {
        Ok(ResourceId::from_bytes(self.array()?))
    }

    /// Takes exactly `n` bytes without a length prefix.
    pub fn raw(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.take(n)
    }

    /// Fails if any input is left unconsumed.
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn fields_decode_in_order() {
        let bytes = Encoder::new()
            .u8(7)
            .u16(0x1234)
            .u32(0xDEAD_BEEF)
            .u64(u64::MAX - 1)
            .i32(-5)
            .bool(true)
            .str("glDrawArrays")
            .finish();

        let mut d = Decoder::new(&bytes);
        assert_eq!(d.u8().unwrap(), 7);
        assert_eq!(d.u16().unwrap(), 0x1234);
        assert_eq!(d.u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(d.u64().unwrap(), u64::MAX - 1);
        assert_eq!(d.i32().unwrap(), -5);
        assert!(d.bool().unwrap());
        assert_eq!(d.string().unwrap(), "glDrawArrays");
        d.finish().unwrap();
    }

    #[test]
    fn truncated_input_is_reported() {
        let mut d = Decoder::new(&[1, 2]);
        assert_eq!(
            d.u32().unwrap_err(),
            DecodeError::UnexpectedEof {
                offset: 0,
                needed: 4,
                remaining: 2
            }
        );
    }

    #[test]
    fn oversized_length_prefix_is_rejected_before_allocating() {
        let bytes = Encoder::new().u32(u32::MAX).finish();
        let err = Decoder::new(&bytes).bytes().unwrap_err();
        assert!(matches!(err, DecodeError::LengthOutOfBounds { .. }));
    }

    #[test]
    #[cfg(all(debug_assertions, target_pointer_width = "64"))]
    #[should_panic(expected = "does not fit the u32 wire prefix")]
    fn unrepresentable_length_panics_in_debug_builds() {
        let _ = Encoder::new().len_prefix(u32::MAX as usize + 1);
    }

    #[test]
    fn bad_bool_and_utf8_are_errors() {
        assert_eq!(Decoder::new(&[2]).bool().unwrap_err(), DecodeError::InvalidBool(2));

        let bytes = Encoder::new().bytes(&[0xFF, 0xFE]).finish();
        assert_eq!(
            Decoder::new(&bytes).string().unwrap_err(),
            DecodeError::InvalidUtf8
        );
    }

    #[test]
    fn trailing_bytes_fail_finish() {
        let mut d = Decoder::new(&[0, 0]);
        d.u8().unwrap();
        assert_eq!(d.finish().unwrap_err(), DecodeError::TrailingBytes(1));
    }
}
