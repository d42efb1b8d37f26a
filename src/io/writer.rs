//! Growable writing cursor.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::{padding_for, Endian};
use crate::util::{Error, Result};

macro_rules! write_primitive {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $size:expr, $fn:ident) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, value: $ty) {
            let mut bytes = [0u8; $size];
            match self.endian {
                Endian::Little => LittleEndian::$fn(&mut bytes, value),
                Endian::Big => BigEndian::$fn(&mut bytes, value),
            }
            self.buf.extend_from_slice(&bytes);
        }
    };
}

/// Writing cursor backed by an owned buffer.
#[derive(Debug, Clone, Default)]
pub struct BinaryWriter {
    buf: Vec<u8>,
    endian: Endian,
}

impl BinaryWriter {
    /// Create an empty writer.
    pub fn new(endian: Endian) -> Self {
        Self { buf: Vec::new(), endian }
    }

    /// Create an empty writer with reserved capacity.
    pub fn with_capacity(endian: Endian, capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity), endian }
    }

    /// Byte order used for multi-byte writes.
    #[inline]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Current write position (bytes written so far).
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// Bytes written so far.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return its buffer.
    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    #[inline]
    pub fn write_i8(&mut self, value: i8) {
        self.buf.push(value as u8);
    }

    /// Write a boolean as a single `0`/`1` byte.
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(value as u8);
    }

    write_primitive!(write_u16, u16, 2, write_u16);
    write_primitive!(write_i16, i16, 2, write_i16);
    write_primitive!(write_u32, u32, 4, write_u32);
    write_primitive!(write_i32, i32, 4, write_i32);
    write_primitive!(write_u64, u64, 8, write_u64);
    write_primitive!(write_i64, i64, 8, write_i64);
    write_primitive!(write_f32, f32, 4, write_f32);
    write_primitive!(write_f64, f64, 8, write_f64);

    /// Append raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Write a length or element count as `i32`. Fails when it does not fit.
    pub fn write_count(&mut self, count: usize) -> Result<()> {
        let value = i32::try_from(count)
            .map_err(|_| Error::other(format!("count {} does not fit in i32", count)))?;
        self.write_i32(value);
        Ok(())
    }

    /// Write an `i32` length followed by the bytes.
    pub fn write_byte_array(&mut self, data: &[u8]) -> Result<()> {
        self.write_count(data.len())?;
        self.write_bytes(data);
        Ok(())
    }

    /// Write an `i32`-length-prefixed UTF-8 string. Does not align.
    pub fn write_string32(&mut self, value: &str) -> Result<()> {
        self.write_byte_array(value.as_bytes())
    }

    /// Write a length-prefixed string and align to 4 bytes afterwards.
    pub fn write_aligned_string(&mut self, value: &str) -> Result<()> {
        self.write_string32(value)?;
        self.align();
        Ok(())
    }

    /// Write a NUL-terminated string.
    pub fn write_cstring(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
        self.buf.push(0);
    }

    /// Zero-fill up to the next multiple of 4 from the buffer start.
    #[inline]
    pub fn align(&mut self) {
        self.align_to(4);
    }

    /// Zero-fill up to the next multiple of `n` from the buffer start.
    pub fn align_to(&mut self, n: usize) {
        let pad = padding_for(self.buf.len(), n);
        self.buf.resize(self.buf.len() + pad, 0);
    }

    /// Zero-fill until the buffer is `len` bytes long. No-op when already longer.
    pub fn pad_to(&mut self, len: usize) {
        if self.buf.len() < len {
            self.buf.resize(len, 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::BinaryReader;

    #[test]
    fn test_endian_writes() {
        let mut w = BinaryWriter::new(Endian::Big);
        w.write_u32(0x01020304);
        w.write_i16(-2);
        assert_eq!(w.as_bytes(), &[1, 2, 3, 4, 0xFF, 0xFE]);

        let mut w = BinaryWriter::new(Endian::Little);
        w.write_u32(0x01020304);
        assert_eq!(w.as_bytes(), &[4, 3, 2, 1]);
    }

    #[test]
    fn test_align_zero_fill() {
        let mut w = BinaryWriter::new(Endian::Little);
        w.write_u8(7);
        w.align();
        assert_eq!(w.as_bytes(), &[7, 0, 0, 0]);
        w.align();
        assert_eq!(w.position(), 4);
    }

    #[test]
    fn test_mirrors_reader() {
        let mut w = BinaryWriter::new(Endian::Big);
        w.write_aligned_string("Cube").unwrap();
        w.write_u16(5);
        w.write_bool(true);
        w.write_f64(1.5);
        w.write_cstring("x");
        let bytes = w.into_inner();

        let mut r = BinaryReader::new(&bytes, Endian::Big);
        assert_eq!(r.read_aligned_string().unwrap(), "Cube");
        assert_eq!(r.read_u16().unwrap(), 5);
        assert!(r.read_bool().unwrap());
        assert_eq!(r.read_f64().unwrap(), 1.5);
        assert_eq!(r.read_cstring().unwrap(), "x");
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_count_must_fit_i32() {
        let mut w = BinaryWriter::new(Endian::Little);
        w.write_count(i32::MAX as usize).unwrap();
        assert!(w.write_count(i32::MAX as usize + 1).is_err());
        assert_eq!(w.as_bytes(), &[0xFF, 0xFF, 0xFF, 0x7F]);
    }
}
