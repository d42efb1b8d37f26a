//! Bounds-checked reading cursor.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::{padding_for, Endian};
use crate::util::{Error, Result};

macro_rules! read_primitive {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $size:expr, $fn:ident) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self) -> Result<$ty> {
            let bytes = self.take($size)?;
            Ok(match self.endian {
                Endian::Little => LittleEndian::$fn(bytes),
                Endian::Big => BigEndian::$fn(bytes),
            })
        }
    };
}

/// Reading cursor over a borrowed byte buffer.
///
/// A failed read returns [`Error::OutOfBounds`] and leaves the position
/// where it was.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> BinaryReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        Self { data, pos: 0, endian }
    }

    /// Byte order used for multi-byte reads.
    #[inline]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Current offset from the start of the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move to an absolute offset. The end of the buffer is a valid target.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::OutOfBounds { pos, needed: 0, len: self.data.len() });
        }
        self.pos = pos;
        Ok(())
    }

    /// Total buffer length.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left after the current position.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// The whole underlying buffer.
    #[inline]
    pub fn buffer(&self) -> &'a [u8] {
        self.data
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(Error::OutOfBounds { pos: self.pos, needed: n, len: self.data.len() })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read a boolean stored as one byte, non-zero meaning true.
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    read_primitive!(read_u16, u16, 2, read_u16);
    read_primitive!(read_i16, i16, 2, read_i16);
    read_primitive!(read_u32, u32, 4, read_u32);
    read_primitive!(read_i32, i32, 4, read_i32);
    read_primitive!(read_u64, u64, 8, read_u64);
    read_primitive!(read_i64, i64, 8, read_i64);
    read_primitive!(read_f32, f32, 4, read_f32);
    read_primitive!(read_f64, f64, 8, read_f64);

    /// Borrow the next `n` bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Read a fixed-size byte array (hashes, GUIDs).
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read an `i32` element count and reject negative values.
    pub fn read_count(&mut self) -> Result<usize> {
        let start = self.pos;
        let count = self.read_i32()?;
        if count < 0 {
            self.pos = start;
            return Err(Error::invalid(format!("negative count {} at {}", count, start)));
        }
        Ok(count as usize)
    }

    /// Read an `i32` length followed by that many bytes.
    pub fn read_byte_array(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;
        let len = self.read_count()?;
        self.take(len).inspect_err(|_| self.pos = start)
    }

    /// Read an `i32`-length-prefixed UTF-8 string. Does not align.
    pub fn read_string32(&mut self) -> Result<String> {
        let start = self.pos;
        let bytes = self.read_byte_array()?;
        String::from_utf8(bytes.to_vec()).map_err(|e| {
            self.pos = start;
            Error::Utf8(e)
        })
    }

    /// Read a length-prefixed string and align to 4 bytes afterwards.
    pub fn read_aligned_string(&mut self) -> Result<String> {
        let start = self.pos;
        let s = self.read_string32()?;
        self.align().inspect_err(|_| self.pos = start)?;
        Ok(s)
    }

    /// Read a NUL-terminated UTF-8 string. The terminator is consumed.
    pub fn read_cstring(&mut self) -> Result<String> {
        let rest = &self.data[self.pos..];
        let nul = rest.iter().position(|&b| b == 0).ok_or(Error::OutOfBounds {
            pos: self.pos,
            needed: rest.len() + 1,
            len: self.data.len(),
        })?;
        let s = String::from_utf8(rest[..nul].to_vec())?;
        self.pos += nul + 1;
        Ok(s)
    }

    /// Skip zero-fill up to the next multiple of 4 from the buffer start.
    #[inline]
    pub fn align(&mut self) -> Result<()> {
        self.align_to(4)
    }

    /// Skip up to the next multiple of `n` from the buffer start.
    pub fn align_to(&mut self, n: usize) -> Result<()> {
        let pad = padding_for(self.pos, n);
        self.take(pad).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endian_reads() {
        let data = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(BinaryReader::new(&data, Endian::Little).read_u32().unwrap(), 0x04030201);
        assert_eq!(BinaryReader::new(&data, Endian::Big).read_u32().unwrap(), 0x01020304);
        assert_eq!(BinaryReader::new(&data, Endian::Big).read_i16().unwrap(), 0x0102);
    }

    #[test]
    fn test_out_of_bounds_keeps_position() {
        let data = [1u8, 2, 3];
        let mut r = BinaryReader::new(&data, Endian::Little);
        assert_eq!(r.read_u8().unwrap(), 1);
        let err = r.read_u32().unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { pos: 1, needed: 4, len: 3 }));
        assert_eq!(r.position(), 1);
        assert_eq!(r.read_u16().unwrap(), 0x0302);
    }

    #[test]
    fn test_align_from_buffer_start() {
        let data = [0u8; 12];
        let mut r = BinaryReader::new(&data, Endian::Little);
        r.read_u8().unwrap();
        r.align().unwrap();
        assert_eq!(r.position(), 4);
        r.align().unwrap();
        assert_eq!(r.position(), 4);
        r.set_position(6).unwrap();
        r.align_to(8).unwrap();
        assert_eq!(r.position(), 8);
    }

    #[test]
    fn test_align_past_end_fails() {
        let data = [0u8; 5];
        let mut r = BinaryReader::new(&data, Endian::Little);
        r.set_position(5).unwrap();
        assert!(r.align().is_err());
        assert_eq!(r.position(), 5);
    }

    #[test]
    fn test_string32() {
        let data = [3, 0, 0, 0, b'a', b'b', b'c', 0, 9];
        let mut r = BinaryReader::new(&data, Endian::Little);
        assert_eq!(r.read_aligned_string().unwrap(), "abc");
        assert_eq!(r.position(), 8);
        assert_eq!(r.read_u8().unwrap(), 9);
    }

    #[test]
    fn test_string32_truncated() {
        let data = [9, 0, 0, 0, b'a'];
        let mut r = BinaryReader::new(&data, Endian::Little);
        assert!(r.read_string32().is_err());
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_cstring() {
        let data = b"5.6.0f1\0rest\0";
        let mut r = BinaryReader::new(data, Endian::Big);
        assert_eq!(r.read_cstring().unwrap(), "5.6.0f1");
        assert_eq!(r.read_cstring().unwrap(), "rest");
        assert!(r.read_cstring().is_err());
    }

    #[test]
    fn test_negative_count() {
        let data = (-1i32).to_le_bytes();
        let mut r = BinaryReader::new(&data, Endian::Little);
        assert!(r.read_count().is_err());
        assert_eq!(r.position(), 0);
    }
}
