//! Fixed big-endian file header.

use super::format::*;
use crate::io::{BinaryReader, BinaryWriter, Endian};
use crate::util::{Error, Result};

/// Decoded fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Bytes of metadata following the header.
    pub metadata_size: u32,
    pub file_size: u64,
    /// Container format number.
    pub format: u32,
    /// Absolute offset of the object data region.
    pub data_offset: u64,
    /// Byte order of metadata and object bodies.
    pub endian: Endian,
    pub reserved: [u8; 3],
    /// Trailing field of the wide header, kept for re-encoding.
    pub unknown: u64,
}

impl FileHeader {
    /// Parse and validate the header at the start of `data`.
    pub fn read(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::TruncatedHeader(data.len()));
        }
        let mut r = BinaryReader::new(data, Endian::Big);
        let mut metadata_size = r.read_u32()?;
        let mut file_size = r.read_u32()? as u64;
        let format = r.read_u32()?;
        let mut data_offset = r.read_u32()? as u64;

        if !is_supported_format(format) {
            return Err(Error::UnsupportedFormat(format));
        }

        let flag = r.read_u8()?;
        let endian = Endian::from_flag(flag)
            .ok_or_else(|| Error::invalid(format!("endianness flag {}", flag)))?;
        let reserved = r.read_array::<3>()?;

        let mut unknown = 0;
        if format >= FORMAT_LARGE_FILES {
            if data.len() < LARGE_HEADER_SIZE {
                return Err(Error::TruncatedHeader(data.len()));
            }
            metadata_size = r.read_u32()?;
            file_size = r.read_u64()?;
            data_offset = r.read_u64()?;
            unknown = r.read_u64()?;
        }

        Ok(Self { metadata_size, file_size, format, data_offset, endian, reserved, unknown })
    }

    /// Size of this header on disk.
    #[inline]
    pub fn size(&self) -> usize {
        header_size(self.format)
    }

    pub fn write(&self, writer: &mut BinaryWriter) -> Result<()> {
        let narrow = |value: u64, what: &str| {
            u32::try_from(value)
                .map_err(|_| Error::other(format!("{} {} does not fit format {}", what, value, self.format)))
        };

        if self.format >= FORMAT_LARGE_FILES {
            writer.write_u32(0);
            writer.write_u32(0);
            writer.write_u32(self.format);
            writer.write_u32(0);
        } else {
            writer.write_u32(self.metadata_size);
            writer.write_u32(narrow(self.file_size, "file size")?);
            writer.write_u32(self.format);
            writer.write_u32(narrow(self.data_offset, "data offset")?);
        }
        writer.write_u8(self.endian.flag());
        writer.write_bytes(&self.reserved);

        if self.format >= FORMAT_LARGE_FILES {
            writer.write_u32(self.metadata_size);
            writer.write_u64(self.file_size);
            writer.write_u64(self.data_offset);
            writer.write_u64(self.unknown);
        }
        Ok(())
    }
}
