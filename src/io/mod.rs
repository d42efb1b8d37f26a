//! Endian-aware binary cursor.
//!
//! [`BinaryReader`] walks a borrowed buffer and [`BinaryWriter`] fills an
//! owned one. Both are bound to a single [`Endian`] for their whole
//! lifetime and align relative to the start of their own buffer.

mod reader;
mod writer;

pub use reader::*;
pub use writer::*;

/// Byte order of multi-byte primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// Decode the header endianness flag (`0` little, `1` big).
    pub const fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Self::Little),
            1 => Some(Self::Big),
            _ => None,
        }
    }

    /// Header flag value for this byte order.
    #[inline]
    pub const fn flag(self) -> u8 {
        match self {
            Self::Little => 0,
            Self::Big => 1,
        }
    }
}

/// Number of padding bytes needed to bring `pos` to a multiple of `align`.
#[inline]
pub const fn padding_for(pos: usize, align: usize) -> usize {
    (align - pos % align) % align
}

/// Round `pos` up to a multiple of `align`.
#[inline]
pub const fn align_up(pos: u64, align: u64) -> u64 {
    pos.div_ceil(align) * align
}
