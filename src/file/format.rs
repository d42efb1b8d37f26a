//! Container format constants.

/// Oldest container format this crate reads.
pub const MIN_FORMAT: u32 = 14;

/// Newest container format this crate reads.
pub const MAX_FORMAT: u32 = 22;

/// Size of the fixed header before format 22.
pub const HEADER_SIZE: usize = 20;

/// Size of the fixed header from format 22 on (legacy block + wide fields).
pub const LARGE_HEADER_SIZE: usize = 48;

/// First format with 64-bit header sizes and object offsets.
pub const FORMAT_LARGE_FILES: u32 = 22;

/// First format whose directory entries index the type table and whose
/// types carry a stripped flag.
pub const FORMAT_TYPE_INDEX: u32 = 16;

/// First format whose types carry a script type index.
pub const FORMAT_SCRIPT_TYPE_INDEX: u32 = 17;

/// First format whose type tree nodes carry a reference type hash.
pub const FORMAT_REF_TYPE_HASH: u32 = 19;

/// First format with a reference type table.
pub const FORMAT_REF_TYPES: u32 = 20;

/// First format whose type trees are followed by dependencies or ref-type names.
pub const FORMAT_TYPE_DEPENDENCIES: u32 = 21;

/// Alignment of object starts inside the data region.
pub const OBJECT_ALIGNMENT: u64 = 8;

/// Alignment of the data region when it cannot be kept from the source.
pub const DATA_ALIGNMENT: u64 = 16;

/// Class id of script-backed objects, whose types carry a script hash.
pub const SCRIPT_CLASS_ID: i32 = 114;

#[inline]
pub const fn is_supported_format(format: u32) -> bool {
    format >= MIN_FORMAT && format <= MAX_FORMAT
}

#[inline]
pub const fn header_size(format: u32) -> usize {
    if format >= FORMAT_LARGE_FILES {
        LARGE_HEADER_SIZE
    } else {
        HEADER_SIZE
    }
}

/// Size in bytes of one blob type tree node.
#[inline]
pub const fn type_tree_node_size(format: u32) -> usize {
    if format >= FORMAT_REF_TYPE_HASH {
        32
    } else {
        24
    }
}
