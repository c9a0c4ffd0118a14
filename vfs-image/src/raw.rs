//! Packed on-disk structures, read and written in place through the mapping.
//!
//! Both are fixed-size, little-endian, and unaligned by construction so that
//! a `&[u8]` slice taken straight out of the mapping can be reinterpreted
//! without a copy — the same approach `fs/fat`'s `BootSector`/`DirEntry`
//! views take over a block device.

use zerocopy::little_endian::I32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::layout::MAX_NAME_LEN;

#[repr(C)]
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned, Debug)]
pub struct RawSuperblock {
    pub check_number: I32,
    pub block_size: I32,
    pub fat_type: I32,
    pub root_block: I32,
    pub free_block: I32,
    pub n_free_blocks: I32,
}

/// Fixed-size directory entry record; `size_of::<RawDirEntry>() == 32`, so
/// `entries_per_block == block_size / 32` for every supported block size.
#[repr(C)]
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned, Clone, Copy, Debug)]
pub struct RawDirEntry {
    pub r#type: u8,
    pub name: [u8; MAX_NAME_LEN],
    pub day: u8,
    pub month: u8,
    pub year: u8,
    pub size: I32,
    pub first_block: I32,
}

const _: () = assert!(core::mem::size_of::<RawDirEntry>() == 32);

impl RawDirEntry {
    pub fn empty() -> Self {
        Self {
            r#type: 0,
            name: [0; MAX_NAME_LEN],
            day: 0,
            month: 0,
            year: 0,
            size: I32::new(0),
            first_block: I32::new(0),
        }
    }

    pub fn name_str(&self) -> &str {
        let len = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        core::str::from_utf8(&self.name[..len]).unwrap_or("")
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = [0; MAX_NAME_LEN];
        self.name[..name.len()].copy_from_slice(name.as_bytes());
    }
}
