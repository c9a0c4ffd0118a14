//! Format parameters and the byte-exact region layout they imply.
//!
//! ```text
//! 0 .. block_size                                   superblock
//! block_size .. block_size + 4*fat_entries           FAT (one i32 per data block)
//! .. EOF                                             data region (fat_entries blocks)
//! ```

use vfs_err::{Error, Result};

/// `check_number` used to recognise a formatted image.
pub const CHECK_NUMBER: i32 = 9999;

pub const TYPE_DIR: u8 = b'D';
pub const TYPE_FILE: u8 = b'F';

/// Maximum length (in bytes, NUL-exclusive) of a directory entry name.
pub const MAX_NAME_LEN: usize = 20;

/// On-disk size of one directory entry / FAT-chain payload unit.
pub const DIR_ENTRY_SIZE: u32 = 32;

/// FAT sentinel for end-of-chain and "disk full".
pub const END_OF_CHAIN: i32 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockSize {
    B256 = 256,
    B512 = 512,
    B1024 = 1024,
}

impl BlockSize {
    pub fn from_u32(value: u32) -> Result<Self> {
        match value {
            256 => Ok(Self::B256),
            512 => Ok(Self::B512),
            1024 => Ok(Self::B1024),
            other => Err(Error::InvalidBlockSize(other)),
        }
    }

    pub fn bytes(self) -> u32 {
        self as u32
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self::B512
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FatType {
    Fat8 = 8,
    Fat10 = 10,
    Fat12 = 12,
}

impl FatType {
    pub fn from_u32(value: u32) -> Result<Self> {
        match value {
            8 => Ok(Self::Fat8),
            10 => Ok(Self::Fat10),
            12 => Ok(Self::Fat12),
            other => Err(Error::InvalidFatType(other)),
        }
    }

    /// Number of data blocks (and FAT slots) this FAT type provides.
    pub fn entries(self) -> u32 {
        match self {
            Self::Fat8 => 256,
            Self::Fat10 => 1024,
            Self::Fat12 => 4096,
        }
    }
}

impl Default for FatType {
    fn default() -> Self {
        Self::Fat10
    }
}

/// Byte offset and size of each of the three regions, derived from
/// `block_size` and `fat_entries` alone (never stored separately: recomputed
/// from the superblock on every open).
#[derive(Clone, Copy, Debug)]
pub struct Layout {
    pub block_size: u32,
    pub fat_entries: u32,
}

impl Layout {
    pub fn new(block_size: u32, fat_entries: u32) -> Self {
        Self {
            block_size,
            fat_entries,
        }
    }

    pub fn fat_bytes(&self) -> u64 {
        4 * self.fat_entries as u64
    }

    pub fn fat_offset(&self) -> u64 {
        self.block_size as u64
    }

    pub fn data_offset(&self) -> u64 {
        self.fat_offset() + self.fat_bytes()
    }

    pub fn total_size(&self) -> u64 {
        self.data_offset() + self.fat_entries as u64 * self.block_size as u64
    }

    pub fn entries_per_block(&self) -> u32 {
        self.block_size / DIR_ENTRY_SIZE
    }
}
