// Copyright 2024 Kevin Ludwig
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Byte-exact on-disk image for the vfs virtual file system: superblock,
//! FAT, and data region, all views over a single `memmap2::MmapMut`.
//!
//! Grounded on `ds/std` (`hyrax_ds_std`, a `std::fs::File`-backed storage
//! server) generalized from offset-addressed reads/writes to a direct
//! memory mapping, and on `fs/fat`'s `zerocopy`-typed on-disk structures.

mod image;
mod layout;
mod raw;

pub use image::Image;
pub use layout::{BlockSize, FatType, Layout, CHECK_NUMBER, DIR_ENTRY_SIZE, END_OF_CHAIN, MAX_NAME_LEN, TYPE_DIR, TYPE_FILE};
pub use raw::{RawDirEntry, RawSuperblock};

/// `(day, month, year-since-1900)` for "now", in the narrow ranges the
/// on-disk directory entry stores them in.
pub fn today() -> (u8, u8, u8) {
    use chrono::Datelike;
    let now = chrono::Local::now().date_naive();
    (now.day() as u8, now.month() as u8, (now.year() - 1900) as u8)
}
