//! A directory entry, lifted out of its packed on-disk representation into
//! something ordinary Rust code can build, compare, and hand around.

use vfs_image::{RawDirEntry, MAX_NAME_LEN, TYPE_DIR, TYPE_FILE};
use zerocopy::little_endian::I32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Dir,
    File,
}

/// `(day, month, year-since-1900)`, exactly as stored on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Date {
    pub day: u8,
    pub month: u8,
    pub year: u8,
}

impl Date {
    pub fn today() -> Self {
        let (day, month, year) = vfs_image::today();
        Self { day, month, year }
    }
}

#[derive(Clone, Debug)]
pub struct Entry {
    pub kind: Kind,
    pub name: String,
    pub date: Date,
    pub size: u32,
    pub first_block: u32,
}

impl Entry {
    pub fn new_dir(name: &str, first_block: u32) -> Self {
        Self {
            kind: Kind::Dir,
            name: name.to_string(),
            date: Date::today(),
            size: 0,
            first_block,
        }
    }

    pub fn new_file(name: &str, first_block: u32, size: u32) -> Self {
        Self {
            kind: Kind::File,
            name: name.to_string(),
            date: Date::today(),
            size,
            first_block,
        }
    }

    pub fn from_raw(raw: &RawDirEntry) -> Self {
        Self {
            kind: if raw.r#type == TYPE_DIR { Kind::Dir } else { Kind::File },
            name: raw.name_str().to_string(),
            date: Date {
                day: raw.day,
                month: raw.month,
                year: raw.year,
            },
            size: raw.size.get() as u32,
            first_block: raw.first_block.get() as u32,
        }
    }

    pub fn to_raw(&self) -> RawDirEntry {
        let mut raw = RawDirEntry::empty();
        raw.r#type = match self.kind {
            Kind::Dir => TYPE_DIR,
            Kind::File => TYPE_FILE,
        };
        raw.set_name(&self.name);
        raw.day = self.date.day;
        raw.month = self.date.month;
        raw.year = self.date.year;
        raw.size = I32::new(self.size as i32);
        raw.first_block = I32::new(self.first_block as i32);
        raw
    }

    pub fn is_dir(&self) -> bool {
        self.kind == Kind::Dir
    }
}

pub fn name_fits(name: &str) -> bool {
    !name.is_empty() && name.len() < MAX_NAME_LEN
}
