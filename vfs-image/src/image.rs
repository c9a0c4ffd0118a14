use std::fs::OpenOptions;
use std::path::Path;

use log::info;
use memmap2::{MmapMut, MmapOptions};
use vfs_err::{Error, Result};
use zerocopy::little_endian::I32;
use zerocopy::{FromBytes, IntoBytes};

use crate::layout::{BlockSize, FatType, Layout, CHECK_NUMBER, TYPE_DIR};
use crate::raw::{RawDirEntry, RawSuperblock};

/// A formatted or freshly-created backing image, mapped read-write shared
/// into this process. Owns the only view of the superblock, FAT, and data
/// region; there is exactly one of these per open command-line session.
pub struct Image {
    mmap: MmapMut,
    layout: Layout,
}

impl Image {
    /// Open `path` if it already holds a valid image, otherwise format a new
    /// one with `block_size`/`fat_type`. Mirrors `init_filesystem` in the
    /// original `vfs.c`: an existing image's own stored parameters win over
    /// whatever was requested on the command line.
    pub fn open_or_format(path: &Path, block_size: BlockSize, fat_type: FatType) -> Result<Self> {
        if path.exists() {
            Self::open(path)
        } else {
            Self::format(path, block_size, fat_type)
        }
    }

    fn format(path: &Path, block_size: BlockSize, fat_type: FatType) -> Result<Self> {
        let layout = Layout::new(block_size.bytes(), fat_type.entries());
        let total_size = layout.total_size();
        info!("formatting virtual file-system ({total_size} bytes) ... please wait");

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(total_size)?;

        let mmap = unsafe { MmapOptions::new().map_mut(&file) }.map_err(|_| Error::Mmap)?;
        let mut image = Self { mmap, layout };

        image.init_superblock(block_size, fat_type);
        image.init_free_list();
        image.init_dir_block(0, 0);
        Ok(image)
    }

    fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let file_len = file.metadata()?.len();

        let mmap = unsafe { MmapOptions::new().map_mut(&file) }.map_err(|_| Error::Mmap)?;
        // Peek the stored block_size/fat_type before trusting the rest of the mapping.
        // `ref_from_prefix` itself rejects a mapping shorter than a superblock, so the
        // file is never indexed before its length is known to be sufficient.
        let peek = RawSuperblock::ref_from_prefix(&mmap)
            .map_err(|_| Error::InvalidFilesystem(path.to_path_buf()))?
            .0;
        let block_size = peek.block_size.get();
        let fat_type = peek.fat_type.get();
        let check_number = peek.check_number.get();

        let fat_type = FatType::from_u32(fat_type.max(0) as u32)
            .map_err(|_| Error::InvalidFilesystem(path.to_path_buf()))?;
        let layout = Layout::new(block_size.max(0) as u32, fat_type.entries());

        if check_number != CHECK_NUMBER || file_len != layout.total_size() {
            return Err(Error::InvalidFilesystem(path.to_path_buf()));
        }

        Ok(Self { mmap, layout })
    }

    fn init_superblock(&mut self, block_size: BlockSize, fat_type: FatType) {
        let sb = self.superblock_mut();
        sb.check_number = I32::new(CHECK_NUMBER);
        sb.block_size = I32::new(block_size.bytes() as i32);
        sb.fat_type = I32::new(fat_type as i32);
        sb.root_block = I32::new(0);
        sb.free_block = I32::new(1);
        sb.n_free_blocks = I32::new(self.layout.fat_entries as i32 - 1);
    }

    fn init_free_list(&mut self) {
        let n = self.layout.fat_entries;
        let fat = self.fat_mut();
        fat[0] = I32::new(-1);
        for i in 1..n - 1 {
            fat[i as usize] = I32::new(i as i32 + 1);
        }
        fat[(n - 1) as usize] = I32::new(-1);
    }

    fn init_dir_block(&mut self, block: u32, parent_block: u32) {
        let mut dot = RawDirEntry::empty();
        dot.r#type = TYPE_DIR;
        dot.set_name(".");
        dot.size = I32::new(2);
        dot.first_block = I32::new(block as i32);
        let (day, month, year) = crate::today();
        dot.day = day;
        dot.month = month;
        dot.year = year;

        let mut dotdot = RawDirEntry::empty();
        dotdot.r#type = TYPE_DIR;
        dotdot.set_name("..");
        dotdot.size = I32::new(0);
        dotdot.first_block = I32::new(parent_block as i32);
        dotdot.day = day;
        dotdot.month = month;
        dotdot.year = year;

        let entry_bytes = core::mem::size_of::<RawDirEntry>();
        let buf = self.block_mut(block);
        buf[..entry_bytes].copy_from_slice(dot.as_bytes());
        buf[entry_bytes..2 * entry_bytes].copy_from_slice(dotdot.as_bytes());
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn block_size(&self) -> u32 {
        self.layout.block_size
    }

    pub fn fat_entries(&self) -> u32 {
        self.layout.fat_entries
    }

    pub fn entries_per_block(&self) -> u32 {
        self.layout.entries_per_block()
    }

    pub fn superblock(&self) -> &RawSuperblock {
        RawSuperblock::ref_from_prefix(&self.mmap[..core::mem::size_of::<RawSuperblock>()])
            .expect("superblock region is always large enough")
            .0
    }

    pub fn superblock_mut(&mut self) -> &mut RawSuperblock {
        RawSuperblock::mut_from_prefix(&mut self.mmap[..core::mem::size_of::<RawSuperblock>()])
            .expect("superblock region is always large enough")
            .0
    }

    pub fn fat(&self) -> &[I32] {
        let start = self.layout.fat_offset() as usize;
        let end = start + self.layout.fat_bytes() as usize;
        <[I32]>::ref_from_bytes(&self.mmap[start..end]).expect("FAT region is 4-byte aligned by layout")
    }

    pub fn fat_mut(&mut self) -> &mut [I32] {
        let start = self.layout.fat_offset() as usize;
        let end = start + self.layout.fat_bytes() as usize;
        <[I32]>::mut_from_bytes(&mut self.mmap[start..end])
            .expect("FAT region is 4-byte aligned by layout")
    }

    pub fn block(&self, index: u32) -> &[u8] {
        let start = self.layout.data_offset() as usize + index as usize * self.layout.block_size as usize;
        &self.mmap[start..start + self.layout.block_size as usize]
    }

    pub fn block_mut(&mut self, index: u32) -> &mut [u8] {
        let block_size = self.layout.block_size as usize;
        let start = self.layout.data_offset() as usize + index as usize * block_size;
        &mut self.mmap[start..start + block_size]
    }

    pub fn flush(&self) -> Result<()> {
        self.mmap.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_creates_byte_exact_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.vfs");
        let image = Image::open_or_format(&path, BlockSize::B512, FatType::Fat8).unwrap();
        let expected = 512 + 4 * 256 + 256 * 512;
        assert_eq!(std::fs::metadata(&path).unwrap().len(), expected);
        assert_eq!(image.superblock().check_number.get(), CHECK_NUMBER);
        assert_eq!(image.superblock().free_block.get(), 1);
        assert_eq!(image.superblock().n_free_blocks.get(), 255);
        drop(image);
    }

    #[test]
    fn root_directory_has_dot_and_dotdot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.vfs");
        let image = Image::open_or_format(&path, BlockSize::B512, FatType::Fat8).unwrap();
        let block = image.block(0);
        let dot = RawDirEntry::ref_from_bytes(&block[..32]).unwrap();
        assert_eq!(dot.name_str(), ".");
        assert_eq!(dot.size.get(), 2);
        assert_eq!(dot.first_block.get(), 0);
        let dotdot = RawDirEntry::ref_from_bytes(&block[32..64]).unwrap();
        assert_eq!(dotdot.name_str(), "..");
        assert_eq!(dotdot.first_block.get(), 0);
    }

    #[test]
    fn reopen_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.vfs");
        {
            let mut image = Image::open_or_format(&path, BlockSize::B512, FatType::Fat10).unwrap();
            image.fat_mut()[1] = I32::new(-1);
            image.superblock_mut().free_block = I32::new(2);
            image.flush().unwrap();
        }
        let image = Image::open_or_format(&path, BlockSize::B512, FatType::Fat10).unwrap();
        assert_eq!(image.superblock().free_block.get(), 2);
        assert_eq!(image.fat()[1].get(), -1);
    }

    #[test]
    fn rejects_truncated_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.vfs");
        Image::open_or_format(&path, BlockSize::B512, FatType::Fat8).unwrap();
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(10).unwrap();
        drop(file);
        assert!(Image::open_or_format(&path, BlockSize::B512, FatType::Fat8).is_err());
    }
}
