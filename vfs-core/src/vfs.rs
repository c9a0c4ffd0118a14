//! The mounted-image handle: the superblock/FAT/data views plus the single
//! piece of process-wide state the core adds on top of them, the current
//! directory's first block. Every shell command is one method call here.

use std::io::Write;
use std::path::Path;

use vfs_err::{Error, Result};
use vfs_image::{BlockSize, FatType, Image};

use crate::alloc;
use crate::dir::{self, reject_dot_names};
use crate::entry::{name_fits, Entry};
use crate::file;
use crate::list;
use crate::path;

/// A formatted or freshly-opened image plus the block of the directory the
/// shell is currently "in". Threaded through every command.
pub struct Vfs {
    image: Image,
    current_dir: u32,
}

impl Vfs {
    pub fn open_or_format(path: &Path, block_size: BlockSize, fat_type: FatType) -> Result<Self> {
        let image = Image::open_or_format(path, block_size, fat_type)?;
        let root_block = image.superblock().root_block.get() as u32;
        Ok(Self {
            image,
            current_dir: root_block,
        })
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    fn root_block(&self) -> u32 {
        self.image.superblock().root_block.get() as u32
    }

    pub fn flush(&self) -> Result<()> {
        self.image.flush()
    }

    pub fn ls(&self) -> Vec<String> {
        list::render(&self.image, self.current_dir)
    }

    pub fn pwd(&self) -> String {
        path::pwd(&self.image, self.root_block(), self.current_dir)
    }

    pub fn cd(&mut self, name: &str) -> Result<()> {
        let located = dir::lookup(&self.image, self.current_dir, name).ok_or_else(|| Error::NotFound(name.to_string()))?;
        if !located.entry.is_dir() {
            return Err(Error::NotADirectory(name.to_string()));
        }
        self.current_dir = located.entry.first_block;
        Ok(())
    }

    pub fn mkdir(&mut self, name: &str) -> Result<()> {
        if !name_fits(name) {
            return Err(Error::NameTooLong(name.to_string()));
        }
        if dir::lookup(&self.image, self.current_dir, name).is_some() {
            return Err(Error::AlreadyExists(name.to_string()));
        }

        let new_block = alloc::allocate(&mut self.image)?;
        let entry = Entry::new_dir(name, new_block);
        if let Err(err) = dir::insert(&mut self.image, self.current_dir, &entry) {
            alloc::free(&mut self.image, new_block);
            return Err(err);
        }
        dir::init(&mut self.image, new_block, self.current_dir);
        Ok(())
    }

    pub fn rmdir(&mut self, name: &str) -> Result<()> {
        reject_dot_names(name)?;
        let located = dir::lookup(&self.image, self.current_dir, name).ok_or_else(|| Error::NotFound(name.to_string()))?;
        if !located.entry.is_dir() {
            return Err(Error::NotADirectory(name.to_string()));
        }
        if dir::size(&self.image, located.entry.first_block) > 2 {
            return Err(Error::DirectoryNotEmpty(name.to_string()));
        }
        alloc::free(&mut self.image, located.entry.first_block);
        dir::remove(&mut self.image, self.current_dir, &located);
        Ok(())
    }

    pub fn get(&mut self, host_path: &Path, vfs_name: &str) -> Result<()> {
        file::get(&mut self.image, self.current_dir, host_path, vfs_name)
    }

    pub fn put(&self, vfs_name: &str, host_path: &Path) -> Result<()> {
        file::put(&self.image, self.current_dir, vfs_name, host_path)
    }

    pub fn cat(&self, vfs_name: &str, out: &mut dyn Write) -> Result<()> {
        file::cat(&self.image, self.current_dir, vfs_name, out)
    }

    pub fn cp(&mut self, src: &str, dst: &str) -> Result<()> {
        file::cp(&mut self.image, self.current_dir, src, dst)
    }

    pub fn mv(&mut self, src: &str, dst: &str) -> Result<()> {
        file::mv(&mut self.image, self.current_dir, src, dst)
    }

    pub fn rm(&mut self, name: &str) -> Result<()> {
        file::rm(&mut self.image, self.current_dir, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_vfs() -> Vfs {
        let dir = tempfile::tempdir().unwrap();
        Vfs::open_or_format(&dir.path().join("disk.vfs"), BlockSize::B512, FatType::Fat8).unwrap()
    }

    #[test]
    fn format_and_root_lists_dot_and_dotdot_as_directories() {
        let vfs = new_vfs();
        let lines = vfs.ls();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(". ,") || lines[0].starts_with(".,"));
        assert!(lines.iter().all(|line| line.ends_with(", DIR")));
        assert!(lines[0].starts_with('.'));
        assert!(lines[1].starts_with(".."));
    }

    #[test]
    fn mkdir_cd_pwd_resolves_a_nested_path() {
        let mut vfs = new_vfs();
        vfs.mkdir("a").unwrap();
        vfs.cd("a").unwrap();
        vfs.mkdir("b").unwrap();
        vfs.cd("b").unwrap();
        assert_eq!(vfs.pwd(), "/a/b");
    }

    #[test]
    fn rmdir_on_a_non_empty_directory_is_rejected_and_leaves_both_dirs() {
        let mut vfs = new_vfs();
        vfs.mkdir("a").unwrap();
        vfs.cd("a").unwrap();
        vfs.mkdir("b").unwrap();
        vfs.cd("..").unwrap();

        let err = vfs.rmdir("a").unwrap_err();
        assert_eq!(err.to_string(), "'a': Directory not empty.");

        vfs.cd("a").unwrap();
        assert!(vfs.cd("b").is_ok());
    }

    #[test]
    fn mkdir_rmdir_restores_free_block_count() {
        let mut vfs = new_vfs();
        let free_before = vfs.image().superblock().n_free_blocks.get();
        vfs.mkdir("a").unwrap();
        vfs.rmdir("a").unwrap();
        assert_eq!(vfs.image().superblock().n_free_blocks.get(), free_before);
    }

    #[test]
    fn cd_and_rmdir_reject_dot_and_dotdot_names() {
        let mut vfs = new_vfs();
        assert!(vfs.rmdir(".").is_err());
        assert!(vfs.rmdir("..").is_err());
        assert!(vfs.cd(".").is_ok());
        assert!(vfs.cd("..").is_ok());
    }

    #[test]
    fn cd_into_a_file_is_rejected_as_not_a_directory() {
        let mut vfs = new_vfs();
        let dir = tempfile::tempdir().unwrap();
        let host_path = dir.path().join("a.bin");
        std::fs::write(&host_path, b"x").unwrap();
        vfs.get(&host_path, "f").unwrap();
        assert!(matches!(vfs.cd("f"), Err(Error::NotADirectory(_))));
    }

    #[test]
    fn filling_the_disk_then_one_more_allocation_reports_disk_full() {
        let mut vfs = new_vfs();
        let total_free = vfs.image().superblock().n_free_blocks.get();
        for i in 0..total_free {
            vfs.mkdir(&format!("d{i}")).unwrap();
        }
        match vfs.mkdir("overflow") {
            Err(Error::DiskFull) => {}
            other => panic!("expected DiskFull, got {other:?}"),
        }
        // A failed mkdir must not have consumed any blocks nor added an entry.
        assert_eq!(vfs.image().superblock().n_free_blocks.get(), 0);
        assert!(dir::lookup(vfs.image(), 0, "overflow").is_none());
    }

    #[test]
    fn get_put_round_trip_is_byte_identical() {
        let mut vfs = new_vfs();
        let dir = tempfile::tempdir().unwrap();
        let host_in = dir.path().join("hostname");
        let host_out = dir.path().join("out");
        std::fs::write(&host_in, b"my-host-name\n").unwrap();

        vfs.get(&host_in, "h").unwrap();
        vfs.put("h", &host_out).unwrap();
        assert_eq!(std::fs::read(&host_out).unwrap(), std::fs::read(&host_in).unwrap());
    }

    #[test]
    fn reopening_an_image_preserves_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.vfs");
        {
            let mut vfs = Vfs::open_or_format(&path, BlockSize::B512, FatType::Fat8).unwrap();
            vfs.mkdir("a").unwrap();
            vfs.flush().unwrap();
        }
        let vfs = Vfs::open_or_format(&path, BlockSize::B512, FatType::Fat8).unwrap();
        assert_eq!(vfs.ls().len(), 3);
    }
}
