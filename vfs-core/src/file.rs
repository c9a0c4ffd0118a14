//! File engine: moving bytes between a host path/stream and a VFS chain, and
//! the intra-VFS `cp`/`mv`/`rm` entry operations.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use vfs_err::{Error, Result};
use vfs_image::Image;

use crate::alloc;
use crate::chain;
use crate::dir::{self, Located};
use crate::entry::{name_fits, Entry};

fn blocks_for_size(size: u32, block_size: u32) -> u32 {
    if size == 0 {
        1
    } else {
        (size + block_size - 1) / block_size
    }
}

fn read_fill(file: &mut File, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

fn stream_out(image: &Image, entry: &Entry, out: &mut dyn Write) -> Result<()> {
    let block_size = image.block_size();
    let full_blocks = entry.size / block_size;
    let remainder = entry.size % block_size;
    let mut walker = chain::walk(image, entry.first_block);
    for _ in 0..full_blocks {
        let block = walker.next().expect("chain covers the file's full byte length");
        out.write_all(image.block(block))?;
    }
    if remainder > 0 {
        let block = walker.next().expect("chain covers the file's remainder");
        out.write_all(&image.block(block)[..remainder as usize])?;
    }
    Ok(())
}

/// Import a host file as a new regular file in `dir_head`.
pub fn get(image: &mut Image, dir_head: u32, host_path: &Path, vfs_name: &str) -> Result<()> {
    if !name_fits(vfs_name) {
        return Err(Error::NameTooLong(vfs_name.to_string()));
    }
    if dir::lookup(image, dir_head, vfs_name).is_some() {
        return Err(Error::AlreadyExists(vfs_name.to_string()));
    }

    let mut host_file = File::open(host_path)?;
    let block_size = image.block_size() as usize;
    let mut buf = vec![0u8; block_size];

    let first = alloc::allocate(image)?;
    let mut last = first;
    let mut total = 0u32;

    loop {
        let n = match read_fill(&mut host_file, &mut buf) {
            Ok(n) => n,
            Err(err) => {
                alloc::free_chain(image, first);
                return Err(err);
            }
        };
        if n == 0 {
            break;
        }
        image.block_mut(last)[..n].copy_from_slice(&buf[..n]);
        total += n as u32;
        if n < block_size {
            break;
        }
        match chain::extend(image, last) {
            Ok(next) => last = next,
            Err(err) => {
                alloc::free_chain(image, first);
                return Err(err);
            }
        }
    }

    let entry = Entry::new_file(vfs_name, first, total);
    if let Err(err) = dir::insert(image, dir_head, &entry) {
        alloc::free_chain(image, first);
        return Err(err);
    }
    Ok(())
}

/// Export a VFS file to a (created/truncated) host path.
pub fn put(image: &Image, dir_head: u32, vfs_name: &str, host_path: &Path) -> Result<()> {
    let located = dir::lookup(image, dir_head, vfs_name).ok_or_else(|| Error::NotFound(vfs_name.to_string()))?;
    if located.entry.is_dir() {
        return Err(Error::IsADirectory(vfs_name.to_string()));
    }
    let mut host_file = File::create(host_path)?;
    stream_out(image, &located.entry, &mut host_file)
}

/// Write a VFS file to `out` (standard output, in the shell).
pub fn cat(image: &Image, dir_head: u32, vfs_name: &str, out: &mut dyn Write) -> Result<()> {
    let located = dir::lookup(image, dir_head, vfs_name).ok_or_else(|| Error::NotFound(vfs_name.to_string()))?;
    if located.entry.is_dir() {
        return Err(Error::IsADirectory(vfs_name.to_string()));
    }
    stream_out(image, &located.entry, out)
}

/// Copy `src` to `dst` within the current directory. `dst` may be absent
/// (fresh file), an existing file (overwritten in place), or an existing
/// directory (recurse using `src`'s own name).
pub fn cp(image: &mut Image, dir_head: u32, src_name: &str, dst_name: &str) -> Result<()> {
    let src = dir::lookup(image, dir_head, src_name).ok_or_else(|| Error::NotFound(src_name.to_string()))?;
    if src.entry.is_dir() {
        return Err(Error::IsADirectory(src_name.to_string()));
    }
    cp_into(image, dir_head, &src.entry, dst_name)
}

fn cp_into(image: &mut Image, dst_dir: u32, src: &Entry, dst_name: &str) -> Result<()> {
    match dir::lookup(image, dst_dir, dst_name) {
        None => {
            if !name_fits(dst_name) {
                return Err(Error::NameTooLong(dst_name.to_string()));
            }
            let block_count = blocks_for_size(src.size, image.block_size());
            let new_head = chain::copy(image, src.first_block, block_count)?;
            let new_entry = Entry::new_file(dst_name, new_head, src.size);
            if let Err(err) = dir::insert(image, dst_dir, &new_entry) {
                alloc::free_chain(image, new_head);
                return Err(err);
            }
            Ok(())
        }
        Some(existing) => {
            if existing.entry.is_dir() {
                return cp_into(image, existing.entry.first_block, src, &src.name.clone());
            }
            if existing.entry.first_block == src.first_block {
                return Err(Error::InvalidArgument(dst_name.to_string()));
            }
            let block_count = blocks_for_size(src.size, image.block_size());
            let new_head = chain::copy(image, src.first_block, block_count)?;
            alloc::free_chain(image, existing.entry.first_block);
            let mut updated = existing.entry.clone();
            updated.first_block = new_head;
            updated.size = src.size;
            dir::overwrite(image, &existing, &updated);
            Ok(())
        }
    }
}

/// Move (rename) `src` to `dst`: same destination dispatch as [`cp`], but
/// the source chain is reused rather than duplicated, and the source entry
/// is removed from its own directory via swap-with-last compaction.
pub fn mv(image: &mut Image, dir_head: u32, src_name: &str, dst_name: &str) -> Result<()> {
    let src_located = dir::lookup(image, dir_head, src_name).ok_or_else(|| Error::NotFound(src_name.to_string()))?;
    if src_located.entry.is_dir() {
        return Err(Error::IsADirectory(src_name.to_string()));
    }
    mv_into(image, dir_head, &src_located, dir_head, dst_name)
}

fn mv_into(image: &mut Image, src_dir: u32, src_located: &Located, dst_dir: u32, dst_name: &str) -> Result<()> {
    match dir::lookup(image, dst_dir, dst_name) {
        None => {
            if !name_fits(dst_name) {
                return Err(Error::NameTooLong(dst_name.to_string()));
            }
            let new_entry = Entry::new_file(dst_name, src_located.entry.first_block, src_located.entry.size);
            dir::insert(image, dst_dir, &new_entry)?;
            dir::remove(image, src_dir, src_located);
            Ok(())
        }
        Some(existing) => {
            if existing.entry.is_dir() {
                let name = src_located.entry.name.clone();
                return mv_into(image, src_dir, src_located, existing.entry.first_block, &name);
            }
            if existing.entry.first_block == src_located.entry.first_block {
                return Err(Error::InvalidArgument(dst_name.to_string()));
            }
            alloc::free_chain(image, existing.entry.first_block);
            let mut updated = existing.entry.clone();
            updated.first_block = src_located.entry.first_block;
            updated.size = src_located.entry.size;
            dir::overwrite(image, &existing, &updated);
            dir::remove(image, src_dir, src_located);
            Ok(())
        }
    }
}

/// Remove a regular file.
pub fn rm(image: &mut Image, dir_head: u32, name: &str) -> Result<()> {
    let located = dir::lookup(image, dir_head, name).ok_or_else(|| Error::NotFound(name.to_string()))?;
    if located.entry.is_dir() {
        return Err(Error::IsADirectory(name.to_string()));
    }
    alloc::free_chain(image, located.entry.first_block);
    dir::remove(image, dir_head, &located);
    Ok(())
}
