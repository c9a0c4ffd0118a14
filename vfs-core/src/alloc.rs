//! Block allocator: the free-list is itself a FAT chain headed by the
//! superblock's `free_block`, exactly like every other chain in the image.

use log::{debug, trace};
use vfs_err::{Error, Result};
use vfs_image::{Image, END_OF_CHAIN};
use zerocopy::little_endian::I32;

use crate::chain;

/// Pop the head of the free-list. The popped block's own FAT slot is reset
/// to end-of-chain so it is immediately usable as a fresh one-block chain.
pub fn allocate(image: &mut Image) -> Result<u32> {
    let head = image.superblock().free_block.get();
    if head < 0 {
        return Err(Error::DiskFull);
    }
    let head = head as u32;
    let next = image.fat()[head as usize].get();

    image.fat_mut()[head as usize] = I32::new(END_OF_CHAIN);
    image.superblock_mut().free_block = I32::new(next);
    let n_free = image.superblock().n_free_blocks.get();
    image.superblock_mut().n_free_blocks = I32::new(n_free - 1);

    debug!("allocated block {head}, {} free remaining", n_free - 1);
    debug_assert!(image.superblock().n_free_blocks.get() >= 0);
    Ok(head)
}

/// Push `block` onto the head of the free-list. Payload bytes are untouched.
pub fn free(image: &mut Image, block: u32) {
    let head = image.superblock().free_block.get();
    image.fat_mut()[block as usize] = I32::new(head);
    image.superblock_mut().free_block = I32::new(block as i32);
    let n_free = image.superblock().n_free_blocks.get();
    image.superblock_mut().n_free_blocks = I32::new(n_free + 1);
    trace!("freed block {block}, {} free now", n_free + 1);
    debug_assert!(image.superblock().n_free_blocks.get() as u32 <= image.fat_entries());
}

/// Release every block reachable from `first`. Blocks are gathered into a
/// list before any of them are pushed onto the free-list, so the free-list
/// is a well-formed chain terminated by -1 at every intermediate step.
pub fn free_chain(image: &mut Image, first: u32) {
    let blocks: Vec<u32> = chain::walk(image, first).collect();
    for block in blocks {
        free(image, block);
    }
}
