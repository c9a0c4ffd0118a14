//! Following, extending, and duplicating FAT chains.
//!
//! Grounded on `fs/fat`'s `ClusterChain` iterator: both walk a singly-linked
//! chain through a flat table one slot at a time until the sentinel.

use log::debug;
use vfs_err::Result;
use vfs_image::{Image, END_OF_CHAIN};
use zerocopy::little_endian::I32;

use crate::alloc;

/// Yields every block index of a chain, in chain order, starting at `head`.
pub struct Walk<'a> {
    fat: &'a [I32],
    next: Option<u32>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let current = self.next?;
        let slot = self.fat[current as usize].get();
        self.next = if slot == END_OF_CHAIN { None } else { Some(slot as u32) };
        Some(current)
    }
}

pub fn walk(image: &Image, head: u32) -> Walk<'_> {
    Walk {
        fat: image.fat(),
        next: Some(head),
    }
}

/// Last block reachable from `head`.
pub fn last(image: &Image, head: u32) -> u32 {
    walk(image, head).last().expect("a chain always has at least its head")
}

/// The `n`th block (0-indexed) of the chain starting at `head`.
pub fn nth(image: &Image, head: u32, n: u32) -> u32 {
    walk(image, head)
        .nth(n as usize)
        .expect("chain is long enough for any in-range entry index")
}

/// Allocate a fresh block and link it after `last_block`.
pub fn extend(image: &mut Image, last_block: u32) -> Result<u32> {
    let new_block = alloc::allocate(image)?;
    image.fat_mut()[last_block as usize] = I32::new(new_block as i32);
    debug!("extended chain: {last_block} -> {new_block}");
    Ok(new_block)
}

/// Copy `block_count` blocks' worth of bytes from the chain at `src_head`
/// into a freshly allocated chain, returning its head. On `DiskFull`
/// mid-copy, every block allocated so far is released before returning, so
/// the caller observes no partial chain.
pub fn copy(image: &mut Image, src_head: u32, block_count: u32) -> Result<u32> {
    let first = alloc::allocate(image)?;
    let src_first = nth(image, src_head, 0);
    let bytes = image.block(src_first).to_vec();
    image.block_mut(first).copy_from_slice(&bytes);

    let mut dst_last = first;
    for i in 1..block_count {
        let src_block = nth(image, src_head, i);
        let new_block = match extend(image, dst_last) {
            Ok(block) => block,
            Err(err) => {
                alloc::free_chain(image, first);
                return Err(err);
            }
        };
        let bytes = image.block(src_block).to_vec();
        image.block_mut(new_block).copy_from_slice(&bytes);
        dst_last = new_block;
    }
    Ok(first)
}
