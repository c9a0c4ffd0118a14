//! Directory engine: a directory is a FAT chain of fixed-size entry slots,
//! addressed densely across the chain (entry `i` lives in
//! `chain[i / entries_per_block]`, slot `i % entries_per_block`). Entry 0 is
//! always `.`, entry 1 is always `..`, and entry 0's `size` field is the
//! single source of truth for the directory's population.

use vfs_err::{Error, Result};
use vfs_image::{Image, RawDirEntry};
use zerocopy::little_endian::I32;
use zerocopy::{FromBytes, IntoBytes};

use crate::chain;
use crate::entry::Entry;

const ENTRY_SIZE: usize = core::mem::size_of::<RawDirEntry>();

fn read_raw(image: &Image, phys_block: u32, slot: u32) -> RawDirEntry {
    let offset = slot as usize * ENTRY_SIZE;
    let bytes = &image.block(phys_block)[offset..offset + ENTRY_SIZE];
    *RawDirEntry::ref_from_bytes(bytes).expect("slot is entry-aligned")
}

fn write_raw(image: &mut Image, phys_block: u32, slot: u32, raw: &RawDirEntry) {
    let offset = slot as usize * ENTRY_SIZE;
    image.block_mut(phys_block)[offset..offset + ENTRY_SIZE].copy_from_slice(raw.as_bytes());
}

/// Current population of the directory headed at `head` (entry 0's `size`).
pub fn size(image: &Image, head: u32) -> u32 {
    read_raw(image, head, 0).size.get() as u32
}

fn set_size(image: &mut Image, head: u32, new_size: u32) {
    let mut entry0 = read_raw(image, head, 0);
    entry0.size = I32::new(new_size as i32);
    write_raw(image, head, 0, &entry0);
}

/// A located entry: its logical index, its physical slot, and its value.
pub struct Located {
    pub index: u32,
    pub phys_block: u32,
    pub slot: u32,
    pub entry: Entry,
}

/// Linear scan over the directory's `size` live entries, byte-wise name match.
pub fn lookup(image: &Image, head: u32, name: &str) -> Option<Located> {
    let epb = image.entries_per_block();
    let count = size(image, head);
    let mut walker = chain::walk(image, head);
    let mut phys_block = walker.next().expect("directory chain has a head");
    let mut blocks_consumed = 0u32;

    for index in 0..count {
        let chain_idx = index / epb;
        while blocks_consumed < chain_idx {
            phys_block = walker.next().expect("chain long enough for its own size");
            blocks_consumed += 1;
        }
        let slot = index % epb;
        let raw = read_raw(image, phys_block, slot);
        if raw.name_str() == name {
            return Some(Located {
                index,
                phys_block,
                slot,
                entry: Entry::from_raw(&raw),
            });
        }
    }
    None
}

/// Append `entry` at position `size`, allocating and linking a new block
/// first if the current last block is full. Caller must have already
/// checked for a name collision via [`lookup`].
pub fn insert(image: &mut Image, head: u32, entry: &Entry) -> Result<()> {
    let epb = image.entries_per_block();
    let count = size(image, head);

    let phys_block = if count % epb == 0 {
        let last = chain::last(image, head);
        chain::extend(image, last)?
    } else {
        chain::nth(image, head, count / epb)
    };

    let slot = count % epb;
    write_raw(image, phys_block, slot, &entry.to_raw());
    set_size(image, head, count + 1);
    Ok(())
}

/// Remove the entry at logical `index` (located at `phys_block`/`slot`) by
/// swap-with-last compaction: the current last entry overwrites the removed
/// slot (unless it IS the removed slot), then `size` shrinks by one. If the
/// old last block becomes empty as a result, it is unlinked and freed.
pub fn remove(image: &mut Image, head: u32, located: &Located) {
    let epb = image.entries_per_block();
    let count = size(image, head);
    let last_index = count - 1;

    if located.index != last_index {
        let last_chain_idx = last_index / epb;
        let last_slot = last_index % epb;
        let last_phys_block = chain::nth(image, head, last_chain_idx);
        let last_raw = read_raw(image, last_phys_block, last_slot);
        write_raw(image, located.phys_block, located.slot, &last_raw);
    }

    let new_count = count - 1;
    if new_count % epb == 0 && new_count > 0 {
        let trailing_chain_idx = new_count / epb;
        let trailing_block = chain::nth(image, head, trailing_chain_idx);
        let prev_block = chain::nth(image, head, trailing_chain_idx - 1);
        crate::alloc::free(image, trailing_block);
        image.fat_mut()[prev_block as usize] = zerocopy::little_endian::I32::new(vfs_image::END_OF_CHAIN);
    }
    set_size(image, head, new_count);
}

/// All `size` live entries, in storage order.
pub fn enumerate(image: &Image, head: u32) -> Vec<Entry> {
    let epb = image.entries_per_block();
    let count = size(image, head);
    let mut walker = chain::walk(image, head);
    let mut phys_block = walker.next().expect("directory chain has a head");
    let mut blocks_consumed = 0u32;

    let mut entries = Vec::with_capacity(count as usize);
    for index in 0..count {
        let chain_idx = index / epb;
        while blocks_consumed < chain_idx {
            phys_block = walker.next().expect("chain long enough for its own size");
            blocks_consumed += 1;
        }
        let slot = index % epb;
        entries.push(Entry::from_raw(&read_raw(image, phys_block, slot)));
    }
    entries
}

/// Initialise a brand-new directory block with `.` and `..` in place, both
/// dated today, entry 0's `size` set to 2.
pub fn init(image: &mut Image, block: u32, parent_block: u32) {
    let dot = Entry::new_dir(".", block);
    let mut dotdot = Entry::new_dir("..", parent_block);
    dotdot.size = 0;
    let mut dot_raw = dot.to_raw();
    dot_raw.size = I32::new(2);

    write_raw(image, block, 0, &dot_raw);
    write_raw(image, block, 1, &dotdot.to_raw());
}

/// Overwrite a located slot with a new entry value, without touching `size`.
/// Used by `cp`/`mv` when the destination already exists.
pub fn overwrite(image: &mut Image, located: &Located, entry: &Entry) {
    write_raw(image, located.phys_block, located.slot, &entry.to_raw());
}

/// The directory's parent block, read straight out of entry 1 (`..`).
pub fn parent(image: &Image, head: u32) -> u32 {
    read_raw(image, head, 1).first_block.get() as u32
}

pub fn reject_dot_names(name: &str) -> Result<()> {
    if name == "." || name == ".." {
        Err(Error::InvalidArgument(name.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vfs_image::{BlockSize, FatType};

    fn new_image() -> Image {
        let dir = tempfile::tempdir().unwrap();
        Image::open_or_format(&dir.path().join("disk.vfs"), BlockSize::B512, FatType::Fat8).unwrap()
    }

    #[test]
    fn root_starts_with_dot_and_dotdot_only() {
        let image = new_image();
        assert_eq!(size(&image, 0), 2);
        let entries = enumerate(&image, 0);
        assert_eq!(entries[0].name, ".");
        assert_eq!(entries[0].first_block, 0);
        assert_eq!(entries[1].name, "..");
        assert_eq!(entries[1].first_block, 0);
    }

    #[test]
    fn insert_then_lookup_finds_the_entry() {
        let mut image = new_image();
        insert(&mut image, 0, &Entry::new_dir("a", 1)).unwrap();
        assert_eq!(size(&image, 0), 3);
        let found = lookup(&image, 0, "a").unwrap();
        assert_eq!(found.entry.name, "a");
        assert_eq!(found.index, 2);
        assert!(lookup(&image, 0, "missing").is_none());
    }

    #[test]
    fn lookup_is_byte_wise_case_sensitive() {
        let mut image = new_image();
        insert(&mut image, 0, &Entry::new_dir("Foo", 1)).unwrap();
        assert!(lookup(&image, 0, "foo").is_none());
        assert!(lookup(&image, 0, "Foo").is_some());
    }

    #[test]
    fn remove_swaps_with_last_and_shrinks() {
        let mut image = new_image();
        insert(&mut image, 0, &Entry::new_dir("a", 1)).unwrap();
        insert(&mut image, 0, &Entry::new_dir("b", 2)).unwrap();
        insert(&mut image, 0, &Entry::new_dir("c", 3)).unwrap();

        let a = lookup(&image, 0, "a").unwrap();
        remove(&mut image, 0, &a);

        assert_eq!(size(&image, 0), 4);
        let names: Vec<String> = enumerate(&image, 0).into_iter().map(|e| e.name).collect();
        assert!(!names.contains(&"a".to_string()));
        assert!(names.contains(&"b".to_string()));
        assert!(names.contains(&"c".to_string()));
    }

    #[test]
    fn removing_last_entry_is_a_plain_shrink() {
        let mut image = new_image();
        insert(&mut image, 0, &Entry::new_dir("a", 1)).unwrap();
        let a = lookup(&image, 0, "a").unwrap();
        remove(&mut image, 0, &a);
        assert_eq!(size(&image, 0), 2);
        assert!(lookup(&image, 0, "a").is_none());
    }

    #[test]
    fn inserting_past_a_block_boundary_allocates_and_links_a_new_block() {
        let mut image = new_image();
        let epb = image.entries_per_block();
        let free_before = image.superblock().n_free_blocks.get();

        // Root already holds `.`/`..`; fill it up to exactly one full block.
        for i in 0..(epb - 2) {
            insert(&mut image, 0, &Entry::new_dir(&format!("d{i}"), i + 1)).unwrap();
        }
        assert_eq!(size(&image, 0), epb);
        assert_eq!(chain::walk(&image, 0).count(), 1);
        assert_eq!(image.superblock().n_free_blocks.get(), free_before);

        // One more entry must cross the boundary and allocate a second block.
        insert(&mut image, 0, &Entry::new_dir("overflow", 999)).unwrap();
        assert_eq!(size(&image, 0), epb + 1);
        assert_eq!(chain::walk(&image, 0).count(), 2);
        assert_eq!(image.superblock().n_free_blocks.get(), free_before - 1);

        // Removing the entry that crossed the boundary must free that block again.
        let located = lookup(&image, 0, "overflow").unwrap();
        remove(&mut image, 0, &located);
        assert_eq!(size(&image, 0), epb);
        assert_eq!(chain::walk(&image, 0).count(), 1);
        assert_eq!(image.superblock().n_free_blocks.get(), free_before);
    }

    #[test]
    fn name_of_19_bytes_is_accepted_20_is_rejected() {
        let name19 = "a".repeat(19);
        let name20 = "a".repeat(20);
        assert!(crate::entry::name_fits(&name19));
        assert!(!crate::entry::name_fits(&name20));
    }

    #[test]
    fn reject_dot_names_rejects_dot_and_dotdot_only() {
        assert!(reject_dot_names(".").is_err());
        assert!(reject_dot_names("..").is_err());
        assert!(reject_dot_names("a").is_ok());
    }
}
