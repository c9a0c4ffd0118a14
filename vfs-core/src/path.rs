//! Absolute-path resolution from a current-directory block, by walking `..`
//! pointers and re-deriving each segment's name from its parent's listing
//! (the entry itself carries no back-pointer to its own name).

use vfs_image::Image;

use crate::dir;
use crate::entry::Kind;

/// Render the absolute path of the directory at block `current`, given the
/// image's root block (always 0).
pub fn pwd(image: &Image, root_block: u32, current: u32) -> String {
    if current == root_block {
        return "/".to_string();
    }

    let mut segments = Vec::new();
    let mut cur = current;
    while cur != root_block {
        let parent_block = dir::parent(image, cur);
        let name = dir::enumerate(image, parent_block)
            .into_iter()
            .find(|e| e.kind == Kind::Dir && e.first_block == cur)
            .map(|e| e.name)
            .expect("every non-root directory is listed once under its parent");
        segments.push(name);
        cur = parent_block;
    }
    segments.reverse();
    format!("/{}", segments.join("/"))
}
