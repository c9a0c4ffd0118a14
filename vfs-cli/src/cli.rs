//! Command-line argument parsing: `vfs [-b{256|512|1024}] [-f{8|10|12}] IMAGE_PATH`.
//!
//! Hand-rolled over `std::env::args` rather than a declarative parser,
//! mirroring the flag grammar of the original `vfs` tool this crate
//! reimplements: short flags glued to their value, in either order, always
//! before the positional image path.

use std::path::PathBuf;
use std::process;

use vfs_image::{BlockSize, FatType};

pub struct Args {
    pub block_size: BlockSize,
    pub fat_type: FatType,
    pub image_path: PathBuf,
}

const USAGE: &str = "Usage: vfs [-b[256|512|1024]] [-f[8|10|12]] FILESYSTEM";

fn usage_error(message: &str) -> ! {
    eprintln!("vfs: {message}");
    eprintln!("{USAGE}");
    process::exit(1);
}

pub fn parse() -> Args {
    let argv: Vec<String> = std::env::args().collect();
    if argv.len() < 2 || argv.len() > 4 {
        usage_error("invalid number of arguments");
    }

    let mut block_size = BlockSize::default();
    let mut fat_type = FatType::default();

    for flag in &argv[1..argv.len() - 1] {
        let mut chars = flag.char_indices();
        if chars.next().map(|(_, c)| c) != Some('-') {
            usage_error(&format!("invalid argument ({flag})"));
        }
        match chars.next().map(|(_, c)| c) {
            Some('b') => {
                let value: u32 = flag[2..].parse().unwrap_or(0);
                block_size = BlockSize::from_u32(value)
                    .unwrap_or_else(|_| usage_error(&format!("invalid block size ({value})")));
            }
            Some('f') => {
                let value: u32 = flag[2..].parse().unwrap_or(0);
                fat_type = FatType::from_u32(value)
                    .unwrap_or_else(|_| usage_error(&format!("invalid fat type ({value})")));
            }
            _ => usage_error(&format!("invalid argument ({flag})")),
        }
    }

    let image_path = PathBuf::from(argv.last().expect("argc checked above").clone());
    Args {
        block_size,
        fat_type,
        image_path,
    }
}
