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

//! `vfs` — an interactive shell over a single memory-mapped virtual file
//! system image (see [`vfs_core`] and [`vfs_image`] for the on-disk format).

mod cli;
mod shell;

use std::process;

use vfs_core::Vfs;

fn main() {
    env_logger::init();

    let args = cli::parse();
    let mut vfs = match Vfs::open_or_format(&args.image_path, args.block_size, args.fat_type) {
        Ok(vfs) => vfs,
        Err(err) => {
            eprintln!("vfs: {err}");
            process::exit(1);
        }
    };

    if let Err(err) = shell::run(&mut vfs) {
        eprintln!("vfs: {err}");
        process::exit(1);
    }

    if let Err(err) = vfs.flush() {
        eprintln!("vfs: {err}");
        process::exit(1);
    }
}
