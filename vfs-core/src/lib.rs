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

//! Block allocator, FAT chain engine, directory engine, file engine,
//! listing, and path/current-directory state for the vfs virtual file
//! system, all built on top of [`vfs_image::Image`]'s byte-exact mapping.
//!
//! Grounded on `fs/src/lib.rs`'s `FileSystem` trait shape (generalised here
//! into the single concrete FAT-chain format this workspace implements) and
//! `fs/fat/src/lib.rs`'s `ClusterChain` walking style.

pub mod alloc;
pub mod chain;
pub mod dir;
pub mod entry;
pub mod file;
pub mod list;
pub mod path;
mod vfs;

pub use entry::{Date, Entry, Kind};
pub use vfs::Vfs;
