//! Error types shared by every crate in the vfs workspace.

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid block size ({0})")]
    InvalidBlockSize(u32),
    #[error("invalid fat type ({0})")]
    InvalidFatType(u32),
    #[error("cannot map filesystem (mmap error)")]
    Mmap,
    #[error("invalid filesystem ({0})")]
    InvalidFilesystem(PathBuf),

    #[error("Disk full.")]
    DiskFull,

    #[error("'{0}': No such file or directory")]
    NotFound(String),
    #[error("'{0}': File exists")]
    AlreadyExists(String),
    #[error("'{0}': Not a directory")]
    NotADirectory(String),
    #[error("'{0}': Is a directory")]
    IsADirectory(String),
    #[error("'{0}': Directory not empty")]
    DirectoryNotEmpty(String),
    #[error("'{0}': File name too long")]
    NameTooLong(String),
    #[error("'{0}': Invalid argument")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;
