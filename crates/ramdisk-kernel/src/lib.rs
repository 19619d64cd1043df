//! # ramdisk-kernel
//!
//! Storage and namespace logic for a userspace in-memory filesystem.
//!
//! Everything lives in a fixed-capacity [`NamespaceTable`]: up to 100
//! entries (directories and regular files of at most 4 KiB), linked into a
//! tree by parent indices and rooted at slot 0. [`RamdiskBackend`] exposes
//! the POSIX-style operations through the [`VfsOps`] trait; every failure is
//! a [`VfsError`] carrying exactly one errno.

pub mod config;
pub mod vfs;

pub use config::{ConfigError, RamdiskConfig};
pub use vfs::{
    DirEntry, FileAttr, FileType, NamespaceTable, RamdiskBackend, StatFs, VfsError, VfsOps,
    VfsResult,
};
