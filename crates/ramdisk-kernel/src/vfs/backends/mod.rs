//! VFS backends.
//!
//! Backends implement [`VfsOps`](super::VfsOps) for different storage types.

mod ramdisk;

pub use ramdisk::RamdiskBackend;
