//! Virtual Filesystem core.
//!
//! Key components:
//!
//! - [`NamespaceTable`] - Fixed-capacity slot array holding every entry
//! - [`resolve()`] / [`split_parent()`] - Path to slot index resolution
//! - [`VfsOps`] - Operation contract offered to the driver-dispatch layer
//! - [`RamdiskBackend`] - The handlers, over a locked namespace table
//!
//! ## Design Decisions
//!
//! - **Flat table, parent links**: The tree is encoded by each entry's
//!   parent index. Lookups are linear scans; at 100 slots no index is needed.
//! - **Path-based API**: Slot indices never leave the crate.
//! - **Explicit bounds**: Over-long names and over-capacity writes fail with
//!   an error instead of being truncated.

pub mod backends;
mod error;
mod ops;
pub mod resolve;
pub mod table;
mod types;

pub use backends::RamdiskBackend;
pub use error::{VfsError, VfsResult};
pub use ops::VfsOps;
pub use resolve::{resolve, split_parent};
pub use table::{
    Entry, EntryKind, MAX_ENTRIES, MAX_FILE_SIZE, MAX_NAME_LEN, NamespaceTable, ROOT_INDEX,
    SlotIndex,
};
pub use types::{BLOCK_SIZE, DIR_SIZE, DirEntry, FileAttr, FileType, StatFs};
