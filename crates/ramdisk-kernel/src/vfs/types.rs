//! Core VFS types.
//!
//! These are the values handed back across the driver boundary. They carry
//! no slot indices; callers only ever see paths.

use rustix::fs::RawMode;
use serde::{Deserialize, Serialize};

/// Logical size reported for every directory.
pub const DIR_SIZE: u64 = 4096;

/// Block size reported by statfs.
pub const BLOCK_SIZE: u32 = 4096;

/// Permission bits kept from a requested mode.
pub const PERM_MASK: u32 = 0o7777;

/// File type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }

    /// The `S_IFMT` bits for this type.
    pub fn format_bits(&self) -> u32 {
        let raw: RawMode = match self {
            FileType::File => rustix::fs::FileType::RegularFile.as_raw_mode(),
            FileType::Directory => rustix::fs::FileType::Directory.as_raw_mode(),
        };
        raw as u32
    }
}

/// File attributes (metadata).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAttr {
    /// Size in bytes.
    pub size: u64,
    /// File type.
    pub kind: FileType,
    /// Unix permissions (e.g., 0o644).
    pub perm: u32,
    /// Number of hard links.
    pub nlink: u32,
    /// Owner user ID (the serving process).
    pub uid: u32,
    /// Owner group ID (the serving process).
    pub gid: u32,
}

impl FileAttr {
    /// Attributes for a regular file of `size` bytes.
    pub fn file(size: u64, perm: u32) -> Self {
        Self {
            size,
            kind: FileType::File,
            perm: perm & PERM_MASK,
            nlink: 1,
            uid: process_uid(),
            gid: process_gid(),
        }
    }

    /// Attributes for a directory.
    pub fn directory(perm: u32) -> Self {
        Self {
            size: DIR_SIZE,
            kind: FileType::Directory,
            perm: perm & PERM_MASK,
            nlink: 2, // . and ..
            uid: process_uid(),
            gid: process_gid(),
        }
    }

    /// Full `st_mode`: type bits plus permissions.
    pub fn mode(&self) -> u32 {
        self.kind.format_bits() | self.perm
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

fn process_uid() -> u32 {
    rustix::process::getuid().as_raw()
}

fn process_gid() -> u32 {
    rustix::process::getgid().as_raw()
}

/// Directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type.
    pub kind: FileType,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, kind: FileType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, FileType::Directory)
    }
}

/// Filesystem statistics.
///
/// Blocks and inodes both count namespace slots; there is no block layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatFs {
    /// Total slots.
    pub blocks: u64,
    /// Free slots.
    pub bfree: u64,
    /// Available slots (to non-root).
    pub bavail: u64,
    /// Total inodes.
    pub files: u64,
    /// Free inodes.
    pub ffree: u64,
    /// Block size.
    pub bsize: u32,
    /// Maximum name length.
    pub namelen: u32,
    /// Fragment size.
    pub frsize: u32,
}

impl StatFs {
    /// Statistics for a table of `total` slots with `free` unoccupied.
    pub fn from_slots(total: usize, free: usize, namelen: usize) -> Self {
        Self {
            blocks: total as u64,
            bfree: free as u64,
            bavail: free as u64,
            files: total as u64,
            ffree: free as u64,
            bsize: BLOCK_SIZE,
            namelen: namelen as u32,
            frsize: BLOCK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type() {
        assert!(FileType::File.is_file());
        assert!(!FileType::File.is_dir());
        assert!(FileType::Directory.is_dir());
    }

    #[test]
    fn test_file_attr_constructors() {
        let file = FileAttr::file(1024, 0o644);
        assert!(file.is_file());
        assert_eq!(file.size, 1024);
        assert_eq!(file.perm, 0o644);
        assert_eq!(file.nlink, 1);

        let dir = FileAttr::directory(0o755);
        assert!(dir.is_dir());
        assert_eq!(dir.perm, 0o755);
        assert_eq!(dir.nlink, 2);
        assert_eq!(dir.size, DIR_SIZE);
    }

    #[test]
    fn test_mode_carries_type_bits() {
        let dir = FileAttr::directory(0o40755);
        assert_eq!(dir.perm, 0o755);
        assert_eq!(dir.mode() & 0o170000, 0o040000);

        let file = FileAttr::file(0, 0o600);
        assert_eq!(file.mode() & 0o170000, 0o100000);
        assert_eq!(file.mode() & PERM_MASK, 0o600);
    }

    #[test]
    fn test_dir_entry() {
        let file = DirEntry::new("test.txt", FileType::File);
        assert_eq!(file.name, "test.txt");
        assert!(file.kind.is_file());

        let dir = DirEntry::directory("subdir");
        assert!(dir.kind.is_dir());
    }

    #[test]
    fn test_statfs_from_slots() {
        let st = StatFs::from_slots(100, 99, 255);
        assert_eq!(st.blocks, 100);
        assert_eq!(st.bfree, 99);
        assert_eq!(st.ffree, 99);
        assert_eq!(st.namelen, 255);
        assert_eq!(st.bsize, 4096);
    }
}
