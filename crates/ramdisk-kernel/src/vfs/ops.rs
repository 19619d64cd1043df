//! VFS operations trait.
//!
//! This is the contract offered to the driver-dispatch layer: path-based
//! (absolute, slash-separated), explicit offset/size, one error per failure.

use async_trait::async_trait;

use super::VfsResult;
use super::types::{DirEntry, FileAttr, StatFs};

/// Core VFS operations trait.
///
/// All operations take an absolute path. Errors map to POSIX codes through
/// [`VfsError::errno`](super::VfsError::errno).
#[async_trait]
pub trait VfsOps: Send + Sync {
    // ========================================================================
    // Reading
    // ========================================================================

    /// Get file attributes.
    async fn getattr(&self, path: &str) -> VfsResult<FileAttr>;

    /// Read directory entries.
    ///
    /// The listing starts with `.` and `..`, followed by the children in
    /// storage order.
    async fn readdir(&self, path: &str) -> VfsResult<Vec<DirEntry>>;

    /// Read file contents.
    ///
    /// Reads up to `size` bytes starting at `offset`.
    /// Returns fewer bytes if EOF is reached.
    async fn read(&self, path: &str, offset: u64, size: u32) -> VfsResult<Vec<u8>>;

    // ========================================================================
    // Writing
    // ========================================================================

    /// Write data to a file.
    ///
    /// Writes all of `data` at `offset` or nothing. Returns the number of
    /// bytes written.
    async fn write(&self, path: &str, offset: u64, data: &[u8]) -> VfsResult<u32>;

    /// Create a new file.
    ///
    /// Returns the attributes of the newly created file.
    async fn create(&self, path: &str, mode: u32) -> VfsResult<FileAttr>;

    /// Create a new directory.
    ///
    /// Returns the attributes of the newly created directory.
    async fn mkdir(&self, path: &str, mode: u32) -> VfsResult<FileAttr>;

    /// Remove a file.
    async fn unlink(&self, path: &str) -> VfsResult<()>;

    /// Remove an empty directory.
    async fn rmdir(&self, path: &str) -> VfsResult<()>;

    /// Truncate a file to the specified size.
    async fn truncate(&self, path: &str, size: u64) -> VfsResult<()>;

    /// Update timestamps. Only checks that the path exists.
    async fn utimens(&self, path: &str) -> VfsResult<()>;

    // ========================================================================
    // Metadata
    // ========================================================================

    /// Get filesystem statistics.
    async fn statfs(&self) -> VfsResult<StatFs>;

    // ========================================================================
    // Convenience methods (default implementations)
    // ========================================================================

    /// Check if a path exists.
    async fn exists(&self, path: &str) -> bool {
        self.getattr(path).await.is_ok()
    }

    /// Read entire file contents.
    async fn read_all(&self, path: &str) -> VfsResult<Vec<u8>> {
        let attr = self.getattr(path).await?;
        self.read(path, 0, attr.size as u32).await
    }

    /// Write entire file contents.
    ///
    /// Convenience method that creates or truncates, then writes.
    async fn write_all(&self, path: &str, data: &[u8]) -> VfsResult<()> {
        if self.exists(path).await {
            self.truncate(path, 0).await?;
        } else {
            self.create(path, 0o644).await?;
        }
        self.write(path, 0, data).await?;
        Ok(())
    }
}
