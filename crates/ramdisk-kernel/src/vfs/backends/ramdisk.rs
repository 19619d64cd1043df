//! Fixed-capacity in-memory filesystem backend.
//!
//! All state lives in one [`NamespaceTable`] behind a `RwLock`. Queries take
//! the read lock; every mutation holds the write lock for the whole
//! resolve, validate, mutate sequence. Nothing awaits while a guard is held.

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, error, info};

use crate::config::RamdiskConfig;
use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::ops::VfsOps;
use crate::vfs::resolve::{resolve, split_parent};
use crate::vfs::table::{Entry, EntryKind, NamespaceTable, SlotIndex};
use crate::vfs::types::{DirEntry, FileAttr, StatFs};

/// In-memory filesystem backend.
///
/// Thread-safe via internal `RwLock`. All data is lost when dropped.
#[derive(Debug)]
pub struct RamdiskBackend {
    table: RwLock<NamespaceTable>,
    config: RamdiskConfig,
}

impl Default for RamdiskBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RamdiskBackend {
    /// Create a filesystem with the default capacities.
    pub fn new() -> Self {
        Self::with_config(RamdiskConfig::default())
    }

    /// Create a filesystem from a (validated) configuration.
    pub fn with_config(config: RamdiskConfig) -> Self {
        let table = NamespaceTable::new(config.max_entries, config.root_mode);
        Self {
            table: RwLock::new(table),
            config,
        }
    }

    /// Capacities this filesystem was built with.
    pub fn config(&self) -> &RamdiskConfig {
        &self.config
    }

    /// Number of occupied slots, root included.
    pub fn occupied(&self) -> usize {
        self.table.read().occupied_count()
    }

    fn lookup<'t>(table: &'t NamespaceTable, path: &str) -> VfsResult<(SlotIndex, &'t Entry)> {
        let index = resolve(table, path)?;
        let entry = table
            .get(index)
            .ok_or_else(|| VfsError::internal(format!("{path} resolved to free slot {index}")))?;
        Ok((index, entry))
    }

    fn lookup_mut<'t>(table: &'t mut NamespaceTable, path: &str) -> VfsResult<&'t mut Entry> {
        let index = resolve(table, path)?;
        table
            .get_mut(index)
            .ok_or_else(|| VfsError::internal(format!("{path} resolved to free slot {index}")))
    }

    /// Fail unless `path` is definitely absent.
    ///
    /// Not-found is the success case. A malformed path is the caller's
    /// error; anything else from the resolver means the table is broken.
    fn ensure_absent(table: &NamespaceTable, path: &str) -> VfsResult<()> {
        match resolve(table, path) {
            Ok(_) => Err(VfsError::already_exists(path)),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e @ VfsError::InvalidPath(_)) => Err(e),
            Err(e) => Err(VfsError::internal(format!("resolving {path}: {e}"))),
        }
    }

    /// Shared body of create and mkdir.
    fn insert(
        &self,
        table: &mut NamespaceTable,
        path: &str,
        make: impl FnOnce(String, SlotIndex) -> Entry,
    ) -> VfsResult<FileAttr> {
        Self::ensure_absent(table, path)?;
        let (parent, name) = split_parent(table, path, self.config.max_name_len)?;

        let entry = make(name, parent);
        let attr = entry.attr();
        let index = table.allocate(entry)?;
        debug!(path, index, parent, "allocated slot");
        Ok(attr)
    }

    fn read_locked(
        table: &NamespaceTable,
        path: &str,
        offset: u64,
        size: u32,
    ) -> VfsResult<Vec<u8>> {
        let (_, entry) = Self::lookup(table, path)?;
        let EntryKind::File { data } = &entry.kind else {
            return Err(VfsError::is_a_directory(path));
        };

        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
        let end = start.saturating_add(size as usize).min(data.len());
        Ok(data[start..end].to_vec())
    }

    fn write_locked(
        &self,
        table: &mut NamespaceTable,
        path: &str,
        offset: u64,
        buf: &[u8],
    ) -> VfsResult<(u32, u64)> {
        let limit = self.config.max_file_size;
        let entry = Self::lookup_mut(table, path)?;
        let EntryKind::File { data } = &mut entry.kind else {
            return Err(VfsError::is_a_directory(path));
        };

        let too_large = || VfsError::file_too_large(path, limit as u64);
        let start = usize::try_from(offset).map_err(|_| too_large())?;
        let end = start.checked_add(buf.len()).ok_or_else(too_large)?;
        if end > limit {
            return Err(too_large());
        }
        let written = u32::try_from(buf.len()).map_err(|_| too_large())?;

        if end > data.len() {
            data.try_reserve_exact(end - data.len())
                .map_err(|e| VfsError::OutOfMemory(format!("{path}: {e}")))?;
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        Ok((written, data.len() as u64))
    }

    fn truncate_locked(&self, table: &mut NamespaceTable, path: &str, size: u64) -> VfsResult<u64> {
        let limit = self.config.max_file_size;
        let entry = Self::lookup_mut(table, path)?;
        let EntryKind::File { data } = &mut entry.kind else {
            return Err(VfsError::is_a_directory(path));
        };

        let new_len = usize::try_from(size)
            .ok()
            .filter(|&len| len <= limit)
            .ok_or_else(|| VfsError::file_too_large(path, limit as u64))?;

        if new_len == 0 {
            *data = Vec::new();
        } else if new_len > data.len() {
            data.try_reserve_exact(new_len - data.len())
                .map_err(|e| VfsError::OutOfMemory(format!("{path}: {e}")))?;
            data.resize(new_len, 0);
        } else {
            data.truncate(new_len);
        }
        Ok(new_len as u64)
    }

    fn unlink_locked(table: &mut NamespaceTable, path: &str) -> VfsResult<SlotIndex> {
        let (index, entry) = Self::lookup(table, path)?;
        if entry.is_dir() {
            return Err(VfsError::is_a_directory(path));
        }
        table.release(index)?;
        Ok(index)
    }

    fn rmdir_locked(table: &mut NamespaceTable, path: &str) -> VfsResult<SlotIndex> {
        let (index, entry) = Self::lookup(table, path)?;
        if !entry.is_dir() {
            return Err(VfsError::not_a_directory(path));
        }
        if let Some((_, child)) = table.children(index).next() {
            debug!(path, child = %child.name, "rmdir: not empty");
            return Err(VfsError::directory_not_empty(path));
        }
        table.release(index)?;
        Ok(index)
    }
}

#[async_trait]
impl VfsOps for RamdiskBackend {
    async fn getattr(&self, path: &str) -> VfsResult<FileAttr> {
        let table = self.table.read();
        Self::lookup(&table, path).map(|(_, entry)| entry.attr())
    }

    async fn readdir(&self, path: &str) -> VfsResult<Vec<DirEntry>> {
        let table = self.table.read();
        let (index, entry) = Self::lookup(&table, path)?;
        if !entry.is_dir() {
            return Err(VfsError::not_a_directory(path));
        }

        let mut result = vec![DirEntry::directory("."), DirEntry::directory("..")];
        result.extend(
            table
                .children(index)
                .map(|(_, child)| DirEntry::new(child.name.clone(), child.file_type())),
        );
        Ok(result)
    }

    async fn read(&self, path: &str, offset: u64, size: u32) -> VfsResult<Vec<u8>> {
        let table = self.table.read();
        Self::read_locked(&table, path, offset, size)
    }

    async fn write(&self, path: &str, offset: u64, data: &[u8]) -> VfsResult<u32> {
        debug!(path, size = data.len(), offset, "write");
        let mut table = self.table.write();
        let (written, size) = self
            .write_locked(&mut table, path, offset, data)
            .inspect_err(|e| error!(path, error = %e, "write failed"))?;
        info!(path, written, size, "write: done");
        Ok(written)
    }

    async fn create(&self, path: &str, mode: u32) -> VfsResult<FileAttr> {
        info!(path, mode = format_args!("{mode:o}"), "create");
        let mut table = self.table.write();
        let attr = self
            .insert(&mut table, path, |name, parent| Entry::file(name, parent, mode))
            .inspect_err(|e| error!(path, error = %e, "create failed"))?;
        info!(path, "create: done");
        Ok(attr)
    }

    async fn mkdir(&self, path: &str, mode: u32) -> VfsResult<FileAttr> {
        info!(path, mode = format_args!("{mode:o}"), "mkdir");
        let mut table = self.table.write();
        let attr = self
            .insert(&mut table, path, |name, parent| {
                Entry::directory(name, parent, mode)
            })
            .inspect_err(|e| error!(path, error = %e, "mkdir failed"))?;
        info!(path, "mkdir: done");
        Ok(attr)
    }

    async fn unlink(&self, path: &str) -> VfsResult<()> {
        info!(path, "unlink");
        let mut table = self.table.write();
        let index = Self::unlink_locked(&mut table, path)
            .inspect_err(|e| error!(path, error = %e, "unlink failed"))?;
        info!(path, index, "unlink: removed");
        Ok(())
    }

    async fn rmdir(&self, path: &str) -> VfsResult<()> {
        info!(path, "rmdir");
        let mut table = self.table.write();
        let index = Self::rmdir_locked(&mut table, path)
            .inspect_err(|e| error!(path, error = %e, "rmdir failed"))?;
        info!(path, index, "rmdir: removed");
        Ok(())
    }

    async fn truncate(&self, path: &str, size: u64) -> VfsResult<()> {
        let mut table = self.table.write();
        let size = self
            .truncate_locked(&mut table, path, size)
            .inspect_err(|e| error!(path, error = %e, "truncate failed"))?;
        debug!(path, size, "truncate: done");
        Ok(())
    }

    async fn utimens(&self, path: &str) -> VfsResult<()> {
        let table = self.table.read();
        resolve(&table, path).map(|_| ())
    }

    async fn statfs(&self) -> VfsResult<StatFs> {
        let table = self.table.read();
        let total = table.capacity();
        let free = table.free_count();
        debug!(free, total, "statfs");
        Ok(StatFs::from_slots(total, free, self.config.max_name_len))
    }
}
