//! Fixed-capacity namespace table.
//!
//! A flat array of slots. Each occupied slot holds one entry whose `parent`
//! field links it to its containing directory; slot 0 is the root and is its
//! own parent. The table itself does not enforce tree invariants across
//! entries: the handlers in [`super::backends`] do that while holding the
//! write lock.

use crate::vfs::error::{VfsError, VfsResult};
use crate::vfs::types::{FileAttr, FileType, PERM_MASK};

/// Index of a slot in the namespace table.
pub type SlotIndex = usize;

/// Slot reserved for the root directory.
pub const ROOT_INDEX: SlotIndex = 0;

/// Default number of slots, root included.
pub const MAX_ENTRIES: usize = 100;

/// Default content capacity of a regular file.
pub const MAX_FILE_SIZE: usize = 4096;

/// Default maximum entry name length in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Payload of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file; `data.len()` is the logical size.
    File { data: Vec<u8> },
    /// Directory.
    Directory,
}

/// One file-system object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Name within the parent directory. `/` for the root.
    pub name: String,
    /// Slot index of the containing directory.
    pub parent: SlotIndex,
    /// Permission bits.
    pub perm: u32,
    /// File data or directory marker.
    pub kind: EntryKind,
}

impl Entry {
    /// A new empty regular file.
    pub fn file(name: impl Into<String>, parent: SlotIndex, perm: u32) -> Self {
        Self {
            name: name.into(),
            parent,
            perm: perm & PERM_MASK,
            kind: EntryKind::File { data: Vec::new() },
        }
    }

    /// A new directory.
    pub fn directory(name: impl Into<String>, parent: SlotIndex, perm: u32) -> Self {
        Self {
            name: name.into(),
            parent,
            perm: perm & PERM_MASK,
            kind: EntryKind::Directory,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    pub fn file_type(&self) -> FileType {
        match self.kind {
            EntryKind::File { .. } => FileType::File,
            EntryKind::Directory => FileType::Directory,
        }
    }

    /// Logical size in bytes. Directories report a fixed size.
    pub fn size(&self) -> u64 {
        match &self.kind {
            EntryKind::File { data } => data.len() as u64,
            EntryKind::Directory => crate::vfs::types::DIR_SIZE,
        }
    }

    pub fn attr(&self) -> FileAttr {
        match self.kind {
            EntryKind::File { .. } => FileAttr::file(self.size(), self.perm),
            EntryKind::Directory => FileAttr::directory(self.perm),
        }
    }
}

/// The slot array.
#[derive(Debug, Clone)]
pub struct NamespaceTable {
    slots: Vec<Option<Entry>>,
}

impl NamespaceTable {
    /// Create a table of `capacity` slots with the root directory in slot 0.
    ///
    /// `capacity` is clamped to at least one slot so the root always exists.
    pub fn new(capacity: usize, root_perm: u32) -> Self {
        let mut slots = vec![None; capacity.max(1)];
        slots[ROOT_INDEX] = Some(Entry::directory("/", ROOT_INDEX, root_perm));
        tracing::info!(capacity = slots.len(), "namespace table: created root directory");
        Self { slots }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, index: SlotIndex) -> Option<&Entry> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: SlotIndex) -> Option<&mut Entry> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Lowest free slot at index 1 or above.
    pub fn find_free_slot(&self) -> Option<SlotIndex> {
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, slot)| slot.is_none())
            .map(|(i, _)| i)
    }

    /// Occupied entries whose parent is `parent`, in table order.
    ///
    /// The root is never reported as its own child.
    pub fn children(&self, parent: SlotIndex) -> impl Iterator<Item = (SlotIndex, &Entry)> {
        self.slots
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(move |(i, slot)| match slot {
                Some(entry) if entry.parent == parent => Some((i, entry)),
                _ => None,
            })
    }

    /// The child of `parent` named `name`, if any.
    pub fn find_child(&self, parent: SlotIndex, name: &str) -> Option<SlotIndex> {
        self.children(parent)
            .find(|(_, entry)| entry.name == name)
            .map(|(i, _)| i)
    }

    pub fn has_children(&self, parent: SlotIndex) -> bool {
        self.children(parent).next().is_some()
    }

    /// Place `entry` in the lowest free slot.
    pub fn allocate(&mut self, entry: Entry) -> VfsResult<SlotIndex> {
        let index = self.find_free_slot().ok_or(VfsError::NoSpace)?;
        self.slots[index] = Some(entry);
        Ok(index)
    }

    /// Free a slot, returning the entry it held.
    pub fn release(&mut self, index: SlotIndex) -> VfsResult<Entry> {
        if index == ROOT_INDEX {
            return Err(VfsError::Busy("/".to_string()));
        }
        self.slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| VfsError::internal(format!("release of free slot {index}")))
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }
}

impl Default for NamespaceTable {
    fn default() -> Self {
        Self::new(MAX_ENTRIES, 0o755)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_initialized() {
        let table = NamespaceTable::default();
        let root = table.get(ROOT_INDEX).unwrap();
        assert!(root.is_dir());
        assert_eq!(root.parent, ROOT_INDEX);
        assert_eq!(root.perm, 0o755);
        assert_eq!(root.size(), 4096);
        assert_eq!(table.capacity(), MAX_ENTRIES);
        assert_eq!(table.occupied_count(), 1);
        assert_eq!(table.free_count(), MAX_ENTRIES - 1);
    }

    #[test]
    fn test_allocate_lowest_free_wins() {
        let mut table = NamespaceTable::default();
        let a = table.allocate(Entry::file("a", ROOT_INDEX, 0o644)).unwrap();
        let b = table.allocate(Entry::file("b", ROOT_INDEX, 0o644)).unwrap();
        let c = table.allocate(Entry::file("c", ROOT_INDEX, 0o644)).unwrap();
        assert_eq!((a, b, c), (1, 2, 3));

        table.release(b).unwrap();
        assert_eq!(table.find_free_slot(), Some(2));
        let d = table.allocate(Entry::file("d", ROOT_INDEX, 0o644)).unwrap();
        assert_eq!(d, 2);
    }

    #[test]
    fn test_allocate_until_full() {
        let mut table = NamespaceTable::new(4, 0o755);
        for name in ["a", "b", "c"] {
            table.allocate(Entry::file(name, ROOT_INDEX, 0o644)).unwrap();
        }
        let err = table
            .allocate(Entry::file("d", ROOT_INDEX, 0o644))
            .unwrap_err();
        assert!(matches!(err, VfsError::NoSpace));
        assert_eq!(table.free_count(), 0);
    }

    #[test]
    fn test_children_in_table_order() {
        let mut table = NamespaceTable::default();
        let dir = table.allocate(Entry::directory("d", ROOT_INDEX, 0o755)).unwrap();
        table.allocate(Entry::file("z", dir, 0o644)).unwrap();
        table.allocate(Entry::file("top", ROOT_INDEX, 0o644)).unwrap();
        table.allocate(Entry::file("a", dir, 0o644)).unwrap();

        let names: Vec<_> = table.children(dir).map(|(_, e)| e.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);

        let root_names: Vec<_> = table
            .children(ROOT_INDEX)
            .map(|(_, e)| e.name.as_str())
            .collect();
        assert_eq!(root_names, vec!["d", "top"]);
        assert!(table.has_children(dir));
        assert_eq!(table.find_child(dir, "a"), Some(4));
        assert_eq!(table.find_child(dir, "A"), None);
    }

    #[test]
    fn test_release_root_refused() {
        let mut table = NamespaceTable::default();
        assert!(matches!(table.release(ROOT_INDEX), Err(VfsError::Busy(_))));
        assert!(table.get(ROOT_INDEX).is_some());
    }

    #[test]
    fn test_release_free_slot_is_internal_error() {
        let mut table = NamespaceTable::default();
        assert!(matches!(table.release(7), Err(VfsError::Internal(_))));
        assert!(matches!(table.release(500), Err(VfsError::Internal(_))));
    }

    #[test]
    fn test_perm_masked() {
        let entry = Entry::file("f", ROOT_INDEX, 0o100644);
        assert_eq!(entry.perm, 0o644);
        assert_eq!(entry.attr().perm, 0o644);
        assert_eq!(entry.size(), 0);
    }
}
