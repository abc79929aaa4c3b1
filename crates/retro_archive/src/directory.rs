//! The in-memory entry directory of an open archive.

use std::collections::HashMap;

use crate::types::ArchiveEntry;

/// Ordered list of entries plus a name index.
///
/// Names are not required to be unique. When the same name is committed twice both entries stay in the list, and
/// the index resolves the name to the most recently committed one. The older entry is said to be shadowed.
#[derive(Debug, Clone)]
pub struct Directory<E> {
    entries: Vec<E>,
    index: HashMap<String, usize>,
    append_cursor: u64,
}

impl<E: ArchiveEntry> Directory<E> {
    /// Builds a directory from parsed entries
    pub fn new(entries: Vec<E>, append_cursor: u64) -> Self {
        let mut directory = Directory {
            entries: Vec::with_capacity(entries.len()),
            index: HashMap::with_capacity(entries.len()),
            append_cursor,
        };

        for entry in entries {
            directory.insert(entry);
        }

        directory
    }

    /// Commits a new entry, shadowing any older entry with the same name
    pub fn push(&mut self, entry: E) {
        self.append_cursor = self.append_cursor.max(entry.offset() + entry.size());
        self.insert(entry);
    }

    fn insert(&mut self, entry: E) {
        self.index.insert(entry.name().to_owned(), self.entries.len());
        self.entries.push(entry);
    }

    /// Number of committed entries, shadowed ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory contains no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in commit order
    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    /// The most recent entry named `name`
    pub fn get(&self, name: &str) -> Option<&E> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Entry at position `index` of the ordered list
    pub fn get_index(&self, index: usize) -> Option<&E> {
        self.entries.get(index)
    }

    /// Whether the entry at `index` is the one its name resolves to
    pub fn is_current(&self, index: usize) -> bool {
        self.entries
            .get(index)
            .and_then(|e| self.index.get(e.name()))
            .is_some_and(|&i| i == index)
    }

    /// Where the next entry's data, or the rewritten directory, goes
    pub fn append_cursor(&self) -> u64 {
        self.append_cursor
    }
}
