//! Flat directory of file metadata entries

use crate::constants::DIR_CAPACITY;
use crate::name::ShortName;
use crate::timestamp::Timestamp;
use crate::{ClusterAddr, FsError};

/// Packed metadata for one file
#[derive(Debug, Clone, Copy)]
pub struct DirEntry {
    /// 8.3 filename
    pub name: ShortName,

    /// Packed creation date
    pub date: u16,

    /// Packed creation time
    pub time: u16,

    /// File size in bytes
    pub size: u32,

    /// First cluster of the file's chain; zero while the slot is free
    pub start_cluster: ClusterAddr,
}

impl DirEntry {
    /// The empty slot sentinel
    pub const EMPTY: Self = Self {
        name: ShortName::EMPTY,
        date: 0,
        time: 0,
        size: 0,
        start_cluster: 0,
    };

    /// Returns true if the slot holds a live file
    pub fn is_occupied(&self) -> bool {
        self.start_cluster != 0
    }
}

/// Fixed-capacity table of directory entries
pub struct Directory {
    entries: [DirEntry; DIR_CAPACITY],
}

impl Default for Directory {
    fn default() -> Self {
        Self::new()
    }
}

impl Directory {
    /// Creates an empty directory
    pub fn new() -> Self {
        Self {
            entries: [DirEntry::EMPTY; DIR_CAPACITY],
        }
    }

    /// Finds an occupied entry by full 8.3 name
    pub fn find(&self, name: &ShortName) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.is_occupied() && e.name == *name)
    }

    /// Claims the first free slot for a new file
    ///
    /// Name, creation timestamp, and size are fixed here for the
    /// entry's lifetime; the start cluster stays zero until the write
    /// path links a chain.
    pub fn create(
        &mut self,
        name: ShortName,
        size: u32,
        created: Timestamp,
    ) -> Result<usize, FsError> {
        let idx = self
            .entries
            .iter()
            .position(|e| !e.is_occupied())
            .ok_or(FsError::DirectoryFull)?;
        let (date, time) = created.pack();
        self.entries[idx] = DirEntry {
            name,
            date,
            time,
            size,
            start_cluster: 0,
        };
        Ok(idx)
    }

    /// Returns the entry at `idx`
    pub fn entry(&self, idx: usize) -> &DirEntry {
        &self.entries[idx]
    }

    /// Points the entry at the head of its cluster chain
    pub fn set_start_cluster(&mut self, idx: usize, addr: ClusterAddr) {
        self.entries[idx].start_cluster = addr;
    }

    /// Resets the slot to the empty sentinel
    pub fn clear(&mut self, idx: usize) {
        self.entries[idx] = DirEntry::EMPTY;
    }
}
