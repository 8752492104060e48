//! File allocation table with per-file linked cluster chains

use arrayvec::ArrayVec;

use crate::constants::{FIRST_DATA_CLUSTER, TOTAL_CLUSTERS};
use crate::{ClusterAddr, FsError};

/// Upper bound on chain length: every slot of the largest supported disk
pub const MAX_CHAIN_SLOTS: usize = TOTAL_CLUSTERS as usize;

/// One FAT slot: what comes next for the chain passing through it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatEntry {
    /// Slot is available for allocation
    Free,
    /// Terminal marker of a chain; the slot holds no file data
    EndOfChain,
    /// Address of the next cluster in the chain
    Next(ClusterAddr),
}

impl FatEntry {
    /// Returns true if this slot is available for allocation
    pub fn is_free(&self) -> bool {
        matches!(self, FatEntry::Free)
    }

    /// Returns true if this slot marks the end of a cluster chain
    pub fn is_end_of_chain(&self) -> bool {
        matches!(self, FatEntry::EndOfChain)
    }
}

/// A file's cluster chain as recorded in the FAT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterChain {
    /// Data cluster addresses in chain order
    pub clusters: ArrayVec<ClusterAddr, MAX_CHAIN_SLOTS>,
    /// Address of the slot holding the end-of-chain marker
    pub sentinel: ClusterAddr,
}

/// The allocation table: one slot per cluster address
pub struct Fat {
    slots: Vec<FatEntry>,
}

impl Fat {
    /// Creates a table of `total_clusters` free slots
    pub fn new(total_clusters: u16) -> Self {
        Self {
            slots: vec![FatEntry::Free; total_clusters as usize],
        }
    }

    /// Number of cluster slots, reserved addresses included
    pub fn total_clusters(&self) -> u16 {
        self.slots.len() as u16
    }

    /// Returns the slot value at `addr`
    pub fn entry(&self, addr: ClusterAddr) -> FatEntry {
        self.slots[addr as usize]
    }

    /// Sets the slot value at `addr`
    pub fn set(&mut self, addr: ClusterAddr, entry: FatEntry) {
        self.slots[addr as usize] = entry;
    }

    /// First-fit scan for a free slot strictly after `addr`
    ///
    /// Reserved addresses are never returned. The linear forward scan is
    /// the designed allocation policy; alternative policies substitute
    /// here without touching the chain-building logic.
    pub fn find_free_cluster_after(&self, addr: ClusterAddr) -> Option<ClusterAddr> {
        let start = (addr + 1).max(FIRST_DATA_CLUSTER);
        (start..self.total_clusters()).find(|&c| self.entry(c).is_free())
    }

    /// Walks the chain starting at `start` up to its end-of-chain slot
    ///
    /// Every hop is validated: a link into a free slot reports
    /// `TruncatedChain`, a link to a reserved or out-of-range address
    /// reports `BadCluster`, and a walk longer than the disk itself
    /// (a cycle) reports `ChainTooLong`.
    pub fn chain_from(&self, start: ClusterAddr) -> Result<ClusterChain, FsError> {
        let mut clusters = ArrayVec::new();
        let mut addr = start;
        loop {
            if addr < FIRST_DATA_CLUSTER || addr >= self.total_clusters() {
                return Err(FsError::BadCluster(addr));
            }
            match self.entry(addr) {
                FatEntry::Free => return Err(FsError::TruncatedChain),
                FatEntry::EndOfChain => {
                    return Ok(ClusterChain {
                        clusters,
                        sentinel: addr,
                    })
                }
                FatEntry::Next(next) => {
                    clusters.try_push(addr).map_err(|_| FsError::ChainTooLong)?;
                    addr = next;
                }
            }
        }
    }
}
