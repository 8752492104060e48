//! Allocation engine tying the directory, FAT, and cluster store together

use log::{debug, error, info};

use crate::constants::{CLUSTER_SIZE, FIRST_DATA_CLUSTER, TOTAL_CLUSTERS};
use crate::dir::{DirEntry, Directory};
use crate::fat::{ClusterChain, Fat, FatEntry};
use crate::name::ShortName;
use crate::store::ClusterStore;
use crate::timestamp::Timestamp;
use crate::{ClusterAddr, FsError};

/// A file's directory metadata in unpacked form
#[derive(Debug, Clone, Copy)]
pub struct FileInfo {
    pub name: ShortName,
    pub created: Timestamp,
    pub size: u32,
    pub start_cluster: ClusterAddr,
}

/// An in-memory FAT-style volume
///
/// Owns the cluster store, the allocation table, and the directory as
/// one unit; all operations go through an explicit `&self`/`&mut self`
/// rather than ambient state.
pub struct FatVolume {
    fat: Fat,
    store: ClusterStore,
    dir: Directory,
}

impl Default for FatVolume {
    fn default() -> Self {
        Self::new()
    }
}

impl FatVolume {
    /// Creates a volume with the default geometry
    pub fn new() -> Self {
        Self::with_clusters(TOTAL_CLUSTERS)
    }

    /// Creates a volume with `total_clusters` cluster slots
    ///
    /// Addresses 0 and 1 stay reserved, so the smallest useful disk has
    /// three slots. Capped at the default geometry.
    pub fn with_clusters(total_clusters: u16) -> Self {
        assert!(
            total_clusters > FIRST_DATA_CLUSTER && total_clusters <= TOTAL_CLUSTERS,
            "total_clusters out of range"
        );
        Self {
            fat: Fat::new(total_clusters),
            store: ClusterStore::new(total_clusters),
            dir: Directory::new(),
        }
    }

    /// Writes `data` under `filename`, creating the file on first write
    ///
    /// The chain head is found by a first-fit scan from the first data
    /// cluster; each further slot by a scan strictly after the current
    /// one. One cluster's worth of payload is copied per slot, the last
    /// block zero-filled past the payload's end, and the end-of-chain
    /// marker lands in a final extra slot. Writing an existing name
    /// allocates a fresh chain and repoints the entry at it; size and
    /// creation timestamp keep the values fixed at creation.
    ///
    /// A `DiskFull` return can leave a truncated chain behind; the
    /// volume is not expected to be used further once the disk is full.
    pub fn write(&mut self, filename: &str, data: &[u8]) -> Result<(), FsError> {
        let name = ShortName::parse(filename)?;
        let slot = match self.dir.find(&name) {
            Some(idx) => idx,
            None => self.dir.create(name, data.len() as u32, Timestamp::now())?,
        };

        let head = self.allocate_after(FIRST_DATA_CLUSTER - 1)?;
        self.dir.set_start_cluster(slot, head);

        let mut current = head;
        let mut remaining = data;
        while !remaining.is_empty() {
            let next = self.allocate_after(current)?;
            self.fat.set(current, FatEntry::Next(next));
            let take = remaining.len().min(CLUSTER_SIZE);
            self.store.write_cluster(current, &remaining[..take]);
            debug!("wrote {} bytes of '{}' to cluster {}", take, name, current);
            remaining = &remaining[take..];
            current = next;
        }
        self.fat.set(current, FatEntry::EndOfChain);

        info!(
            "wrote '{}' ({} bytes) starting at cluster {}",
            name,
            data.len(),
            head
        );
        Ok(())
    }

    /// Reads a file's chain in order, zero-padded to whole clusters
    pub fn read(&self, filename: &str) -> Result<Vec<u8>, FsError> {
        let entry = self.lookup(filename)?;
        let chain = self.fat.chain_from(entry.start_cluster)?;
        let mut contents = Vec::with_capacity(chain.clusters.len() * CLUSTER_SIZE);
        for &addr in &chain.clusters {
            contents.extend_from_slice(self.store.cluster(addr));
        }
        Ok(contents)
    }

    /// Deletes a file, freeing every chain slot including the sentinel
    pub fn delete(&mut self, filename: &str) -> Result<(), FsError> {
        let name = ShortName::parse(filename)?;
        let slot = self.dir.find(&name).ok_or(FsError::NotFound)?;
        let chain = self.fat.chain_from(self.dir.entry(slot).start_cluster)?;

        for &addr in &chain.clusters {
            self.fat.set(addr, FatEntry::Free);
        }
        self.fat.set(chain.sentinel, FatEntry::Free);
        self.dir.clear(slot);

        info!("deleted '{}'", name);
        Ok(())
    }

    /// Returns a file's cluster chain
    pub fn clusters(&self, filename: &str) -> Result<ClusterChain, FsError> {
        let entry = self.lookup(filename)?;
        self.fat.chain_from(entry.start_cluster)
    }

    /// Returns a file's metadata with the creation timestamp unpacked
    pub fn metadata(&self, filename: &str) -> Result<FileInfo, FsError> {
        let entry = self.lookup(filename)?;
        Ok(FileInfo {
            name: entry.name,
            created: Timestamp::unpack(entry.date, entry.time),
            size: entry.size,
            start_cluster: entry.start_cluster,
        })
    }

    fn lookup(&self, filename: &str) -> Result<&DirEntry, FsError> {
        let name = ShortName::parse(filename)?;
        let slot = self.dir.find(&name).ok_or(FsError::NotFound)?;
        Ok(self.dir.entry(slot))
    }

    fn allocate_after(&self, addr: ClusterAddr) -> Result<ClusterAddr, FsError> {
        match self.fat.find_free_cluster_after(addr) {
            Some(free) => Ok(free),
            None => {
                error!("failed to allocate a cluster, disk is full");
                Err(FsError::DiskFull)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DIR_CAPACITY;

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn round_trip_pads_to_whole_clusters() {
        let mut volume = FatVolume::new();
        let data = payload(1000);
        volume.write("a.txt", &data).unwrap();

        let contents = volume.read("a.txt").unwrap();
        assert_eq!(contents.len(), 2 * CLUSTER_SIZE);
        assert_eq!(&contents[..1000], &data[..]);
        assert!(contents[1000..].iter().all(|&b| b == 0));
    }

    #[test]
    fn thousand_byte_file_uses_two_data_clusters_and_a_sentinel() {
        let mut volume = FatVolume::new();
        volume.write("a.txt", &payload(1000)).unwrap();

        let chain = volume.clusters("a.txt").unwrap();
        assert_eq!(chain.clusters.as_slice(), &[2, 3]);
        assert_eq!(chain.sentinel, 4);
        assert_eq!(volume.fat.entry(2), FatEntry::Next(3));
        assert_eq!(volume.fat.entry(3), FatEntry::Next(4));
        assert_eq!(volume.fat.entry(4), FatEntry::EndOfChain);
    }

    #[test]
    fn chain_reaches_the_sentinel_in_one_step_per_data_cluster() {
        let mut volume = FatVolume::new();
        for (name, size) in [("a.txt", 1usize), ("b.txt", 512), ("c.txt", 513), ("d.txt", 3000)] {
            volume.write(name, &payload(size)).unwrap();
            let chain = volume.clusters(name).unwrap();
            assert_eq!(chain.clusters.len(), size.div_ceil(CLUSTER_SIZE));
        }
    }

    #[test]
    fn zero_byte_file_is_a_lone_sentinel() {
        let mut volume = FatVolume::new();
        volume.write("empty.txt", &[]).unwrap();

        let chain = volume.clusters("empty.txt").unwrap();
        assert!(chain.clusters.is_empty());
        assert_eq!(chain.sentinel, 2);
        assert_eq!(volume.read("empty.txt").unwrap(), Vec::<u8>::new());
        assert_eq!(volume.metadata("empty.txt").unwrap().size, 0);
    }

    #[test]
    fn delete_frees_every_chain_slot() {
        let mut volume = FatVolume::new();
        volume.write("a.txt", &payload(1000)).unwrap();
        let chain = volume.clusters("a.txt").unwrap();

        volume.delete("a.txt").unwrap();
        for &addr in chain.clusters.iter().chain([chain.sentinel].iter()) {
            assert!(volume.fat.entry(addr).is_free());
        }
        assert_eq!(volume.read("a.txt"), Err(FsError::NotFound));
    }

    #[test]
    fn demo_sequence_reuses_freed_clusters_without_cross_contamination() {
        let mut volume = FatVolume::new();
        volume.write("file1.txt", &payload(1000)).unwrap();
        volume.write("file2.txt", &payload(2000)).unwrap();
        volume.write("file3.txt", &payload(3000)).unwrap();
        let second = volume.clusters("file2.txt").unwrap();
        volume.delete("file2.txt").unwrap();
        volume.write("file4.txt", &payload(4000)).unwrap();

        let first = volume.clusters("file1.txt").unwrap();
        let third = volume.clusters("file3.txt").unwrap();
        let fourth = volume.clusters("file4.txt").unwrap();

        assert_eq!(first.clusters.as_slice(), &[2, 3]);
        assert_eq!(third.clusters.as_slice(), &[10, 11, 12, 13, 14, 15]);
        assert_eq!(fourth.clusters.as_slice(), &[5, 6, 7, 8, 9, 17, 18, 19]);

        // file4 reuses file2's freed clusters but never a live file's
        assert!(fourth.clusters.iter().any(|a| second.clusters.contains(a)));
        for addr in &fourth.clusters {
            assert!(!first.clusters.contains(addr));
            assert!(!third.clusters.contains(addr));
        }

        assert_eq!(&volume.read("file1.txt").unwrap()[..1000], &payload(1000)[..]);
        assert_eq!(&volume.read("file3.txt").unwrap()[..3000], &payload(3000)[..]);
        assert_eq!(&volume.read("file4.txt").unwrap()[..4000], &payload(4000)[..]);
    }

    #[test]
    fn sixty_fifth_file_reports_directory_full() {
        let mut volume = FatVolume::new();
        for i in 0..DIR_CAPACITY {
            volume.write(&format!("f{}.txt", i), &payload(1)).unwrap();
        }
        let before = volume.clusters("f0.txt").unwrap();

        assert_eq!(
            volume.write("extra.txt", &payload(1)),
            Err(FsError::DirectoryFull)
        );
        assert_eq!(volume.clusters("f0.txt").unwrap(), before);
        assert_eq!(volume.metadata("f0.txt").unwrap().size, 1);
    }

    #[test]
    fn delete_of_a_nonexistent_file_is_not_found_and_harmless() {
        let mut volume = FatVolume::new();
        volume.write("keep.txt", &payload(600)).unwrap();
        let before = volume.clusters("keep.txt").unwrap();

        assert_eq!(volume.delete("ghost.txt"), Err(FsError::NotFound));
        assert_eq!(volume.clusters("keep.txt").unwrap(), before);
        assert_eq!(&volume.read("keep.txt").unwrap()[..600], &payload(600)[..]);
    }

    #[test]
    fn extension_distinguishes_files() {
        let mut volume = FatVolume::new();
        volume.write("a.txt", b"text contents").unwrap();
        volume.write("a.dat", b"data contents").unwrap();
        assert_eq!(&volume.read("a.txt").unwrap()[..13], b"text contents");
        assert_eq!(&volume.read("a.dat").unwrap()[..13], b"data contents");

        volume.delete("a.txt").unwrap();
        assert_eq!(volume.read("a.txt"), Err(FsError::NotFound));
        assert!(volume.read("a.dat").is_ok());
    }

    #[test]
    fn overwrite_keeps_creation_metadata_and_repoints_the_chain() {
        let mut volume = FatVolume::new();
        volume.write("a.txt", &payload(1000)).unwrap();
        let created = volume.metadata("a.txt").unwrap();

        volume.write("a.txt", &payload(200)).unwrap();
        let after = volume.metadata("a.txt").unwrap();

        // size and timestamp are fixed at creation
        assert_eq!(after.size, created.size);
        assert_eq!(after.created, created.created);
        assert_ne!(after.start_cluster, created.start_cluster);

        let chain = volume.clusters("a.txt").unwrap();
        assert_eq!(chain.clusters.len(), 1);
        assert_eq!(&volume.read("a.txt").unwrap()[..200], &payload(200)[..]);
    }

    #[test]
    fn disk_full_on_the_head_scan() {
        let mut volume = FatVolume::with_clusters(4);
        volume.write("a.txt", &payload(1)).unwrap();
        assert_eq!(volume.write("b.txt", &payload(1)), Err(FsError::DiskFull));
    }

    #[test]
    fn disk_full_midway_through_a_chain() {
        let mut volume = FatVolume::with_clusters(4);
        assert_eq!(
            volume.write("big.txt", &payload(600)),
            Err(FsError::DiskFull)
        );
    }

    #[test]
    fn truncated_chains_are_reported_not_followed() {
        let mut volume = FatVolume::new();
        volume.write("a.txt", &payload(1000)).unwrap();
        volume.fat.set(3, FatEntry::Free);

        assert_eq!(volume.read("a.txt"), Err(FsError::TruncatedChain));
        assert_eq!(volume.clusters("a.txt"), Err(FsError::TruncatedChain));
    }

    #[test]
    fn metadata_reports_the_directory_entry() {
        let mut volume = FatVolume::new();
        volume.write("file1.txt", &payload(1000)).unwrap();

        let info = volume.metadata("file1.txt").unwrap();
        assert_eq!(info.name.to_string(), "file1.txt");
        assert_eq!(info.size, 1000);
        assert_eq!(info.start_cluster, 2);
        assert!(info.created.year >= 1980);
    }

    #[test]
    fn invalid_names_are_rejected_up_front() {
        let mut volume = FatVolume::new();
        assert_eq!(volume.write("noext", b"x"), Err(FsError::InvalidName));
        assert_eq!(volume.read(".txt"), Err(FsError::InvalidName));
        assert_eq!(volume.delete("noext"), Err(FsError::InvalidName));
    }
}
