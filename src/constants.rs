//! Filesystem geometry constants

/// Size of a cluster in bytes
pub const CLUSTER_SIZE: usize = 512;

/// Number of cluster slots on the default simulated disk
pub const TOTAL_CLUSTERS: u16 = 1024;

/// Maximum number of directory entries
pub const DIR_CAPACITY: usize = 64;

/// First cluster address usable for file data
///
/// Addresses 0 and 1 are reserved and never allocated.
pub const FIRST_DATA_CLUSTER: u16 = 2;

/// Maximum length of filename excluding extension
pub const MAX_FILENAME_LENGTH: usize = 8;

/// Maximum length of file extension
pub const MAX_EXTENSION_LENGTH: usize = 3;
