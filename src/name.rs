//! 8.3 filename handling

use core::fmt;

use crate::constants::{MAX_EXTENSION_LENGTH, MAX_FILENAME_LENGTH};
use crate::FsError;

/// 8.3 format filename, space padded
///
/// Both the base name and the extension are part of the lookup key, so
/// `a.txt` and `a.dat` name different files.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ShortName {
    name: [u8; MAX_FILENAME_LENGTH],
    ext: [u8; MAX_EXTENSION_LENGTH],
}

impl ShortName {
    /// The all-blank name held by empty directory slots
    pub const EMPTY: Self = Self {
        name: [0x20; MAX_FILENAME_LENGTH],
        ext: [0x20; MAX_EXTENSION_LENGTH],
    };

    /// Parses a `base.ext` filename, truncating overlong components
    ///
    /// The base name is everything before the first `.` and must be
    /// non-empty; the extension runs to the next `.` if any. A filename
    /// without a separator is rejected.
    pub fn parse(filename: &str) -> Result<Self, FsError> {
        let mut parts = filename.splitn(3, '.');
        let base = parts.next().unwrap_or("");
        let ext = parts.next().ok_or(FsError::InvalidName)?;
        if base.is_empty() {
            return Err(FsError::InvalidName);
        }

        let mut short = Self::EMPTY;
        let base_bytes = base.as_bytes();
        let len = base_bytes.len().min(MAX_FILENAME_LENGTH);
        short.name[..len].copy_from_slice(&base_bytes[..len]);

        let ext_bytes = ext.as_bytes();
        let len = ext_bytes.len().min(MAX_EXTENSION_LENGTH);
        short.ext[..len].copy_from_slice(&ext_bytes[..len]);

        Ok(short)
    }

    /// Returns the base name with padding trimmed
    pub fn base(&self) -> &str {
        let end = self
            .name
            .iter()
            .position(|&b| b == 0x20)
            .unwrap_or(MAX_FILENAME_LENGTH);
        core::str::from_utf8(&self.name[..end]).unwrap_or("")
    }

    /// Returns the extension with padding trimmed
    pub fn extension(&self) -> &str {
        let end = self
            .ext
            .iter()
            .position(|&b| b == 0x20)
            .unwrap_or(MAX_EXTENSION_LENGTH);
        core::str::from_utf8(&self.ext[..end]).unwrap_or("")
    }
}

impl fmt::Display for ShortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.base(), self.extension())
    }
}

impl fmt::Debug for ShortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}
