//! Base types for structure of PAK file.

use binrw::{BinRead, BinWrite};
use retro_archive::ArchiveEntry;

/// PAK file header
///
/// The magic number is kept as a plain field since it differs between `PACK` and `HROT` archives. All data is stored
/// in little endian format.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct PakHeader {
    /// `PACK` or `HROT`
    pub identity: [u8; 4],

    /// The offset from the beginning of the file where the directory starts
    pub directory_offset: u32,

    /// The size of the directory in bytes
    pub directory_size: u32,
}

impl PakHeader {
    /// Size of the header on disk
    pub const SIZE: u64 = 12;
}

/// A member of a PAK archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PakEntry {
    /// Name of the file, `/` separated
    pub name: String,

    /// Offset of the file data from the start of the archive
    pub offset: u64,

    /// Size of the file data in bytes
    pub size: u64,
}

impl PakEntry {
    /// Creates an entry named `name` that has not been placed yet
    pub fn new(name: impl Into<String>) -> Self {
        PakEntry {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl ArchiveEntry for PakEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn offset(&self) -> u64 {
        self.offset
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn set_placement(&mut self, offset: u64, size: u64) {
        self.offset = offset;
        self.size = size;
    }
}
