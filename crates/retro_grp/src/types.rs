//! Base types for structure of GRP file.

use binrw::{BinRead, BinWrite};
use retro_archive::{
    error::Result,
    types::{encode_name, narrow},
    ArchiveEntry,
};

/// GRP file header
///
/// Always starts with "KenSilverman". All data is stored in little endian format.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"KenSilverman", little)]
pub struct GrpHeader {
    /// The number of files in the archive
    pub entry_count: u32,
}

impl GrpHeader {
    /// Size of the header on disk
    pub const SIZE: u64 = 16;
}

/// GRP directory record
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct GrpRecord {
    /// NUL padded name
    pub name: [u8; 12],

    /// The size of the file data
    pub size: u32,
}

impl GrpRecord {
    /// Size of a record on disk
    pub const SIZE: u64 = 16;

    /// Width of the name field
    pub const NAME_SIZE: usize = 12;

    /// Builds the on-disk record of `entry`
    pub fn from_entry(entry: &GrpEntry) -> Result<Self> {
        let mut name = [0u8; Self::NAME_SIZE];
        name.copy_from_slice(&encode_name(&entry.name, Self::NAME_SIZE)?);

        Ok(GrpRecord {
            name,
            size: narrow(&entry.name, entry.size)?,
        })
    }
}

/// A file of a GRP archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrpEntry {
    /// Name of the file
    pub name: String,

    /// Offset of the file data, derived from the sizes of the files before it
    pub offset: u64,

    /// Size of the file data in bytes
    pub size: u64,
}

impl GrpEntry {
    /// Creates an entry named `name` that has not been placed yet
    pub fn new(name: impl Into<String>) -> Self {
        GrpEntry {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl ArchiveEntry for GrpEntry {
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

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::{BinRead, BinWrite};
    use pretty_assertions::assert_eq;

    use crate::error::{Error, Result};
    use crate::types::{GrpEntry, GrpHeader, GrpRecord};

    #[test]
    fn read_header() -> Result<()> {
        let mut input = Cursor::new(b"KenSilverman\x03\x00\x00\x00".to_vec());
        assert_eq!(GrpHeader::read(&mut input)?, GrpHeader { entry_count: 3 });

        Ok(())
    }

    #[test]
    fn read_invalid_magic() {
        let mut input = Cursor::new(b"KenSilverma!\x03\x00\x00\x00".to_vec());
        let error = GrpHeader::read(&mut input)
            .map_err(|e| Error::from_binrw("GRP", e))
            .unwrap_err();
        assert!(matches!(error, Error::BadFormat { format: "GRP", .. }));
    }

    #[test]
    fn write_record() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            b'E', b'1', b'L', b'1', b'.', b'M', b'A', b'P', 0x00, 0x00, 0x00, 0x00,
            0x10, 0x27, 0x00, 0x00,
        ];

        let entry = GrpEntry {
            name: "E1L1.MAP".into(),
            offset: 64,
            size: 10_000,
        };

        let mut output = Cursor::new(Vec::new());
        GrpRecord::from_entry(&entry)?.write(&mut output)?;
        assert_eq!(output.into_inner(), expected);

        Ok(())
    }
}
