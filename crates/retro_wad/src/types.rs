//! Base types for structure of WAD file.

use binrw::{BinRead, BinWrite};
use bon::Builder;
use retro_archive::{
    error::Result,
    types::{decode_name, encode_name, narrow},
    ArchiveEntry,
};

/// WAD file header
///
/// All data is stored in little endian format.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct WadHeader {
    /// `WAD2` or `WAD3`
    pub identity: [u8; 4],

    /// The number of records in the directory
    pub lump_count: u32,

    /// The offset from the beginning of the file where the directory starts
    pub directory_offset: u32,
}

impl WadHeader {
    /// Size of the header on disk
    pub const SIZE: u64 = 12;
}

/// Identifies what kind of data a lump holds.
///
/// The values are game specific, see [`quake`] and [`half_life`].
#[derive(BinRead, BinWrite, Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[brw(little)]
pub struct LumpType(pub u8);

impl LumpType {
    /// Untyped lump
    pub const NONE: LumpType = LumpType(0);

    /// Label lump
    pub const LABEL: LumpType = LumpType(1);
}

/// Lump types found in *Quake* `WAD2` files
pub mod quake {
    use super::LumpType;

    /// Generic lump, shares its value with [`PALETTE`]
    pub const LUMP: LumpType = LumpType(64);
    /// 256 color palette
    pub const PALETTE: LumpType = LumpType(64);
    /// Texture in the `qtex` format
    pub const QTEX: LumpType = LumpType(65);
    /// Status bar and menu picture
    pub const QPIC: LumpType = LumpType(66);
    /// Sound
    pub const SOUND: LumpType = LumpType(67);
    /// Mip-mapped wall texture
    pub const MIPTEX: LumpType = LumpType(68);
}

/// Lump types found in *Half-Life* `WAD3` files
pub mod half_life {
    use super::LumpType;

    /// 256 color palette
    pub const PALETTE: LumpType = LumpType(64);
    /// Colormap
    pub const COLORMAP: LumpType = LumpType(65);
    /// Picture with its own palette
    pub const QPIC: LumpType = LumpType(66);
    /// Mip-mapped wall texture with its own palette
    pub const MIPTEX: LumpType = LumpType(67);
    /// Raw data
    pub const RAW: LumpType = LumpType(68);
    /// Second colormap
    pub const COLORMAP2: LumpType = LumpType(69);
    /// Bitmap font
    pub const FONT: LumpType = LumpType(70);
}

/// Identifies how a lump's data was compressed
#[derive(BinRead, BinWrite, Debug, Copy, Clone, Default, PartialEq, Eq)]
#[brw(repr = u8)]
pub enum Compression {
    /// Stores the data as it is
    #[default]
    None = 0,

    /// LZSS, recognized but never decoded
    Lzss = 1,
}

/// WAD directory record
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct WadRecord {
    /// The offset to the lump data from the start of the file
    pub offset: u32,

    /// The size of the lump data as stored
    pub disk_size: u32,

    /// The size of the lump data once decompressed
    pub size: u32,

    /// What the lump holds
    pub lump_type: LumpType,

    /// How the lump data was compressed
    pub compression: Compression,

    /// NUL padded name
    #[brw(pad_before = 2)]
    pub name: [u8; 16],
}

impl WadRecord {
    /// Size of a record on disk
    pub const SIZE: u64 = 32;

    /// Width of the name field
    pub const NAME_SIZE: usize = 16;

    /// Builds the on-disk record of `entry`
    pub fn from_entry(entry: &WadEntry) -> Result<Self> {
        let mut name = [0u8; Self::NAME_SIZE];
        name.copy_from_slice(&encode_name(&entry.name, Self::NAME_SIZE)?);

        Ok(WadRecord {
            offset: narrow(&entry.name, entry.offset)?,
            disk_size: narrow(&entry.name, entry.disk_size)?,
            size: narrow(&entry.name, entry.size)?,
            lump_type: entry.lump_type,
            compression: entry.compression,
            name,
        })
    }
}

impl From<WadRecord> for WadEntry {
    fn from(record: WadRecord) -> Self {
        WadEntry {
            name: decode_name(&record.name),
            offset: record.offset as u64,
            disk_size: record.disk_size as u64,
            size: record.size as u64,
            lump_type: record.lump_type,
            compression: record.compression,
        }
    }
}

/// A lump of a WAD archive
///
/// ```
/// use retro_wad::{types::half_life, WadEntry};
///
/// let entry = WadEntry::builder()
///     .name("FONT1")
///     .lump_type(half_life::FONT)
///     .build();
///
/// assert_eq!(entry.offset, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct WadEntry {
    /// Name of the lump
    #[builder(into)]
    pub name: String,

    /// Offset of the lump data from the start of the archive
    #[builder(default)]
    pub offset: u64,

    /// Size of the lump data as stored, which is what reading the entry returns
    #[builder(default)]
    pub disk_size: u64,

    /// Size of the lump data once decompressed
    #[builder(default)]
    pub size: u64,

    /// What the lump holds
    #[builder(default)]
    pub lump_type: LumpType,

    /// How the lump data was compressed
    #[builder(default)]
    pub compression: Compression,
}

impl ArchiveEntry for WadEntry {
    fn name(&self) -> &str {
        &self.name
    }

    fn offset(&self) -> u64 {
        self.offset
    }

    /// The stored span, [`WadEntry::disk_size`]
    fn size(&self) -> u64 {
        self.disk_size
    }

    /// Uncompressed lumps get both sizes set. A compressed lump keeps the decompressed size it was created with,
    /// unless none was given.
    fn set_placement(&mut self, offset: u64, size: u64) {
        self.offset = offset;
        self.disk_size = size;
        if self.compression == Compression::None || self.size == 0 {
            self.size = size;
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::{BinRead, BinWrite};
    use pretty_assertions::assert_eq;
    use retro_archive::ArchiveEntry;

    use crate::error::Result;
    use crate::types::{half_life, quake, Compression, WadEntry, WadRecord};

    #[rustfmt::skip]
    const CONCHARS: [u8; 32] = [
        0x0C, 0x00, 0x00, 0x00,
        0x00, 0x40, 0x00, 0x00,
        0x00, 0x40, 0x00, 0x00,
        0x44,
        0x00,
        0x00, 0x00,
        b'C', b'O', b'N', b'C', b'H', b'A', b'R', b'S',
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn read_record() -> Result<()> {
        let record = WadRecord::read(&mut Cursor::new(CONCHARS))?;
        let entry = WadEntry::from(record);

        assert_eq!(entry.name, "CONCHARS");
        assert_eq!(entry.offset, 12);
        assert_eq!(entry.size(), 0x4000);
        assert_eq!(entry.lump_type, quake::MIPTEX);
        assert_eq!(entry.compression, Compression::None);

        Ok(())
    }

    #[test]
    fn write_record() -> Result<()> {
        let entry = WadEntry::builder()
            .name("CONCHARS")
            .offset(12)
            .disk_size(0x4000)
            .size(0x4000)
            .lump_type(quake::MIPTEX)
            .build();

        let mut output = Cursor::new(Vec::new());
        WadRecord::from_entry(&entry)?.write(&mut output)?;
        assert_eq!(output.into_inner(), CONCHARS);

        Ok(())
    }

    #[test]
    fn unknown_compression_is_an_error() {
        let mut input = CONCHARS;
        input[13] = 7;
        assert!(WadRecord::read(&mut Cursor::new(input)).is_err());
    }

    #[test]
    fn placement_keeps_declared_size_of_compressed_lumps() {
        let mut plain = WadEntry::builder().name("RAW").lump_type(half_life::RAW).build();
        plain.set_placement(40, 10);
        assert_eq!((plain.offset, plain.disk_size, plain.size), (40, 10, 10));

        let mut packed = WadEntry::builder()
            .name("PACKED")
            .size(100)
            .compression(Compression::Lzss)
            .build();
        packed.set_placement(50, 30);
        assert_eq!((packed.disk_size, packed.size), (30, 100));
    }
}
