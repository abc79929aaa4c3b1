//! Base types for structure of resource group files.

use std::borrow::Cow;

use binrw::{BinRead, BinWrite, NullString};
use bon::Builder;
use retro_archive::{error::Result, types::narrow, ArchiveEntry};

/// Resource group header
///
/// Always starts with `:hx:rg:\x01`. All data is stored in little endian format.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b":hx:rg:\x01", little)]
pub struct HxrgHeader {
    /// Size of the directory in bytes, terminator included
    pub directory_size: u32,
}

impl HxrgHeader {
    /// Size of the header on disk
    pub const SIZE: u64 = 12;
}

/// Identifies what kind of data a resource holds
#[derive(BinRead, BinWrite, Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
#[brw(little)]
pub struct ResourceType(pub u16);

impl ResourceType {
    /// Untyped resource, used for anything added without a type
    pub const NONE: ResourceType = ResourceType(0);
    /// Model
    pub const MESH: ResourceType = ResourceType(0x01);
    /// Texture
    pub const TEXTURE: ResourceType = ResourceType(0x02);
    /// GLSL shader
    pub const SHADER: ResourceType = ResourceType(0x10);
    /// Sound, stored as a RIFF wave
    pub const AUDIO: ResourceType = ResourceType(0x20);
    /// Material
    pub const MATERIAL: ResourceType = ResourceType(0x80);

    /// Extension given to resources of this type when they are extracted
    pub const fn extension(self) -> Option<&'static str> {
        match self {
            ResourceType::MESH => Some("mesh"),
            ResourceType::TEXTURE => Some("texture"),
            ResourceType::SHADER => Some("shader"),
            ResourceType::AUDIO => Some("wav"),
            ResourceType::MATERIAL => Some("material"),
            _ => None,
        }
    }
}

/// Resource group directory record
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct HxrgRecord {
    /// What the resource holds
    pub resource_type: ResourceType,

    /// NUL terminated name
    pub name: NullString,

    /// The offset to the resource data from the start of the file
    pub offset: u32,

    /// The size of the resource data
    pub size: u32,

    /// Unix timestamp of the last modification
    pub date_time: u32,
}

impl HxrgRecord {
    /// Size of a record without its name: type, name terminator, offset, size and timestamp
    pub const FIXED_SIZE: u64 = 15;

    /// Size of the smallest possible record, one with a single character name
    pub const MIN_SIZE: u64 = Self::FIXED_SIZE + 1;

    /// Size on disk of a record for a resource named `name`
    pub fn size_of(name: &str) -> u64 {
        Self::FIXED_SIZE + name.len() as u64
    }

    /// Builds the on-disk record of `entry`, with its data stored at `offset`
    pub fn from_entry(entry: &HxrgEntry, offset: u64) -> Result<Self> {
        Ok(HxrgRecord {
            resource_type: entry.resource_type,
            name: NullString::from(entry.name.as_str()),
            offset: narrow(&entry.name, offset)?,
            size: narrow(&entry.name, entry.size)?,
            date_time: entry.date_time,
        })
    }
}

impl From<HxrgRecord> for HxrgEntry {
    fn from(record: HxrgRecord) -> Self {
        HxrgEntry {
            name: record.name.to_string(),
            offset: record.offset as u64,
            size: record.size as u64,
            resource_type: record.resource_type,
            date_time: record.date_time,
        }
    }
}

/// A resource of a resource group
///
/// ```
/// use retro_hxrg::{HxrgEntry, ResourceType};
///
/// let entry = HxrgEntry::builder()
///     .name("boid")
///     .resource_type(ResourceType::MESH)
///     .build();
///
/// assert_eq!(entry.date_time, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct HxrgEntry {
    /// Name of the resource, without an extension
    #[builder(into)]
    pub name: String,

    /// Offset of the resource data from the start of the file
    #[builder(default)]
    pub offset: u64,

    /// Size of the resource data in bytes
    #[builder(default)]
    pub size: u64,

    /// What the resource holds
    #[builder(default)]
    pub resource_type: ResourceType,

    /// Unix timestamp of the last modification
    #[builder(default)]
    pub date_time: u32,
}

impl ArchiveEntry for HxrgEntry {
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

    /// The name with the extension of its [`ResourceType`]
    fn extract_name(&self) -> Cow<'_, str> {
        match self.resource_type.extension() {
            Some(extension) => Cow::Owned(format!("{}.{extension}", self.name)),
            None => Cow::Borrowed(&self.name),
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::{BinRead, BinWrite};
    use pretty_assertions::assert_eq;
    use retro_archive::ArchiveEntry;

    use crate::error::{Error, Result};
    use crate::types::{HxrgEntry, HxrgHeader, HxrgRecord, ResourceType};

    #[rustfmt::skip]
    const BOID: [u8; 19] = [
        0x01, 0x00,
        b'b', b'o', b'i', b'd', 0x00,
        0x40, 0x00, 0x00, 0x00,
        0x10, 0x27, 0x00, 0x00,
        0x00, 0xE1, 0xF5, 0x05,
    ];

    #[test]
    fn read_header() -> Result<()> {
        let mut input = Cursor::new(b":hx:rg:\x01\x2A\x00\x00\x00".to_vec());
        assert_eq!(
            HxrgHeader::read(&mut input)?,
            HxrgHeader { directory_size: 42 }
        );

        let mut input = Cursor::new(b":hx:rg:\x02\x2A\x00\x00\x00".to_vec());
        let error = HxrgHeader::read(&mut input)
            .map_err(|e| Error::from_binrw("HXRG", e))
            .unwrap_err();
        assert!(matches!(error, Error::BadFormat { format: "HXRG", .. }));

        Ok(())
    }

    #[test]
    fn read_record() -> Result<()> {
        let record = HxrgRecord::read(&mut Cursor::new(BOID))?;
        assert_eq!(HxrgRecord::size_of("boid"), BOID.len() as u64);

        let entry = HxrgEntry::from(record);
        assert_eq!(entry.name, "boid");
        assert_eq!(entry.offset, 0x40);
        assert_eq!(entry.size(), 10_000);
        assert_eq!(entry.resource_type, ResourceType::MESH);
        assert_eq!(entry.date_time, 100_000_000);

        Ok(())
    }

    #[test]
    fn write_record() -> Result<()> {
        let entry = HxrgEntry::builder()
            .name("boid")
            .size(10_000)
            .resource_type(ResourceType::MESH)
            .date_time(100_000_000)
            .build();

        let mut output = Cursor::new(Vec::new());
        HxrgRecord::from_entry(&entry, 0x40)?.write(&mut output)?;
        assert_eq!(output.into_inner(), BOID);

        assert!(matches!(
            HxrgRecord::from_entry(&entry, 1 << 32),
            Err(Error::EntryTooLarge { .. })
        ));

        Ok(())
    }

    #[test]
    fn extraction_adds_the_type_extension() {
        let entry = |resource_type: ResourceType| {
            HxrgEntry::builder()
                .name("dagger")
                .resource_type(resource_type)
                .build()
        };

        assert_eq!(entry(ResourceType::MESH).extract_name(), "dagger.mesh");
        assert_eq!(entry(ResourceType::TEXTURE).extract_name(), "dagger.texture");
        assert_eq!(entry(ResourceType::SHADER).extract_name(), "dagger.shader");
        assert_eq!(entry(ResourceType::AUDIO).extract_name(), "dagger.wav");
        assert_eq!(entry(ResourceType::MATERIAL).extract_name(), "dagger.material");
        assert_eq!(entry(ResourceType::NONE).extract_name(), "dagger");
        assert_eq!(entry(ResourceType(0x11)).extract_name(), "dagger");
    }
}
