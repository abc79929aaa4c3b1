//! Back-loaded directory layout shared by `PACK` and `HROT` archives.

use std::{
    io::{Read, Seek, SeekFrom, Write},
    marker::PhantomData,
};

use binrw::{BinRead, BinWrite};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use retro_archive::{
    error::{Error, Result},
    types::{check_name, decode_name, encode_name, narrow},
    Layout,
};
use tracing::{debug, instrument};

use crate::types::{PakEntry, PakHeader};

/// The parts of the layout that differ between games
pub trait PakVariant {
    /// Name used in diagnostics
    const FORMAT: &'static str;

    /// Magic number at the start of the file
    const MAGIC: &'static [u8; 4];

    /// Width of the name field of a directory record
    const NAME_SIZE: usize;

    /// Size of a directory record: the name followed by offset and size
    fn record_size() -> u64 {
        Self::NAME_SIZE as u64 + 8
    }
}

/// *Quake* and *Quake II*: `PACK` magic and 56 byte names
#[derive(Debug, Clone, Copy)]
pub struct Quake;

impl PakVariant for Quake {
    const FORMAT: &'static str = "PACK";
    const MAGIC: &'static [u8; 4] = b"PACK";
    const NAME_SIZE: usize = 56;
}

/// *HROT*: `HROT` magic and 120 byte names
#[derive(Debug, Clone, Copy)]
pub struct Hrot;

impl PakVariant for Hrot {
    const FORMAT: &'static str = "HROT";
    const MAGIC: &'static [u8; 4] = b"HROT";
    const NAME_SIZE: usize = 120;
}

/// [`Layout`] of a PAK archive for the game `V`
#[derive(Debug, Clone, Copy)]
pub struct PakLayout<V> {
    _variant: PhantomData<V>,
}

impl<V: PakVariant> PakLayout<V> {
    fn read_record<R: Read>(reader: &mut R) -> Result<PakEntry> {
        let mut name = vec![0u8; V::NAME_SIZE];
        reader.read_exact(&mut name)?;

        Ok(PakEntry {
            name: decode_name(&name),
            offset: reader.read_u32::<LittleEndian>()? as u64,
            size: reader.read_u32::<LittleEndian>()? as u64,
        })
    }

    fn write_record<W: Write>(writer: &mut W, entry: &PakEntry) -> Result<()> {
        writer.write_all(&encode_name(&entry.name, V::NAME_SIZE)?)?;
        writer.write_u32::<LittleEndian>(narrow(&entry.name, entry.offset)?)?;
        writer.write_u32::<LittleEndian>(narrow(&entry.name, entry.size)?)?;
        Ok(())
    }
}

impl<V: PakVariant> Layout for PakLayout<V> {
    type Entry = PakEntry;

    const FORMAT: &'static str = V::FORMAT;
    const MAGIC: &'static [u8] = V::MAGIC;
    const HEADER_SIZE: u64 = PakHeader::SIZE;

    #[instrument(skip_all, fields(format = V::FORMAT), err)]
    fn parse_directory<R: Read + Seek>(reader: &mut R) -> Result<(Vec<PakEntry>, u64)> {
        reader.seek(SeekFrom::Start(0))?;
        let header = PakHeader::read(reader).map_err(|e| Error::from_binrw(V::FORMAT, e))?;

        if &header.identity != V::MAGIC {
            return Err(Error::BadFormat {
                format: V::FORMAT,
                reason: format!("bad magic number {:?}", header.identity),
            });
        }

        if header.directory_size as u64 % V::record_size() != 0 {
            return Err(Error::BadFormat {
                format: V::FORMAT,
                reason: format!(
                    "directory size {} is not a multiple of {}",
                    header.directory_size,
                    V::record_size()
                ),
            });
        }

        let count = header.directory_size as u64 / V::record_size();
        debug!(
            count,
            directory_offset = header.directory_offset,
            "reading directory"
        );

        reader.seek(SeekFrom::Start(header.directory_offset as u64))?;
        let entries = (0..count)
            .map(|_| Self::read_record(reader))
            .collect::<Result<Vec<_>>>()?;

        Ok((entries, header.directory_offset as u64))
    }

    #[instrument(skip_all, fields(format = V::FORMAT, count = entries.len()), err)]
    fn serialize_directory<W: Read + Write + Seek>(
        writer: &mut W,
        entries: &[PakEntry],
    ) -> Result<()> {
        let directory_offset = writer.stream_position()?.max(PakHeader::SIZE);
        writer.seek(SeekFrom::Start(directory_offset))?;

        for entry in entries {
            Self::write_record(writer, entry)?;
        }
        let end = writer.stream_position()?;

        let header = PakHeader {
            identity: *V::MAGIC,
            directory_offset: narrow("directory", directory_offset)?,
            directory_size: narrow("directory", end - directory_offset)?,
        };
        debug!(?header, "writing header");

        writer.seek(SeekFrom::Start(0))?;
        header.write(writer)?;
        writer.seek(SeekFrom::Start(end))?;

        Ok(())
    }

    fn entry(name: &str) -> Result<PakEntry> {
        check_name(name, V::NAME_SIZE)?;
        Ok(PakEntry::new(name))
    }
}
