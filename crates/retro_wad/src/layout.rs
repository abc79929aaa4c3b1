//! Back-loaded directory layout shared by `WAD2` and `WAD3` archives.

use std::{
    io::{Read, Seek, SeekFrom, Write},
    marker::PhantomData,
};

use binrw::{BinRead, BinWrite};
use retro_archive::{
    error::{Error, Result},
    types::{check_name, narrow},
    Layout,
};
use tracing::{debug, instrument};

use crate::types::{half_life, quake, LumpType, WadEntry, WadHeader, WadRecord};

/// The parts of the layout that differ between games
pub trait WadVariant {
    /// Name used in diagnostics
    const FORMAT: &'static str;

    /// Magic number at the start of the file
    const MAGIC: &'static [u8; 4];

    /// Lump type given to entries created by name
    const DEFAULT_LUMP_TYPE: LumpType;
}

/// *Quake*: `WAD2`
#[derive(Debug, Clone, Copy)]
pub struct Wad2;

impl WadVariant for Wad2 {
    const FORMAT: &'static str = "WAD2";
    const MAGIC: &'static [u8; 4] = b"WAD2";
    const DEFAULT_LUMP_TYPE: LumpType = quake::LUMP;
}

/// *Half-Life*: `WAD3`
#[derive(Debug, Clone, Copy)]
pub struct Wad3;

impl WadVariant for Wad3 {
    const FORMAT: &'static str = "WAD3";
    const MAGIC: &'static [u8; 4] = b"WAD3";
    const DEFAULT_LUMP_TYPE: LumpType = half_life::RAW;
}

/// [`Layout`] of a WAD archive for the game `V`
#[derive(Debug, Clone, Copy)]
pub struct WadLayout<V> {
    _variant: PhantomData<V>,
}

impl<V: WadVariant> Layout for WadLayout<V> {
    type Entry = WadEntry;

    const FORMAT: &'static str = V::FORMAT;
    const MAGIC: &'static [u8] = V::MAGIC;
    const HEADER_SIZE: u64 = WadHeader::SIZE;

    #[instrument(skip_all, fields(format = V::FORMAT), err)]
    fn parse_directory<R: Read + Seek>(reader: &mut R) -> Result<(Vec<WadEntry>, u64)> {
        reader.seek(SeekFrom::Start(0))?;
        let header = WadHeader::read(reader).map_err(|e| Error::from_binrw(V::FORMAT, e))?;

        if &header.identity != V::MAGIC {
            return Err(Error::BadFormat {
                format: V::FORMAT,
                reason: format!("bad magic number {:?}", header.identity),
            });
        }

        debug!(
            count = header.lump_count,
            directory_offset = header.directory_offset,
            "reading directory"
        );

        reader.seek(SeekFrom::Start(header.directory_offset as u64))?;
        let entries = (0..header.lump_count)
            .map(|_| {
                WadRecord::read(reader)
                    .map(WadEntry::from)
                    .map_err(|e| Error::from_binrw(V::FORMAT, e))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((entries, header.directory_offset as u64))
    }

    #[instrument(skip_all, fields(format = V::FORMAT, count = entries.len()), err)]
    fn serialize_directory<W: Read + Write + Seek>(
        writer: &mut W,
        entries: &[WadEntry],
    ) -> Result<()> {
        let directory_offset = writer.stream_position()?.max(WadHeader::SIZE);
        writer.seek(SeekFrom::Start(directory_offset))?;

        for entry in entries {
            WadRecord::from_entry(entry)?.write(writer)?;
        }
        let end = writer.stream_position()?;

        let header = WadHeader {
            identity: *V::MAGIC,
            lump_count: narrow("directory", entries.len() as u64)?,
            directory_offset: narrow("directory", directory_offset)?,
        };
        debug!(?header, "writing header");

        writer.seek(SeekFrom::Start(0))?;
        header.write(writer)?;
        writer.seek(SeekFrom::Start(end))?;

        Ok(())
    }

    fn entry(name: &str) -> Result<WadEntry> {
        check_name(name, WadRecord::NAME_SIZE)?;
        Ok(WadEntry::builder()
            .name(name)
            .lump_type(V::DEFAULT_LUMP_TYPE)
            .build())
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use retro_archive::{Layout, Mode};

    use crate::error::{Error, Result};
    use crate::layout::{Wad2, Wad3, WadLayout};
    use crate::types::{half_life, quake, WadEntry};
    use crate::{is_wad2file, is_wad3file, Wad2Archive, Wad3Archive};

    #[test]
    fn empty_wad() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0x57, 0x41, 0x44, 0x33,
            0x00, 0x00, 0x00, 0x00,
            0x0C, 0x00, 0x00, 0x00,
        ];

        let archive = Wad3Archive::new(Cursor::new(Vec::new()), Mode::Write)?;
        assert_eq!(archive.finish()?.into_inner(), expected);

        let (entries, cursor) = WadLayout::<Wad3>::parse_directory(&mut Cursor::new(expected))?;
        assert!(entries.is_empty());
        assert_eq!(cursor, WadLayout::<Wad3>::HEADER_SIZE);

        Ok(())
    }

    #[test]
    fn lump_fields_survive_a_round_trip() -> Result<()> {
        let mut archive = Wad2Archive::new(Cursor::new(Vec::new()), Mode::Write)?;
        archive.write_bytes("PALETTE", &[0x7F; 768])?;
        archive.write_entry_bytes(
            WadEntry::builder()
                .name("CONCHARS")
                .lump_type(quake::MIPTEX)
                .build(),
            &[0x01; 128],
        )?;
        let bytes = archive.finish()?.into_inner();

        assert_eq!(bytes.len(), 12 + 768 + 128 + 2 * 32);
        assert_eq!(&bytes[..12], b"WAD2\x02\0\0\0\x8C\x03\0\0");

        let mut cursor = Cursor::new(bytes);
        assert!(is_wad2file(&mut cursor)?);
        assert!(!is_wad3file(&mut cursor)?);

        let archive = Wad2Archive::reader(cursor)?;
        let palette = archive.entry("PALETTE")?;
        assert_eq!(palette.lump_type, quake::LUMP);
        assert_eq!((palette.offset, palette.disk_size, palette.size), (12, 768, 768));

        let conchars = archive.entry("CONCHARS")?;
        assert_eq!(conchars.lump_type, quake::MIPTEX);
        assert_eq!(conchars.offset, 780);
        assert_eq!(archive.read("CONCHARS")?, vec![0x01; 128]);

        Ok(())
    }

    #[test]
    fn names_are_limited_to_sixteen_characters() {
        assert!(WadLayout::<Wad3>::entry("SIXTEEN_CHARS_OK").is_ok());
        assert!(matches!(
            WadLayout::<Wad3>::entry("SEVENTEEN_CHARS_X"),
            Err(Error::InvalidName { .. })
        ));
        assert_eq!(
            WadLayout::<Wad3>::entry("{BLUE").map(|e| e.lump_type).ok(),
            Some(half_life::RAW)
        );
    }

    #[test]
    fn wrong_flavour_is_bad_format() -> Result<()> {
        let bytes = Wad2Archive::new(Cursor::new(Vec::new()), Mode::Write)?
            .finish()?
            .into_inner();

        assert!(matches!(
            Wad3Archive::reader(Cursor::new(bytes)),
            Err(Error::BadFormat { format: "WAD3", .. })
        ));

        Ok(())
    }
}
