//! Front-loaded directory layout of resource groups.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use binrw::{BinRead, BinWrite};
use retro_archive::{
    error::{Error, Result},
    layout::move_range,
    types::{check_name, narrow},
    Layout,
};
use tracing::{debug, instrument, trace};

use crate::types::{HxrgEntry, HxrgHeader, HxrgRecord};

const FORMAT: &str = "HXRG";

/// Longest name accepted for a new resource
pub const NAME_LIMIT: usize = 255;

/// [`Layout`] of a Devil Daggers resource group
#[derive(Debug, Clone, Copy)]
pub struct HxrgLayout;

impl HxrgLayout {
    /// Size of the directory describing `entries`, terminator included
    pub fn directory_size(entries: &[HxrgEntry]) -> u64 {
        entries
            .iter()
            .map(|entry| HxrgRecord::size_of(&entry.name))
            .sum::<u64>()
            + 1
    }
}

/// Whether `rest` of the directory still holds a record rather than the terminator or zero padding
fn holds_record(rest: &[u8]) -> bool {
    rest.len() as u64 >= HxrgRecord::MIN_SIZE && rest[..3] != [0, 0, 0]
}

impl Layout for HxrgLayout {
    type Entry = HxrgEntry;

    const FORMAT: &'static str = FORMAT;
    const MAGIC: &'static [u8] = b":hx:rg:\x01";
    const HEADER_SIZE: u64 = HxrgHeader::SIZE;

    #[instrument(skip_all, err)]
    fn parse_directory<R: Read + Seek>(reader: &mut R) -> Result<(Vec<HxrgEntry>, u64)> {
        reader.seek(SeekFrom::Start(0))?;
        let header = HxrgHeader::read(reader).map_err(|e| Error::from_binrw(FORMAT, e))?;
        let directory_size = header.directory_size as u64;
        debug!(directory_size, "reading directory");

        let mut directory = Vec::new();
        reader
            .by_ref()
            .take(directory_size)
            .read_to_end(&mut directory)?;
        if (directory.len() as u64) < directory_size {
            return Err(Error::BadFormat {
                format: FORMAT,
                reason: format!(
                    "directory of {directory_size} bytes ends after {} bytes",
                    directory.len()
                ),
            });
        }

        let mut records = Cursor::new(directory.as_slice());
        let mut entries = Vec::new();
        while holds_record(&directory[records.position() as usize..]) {
            let record = HxrgRecord::read(&mut records).map_err(|e| Error::from_binrw(FORMAT, e))?;
            let entry = HxrgEntry::from(record);
            trace!(?entry, "parsed record");
            entries.push(entry);
        }

        let payload_start = HxrgHeader::SIZE + directory_size;
        let append_cursor = entries
            .iter()
            .map(|entry| entry.offset + entry.size)
            .fold(payload_start, u64::max);

        Ok((entries, append_cursor))
    }

    /// Writes the header and directory at the start of the file.
    ///
    /// The payload between the first resource and the writer's position is moved so that it starts right after the
    /// new directory, and every offset is shifted along with it.
    #[instrument(skip_all, fields(count = entries.len()), err)]
    fn serialize_directory<W: Read + Write + Seek>(
        writer: &mut W,
        entries: &[HxrgEntry],
    ) -> Result<()> {
        let end = writer.stream_position()?;
        let start = entries
            .iter()
            .filter(|entry| entry.size > 0)
            .map(|entry| entry.offset)
            .min()
            .unwrap_or(end);

        if start > end {
            return Err(Error::CustomError(format!(
                "payload starts at {start} but ends at {end}"
            )));
        }

        let directory_size = Self::directory_size(entries);
        let destination = HxrgHeader::SIZE + directory_size;

        debug!(start, end, destination, "moving payload");
        move_range(writer, start, end, destination)?;

        let mut directory = Cursor::new(Vec::new());
        for entry in entries {
            let offset = entry.offset.clamp(start, end) - start + destination;
            HxrgRecord::from_entry(entry, offset)?.write(&mut directory)?;
        }
        directory.write_all(&[0])?;

        let header = HxrgHeader {
            directory_size: narrow("directory", directory_size)?,
        };

        writer.seek(SeekFrom::Start(0))?;
        header.write(writer)?;
        writer.write_all(directory.get_ref())?;

        writer.seek(SeekFrom::Start(destination + (end - start)))?;
        Ok(())
    }

    fn entry(name: &str) -> Result<HxrgEntry> {
        check_name(name, NAME_LIMIT)?;
        if name.contains('\0') {
            return Err(Error::InvalidName {
                name: name.to_owned(),
                reason: "name can't contain NUL".into(),
            });
        }

        Ok(HxrgEntry::builder().name(name).build())
    }
}
