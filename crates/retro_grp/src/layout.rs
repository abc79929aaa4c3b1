//! Front-loaded directory layout of GRP archives.

use std::io::{Read, Seek, SeekFrom, Write};

use binrw::{BinRead, BinWrite};
use retro_archive::{
    error::{Error, Result},
    layout::move_range,
    types::{check_name, decode_name, narrow},
    Layout,
};
use tracing::{debug, instrument, trace};

use crate::types::{GrpEntry, GrpHeader, GrpRecord};

const FORMAT: &str = "GRP";

/// [`Layout`] of a GRP archive
#[derive(Debug, Clone, Copy)]
pub struct GrpLayout;

impl GrpLayout {
    /// Where the payload of an archive of `count` files starts
    pub const fn payload_start(count: u64) -> u64 {
        GrpHeader::SIZE + GrpRecord::SIZE * count
    }
}

impl Layout for GrpLayout {
    type Entry = GrpEntry;

    const FORMAT: &'static str = FORMAT;
    const MAGIC: &'static [u8] = b"KenSilverman";
    const HEADER_SIZE: u64 = GrpHeader::SIZE;

    #[instrument(skip_all, err)]
    fn parse_directory<R: Read + Seek>(reader: &mut R) -> Result<(Vec<GrpEntry>, u64)> {
        reader.seek(SeekFrom::Start(0))?;
        let header = GrpHeader::read(reader).map_err(|e| Error::from_binrw(FORMAT, e))?;
        debug!(count = header.entry_count, "reading directory");

        // The count comes straight from the file, so the directory grows as records are actually read.
        let mut offset = Self::payload_start(header.entry_count as u64);
        let entries = (0..header.entry_count)
            .map(|_| {
                let record = GrpRecord::read(reader).map_err(|e| Error::from_binrw(FORMAT, e))?;
                let entry = GrpEntry {
                    name: decode_name(&record.name),
                    offset,
                    size: record.size as u64,
                };
                trace!(?entry, "parsed record");

                offset += entry.size;
                Ok(entry)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((entries, offset))
    }

    /// Writes the header and directory at the start of the file.
    ///
    /// The payload between the first entry and the writer's position is moved so that it starts right after the
    /// new directory.
    #[instrument(skip_all, fields(count = entries.len()), err)]
    fn serialize_directory<W: Read + Write + Seek>(
        writer: &mut W,
        entries: &[GrpEntry],
    ) -> Result<()> {
        let end = writer.stream_position()?;
        let start = entries.first().map_or(end, |entry| entry.offset);
        let destination = Self::payload_start(entries.len() as u64);

        if start > end {
            return Err(Error::CustomError(format!(
                "payload starts at {start} but ends at {end}"
            )));
        }

        debug!(start, end, destination, "moving payload");
        move_range(writer, start, end, destination)?;

        let header = GrpHeader {
            entry_count: narrow("directory", entries.len() as u64)?,
        };

        writer.seek(SeekFrom::Start(0))?;
        header.write(writer)?;
        for entry in entries {
            GrpRecord::from_entry(entry)?.write(writer)?;
        }

        writer.seek(SeekFrom::Start(destination + (end - start)))?;
        Ok(())
    }

    fn entry(name: &str) -> Result<GrpEntry> {
        check_name(name, GrpRecord::NAME_SIZE)?;
        Ok(GrpEntry::new(name))
    }
}
