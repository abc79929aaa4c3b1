//! A minimal back-loaded layout used to exercise the engine in unit tests.
//!
//! | Offset | Field             |
//! |--------|-------------------|
//! | 0      | magic `TEST`      |
//! | 4      | directory offset  |
//! | 8      | entry count       |
//!
//! Each directory record is `name[32] | u32 offset | u32 size`.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::archive::Archive;
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::types::{decode_name, encode_name, narrow, ArchiveEntry, Mode};

pub const NAME_SIZE: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEntry {
    pub name: String,
    pub offset: u64,
    pub size: u64,
}

impl TestEntry {
    pub fn at(name: &str, offset: u64, size: u64) -> Self {
        TestEntry {
            name: name.to_owned(),
            offset,
            size,
        }
    }
}

impl ArchiveEntry for TestEntry {
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

pub struct TestLayout;

pub type TestArchive<S> = Archive<TestLayout, S>;

impl Layout for TestLayout {
    type Entry = TestEntry;

    const FORMAT: &'static str = "TEST";
    const MAGIC: &'static [u8] = b"TEST";
    const HEADER_SIZE: u64 = 12;

    fn parse_directory<R: Read + Seek>(reader: &mut R) -> Result<(Vec<TestEntry>, u64)> {
        reader.seek(SeekFrom::Start(0))?;

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != *b"TEST" {
            return Err(Error::BadFormat {
                format: Self::FORMAT,
                reason: format!("bad magic number {magic:?}"),
            });
        }

        let directory_offset = reader.read_u32::<LittleEndian>()? as u64;
        let count = reader.read_u32::<LittleEndian>()?;

        reader.seek(SeekFrom::Start(directory_offset))?;
        let entries = (0..count)
            .map(|_| {
                let mut name = [0u8; NAME_SIZE];
                reader.read_exact(&mut name)?;
                let offset = reader.read_u32::<LittleEndian>()? as u64;
                let size = reader.read_u32::<LittleEndian>()? as u64;
                Ok(TestEntry::at(&decode_name(&name), offset, size))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((entries, directory_offset))
    }

    fn serialize_directory<W: Read + Write + Seek>(
        writer: &mut W,
        entries: &[TestEntry],
    ) -> Result<()> {
        let directory_offset = writer.stream_position()?.max(Self::HEADER_SIZE);
        writer.seek(SeekFrom::Start(directory_offset))?;

        for entry in entries {
            writer.write_all(&encode_name(&entry.name, NAME_SIZE)?)?;
            writer.write_u32::<LittleEndian>(narrow(&entry.name, entry.offset)?)?;
            writer.write_u32::<LittleEndian>(narrow(&entry.name, entry.size)?)?;
        }
        let end = writer.stream_position()?;

        writer.seek(SeekFrom::Start(0))?;
        writer.write_all(b"TEST")?;
        writer.write_u32::<LittleEndian>(narrow("directory", directory_offset)?)?;
        writer.write_u32::<LittleEndian>(entries.len() as u32)?;

        writer.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    fn entry(name: &str) -> Result<TestEntry> {
        crate::types::check_name(name, NAME_SIZE)?;
        Ok(TestEntry::at(name, 0, 0))
    }
}

/// Writes `files` to a fresh in-memory archive and returns its bytes
pub fn build(files: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let mut archive = TestArchive::new(Cursor::new(Vec::new()), Mode::Write)?;
    for (name, data) in files {
        archive.write_bytes(name, data)?;
    }

    Ok(archive.finish()?.into_inner())
}
