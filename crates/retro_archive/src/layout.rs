//! The format specific hook the archive engine calls into.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::Result;
use crate::types::ArchiveEntry;

/// Size of the buffer used by [`move_range`]
const MOVE_CHUNK_SIZE: usize = 64 * 1024;

/// Byte layout of one archive format.
///
/// A layout knows how to parse a header and directory, and how to write them back. The engine never embeds any
/// byte layout itself: it calls [`Layout::parse_directory`] when an archive is opened for reading or appending, and
/// [`Layout::serialize_directory`] once when an archive is opened for writing (with no entries, to reserve the
/// header) and once more when it is closed (with the final entries).
///
/// ```
/// use std::io::{Read, Seek, Write};
/// use retro_archive::{error::Result, Layout};
/// # use retro_archive::ArchiveEntry;
/// # #[derive(Debug, Clone)]
/// # pub struct Entry { name: String, offset: u64, size: u64 }
/// # impl ArchiveEntry for Entry {
/// #     fn name(&self) -> &str { &self.name }
/// #     fn offset(&self) -> u64 { self.offset }
/// #     fn size(&self) -> u64 { self.size }
/// #     fn set_placement(&mut self, offset: u64, size: u64) { self.offset = offset; self.size = size; }
/// # }
///
/// struct Nothing;
///
/// impl Layout for Nothing {
///     type Entry = Entry;
///
///     const FORMAT: &'static str = "nothing";
///     const MAGIC: &'static [u8] = b"";
///     const HEADER_SIZE: u64 = 0;
///
///     fn parse_directory<R: Read + Seek>(_reader: &mut R) -> Result<(Vec<Entry>, u64)> {
///         Ok((Vec::new(), 0))
///     }
///
///     fn serialize_directory<W: Read + Write + Seek>(_writer: &mut W, _entries: &[Entry]) -> Result<()> {
///         Ok(())
///     }
///
///     fn entry(name: &str) -> Result<Entry> {
///         Ok(Entry { name: name.into(), offset: 0, size: 0 })
///     }
/// }
/// ```
pub trait Layout {
    /// Directory entry type, a superset of the base `{name, offset, size}` fields
    type Entry: ArchiveEntry;

    /// Human readable name of the format, used in diagnostics
    const FORMAT: &'static str;

    /// Magic number found at the very start of the file
    const MAGIC: &'static [u8];

    /// Size of the fixed header, which is also where the directory (back-loaded) or payload (front-loaded) of an
    /// empty archive starts
    const HEADER_SIZE: u64;

    /// Parses the header and directory.
    ///
    /// Returns the entries in directory order and the append cursor: the position right after the last byte of
    /// payload, where new entries and the rewritten directory will go.
    fn parse_directory<R: Read + Seek>(reader: &mut R) -> Result<(Vec<Self::Entry>, u64)>;

    /// Writes the header and directory for `entries`.
    ///
    /// The writer is positioned at the append cursor when this is called, and must be left at the end of the data
    /// that was written.
    fn serialize_directory<W: Read + Write + Seek>(
        writer: &mut W,
        entries: &[Self::Entry],
    ) -> Result<()>;

    /// Creates a new entry named `name` with the format's default fields.
    ///
    /// Fails with [`crate::error::Error::InvalidName`] if the format can't store the name.
    fn entry(name: &str) -> Result<Self::Entry>;

    /// Quickly checks whether `reader` starts with this format's magic number.
    ///
    /// The reader is rewound to the start of the file afterwards.
    fn probe<R: Read + Seek>(reader: &mut R) -> Result<bool> {
        reader.seek(SeekFrom::Start(0))?;

        let mut magic = vec![0u8; Self::MAGIC.len()];
        let matched = match reader.read_exact(&mut magic) {
            Ok(()) => magic == Self::MAGIC,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => false,
            Err(e) => return Err(e.into()),
        };

        reader.seek(SeekFrom::Start(0))?;
        Ok(matched)
    }
}

/// Copies the bytes in `start..end` so they begin at `destination`, walking in the direction that never overwrites
/// bytes that are still to be copied.
///
/// Front-loaded layouts use this to make room for a directory that grew. Bytes of the old range that are not
/// overwritten are left as they were.
pub fn move_range<S: Read + Write + Seek>(
    stream: &mut S,
    start: u64,
    end: u64,
    destination: u64,
) -> Result<()> {
    if start == destination || start == end {
        return Ok(());
    }

    let mut buffer = vec![0u8; MOVE_CHUNK_SIZE.min((end - start) as usize)];
    let mut remaining = end - start;

    while remaining > 0 {
        let length = remaining.min(buffer.len() as u64);
        // Moving towards the end of the file has to start with the last chunk.
        let from = if destination > start {
            start + remaining - length
        } else {
            end - remaining
        };
        let chunk = &mut buffer[..length as usize];

        stream.seek(SeekFrom::Start(from))?;
        stream.read_exact(chunk)?;
        stream.seek(SeekFrom::Start(destination + (from - start)))?;
        stream.write_all(chunk)?;

        remaining -= length;
    }

    Ok(())
}
