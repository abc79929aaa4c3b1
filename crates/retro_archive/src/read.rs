//! Types for reading archive entries
//!

use std::{
    fmt::{self, Debug},
    io::{self, BufRead, Read, Seek, SeekFrom},
    sync::Arc,
};

use tracing::{instrument, trace};

use crate::{error::Result, shared::ArchiveShared, types::ArchiveEntry};

/// Smallest number of bytes fetched from the shared handle at once
pub const MIN_READ_SIZE: usize = 4096;

/// Largest slice returned by [`EntryReader::peek`]
pub const MAX_PEEK_SIZE: usize = 512;

/// A read-only stream over a single archive entry.
///
/// The stream is windowed to `[offset, offset + size)` of the archive and behaves like a self-contained file of
/// exactly `size` bytes. Several readers may be open on the same archive at once, each one keeps its own position
/// and takes the archive's lock only for the duration of a refill.
///
/// Data is fetched in chunks of at least [`MIN_READ_SIZE`] bytes. Seeking inside the buffered chunk does no I/O,
/// seeking backwards before it restarts from the beginning of the entry, and seeking forward reads and discards.
/// Positions are clamped to `[0, size]`.
pub struct EntryReader<E: ArchiveEntry, S> {
    shared: Arc<ArchiveShared<E, S>>,
    entry: E,
    buffer: Vec<u8>,
    consumed: usize,
    fetched: u64,
    closed: bool,
}

impl<E: ArchiveEntry, S> Debug for EntryReader<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EntryReader({:#?})", self.entry)
    }
}

/// Methods for retrieving information on the entry being read
impl<E: ArchiveEntry, S> EntryReader<E, S> {
    pub(crate) fn new(shared: Arc<ArchiveShared<E, S>>, entry: E) -> Self {
        EntryReader {
            shared,
            entry,
            buffer: Vec::new(),
            consumed: 0,
            fetched: 0,
            closed: false,
        }
    }

    /// Get the name of the entry
    pub fn name(&self) -> &str {
        self.entry.name()
    }

    /// Get the size of the entry, in bytes
    pub fn size(&self) -> u64 {
        self.entry.size()
    }

    /// Get the offset of the entry data from the start of the archive
    pub fn offset(&self) -> u64 {
        self.entry.offset()
    }

    /// Get the full directory entry
    pub fn entry(&self) -> &E {
        &self.entry
    }

    /// Current position inside the entry
    pub fn position(&self) -> u64 {
        self.fetched - self.available() as u64
    }

    /// Releases this reader's reference on the archive's handle
    pub fn close(mut self) -> Result<()> {
        self.release();
        Ok(())
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.shared.handle.release();
        }
    }

    fn available(&self) -> usize {
        self.buffer.len() - self.consumed
    }

    fn buffer_start(&self) -> u64 {
        self.fetched - self.buffer.len() as u64
    }
}

impl<E: ArchiveEntry, S: Read + Seek> EntryReader<E, S> {
    /// Returns up to [`MAX_PEEK_SIZE`] upcoming bytes without advancing the position.
    ///
    /// The buffer is topped up so that at least `n` bytes are available, unless the entry ends first.
    pub fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        while self.available() < n {
            if self.fill(n - self.available())? == 0 {
                break;
            }
        }

        let end = self.consumed + self.available().min(MAX_PEEK_SIZE);
        Ok(&self.buffer[self.consumed..end])
    }

    /// Appends at least `wanted` bytes (or [`MIN_READ_SIZE`], whichever is larger) to the buffer, stopping at the
    /// end of the entry
    fn fill(&mut self, wanted: usize) -> io::Result<usize> {
        let left = self.entry.size() - self.fetched;
        if left == 0 {
            return Ok(0);
        }

        let len = (wanted.max(MIN_READ_SIZE) as u64).min(left);
        let data = self
            .shared
            .handle
            .read_at(self.entry.offset() + self.fetched, len)?;

        if data.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "entry {} ended after {} of {} bytes",
                    self.entry.name(),
                    self.fetched,
                    self.entry.size()
                ),
            ));
        }

        trace!(name = self.entry.name(), len = data.len(), "refilled buffer");

        if self.consumed > 0 {
            self.buffer.drain(..self.consumed);
            self.consumed = 0;
        }
        self.fetched += data.len() as u64;
        self.buffer.extend_from_slice(&data);

        Ok(data.len())
    }

    /// Moves forward to `target` by reading and discarding
    fn skip_to(&mut self, target: u64) -> io::Result<()> {
        while self.position() < target {
            if self.available() == 0 {
                let wanted = (target - self.fetched).min(16 * MIN_READ_SIZE as u64) as usize;
                if self.fill(wanted)? == 0 {
                    break;
                }
            }

            let step = (target - self.position()).min(self.available() as u64) as usize;
            self.consumed += step;
        }

        Ok(())
    }
}

impl<E: ArchiveEntry, S: Read + Seek> Read for EntryReader<E, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.available() == 0 && self.fill(buf.len())? == 0 {
            return Ok(0);
        }

        let len = buf.len().min(self.available());
        buf[..len].copy_from_slice(&self.buffer[self.consumed..self.consumed + len]);
        self.consumed += len;

        Ok(len)
    }
}

impl<E: ArchiveEntry, S: Read + Seek> BufRead for EntryReader<E, S> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.available() == 0 {
            self.fill(MIN_READ_SIZE)?;
        }

        Ok(&self.buffer[self.consumed..])
    }

    fn consume(&mut self, amt: usize) {
        self.consumed = (self.consumed + amt).min(self.buffer.len());
    }
}

impl<E: ArchiveEntry, S: Read + Seek> Seek for EntryReader<E, S> {
    #[instrument(skip(self), fields(name = self.entry.name()), err)]
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let size = self.entry.size();
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => i128::from(self.position()) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(size) + i128::from(delta),
        }
        .clamp(0, i128::from(size)) as u64;

        if (self.buffer_start()..=self.fetched).contains(&target) {
            self.consumed = (target - self.buffer_start()) as usize;
            return Ok(target);
        }

        if target < self.buffer_start() {
            self.shared.handle.seek(self.entry.offset())?;
            self.buffer.clear();
            self.consumed = 0;
            self.fetched = 0;
        }

        self.skip_to(target)?;
        Ok(self.position())
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position())
    }
}

impl<E: ArchiveEntry, S> Drop for EntryReader<E, S> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod test {
    use std::io::{BufRead, Cursor, Read, Seek, SeekFrom};

    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::testing::{build, TestArchive};

    fn sample() -> Result<TestArchive<Cursor<Vec<u8>>>> {
        let data = (0..10_000u32).map(|i| (i % 251) as u8).collect::<Vec<_>>();
        let bytes = build(&[("small.txt", b"Hello, World!".as_slice()), ("big.bin", data.as_slice())])?;
        TestArchive::new(Cursor::new(bytes), crate::Mode::Read)
    }

    #[test]
    fn read_is_bounded_to_the_entry() -> Result<()> {
        let archive = sample()?;

        let mut reader = archive.by_name("small.txt")?;
        assert_eq!(reader.size(), 13);

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        assert_eq!(buffer, b"Hello, World!");
        assert_eq!(reader.read(&mut [0u8; 4])?, 0);

        Ok(())
    }

    #[test]
    fn seek_is_clamped() -> Result<()> {
        let archive = sample()?;
        let mut reader = archive.by_name("small.txt")?;

        assert_eq!(reader.seek(SeekFrom::End(10))?, 13);
        assert_eq!(reader.seek(SeekFrom::Current(-100))?, 0);
        assert_eq!(reader.seek(SeekFrom::Start(7))?, 7);

        let mut rest = String::new();
        reader.read_to_string(&mut rest)?;
        assert_eq!(rest, "World!");

        Ok(())
    }

    #[test]
    fn seek_backwards_past_the_buffer_rereads() -> Result<()> {
        let archive = sample()?;
        let mut reader = archive.by_name("big.bin")?;

        reader.seek(SeekFrom::Start(9_000))?;
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;
        assert_eq!(byte[0], (9_000u32 % 251) as u8);

        reader.seek(SeekFrom::Start(3))?;
        reader.read_exact(&mut byte)?;
        assert_eq!(byte[0], 3);
        assert_eq!(reader.position(), 4);

        Ok(())
    }

    #[test]
    fn peek_does_not_consume() -> Result<()> {
        let archive = sample()?;
        let mut reader = archive.by_name("big.bin")?;

        assert_eq!(reader.peek(4)?, &[0, 1, 2, 3]);
        assert_eq!(reader.peek(2_000)?.len(), 512);

        let mut first = [0u8; 4];
        reader.read_exact(&mut first)?;
        assert_eq!(first, [0, 1, 2, 3]);

        let mut small = archive.by_name("small.txt")?;
        assert_eq!(small.peek(100)?, b"Hello, World!");

        Ok(())
    }

    #[test]
    fn buf_read_lines() -> Result<()> {
        let bytes = build(&[("lines.txt", b"one\ntwo\nthree".as_slice())])?;
        let archive = TestArchive::new(Cursor::new(bytes), crate::Mode::Read)?;

        let reader = archive.by_name("lines.txt")?;
        let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        assert_eq!(lines, vec!["one", "two", "three"]);

        Ok(())
    }

    #[test]
    fn truncated_storage_is_an_unexpected_eof() -> Result<()> {
        let bytes = build(&[("cut.bin", [7u8; 64].as_slice())])?;
        let archive = TestArchive::new(Cursor::new(bytes), crate::Mode::Read)?;

        // Declared size runs past the end of the storage
        let mut entry = archive.entry("cut.bin")?;
        entry.size = 1_000_000;

        let mut reader = archive.open_entry(&entry)?;
        let mut buffer = Vec::new();
        let error = reader.read_to_end(&mut buffer).unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::UnexpectedEof);

        Ok(())
    }
}
