//! Types for writing archive entries
//!

use std::{
    fmt::{self, Debug},
    io::{self, Seek, SeekFrom, Write},
    sync::Arc,
};

use tracing::{debug, instrument, warn};

use crate::{error::Result, shared::ArchiveShared, types::ArchiveEntry};

/// A write-only stream appending one new entry to an archive.
///
/// Bytes are written at the archive's append cursor as they come in. The entry only becomes visible in the directory
/// once the writer is closed, at which point its offset and size are recorded. Dropping an open writer commits it
/// the same way.
///
/// Only one writer can be open on an archive at any time, and readers can't rewind the shared handle while it is.
pub struct EntryWriter<E: ArchiveEntry, S> {
    shared: Arc<ArchiveShared<E, S>>,
    entry: Option<E>,
    start: u64,
    position: u64,
    extent: u64,
}

impl<E: ArchiveEntry, S> Debug for EntryWriter<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EntryWriter({:#?})", self.entry)
    }
}

impl<E: ArchiveEntry, S> EntryWriter<E, S> {
    /// Expects the writer slot to be taken already, see [`crate::shared::SharedHandle::begin_write`]
    pub(crate) fn new(shared: Arc<ArchiveShared<E, S>>, entry: E, start: u64) -> Self {
        EntryWriter {
            shared,
            entry: Some(entry),
            start,
            position: 0,
            extent: 0,
        }
    }

    /// Name of the entry being written
    pub fn name(&self) -> &str {
        self.entry.as_ref().map_or("", |e| e.name())
    }

    /// Where the entry data starts in the archive
    pub fn offset(&self) -> u64 {
        self.start
    }

    /// Number of bytes written so far
    pub fn size(&self) -> u64 {
        self.extent
    }

    /// Commits the entry to the archive directory and returns it with its final placement
    pub fn close(mut self) -> Result<E> {
        self.commit()
    }

    #[instrument(skip(self), fields(name = self.name(), offset = self.start, size = self.extent), err)]
    fn commit(&mut self) -> Result<E> {
        let Some(mut entry) = self.entry.take() else {
            return Err(crate::error::Error::ClosedHandle);
        };

        entry.set_placement(self.start, self.extent);
        self.shared.directory.lock().push(entry.clone());
        self.shared.handle.end_write();

        debug!("committed entry");
        Ok(entry)
    }
}

impl<E: ArchiveEntry, S: Write + Seek> Write for EntryWriter<E, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.entry.is_none() {
            return Err(crate::error::Error::ClosedHandle.into());
        }

        let at = self.start + self.position;
        let written = self.shared.handle.with(|inner| {
            inner.seek(SeekFrom::Start(at))?;
            inner.write(buf)
        })?;

        self.position += written as u64;
        self.extent = self.extent.max(self.position);

        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.shared.handle.with(|inner| inner.flush())
    }
}

impl<E: ArchiveEntry, S: Write + Seek> Seek for EntryWriter<E, S> {
    /// Moves within the bytes written so far, positions are clamped to `[0, size]`
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => i128::from(self.position) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(self.extent) + i128::from(delta),
        };

        self.position = target.clamp(0, i128::from(self.extent)) as u64;
        Ok(self.position)
    }
}

impl<E: ArchiveEntry, S> Drop for EntryWriter<E, S> {
    fn drop(&mut self) {
        if self.entry.is_some() {
            warn!(name = self.name(), "entry writer dropped without closing it");
            if let Err(e) = self.commit() {
                warn!("failed to commit entry: {e}");
            }
        }
    }
}
