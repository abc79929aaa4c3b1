//! State shared between an archive and the entry streams opened on it.

use std::io::{self, Read, Seek, SeekFrom};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::directory::Directory;
use crate::error::{Error, Result};
use crate::read::MIN_READ_SIZE;

/// Everything an [`crate::Archive`] shares with its open streams
pub(crate) struct ArchiveShared<E, S> {
    pub handle: SharedHandle<S>,
    pub directory: Mutex<Directory<E>>,
}

/// The one underlying storage handle of an archive, guarded by a lock.
///
/// Every access seeks to the caller's own position first, so streams never observe each other's cursors. The handle
/// is reference counted: the archive holds the base reference and every open stream holds one more. When the count
/// drops to zero a handle the archive opened itself is closed, a handle supplied by the caller is left alone.
pub(crate) struct SharedHandle<S> {
    state: Mutex<HandleState<S>>,
}

struct HandleState<S> {
    inner: Option<S>,
    references: usize,
    owned: bool,
    writing: bool,
}

fn closed_handle() -> io::Error {
    Error::ClosedHandle.into()
}

impl<S> SharedHandle<S> {
    pub fn new(inner: S, owned: bool) -> Self {
        SharedHandle {
            state: Mutex::new(HandleState {
                inner: Some(inner),
                references: 1,
                owned,
                writing: false,
            }),
        }
    }

    /// Runs `f` with exclusive access to the handle
    pub fn with<T, Err: From<io::Error>>(
        &self,
        f: impl FnOnce(&mut S) -> core::result::Result<T, Err>,
    ) -> core::result::Result<T, Err> {
        let mut state = self.state.lock();
        let inner = state.inner.as_mut().ok_or_else(closed_handle)?;
        f(inner)
    }

    /// Registers a new reader on the handle
    pub fn acquire(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.inner.is_none() || state.references == 0 {
            return Err(Error::ClosedHandle);
        }
        state.references += 1;
        Ok(())
    }

    /// Drops one reference, closing the handle if it was the last one and the archive owns it
    pub fn release(&self) {
        let mut state = self.state.lock();
        if state.references == 0 {
            warn!("shared handle released more often than acquired");
            return;
        }

        state.references -= 1;
        if state.references == 0 && state.owned {
            if let Some(inner) = state.inner.take() {
                debug!("closing underlying handle");
                drop(inner);
            }
        }
    }

    /// Marks the single writer slot as taken, holding a reference for it
    pub fn begin_write(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.inner.is_none() || state.references == 0 {
            return Err(Error::ClosedHandle);
        }
        if state.writing {
            return Err(Error::AlreadyWriting);
        }
        state.writing = true;
        state.references += 1;
        Ok(())
    }

    /// Frees the writer slot and its reference
    pub fn end_write(&self) {
        self.state.lock().writing = false;
        self.release();
    }

    pub fn is_writing(&self) -> bool {
        self.state.lock().writing
    }

    /// Hands the handle back once nothing references it anymore
    pub fn take(&self) -> Option<S> {
        let mut state = self.state.lock();
        if state.references == 0 {
            state.inner.take()
        } else {
            None
        }
    }
}

impl<S: Read + Seek> SharedHandle<S> {
    /// Reads up to `len` bytes starting at the absolute `position`
    pub fn read_at(&self, position: u64, len: u64) -> io::Result<Vec<u8>> {
        self.with(|inner| {
            inner.seek(SeekFrom::Start(position))?;

            let mut data = Vec::with_capacity(len.min(16 * MIN_READ_SIZE as u64) as usize);
            inner.by_ref().take(len).read_to_end(&mut data)?;
            Ok(data)
        })
    }

    /// Repositions the handle, which is refused while an entry writer is appending through it
    pub fn seek(&self, position: u64) -> io::Result<u64> {
        let mut state = self.state.lock();
        if state.writing {
            return Err(Error::AlreadyWriting.into());
        }
        let inner = state.inner.as_mut().ok_or_else(closed_handle)?;
        inner.seek(SeekFrom::Start(position))
    }
}
