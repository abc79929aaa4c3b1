//! Files holding a single serialized object instead of a directory of entries.
//!
//! Palettes, sprites and level files are read into memory in one go, edited, and written back in one go. They share
//! the archive's [`Mode`] semantics but have no directory, no streams and no append cursor.

use std::{
    fs::{File, OpenOptions},
    io::{self, Cursor, Read, Seek, SeekFrom, Write},
    path::Path,
};

use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::types::Mode;

/// An object with a complete binary encoding.
///
/// [`Default`] is the value a file opened in [`Mode::Write`] starts from.
pub trait BinaryFormat: Sized + Default {
    /// Parses the object from the current position of `reader`
    fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self>;

    /// Serializes the object at the current position of `writer`
    fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()>;
}

/// A handle whose length can be cut down after it has been rewritten
pub trait Truncate {
    /// Drops everything past `len` bytes
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl Truncate for File {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

impl Truncate for Cursor<Vec<u8>> {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        self.get_mut().truncate(len);
        Ok(())
    }
}

impl<T: Truncate + ?Sized> Truncate for &mut T {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        (**self).truncate(len)
    }
}

/// A single [`BinaryFormat`] object bound to the handle it was read from.
///
/// ```
/// # fn doit() -> retro_archive::error::Result<()> {
/// use std::io::{Cursor, Read, Seek, Write};
/// use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
/// use retro_archive::{error::Result, BinaryFile, BinaryFormat, Mode};
///
/// #[derive(Default)]
/// struct Score(u32);
///
/// impl BinaryFormat for Score {
///     fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self> {
///         Ok(Score(reader.read_u32::<LittleEndian>()?))
///     }
///
///     fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
///         Ok(writer.write_u32::<LittleEndian>(self.0)?)
///     }
/// }
///
/// let mut buffer = Cursor::new(Vec::new());
///
/// let mut file = BinaryFile::<Score, _>::new(&mut buffer, Mode::Write)?;
/// file.get_mut().0 = 42;
/// file.close()?;
///
/// assert_eq!(buffer.into_inner(), 42u32.to_le_bytes());
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug)]
pub struct BinaryFile<T, S> {
    object: T,
    handle: Option<S>,
    mode: Mode,
    modified: bool,
}

impl<T: BinaryFormat> BinaryFile<T, File> {
    /// Opens the file at `path`, creating or truncating it in [`Mode::Write`]
    #[instrument(skip(path), fields(path = %path.as_ref().display()), err)]
    pub fn open(path: impl AsRef<Path>, mode: Mode) -> Result<Self> {
        let path = path.as_ref();
        let file = match mode {
            Mode::Read => File::open(path)?,
            Mode::Write => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?,
            Mode::Append => OpenOptions::new().read(true).write(true).open(path)?,
        };

        Self::new(file, mode)
    }
}

impl<T: BinaryFormat, S: Read + Seek> BinaryFile<T, S> {
    /// Binds an object to an already open handle.
    ///
    /// [`Mode::Read`] and [`Mode::Append`] parse the object from the start of the handle, [`Mode::Write`] starts
    /// from [`Default::default`].
    pub fn new(mut handle: S, mode: Mode) -> Result<Self> {
        let object = match mode {
            Mode::Write => T::default(),
            Mode::Read | Mode::Append => {
                handle.seek(SeekFrom::Start(0))?;
                T::read_from(&mut handle)?
            }
        };

        Ok(BinaryFile {
            object,
            handle: Some(handle),
            mode,
            modified: mode.is_writable(),
        })
    }
}

impl<T: BinaryFormat, S> BinaryFile<T, S> {
    /// The object, as read or as last modified
    pub fn get(&self) -> &T {
        &self.object
    }

    /// Mutable access to the object, written back on [`BinaryFile::close`]
    pub fn get_mut(&mut self) -> &mut T {
        self.modified = true;
        &mut self.object
    }

    /// Mode the file was opened in
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether [`BinaryFile::close`] has been called
    pub const fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    /// Serializes the object into another writer
    pub fn save<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        self.object.write_to(writer)
    }

    /// Consumes the file, returning the object
    pub fn into_inner(self) -> T {
        self.object
    }
}

impl<T: BinaryFormat, S: Write + Seek + Truncate> BinaryFile<T, S> {
    /// Rewrites the object at the start of the handle when the file is writable, then lets go of the handle.
    ///
    /// Anything past the end of the new encoding is cut off. Fails with [`Error::ClosedHandle`] when called twice.
    #[instrument(skip(self), fields(mode = %self.mode), err)]
    pub fn close(&mut self) -> Result<()> {
        let mut handle = self.handle.take().ok_or(Error::ClosedHandle)?;

        if self.mode.is_writable() && self.modified {
            handle.seek(SeekFrom::Start(0))?;
            self.object.write_to(&mut handle)?;

            let end = handle.stream_position()?;
            handle.truncate(end)?;
            handle.flush()?;

            debug!(size = end, "rewrote file");
        }

        Ok(())
    }
}
