//! The archive controller: opening, lookups, streams, extraction and closing.
//!

use std::{
    fmt::{self, Debug},
    fs::{self, File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::Arc,
};

use bon::Builder;
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use crate::{
    directory::Directory,
    error::{Error, FileNotFoundError, Result},
    layout::Layout,
    read::{EntryReader, MIN_READ_SIZE},
    sanitize::{archive_name_for, sanitize_entry_path},
    shared::{ArchiveShared, SharedHandle},
    types::{ArchiveEntry, Mode},
    write::EntryWriter,
};

/// Options for how entries are extracted to disk
#[derive(Debug, Clone, Copy, Builder)]
pub struct ExtractOptions {
    /// Replace files that already exist at the destination
    #[builder(default = true)]
    pub overwrite: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions::builder().build()
    }
}

type Finalize<E, S> = fn(&mut S, u64, &[E]) -> Result<()>;

fn finalize_directory<L: Layout, S: Read + Write + Seek>(
    handle: &mut S,
    append_cursor: u64,
    entries: &[L::Entry],
) -> Result<()> {
    handle.seek(SeekFrom::Start(append_cursor))?;
    L::serialize_directory(handle, entries)?;
    handle.flush()?;
    Ok(())
}

/// An archive of named, offset-addressed entries, in the byte layout `L`.
///
/// ```
/// # fn doit() -> retro_archive::error::Result<()> {
/// # use std::io::{Cursor, Read, Seek, SeekFrom, Write};
/// # use retro_archive::{ArchiveEntry, Layout, Mode};
/// # #[derive(Debug, Clone)]
/// # pub struct Entry { name: String, offset: u64, size: u64 }
/// # impl ArchiveEntry for Entry {
/// #     fn name(&self) -> &str { &self.name }
/// #     fn offset(&self) -> u64 { self.offset }
/// #     fn size(&self) -> u64 { self.size }
/// #     fn set_placement(&mut self, offset: u64, size: u64) { self.offset = offset; self.size = size; }
/// # }
/// # struct Raw;
/// # impl Layout for Raw {
/// #     type Entry = Entry;
/// #     const FORMAT: &'static str = "raw";
/// #     const MAGIC: &'static [u8] = b"";
/// #     const HEADER_SIZE: u64 = 0;
/// #     fn parse_directory<R: Read + Seek>(_: &mut R) -> retro_archive::error::Result<(Vec<Entry>, u64)> { Ok((Vec::new(), 0)) }
/// #     fn serialize_directory<W: Read + Write + Seek>(_: &mut W, _: &[Entry]) -> retro_archive::error::Result<()> { Ok(()) }
/// #     fn entry(name: &str) -> retro_archive::error::Result<Entry> { Ok(Entry { name: name.into(), offset: 0, size: 0 }) }
/// # }
/// use retro_archive::Archive;
///
/// let mut archive = Archive::<Raw, _>::new(Cursor::new(Vec::new()), Mode::Write)?;
///
/// let mut writer = archive.create("hello.txt")?;
/// writer.write_all(b"Hello, World!")?;
/// writer.close()?;
///
/// assert_eq!(archive.names(), vec!["hello.txt"]);
/// assert_eq!(archive.read("hello.txt")?, b"Hello, World!");
///
/// archive.close()?;
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct Archive<L: Layout, S> {
    shared: Arc<ArchiveShared<L::Entry, S>>,
    mode: Mode,
    modified: bool,
    closed: bool,
    finalize: Option<Finalize<L::Entry, S>>,
    _layout: PhantomData<fn() -> L>,
}

impl<L: Layout, S> Debug for Archive<L, S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Archive")
            .field("format", &L::FORMAT)
            .field("mode", &self.mode)
            .field("entries", &self.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl<L: Layout> Archive<L, File> {
    /// Opens the archive at `path`.
    ///
    /// The file is created (or truncated) in [`Mode::Write`], and must already exist otherwise. The archive owns the
    /// file and closes it once the archive and every stream opened on it are closed.
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

        Self::with_handle(file, mode, true)
    }
}

impl<L: Layout, S: Read + Write + Seek> Archive<L, S> {
    /// Opens an archive over an already open handle.
    ///
    /// The handle is never closed by the archive, use [`Archive::finish`] to get it back. Pass `&mut T` to keep
    /// ownership of the underlying handle instead.
    #[instrument(skip(handle), err)]
    pub fn new(handle: S, mode: Mode) -> Result<Self> {
        Self::with_handle(handle, mode, false)
    }

    fn with_handle(mut handle: S, mode: Mode, owned: bool) -> Result<Self> {
        let (entries, append_cursor) = match mode {
            Mode::Write => {
                handle.seek(SeekFrom::Start(0))?;
                L::serialize_directory(&mut handle, &[])?;
                (Vec::new(), handle.stream_position()?)
            }
            Mode::Read | Mode::Append => L::parse_directory(&mut handle)?,
        };

        if mode == Mode::Append {
            handle.seek(SeekFrom::Start(append_cursor))?;
        }

        debug!(
            format = L::FORMAT,
            entries = entries.len(),
            append_cursor,
            "opened archive"
        );

        let finalize: Finalize<L::Entry, S> = finalize_directory::<L, S>;
        Ok(Self::assemble(
            handle,
            mode,
            owned,
            Directory::new(entries, append_cursor),
            Some(finalize),
        ))
    }

    /// Starts a new entry named `name`, with the format's default fields
    pub fn create(&mut self, name: &str) -> Result<EntryWriter<L::Entry, S>> {
        let entry = L::entry(name)?;
        self.create_entry(entry)
    }

    /// Starts a new entry from a prepared directory entry.
    ///
    /// Its offset and size are ignored, they are filled in when the returned writer is closed.
    #[instrument(skip_all, fields(name = entry.name()), err)]
    pub fn create_entry(&mut self, entry: L::Entry) -> Result<EntryWriter<L::Entry, S>> {
        self.ensure_open()?;
        if !self.mode.is_writable() {
            return Err(Error::ReadOnly);
        }

        self.shared.handle.begin_write()?;
        self.modified = true;

        let start = self.shared.directory.lock().append_cursor();
        Ok(EntryWriter::new(Arc::clone(&self.shared), entry, start))
    }

    /// Copies the file at `path` into a new entry.
    ///
    /// The entry is named `name`, or after the path's normal components when `name` is `None`.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()), err)]
    pub fn write(&mut self, path: impl AsRef<Path>, name: Option<&str>) -> Result<L::Entry> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::NotAFile(path.to_path_buf()));
        }

        let name = name.map_or_else(|| archive_name_for(path), str::to_owned);
        let mut source = File::open(path)?;

        let mut writer = self.create(&name)?;
        io::copy(&mut source, &mut writer)?;
        writer.close()
    }

    /// Writes `data` to a new entry named `name`
    pub fn write_bytes(&mut self, name: &str, data: &[u8]) -> Result<L::Entry> {
        let entry = L::entry(name)?;
        self.write_entry_bytes(entry, data)
    }

    /// Writes `data` to a new entry described by `entry`
    pub fn write_entry_bytes(&mut self, entry: L::Entry, data: &[u8]) -> Result<L::Entry> {
        let mut writer = self.create_entry(entry)?;
        writer.write_all(data)?;
        writer.close()
    }

    /// Closes the archive and hands back the handle it was opened over.
    ///
    /// Fails with [`Error::ClosedHandle`] if the archive opened the handle itself, or if entry readers are still
    /// holding on to it.
    pub fn finish(mut self) -> Result<S> {
        self.close()?;
        self.shared.handle.take().ok_or(Error::ClosedHandle)
    }
}

impl<L: Layout, S: Read + Seek> Archive<L, S> {
    /// Opens an archive over a handle that can only be read from
    #[instrument(skip(handle), err)]
    pub fn reader(mut handle: S) -> Result<Self> {
        let (entries, append_cursor) = L::parse_directory(&mut handle)?;
        debug!(format = L::FORMAT, entries = entries.len(), "opened archive");

        Ok(Self::assemble(
            handle,
            Mode::Read,
            false,
            Directory::new(entries, append_cursor),
            None,
        ))
    }

    /// Search for an entry by name and open it for reading
    pub fn by_name(&self, name: &str) -> Result<EntryReader<L::Entry, S>> {
        let entry = self.entry(name)?;
        self.open_entry(&entry)
    }

    /// Open the entry at `index` of [`Archive::entries`] for reading
    pub fn by_index(&self, index: usize) -> Result<EntryReader<L::Entry, S>> {
        let entry = self
            .shared
            .directory
            .lock()
            .get_index(index)
            .cloned()
            .ok_or(Error::NotFound(FileNotFoundError::Index(index)))?;

        self.open_entry(&entry)
    }

    /// Open `entry` for reading
    pub fn open_entry(&self, entry: &L::Entry) -> Result<EntryReader<L::Entry, S>> {
        self.ensure_open()?;
        self.shared.handle.acquire()?;
        Ok(EntryReader::new(Arc::clone(&self.shared), entry.clone()))
    }

    /// Reads the whole content of the entry named `name`
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let entry = self.entry(name)?;

        // The declared size is untrusted until the data has actually been read.
        let mut data = Vec::with_capacity(entry.size().min(16 * MIN_READ_SIZE as u64) as usize);
        self.copy_entry(&entry, &mut data)?;
        Ok(data)
    }

    fn copy_entry<W: Write>(&self, entry: &L::Entry, sink: &mut W) -> Result<u64> {
        let mut reader = self.open_entry(entry)?;

        match io::copy(&mut reader, sink) {
            Ok(copied) => Ok(copied),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(Error::UnexpectedEof {
                name: entry.name().to_owned(),
                expected: entry.size(),
                actual: reader.position(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Extracts the entry named `name` below `directory`, see [`Archive::extract_entry_with`]
    pub fn extract(&self, name: &str, directory: impl AsRef<Path>) -> Result<PathBuf> {
        self.extract_with(name, directory, ExtractOptions::default())
    }

    /// Extracts the entry named `name` below `directory`, see [`Archive::extract_entry_with`]
    pub fn extract_with(
        &self,
        name: &str,
        directory: impl AsRef<Path>,
        options: ExtractOptions,
    ) -> Result<PathBuf> {
        let entry = self.entry(name)?;
        self.extract_entry_with(&entry, directory, options)
    }

    /// Extracts `entry` below `directory`, see [`Archive::extract_entry_with`]
    pub fn extract_entry(&self, entry: &L::Entry, directory: impl AsRef<Path>) -> Result<PathBuf> {
        self.extract_entry_with(entry, directory, ExtractOptions::default())
    }

    /// Extracts `entry` below `directory` and returns the path it was written to.
    ///
    /// The entry name is turned into a relative path with [`sanitize_entry_path`] first, so the result always lies
    /// inside `directory`. Missing parent directories are created. Entries whose name ends with `/` are created as
    /// directories.
    #[instrument(skip(self, entry, directory), fields(name = entry.name()), err)]
    pub fn extract_entry_with(
        &self,
        entry: &L::Entry,
        directory: impl AsRef<Path>,
        options: ExtractOptions,
    ) -> Result<PathBuf> {
        self.ensure_open()?;

        let relative = sanitize_entry_path(&entry.extract_name());
        let target = directory.as_ref().join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            return Ok(target);
        }

        if relative.as_os_str().is_empty() {
            return Err(Error::InvalidName {
                name: entry.name().to_owned(),
                reason: "name does not contain any usable path segment".into(),
            });
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = if options.overwrite {
            File::create(&target)?
        } else {
            File::create_new(&target)?
        };

        let copied = self.copy_entry(entry, &mut file)?;
        debug!(path = %target.display(), copied, "extracted entry");

        Ok(target)
    }

    /// Extracts every entry below `directory`, see [`Archive::extract_entry_with`]
    pub fn extract_all(&self, directory: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        self.extract_all_with(directory, ExtractOptions::default())
    }

    /// Extracts every entry below `directory`, see [`Archive::extract_entry_with`].
    ///
    /// Entries shadowed by a later entry with the same name are skipped.
    #[instrument(skip(self, directory, options), fields(directory = %directory.as_ref().display()), err)]
    pub fn extract_all_with(
        &self,
        directory: impl AsRef<Path>,
        options: ExtractOptions,
    ) -> Result<Vec<PathBuf>> {
        let current = {
            let entries = self.shared.directory.lock();
            entries
                .entries()
                .iter()
                .enumerate()
                .filter(|(i, _)| entries.is_current(*i))
                .map(|(_, e)| e.clone())
                .collect::<Vec<_>>()
        };

        current
            .iter()
            .map(|entry| self.extract_entry_with(entry, directory.as_ref(), options))
            .collect()
    }

    /// Extracts the entries named in `members` below `directory`, see [`Archive::extract_members_with`]
    pub fn extract_members<N: AsRef<str>>(
        &self,
        directory: impl AsRef<Path>,
        members: &[N],
    ) -> Result<Vec<PathBuf>> {
        self.extract_members_with(directory, members, ExtractOptions::default())
    }

    /// Extracts only the entries named in `members` below `directory`, in the given order.
    ///
    /// Names resolve like [`Archive::entry`], so the most recent entry of a shadowed name is the one written. Every
    /// name is looked up before anything is extracted, a missing one fails with [`Error::NotFound`] and leaves
    /// `directory` untouched.
    #[instrument(skip_all, fields(directory = %directory.as_ref().display(), members = members.len()), err)]
    pub fn extract_members_with<N: AsRef<str>>(
        &self,
        directory: impl AsRef<Path>,
        members: &[N],
        options: ExtractOptions,
    ) -> Result<Vec<PathBuf>> {
        let selected = members
            .iter()
            .map(|name| self.entry(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        selected
            .iter()
            .map(|entry| self.extract_entry_with(entry, directory.as_ref(), options))
            .collect()
    }
}

impl<L: Layout, S> Archive<L, S> {
    fn assemble(
        handle: S,
        mode: Mode,
        owned: bool,
        directory: Directory<L::Entry>,
        finalize: Option<Finalize<L::Entry, S>>,
    ) -> Self {
        Archive {
            shared: Arc::new(ArchiveShared {
                handle: SharedHandle::new(handle, owned),
                directory: Mutex::new(directory),
            }),
            mode,
            modified: false,
            closed: false,
            finalize,
            _layout: PhantomData,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::ClosedHandle)
        } else {
            Ok(())
        }
    }

    /// Number of entries, shadowed ones included
    pub fn len(&self) -> usize {
        self.shared.directory.lock().len()
    }

    /// Whether the archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of all entries, in directory order
    pub fn names(&self) -> Vec<String> {
        self.shared
            .directory
            .lock()
            .entries()
            .iter()
            .map(|e| e.name().to_owned())
            .collect()
    }

    /// All entries, in directory order
    pub fn entries(&self) -> Vec<L::Entry> {
        self.shared.directory.lock().entries().to_vec()
    }

    /// The entry named `name`.
    ///
    /// When several entries share a name, the most recently written one is returned.
    pub fn entry(&self, name: &str) -> Result<L::Entry> {
        self.shared
            .directory
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(FileNotFoundError::Name(name.to_owned())))
    }

    /// Mode the archive was opened in
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Where the next entry's data, or the final directory, will be written
    pub fn append_cursor(&self) -> u64 {
        self.shared.directory.lock().append_cursor()
    }

    /// Whether an entry writer is currently open
    pub fn is_writing(&self) -> bool {
        self.shared.handle.is_writing()
    }

    /// Whether [`Archive::close`] has completed
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Writes the final directory if the archive was modified, and releases the handle.
    ///
    /// Fails with [`Error::AlreadyWriting`] while an entry writer is open, in which case the archive stays open.
    /// Closing an already closed archive does nothing.
    #[instrument(skip(self), fields(format = L::FORMAT, mode = %self.mode), err)]
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        if self.shared.handle.is_writing() {
            return Err(Error::AlreadyWriting);
        }

        self.closed = true;

        let result = match self.finalize {
            Some(finalize) if self.mode.is_writable() && self.modified => {
                let directory = self.shared.directory.lock();
                debug!(
                    entries = directory.len(),
                    append_cursor = directory.append_cursor(),
                    "writing directory"
                );

                self.shared.handle.with(|inner| {
                    finalize(inner, directory.append_cursor(), directory.entries())
                })
            }
            _ => Ok(()),
        };

        self.shared.handle.release();
        result
    }
}

impl<L: Layout, S> Drop for Archive<L, S> {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                warn!("failed to close {} archive: {e}", L::FORMAT);
            }
        }
    }
}
