//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// file is not a valid archive of the requested format
    #[error("file is not a valid {format} archive: {reason}")]
    #[diagnostic(help("check the magic number at the start of the file"))]
    BadFormat {
        /// Name of the format that was expected
        format: &'static str,
        /// What did not match
        reason: String,
    },

    /// unable to find requested file
    #[error("unable to find requested file")]
    NotFound(#[from] FileNotFoundError),

    /// a write stream is already open on this archive
    #[error("a write stream is already open on this archive")]
    #[diagnostic(help("close the open entry writer first"))]
    AlreadyWriting,

    /// the archive has already been closed
    #[error("the archive has already been closed")]
    ClosedHandle,

    /// the archive was opened for reading
    #[error("the archive was opened for reading")]
    ReadOnly,

    /// entry {name} is shorter than its declared size
    #[error("entry {name} is truncated: expected {expected} bytes, got {actual}")]
    UnexpectedEof {
        /// Name of the entry being read
        name: String,
        /// Size declared in the directory
        expected: u64,
        /// Bytes actually available
        actual: u64,
    },

    /// name can't be stored by this format
    #[error("invalid entry name {name:?}: {reason}")]
    InvalidName {
        /// The offending name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// entry does not fit in the format's offset/size fields
    #[error("entry {name} does not fit in the archive ({size} bytes)")]
    EntryTooLarge {
        /// Name of the entry
        name: String,
        /// Offending offset or size
        size: u64,
    },

    /// expected a regular file
    #[error("expected a file, got {0}")]
    NotAFile(PathBuf),

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

impl Error {
    /// Maps a magic mismatch reported by [`binrw`] to [`Error::BadFormat`], everything else is passed through.
    pub fn from_binrw(format: &'static str, error: binrw::Error) -> Self {
        match error {
            binrw::Error::BadMagic { found, .. } => Error::BadFormat {
                format,
                reason: format!("bad magic number {found:?}"),
            },
            binrw::Error::Io(e) => e.into(),
            e => Error::BinRWError(e),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Unwraps an [`Error`] that was carried through an I/O stream, wraps anything else in [`Error::IOError`]
    fn from(error: std::io::Error) -> Self {
        if !error.get_ref().is_some_and(|inner| inner.is::<Error>()) {
            return Error::IOError(error);
        }

        match error.into_inner().map(|inner| inner.downcast::<Error>()) {
            Some(Ok(inner)) => *inner,
            _ => Error::CustomError("stream error lost its cause".into()),
        }
    }
}

impl From<Error> for std::io::Error {
    /// Lets entry streams report archive errors through [`std::io::Read`] and [`std::io::Write`]
    fn from(error: Error) -> Self {
        match error {
            Error::IOError(e) => e,
            e => std::io::Error::new(std::io::ErrorKind::Other, e),
        }
    }
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
#[error("unable to find requested file")]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
