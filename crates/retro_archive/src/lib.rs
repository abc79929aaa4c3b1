//! This library is the shared engine behind the **archive** formats used by several 1990s and 2000s game engines.
//!
//! # Archive Engine Documentation
//!
//! Every container format handled by the `retro_*` crates (Quake `PACK`, `WAD2`/`WAD3`, Duke Nukem 3D `GRP`, ...)
//! stores a set of named entries inside a single file. Each entry is addressed by an offset and a size into one
//! contiguous payload region. This crate provides everything those formats have in common, and leaves the on-disk
//! header and directory layout to a [`Layout`] implementation supplied by each format crate.
//!
//! ## File Structure
//!
//! Whatever the format, an archive always decomposes into the same three parts:
//!
//! | Part        | Description                                                                      |
//! |-------------|----------------------------------------------------------------------------------|
//! | Header      | Fixed size. Starts with a magic number, then counts and/or a directory pointer.  |
//! | Directory   | A table of records: name, offset, size, plus format specific fields.             |
//! | Payload     | The raw bytes of each entry, stored back to back.                                |
//!
//! Two placements occur in practice:
//!
//! - **Back-loaded**: header at the front with a pointer field, payload next, the directory written once at the end
//!   and the pointer patched when the archive is closed.
//! - **Front-loaded**: header and directory at the front, payload after them. The directory is rewritten in place
//!   when the archive is closed.
//!
//! ## Lifecycles
//!
//! An [`Archive`] is opened in one of three [`Mode`]s:
//!
//! - [`Mode::Read`]: the directory is parsed, entries are read through [`read::EntryReader`] streams.
//! - [`Mode::Write`]: a placeholder header is written, entries are added through [`write::EntryWriter`] streams and the
//!   final directory is written by [`Archive::close`].
//! - [`Mode::Append`]: like read, but new entries are written after the existing payload and the directory is
//!   rewritten on close.
//!
//! Any number of readers may be open on the same archive at once, they share the underlying handle behind a lock. At
//! most one writer may be open at a time.
//!
//! ## Additional Information
//!
//! - **Compression**: some formats declare a compression field per entry, it is carried through but never decoded.
//! - **Extraction**: entry names are sanitized before being joined to a destination directory, see
//!   [`sanitize::sanitize_entry_path`].
//!

pub mod archive;
pub mod directory;
pub mod error;
pub mod file;
pub mod layout;
pub mod read;
pub mod sanitize;
pub(crate) mod shared;
pub mod types;
pub mod write;

pub use archive::{Archive, ExtractOptions};
pub use file::{BinaryFile, BinaryFormat};
pub use layout::Layout;
pub use read::EntryReader;
pub use types::{ArchiveEntry, Mode};
pub use write::EntryWriter;

#[cfg(test)]
pub(crate) mod testing;
