//! This library handles reading from and creating **PAK** files used by *Quake*, *Quake II* and *HROT*.
//!
//! # PAK Archive Format Documentation
//!
//! A PAK file is a flat, uncompressed archive. Entries are stored back to back after a small header, and the
//! directory describing them is written last, at the end of the file. PAK files are identified with the `.pak`
//! extension.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: `PACK` (Quake, Quake II) or `HROT` (HROT)          |
//! | 0x0004         | Directory Offset       | 4 bytes: Offset to the directory from the start of file    |
//! | 0x0008         | Directory Size         | 4 bytes: Size of the directory in bytes                    |
//!
//! ### Payload
//!
//! The data of every entry follows the header, with no padding or alignment. An empty archive has its directory
//! right after the header, at offset `0x000C`.
//!
//! ### Directory
//!
//! The directory is an array of fixed size records. The number of entries is the directory size divided by the
//! record size.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Name                   | 56 bytes (`PACK`) or 120 bytes (`HROT`): NUL padded ASCII  |
//! | 0x0038/0x0078  | Offset                 | 4 bytes: Offset to the entry data from the start of file   |
//! | 0x003C/0x007C  | Size                   | 4 bytes: Size of the entry data                            |
//!
//! Names are paths using `/` as a separator, such as `maps/e1m1.bsp` or `sound/player/pain1.wav`.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.pak`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Compression**: None
//!

pub mod layout;
pub mod types;

pub use retro_archive::error;
pub use retro_archive::Mode;

pub use layout::{Hrot, PakLayout, PakVariant, Quake};
pub use types::{PakEntry, PakHeader};

use std::io::{Read, Seek};

use retro_archive::{Archive, Layout};

/// A Quake or Quake II `PACK` archive
pub type PakArchive<S> = Archive<PakLayout<Quake>, S>;

/// An HROT archive
pub type HrotArchive<S> = Archive<PakLayout<Hrot>, S>;

/// Quickly checks the magic number of a Quake `PACK` archive, rewinding `reader` afterwards
pub fn is_pakfile<R: Read + Seek>(reader: &mut R) -> error::Result<bool> {
    PakLayout::<Quake>::probe(reader)
}

/// Quickly checks the magic number of an HROT archive, rewinding `reader` afterwards
pub fn is_hrot_pakfile<R: Read + Seek>(reader: &mut R) -> error::Result<bool> {
    PakLayout::<Hrot>::probe(reader)
}
