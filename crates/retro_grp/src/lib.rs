//! This library handles reading from and creating **GRP** files used by *Duke Nukem 3D* and other Build engine games.
//!
//! # GRP Archive Format Documentation
//!
//! A GRP ("group") file is the simplest of the archive formats: a header, a directory of names and sizes, then the
//! data of every file in directory order. There are no offsets on disk; each file starts where the previous one
//! ends. GRP files are identified with the `.grp` extension.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 12 bytes: `KenSilverman`                                   |
//! | 0x000C         | Entry Count            | 4 bytes: Number of files in the archive                    |
//!
//! ### Directory
//!
//! The directory immediately follows the header, one 16 byte record per file:
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Name                   | 12 bytes: NUL padded ASCII, usually an 8.3 DOS name        |
//! | 0x000C         | Size                   | 4 bytes: Size of the file data                             |
//!
//! ### Payload
//!
//! File data starts at `16 + 16 * count`. The offset of a file is the payload start plus the sizes of every file
//! before it. An empty archive is only its header, with the payload starting at `0x0010`.
//!
//! Since the directory sits in front of the data, adding files to an archive grows the directory into the payload.
//! The payload is moved back by the size of the new records when the archive is closed.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.grp`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Compression**: None
//!

pub mod layout;
pub mod types;

pub use retro_archive::error;
pub use retro_archive::Mode;

pub use layout::GrpLayout;
pub use types::{GrpEntry, GrpHeader, GrpRecord};

use std::io::{Read, Seek};

use retro_archive::{Archive, Layout};

/// A Build engine GRP archive
pub type GrpArchive<S> = Archive<GrpLayout, S>;

/// Quickly checks the magic number of a GRP archive, rewinding `reader` afterwards
pub fn is_grpfile<R: Read + Seek>(reader: &mut R) -> error::Result<bool> {
    GrpLayout::probe(reader)
}
