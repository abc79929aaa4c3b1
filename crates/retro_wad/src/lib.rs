//! This library handles reading from and creating **WAD2** and **WAD3** files used by *Quake* and *Half-Life*.
//!
//! # WAD Archive Format Documentation
//!
//! WAD files hold the textures, palettes and status bar pictures of a game as named "lumps". *Quake* uses the
//! `WAD2` flavour (`gfx.wad`), *Half-Life* the `WAD3` one (`halflife.wad`). Both share the same layout and only
//! differ in their magic number and in the meaning of the lump type field.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: `WAD2` or `WAD3`                                  |
//! | 0x0004         | Lump Count             | 4 bytes: Number of entries in the directory                |
//! | 0x0008         | Directory Offset       | 4 bytes: Offset to the directory from the start of file    |
//!
//! ### Payload
//!
//! Lump data follows the header with no padding. An empty archive has its directory at offset `0x000C`.
//!
//! ### Directory
//!
//! The directory is written last and holds one 32 byte record per lump:
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Offset                 | 4 bytes: Offset to the lump data from the start of file    |
//! | 0x0004         | Disk Size              | 4 bytes: Size of the lump data as stored                   |
//! | 0x0008         | Size                   | 4 bytes: Size of the lump data once decompressed           |
//! | 0x000C         | Type                   | 1 byte: Lump type, see [`types::quake`] and [`types::half_life`] |
//! | 0x000D         | Compression            | 1 byte: `0` for none, `1` for LZSS                         |
//! | 0x000E         | Padding                | 2 bytes                                                    |
//! | 0x0010         | Name                   | 16 bytes: NUL padded ASCII                                 |
//!
//! ## Additional Information
//!
//! - **File Extension**: `.wad`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Compression**: Declared per lump, but not used by any shipped file. It is carried through and never decoded,
//!   so reading a compressed lump returns its stored bytes.
//!

pub mod layout;
pub mod types;

pub use retro_archive::error;
pub use retro_archive::Mode;

pub use layout::{Wad2, Wad3, WadLayout, WadVariant};
pub use types::{Compression, LumpType, WadEntry, WadHeader, WadRecord};

use std::io::{Read, Seek};

use retro_archive::{Archive, Layout};

/// A *Quake* `WAD2` archive
pub type Wad2Archive<S> = Archive<WadLayout<Wad2>, S>;

/// A *Half-Life* `WAD3` archive
pub type Wad3Archive<S> = Archive<WadLayout<Wad3>, S>;

/// Quickly checks the magic number of a `WAD2` archive, rewinding `reader` afterwards
pub fn is_wad2file<R: Read + Seek>(reader: &mut R) -> error::Result<bool> {
    WadLayout::<Wad2>::probe(reader)
}

/// Quickly checks the magic number of a `WAD3` archive, rewinding `reader` afterwards
pub fn is_wad3file<R: Read + Seek>(reader: &mut R) -> error::Result<bool> {
    WadLayout::<Wad3>::probe(reader)
}
