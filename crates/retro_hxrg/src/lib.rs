//! This library handles reading from and creating the **resource group** files used by *Devil Daggers*.
//!
//! # Resource Group Format Documentation
//!
//! A resource group bundles the meshes, textures, shaders, sounds and materials of the game. The files shipped with
//! the game (`dd`, `core`, `audio`) have no extension and are recognized by their magic number alone. Like a GRP
//! file, the directory sits in front of the data, but each record carries an explicit absolute offset.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 8 bytes: `:hx:rg:` followed by `0x01`                      |
//! | 0x0008         | Directory Size         | 4 bytes: Size of the directory in bytes                    |
//!
//! ### Directory
//!
//! The directory immediately follows the header. It is a run of variable size records, closed by a single `0x00`
//! byte:
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Type                   | 2 bytes: Kind of resource, see [`ResourceType`]            |
//! | 0x0002         | Name                   | NUL terminated ASCII                                       |
//! | +0x0000        | Offset                 | 4 bytes: Offset to the data from the start of file         |
//! | +0x0004        | Size                   | 4 bytes: Size of the data                                  |
//! | +0x0008        | Date Time              | 4 bytes: Unix timestamp of the last modification           |
//!
//! Parsing stops once the bytes left in the directory can't hold another record, or when they are zero padding.
//!
//! ### Payload
//!
//! Resource data starts at `12 + directory size`. An empty group holds only the header and the terminator, with the
//! payload starting at `0x000D`. When resources are added the directory grows into the payload, which is moved back
//! and has its offsets adjusted when the group is closed.
//!
//! ## Additional Information
//!
//! - **File Extension**: None
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Compression**: None
//! - **Extraction**: Names carry no extension, one is added from the resource type, see
//!   [`ResourceType::extension`]
//!

pub mod layout;
pub mod types;

pub use retro_archive::error;
pub use retro_archive::Mode;

pub use layout::HxrgLayout;
pub use types::{HxrgEntry, HxrgHeader, HxrgRecord, ResourceType};

use std::io::{Read, Seek};

use retro_archive::{Archive, Layout};

/// A Devil Daggers resource group
pub type HxrgArchive<S> = Archive<HxrgLayout, S>;

/// Quickly checks the magic number of a resource group, rewinding `reader` afterwards
pub fn is_hxrgfile<R: Read + Seek>(reader: &mut R) -> error::Result<bool> {
    HxrgLayout::probe(reader)
}
