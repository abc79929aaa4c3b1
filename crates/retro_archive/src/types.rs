//! Base types shared by every archive format.

use std::borrow::Cow;
use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use crate::error::{Error, Result};

/// How an archive or a single-object file is opened
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Read an existing file
    #[default]
    Read,

    /// Truncate and write a new file
    Write,

    /// Add to an existing file
    Append,
}

impl Mode {
    /// Whether this mode ends up rewriting the file on close
    pub const fn is_writable(self) -> bool {
        matches!(self, Mode::Write | Mode::Append)
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" => Ok(Mode::Read),
            "w" => Ok(Mode::Write),
            "a" => Ok(Mode::Append),
            other => Err(Error::CustomError(format!(
                "invalid mode {other:?}, expected 'r', 'w' or 'a'"
            ))),
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Read => "r",
            Mode::Write => "w",
            Mode::Append => "a",
        })
    }
}

/// A single named member of an archive directory.
///
/// Formats extend the base `{name, offset, size}` triple with their own fields. Once an entry has been committed to
/// a directory it is never changed again.
pub trait ArchiveEntry: Clone + Debug {
    /// Name of the entry as stored in the directory
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`/etc/shadow`), or break out of the
    /// current directory (`../runtime`). Use [`crate::sanitize::sanitize_entry_path`]
    /// or [`crate::Archive::extract`] instead.
    fn name(&self) -> &str;

    /// Offset of the entry data from the start of the file
    fn offset(&self) -> u64;

    /// Size of the entry data in bytes
    fn size(&self) -> u64;

    /// Records where the data of a freshly written entry ended up
    fn set_placement(&mut self, offset: u64, size: u64);

    /// Whether this entry describes a directory rather than a file
    fn is_dir(&self) -> bool {
        self.name().ends_with('/')
    }

    /// Name the entry is extracted under, before sanitizing.
    ///
    /// Formats that keep the file type outside of the name override this to add an extension.
    fn extract_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.name())
    }
}

/// Decodes a fixed width, NUL padded name field.
///
/// Everything after the first NUL is ignored. Bytes that are not valid UTF-8 are replaced.
pub fn decode_name(raw: &[u8]) -> String {
    let end = raw.iter().position(|&c| c == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Encodes `name` into a fixed width, NUL padded field of `width` bytes.
///
/// A name filling the whole field is stored without a terminator.
pub fn encode_name(name: &str, width: usize) -> Result<Vec<u8>> {
    check_name(name, width)?;

    let mut field = vec![0u8; width];
    field[..name.len()].copy_from_slice(name.as_bytes());
    Ok(field)
}

/// Validates that `name` fits in a fixed width ASCII field of `width` bytes.
pub fn check_name(name: &str, width: usize) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName {
            name: name.to_owned(),
            reason: "name is empty".into(),
        });
    }

    if !name.is_ascii() {
        return Err(Error::InvalidName {
            name: name.to_owned(),
            reason: "name must be ASCII".into(),
        });
    }

    if name.len() > width {
        return Err(Error::InvalidName {
            name: name.to_owned(),
            reason: format!("name must be {width} characters or less"),
        });
    }

    Ok(())
}

/// Narrows an offset or size to the 32 bit fields used by most directory records.
pub fn narrow(name: &str, value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::EntryTooLarge {
        name: name.to_owned(),
        size: value,
    })
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{decode_name, encode_name, Mode};
    use crate::error::{Error, Result};

    #[test]
    fn parse_mode() -> Result<()> {
        assert_eq!("r".parse::<Mode>()?, Mode::Read);
        assert_eq!("w".parse::<Mode>()?, Mode::Write);
        assert_eq!("a".parse::<Mode>()?, Mode::Append);
        assert!("x".parse::<Mode>().is_err());
        assert_eq!(Mode::Append.to_string(), "a");

        Ok(())
    }

    #[test]
    fn decode_padded_name() {
        assert_eq!(decode_name(b"maps/e1m1.bsp\0\0\0"), "maps/e1m1.bsp");
        assert_eq!(decode_name(b"full"), "full");
        assert_eq!(decode_name(b"a\0garbage"), "a");
    }

    #[test]
    fn encode_padded_name() -> Result<()> {
        assert_eq!(encode_name("abc", 6)?, b"abc\0\0\0");
        assert_eq!(encode_name("abcdef", 6)?, b"abcdef");

        assert!(matches!(
            encode_name("abcdefg", 6),
            Err(Error::InvalidName { .. })
        ));
        assert!(matches!(
            encode_name("caf\u{e9}", 6),
            Err(Error::InvalidName { .. })
        ));
        assert!(matches!(encode_name("", 6), Err(Error::InvalidName { .. })));

        Ok(())
    }
}
