use clap::ValueEnum;
use miette::{miette, Context, IntoDiagnostic, Result};
use retro_archive::Layout;
use retro_grp::GrpLayout;
use retro_hxrg::HxrgLayout;
use retro_pak::{Hrot, PakLayout, Quake};
use retro_wad::{Wad2, Wad3, WadLayout};
use std::{
    fmt::Display,
    fs::File,
    io::{Read, Seek},
    path::Path,
};
use tracing::debug;

/// Archive formats understood by the command line
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Quake and Quake II `PACK`
    Pak,
    /// HROT `PACK` with long names
    Hrot,
    /// Quake `WAD2`
    Wad2,
    /// Half-Life `WAD3`
    Wad3,
    /// Build engine `KenSilverman` group file
    Grp,
    /// Devil Daggers resource group
    Hxrg,
}

/// A command that can run against any archive layout
pub trait LayoutCommand {
    fn run<L: Layout>(&self, format: Format) -> Result<()>;
}

impl Format {
    pub const ALL: [Format; 6] = [
        Format::Pak,
        Format::Hrot,
        Format::Wad2,
        Format::Wad3,
        Format::Grp,
        Format::Hxrg,
    ];

    /// Checks the magic number of `reader` against this format
    pub fn probe<R: Read + Seek>(self, reader: &mut R) -> Result<bool> {
        let matched = match self {
            Format::Pak => PakLayout::<Quake>::probe(reader)?,
            Format::Hrot => PakLayout::<Hrot>::probe(reader)?,
            Format::Wad2 => WadLayout::<Wad2>::probe(reader)?,
            Format::Wad3 => WadLayout::<Wad3>::probe(reader)?,
            Format::Grp => GrpLayout::probe(reader)?,
            Format::Hxrg => HxrgLayout::probe(reader)?,
        };
        Ok(matched)
    }

    /// Finds the format of the archive at `path` from its magic number
    pub fn detect(path: &Path) -> Result<Format> {
        let mut file = File::open(path)
            .into_diagnostic()
            .context(format!("path: {}", path.display()))?;

        for format in Self::ALL {
            if format.probe(&mut file)? {
                debug!(%format, "detected format of {}", path.display());
                return Ok(format);
            }
        }

        Err(miette!("{} is not a supported archive", path.display()))
    }

    /// Guesses the format of a new archive from its extension.
    ///
    /// `.wad` is left out, since it could be either flavour. Resource groups have no extension at all.
    pub fn from_extension(path: &Path) -> Option<Format> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pak" => Some(Format::Pak),
            "grp" => Some(Format::Grp),
            _ => None,
        }
    }

    /// Picks the format to use for `path`: the one asked for, the detected one for an existing archive, or the
    /// one its extension suggests
    pub fn resolve(requested: Option<Format>, path: &Path) -> Result<Format> {
        if let Some(format) = requested {
            return Ok(format);
        }

        if path.is_file() {
            return Self::detect(path);
        }

        Self::from_extension(path).ok_or_else(|| {
            miette!(
                "unable to guess the format of {}, pass --format",
                path.display()
            )
        })
    }

    /// Runs `command` with the layout of this format
    pub fn run(self, command: &impl LayoutCommand) -> Result<()> {
        match self {
            Format::Pak => command.run::<PakLayout<Quake>>(self),
            Format::Hrot => command.run::<PakLayout<Hrot>>(self),
            Format::Wad2 => command.run::<WadLayout<Wad2>>(self),
            Format::Wad3 => command.run::<WadLayout<Wad3>>(self),
            Format::Grp => command.run::<GrpLayout>(self),
            Format::Hxrg => command.run::<HxrgLayout>(self),
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Format::Pak => "pak",
            Format::Hrot => "hrot",
            Format::Wad2 => "wad2",
            Format::Wad3 => "wad3",
            Format::Grp => "grp",
            Format::Hxrg => "hxrg",
        };
        f.write_str(name)
    }
}
