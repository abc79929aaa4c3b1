use clap::Args;
use miette::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use retro_archive::{Archive, ArchiveEntry, Layout, Mode};
use std::{fs::File, path::PathBuf};

use super::{Format, LayoutCommand};

#[derive(Args)]
pub struct ListArgs {
    /// An input archive
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Format of the archive, detected from its magic number when omitted
    #[arg(short = 'F', long, value_enum)]
    format: Option<Format>,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        Format::resolve(self.format, &self.file)?.run(self)
    }
}

impl LayoutCommand for ListArgs {
    fn run<L: Layout>(&self, format: Format) -> Result<()> {
        let archive = Archive::<L, File>::open(&self.file, Mode::Read)
            .context(format!("opening {} as {format}", self.file.display()))?;

        let entries = archive.entries();
        let width = entries
            .iter()
            .map(|e| e.name().len())
            .max()
            .unwrap_or(0)
            .max("name".len());

        println!(
            "{}",
            format!("{:<width$}  {:>10}  {:>10}", "name", "offset", "size")
                .if_supports_color(Stream::Stdout, |t| t.bold())
        );
        for line in table(&entries, width) {
            println!("{line}");
        }
        println!(
            "{}",
            format!("{} files, {format}", entries.len())
                .if_supports_color(Stream::Stdout, |t| t.dimmed())
        );

        Ok(())
    }
}

/// One line per entry: name, offset and size
pub fn table<E: ArchiveEntry>(entries: &[E], width: usize) -> Vec<String> {
    entries
        .iter()
        .map(|e| format!("{:<width$}  {:>10}  {:>10}", e.name(), e.offset(), e.size()))
        .collect()
}
