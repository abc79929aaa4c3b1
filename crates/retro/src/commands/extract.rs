use clap::Args;
use miette::{Context, Result};
use retro_archive::{Archive, ExtractOptions, Layout, Mode};
use std::{fs::File, path::PathBuf};
use tracing::info;

use super::{Format, LayoutCommand};

#[derive(Args)]
pub struct ExtractArgs {
    /// An input archive
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Names of the entries to extract, every entry when omitted
    #[arg(value_name = "MEMBER")]
    members: Vec<String>,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting files in the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    /// Format of the archive, detected from its magic number when omitted
    #[arg(short = 'F', long, value_enum)]
    format: Option<Format>,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        Format::resolve(self.format, &self.file)?.run(self)
    }
}

impl LayoutCommand for ExtractArgs {
    fn run<L: Layout>(&self, format: Format) -> Result<()> {
        let archive = Archive::<L, File>::open(&self.file, Mode::Read)
            .context(format!("opening {} as {format}", self.file.display()))?;

        let options = ExtractOptions::builder()
            .overwrite(self.overwrite)
            .build();

        let written = if self.members.is_empty() {
            archive.extract_all_with(&self.directory, options)
        } else {
            archive.extract_members_with(&self.directory, &self.members, options)
        }
        .context(format!("extracting into {}", self.directory.display()))?;

        for path in &written {
            info!("wrote {}", path.display());
        }
        info!(
            "extracted {} files from {}",
            written.len(),
            self.file.display()
        );

        Ok(())
    }
}
