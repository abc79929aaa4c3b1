use clap::Args;
use miette::{miette, Context, IntoDiagnostic, Result};
use retro_archive::{sanitize::archive_name_for, Archive, Layout, Mode};
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use tracing::info;
use walkdir::WalkDir;

use super::{Format, LayoutCommand};

#[derive(Args)]
pub struct AddArgs {
    /// The target archive, appended to when it already exists
    #[arg(value_name = "ARCHIVE")]
    file: PathBuf,

    /// Files to add, directories are added recursively with names relative to them
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// Format of the archive, detected from its magic number or extension when omitted
    #[arg(short = 'F', long, value_enum)]
    format: Option<Format>,
}

impl AddArgs {
    pub fn handle(&self) -> Result<()> {
        Format::resolve(self.format, &self.file)?.run(self)
    }

    /// Pairs every file to add with its entry name
    fn sources(&self) -> Result<Vec<(PathBuf, String)>> {
        let mut sources = Vec::new();

        for path in &self.paths {
            if path.is_dir() {
                let files = WalkDir::new(path)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| !e.file_type().is_dir());

                for file in files {
                    let name = file.path().strip_prefix(path).into_diagnostic()?;
                    sources.push((file.path().to_path_buf(), archive_name_for(name)));
                }
            } else {
                let name = path
                    .file_name()
                    .map(Path::new)
                    .ok_or_else(|| miette!("{} is not a file", path.display()))?;
                sources.push((path.clone(), archive_name_for(name)));
            }
        }

        if sources.is_empty() {
            return Err(miette!("nothing to add"));
        }

        Ok(sources)
    }
}

impl LayoutCommand for AddArgs {
    fn run<L: Layout>(&self, format: Format) -> Result<()> {
        let sources = self.sources()?;

        let mode = if self.file.exists() {
            Mode::Append
        } else {
            Mode::Write
        };
        info!("opening {} as {format} ({mode})", self.file.display());

        let mut archive = Archive::<L, File>::open(&self.file, mode)
            .context(format!("opening {}", self.file.display()))?;

        for (path, name) in &sources {
            info!("adding {name}");
            archive
                .write(path, Some(name.as_str()))
                .context(format!("adding {}", path.display()))?;
        }

        archive
            .close()
            .context(format!("finalizing {}", self.file.display()))?;

        Ok(())
    }
}
