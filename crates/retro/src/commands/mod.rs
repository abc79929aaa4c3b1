pub mod add;
pub mod extract;
pub mod format;
pub mod list;

pub use format::{Format, LayoutCommand};

#[derive(clap::Subcommand)]
pub enum Commands {
    /// List the files of an archive
    List(list::ListArgs),
    /// Extract an archive into a directory
    Extract(extract::ExtractArgs),
    /// Add files and directories to an archive, creating it if needed
    Add(add::AddArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::List(list) => list.handle(),
            Commands::Extract(extract) => extract.handle(),
            Commands::Add(add) => add.handle(),
        }
    }
}
