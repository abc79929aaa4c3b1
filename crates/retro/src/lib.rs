//! Command line front end for the `retro_*` archive crates.
//!
//! Every command works on any supported format. The format of an existing archive is detected from its magic
//! number, a new archive takes it from its extension or from `--format`.

pub mod commands;
