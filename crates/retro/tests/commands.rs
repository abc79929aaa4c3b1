use std::fs::File;

use clap::Parser;
use miette::IntoDiagnostic;
use pretty_assertions::assert_eq;
use retro::commands::Commands;
use retro_grp::GrpArchive;
use retro_hxrg::HxrgArchive;
use retro_pak::PakArchive;
use retro_wad::{Mode, Wad3Archive};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn retro(args: &[&str]) -> miette::Result<()> {
    let cli = Cli::try_parse_from(std::iter::once("retro").chain(args.iter().copied()))
        .into_diagnostic()?;
    cli.command.handle()
}

#[test]
fn add_directory_then_extract() -> miette::Result<()> {
    let workspace = tempfile::tempdir().into_diagnostic()?;
    let root = workspace.path();

    let source = root.join("id1");
    std::fs::create_dir_all(source.join("maps")).into_diagnostic()?;
    std::fs::write(source.join("autoexec.cfg"), b"bind q quit\n").into_diagnostic()?;
    std::fs::write(source.join("maps").join("e1m1.bsp"), [0x1D; 64]).into_diagnostic()?;

    let pak = root.join("pak1.pak");
    let pak_arg = pak.to_string_lossy().into_owned();
    retro(&["add", &pak_arg, &source.to_string_lossy()])?;

    let readme = root.join("readme.txt");
    std::fs::write(&readme, b"hello").into_diagnostic()?;
    retro(&["add", &pak_arg, &readme.to_string_lossy()])?;

    let archive = PakArchive::<File>::open(&pak, Mode::Read)?;
    assert_eq!(
        archive.names(),
        vec!["autoexec.cfg", "maps/e1m1.bsp", "readme.txt"]
    );
    drop(archive);

    retro(&["list", &pak_arg])?;

    let out = root.join("out");
    let out_arg = out.to_string_lossy().into_owned();
    retro(&["extract", &pak_arg, "-d", &out_arg])?;
    assert_eq!(
        std::fs::read(out.join("maps").join("e1m1.bsp")).into_diagnostic()?,
        vec![0x1D; 64]
    );

    assert!(retro(&["extract", &pak_arg, "-d", &out_arg]).is_err());
    retro(&["extract", &pak_arg, "-d", &out_arg, "--overwrite"])?;

    Ok(())
}

#[test]
fn format_comes_from_flag_or_magic() -> miette::Result<()> {
    let workspace = tempfile::tempdir().into_diagnostic()?;
    let root = workspace.path();

    let lump = root.join("FONTA");
    std::fs::write(&lump, [0x11; 40]).into_diagnostic()?;
    let lump_arg = lump.to_string_lossy().into_owned();

    let wad = root.join("fonts.wad");
    let wad_arg = wad.to_string_lossy().into_owned();
    assert!(retro(&["add", &wad_arg, &lump_arg]).is_err());
    retro(&["add", "--format", "wad3", &wad_arg, &lump_arg])?;

    let archive = Wad3Archive::<File>::open(&wad, Mode::Read)?;
    assert_eq!(archive.read("FONTA")?, vec![0x11; 40]);
    drop(archive);

    let grp = root.join("GAME.GRP");
    let grp_arg = grp.to_string_lossy().into_owned();
    retro(&["add", &grp_arg, &lump_arg])?;
    retro(&["add", &grp_arg, &wad_arg])?;

    let archive = GrpArchive::<File>::open(&grp, Mode::Read)?;
    assert_eq!(archive.names(), vec!["FONTA", "fonts.wad"]);

    let out = root.join("out");
    retro(&["extract", &grp_arg, "-d", &out.to_string_lossy()])?;
    assert_eq!(
        std::fs::read(out.join("FONTA")).into_diagnostic()?,
        vec![0x11; 40]
    );

    Ok(())
}

#[test]
fn extract_named_members() -> miette::Result<()> {
    let workspace = tempfile::tempdir().into_diagnostic()?;
    let root = workspace.path();

    let names = ["boid", "hand", "skull"];
    for name in names {
        std::fs::write(root.join(name), name).into_diagnostic()?;
    }
    let sources = names.map(|name| root.join(name));

    let group = root.join("dd");
    let group_arg = group.to_string_lossy().into_owned();
    let source_args = sources
        .iter()
        .map(|source| source.to_string_lossy().into_owned())
        .collect::<Vec<_>>();

    assert!(retro(&["add", &group_arg, &source_args[0]]).is_err());
    retro(&["add", "-F", "hxrg", &group_arg, &source_args[0]])?;
    retro(&["add", &group_arg, &source_args[1], &source_args[2]])?;

    let archive = HxrgArchive::<File>::open(&group, Mode::Read)?;
    assert_eq!(archive.names(), vec!["boid", "hand", "skull"]);
    drop(archive);

    let out = root.join("out");
    let out_arg = out.to_string_lossy().into_owned();
    retro(&["extract", &group_arg, "skull", "boid", "-d", &out_arg])?;
    assert_eq!(std::fs::read(out.join("skull")).into_diagnostic()?, b"skull");
    assert_eq!(std::fs::read(out.join("boid")).into_diagnostic()?, b"boid");
    assert!(!out.join("hand").exists());

    assert!(retro(&["extract", &group_arg, "dagger", "-d", &out_arg]).is_err());

    Ok(())
}
