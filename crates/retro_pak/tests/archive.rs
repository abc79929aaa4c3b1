use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use pretty_assertions::assert_eq;
use retro_pak::{error::Error, is_hrot_pakfile, is_pakfile, Mode, PakArchive};
use tracing::info;
use tracing_test::traced_test;

#[traced_test]
#[test]
fn create_append_and_extract() -> Result<(), Error> {
    let workspace = tempfile::tempdir()?;
    let path = workspace.path().join("pak0.pak");

    let mut pak = PakArchive::<File>::open(&path, Mode::Write)?;
    pak.write_bytes("a.txt", b"hello")?;
    {
        let mut writer = pak.create("maps/e1m1.bsp")?;
        writer.write_all(&[0x1D; 1000])?;
        writer.close()?;
    }
    pak.close()?;

    let mut file = File::open(&path)?;
    assert!(is_pakfile(&mut file)?);
    assert!(!is_hrot_pakfile(&mut file)?);

    let mut pak = PakArchive::<File>::open(&path, Mode::Append)?;
    assert_eq!(pak.len(), 2);
    pak.write_bytes("progs/player.mdl", b"IDPO")?;
    pak.close()?;

    let pak = PakArchive::<File>::open(&path, Mode::Read)?;
    info!("reopened {:?}", pak);
    assert_eq!(
        pak.names(),
        vec!["a.txt", "maps/e1m1.bsp", "progs/player.mdl"]
    );
    assert_eq!(pak.read("a.txt")?, b"hello");
    assert_eq!(pak.entry("a.txt")?.size, 5);
    assert_eq!(pak.read("maps/e1m1.bsp")?, vec![0x1D; 1000]);

    let destination = workspace.path().join("out");
    let written = pak.extract_all(&destination)?;
    assert_eq!(written.len(), 3);
    assert_eq!(
        std::fs::read(destination.join("progs").join("player.mdl"))?,
        b"IDPO"
    );

    Ok(())
}

#[test]
fn caller_handle_is_not_closed() -> Result<(), Error> {
    let mut file = tempfile::tempfile()?;

    let mut pak = PakArchive::new(&mut file, Mode::Write)?;
    pak.write_bytes("gfx/palette.lmp", &[0u8; 768])?;
    pak.close()?;
    drop(pak);

    file.seek(SeekFrom::Start(0))?;
    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)?;
    assert_eq!(&magic, b"PACK");

    let pak = PakArchive::new(&mut file, Mode::Read)?;
    let mut reader = pak.by_name("gfx/palette.lmp")?;
    assert_eq!(reader.size(), 768);
    reader.seek(SeekFrom::End(-8))?;
    let mut tail = Vec::new();
    reader.read_to_end(&mut tail)?;
    assert_eq!(tail, vec![0u8; 8]);

    Ok(())
}

#[test]
fn not_a_pak() -> Result<(), Error> {
    let mut file = tempfile::tempfile()?;
    file.write_all(b"IWAD\x00\x00\x00\x00\x0C\x00\x00\x00")?;

    assert!(!is_pakfile(&mut file)?);
    assert!(matches!(
        PakArchive::new(&mut file, Mode::Read),
        Err(Error::BadFormat { .. })
    ));

    Ok(())
}
