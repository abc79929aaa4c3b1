//! Turning entry names into safe relative paths, and file paths into entry names.

use std::path::{Component, Path, PathBuf};

/// Characters that can't appear in a file name on Windows
pub const ILLEGAL_WINDOWS_CHARACTERS: [char; 7] = [':', '<', '>', '|', '"', '?', '*'];

/// Converts an entry name into a relative path that stays inside whatever directory it is joined to.
///
/// Both `/` and `\` are treated as separators. A leading drive letter (`C:`) or UNC prefix (`//server/share`) is
/// dropped, as are empty, `.` and `..` segments. On Windows, illegal characters are also replaced and trailing dots
/// removed from each segment, see [`sanitize_windows_component`].
///
/// The result may be empty, for instance for a name made only of `..` segments.
pub fn sanitize_entry_path(name: &str) -> PathBuf {
    let normalized = name.replace('\\', "/");

    strip_volume(&normalized)
        .split('/')
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .map(|segment| {
            if cfg!(windows) {
                sanitize_windows_component(segment)
            } else {
                segment.to_owned()
            }
        })
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Replaces every character of [`ILLEGAL_WINDOWS_CHARACTERS`] with `_` and strips trailing dots
pub fn sanitize_windows_component(component: &str) -> String {
    let replaced = component
        .chars()
        .map(|c| {
            if ILLEGAL_WINDOWS_CHARACTERS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect::<String>();

    replaced.trim_end_matches('.').to_owned()
}

fn strip_volume(path: &str) -> &str {
    if let Some(unc) = path.strip_prefix("//") {
        let mut parts = unc.splitn(3, '/');
        let _server = parts.next();
        let _share = parts.next();
        return parts.next().unwrap_or("");
    }

    match path.as_bytes() {
        [drive, b':', ..] if drive.is_ascii_alphabetic() => &path[2..],
        _ => path,
    }
}

/// Default entry name for a file added from disk: its normal path components joined with `/`.
///
/// Roots, drive prefixes and `.`/`..` components are left out.
pub fn archive_name_for(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use pretty_assertions::assert_eq;

    use super::{archive_name_for, sanitize_entry_path, sanitize_windows_component};

    #[test]
    fn traversal_segments_are_dropped() {
        assert_eq!(sanitize_entry_path("../evil.txt"), PathBuf::from("evil.txt"));
        assert_eq!(
            sanitize_entry_path("maps/../../etc/./passwd"),
            PathBuf::from("maps/etc/passwd")
        );
        assert_eq!(sanitize_entry_path("/etc/shadow"), PathBuf::from("etc/shadow"));
        assert_eq!(sanitize_entry_path("../.."), PathBuf::new());
    }

    #[test]
    fn volumes_and_backslashes() {
        assert_eq!(
            sanitize_entry_path("C:\\quake\\id1\\pak0.pak"),
            PathBuf::from("quake/id1/pak0.pak")
        );
        assert_eq!(
            sanitize_entry_path("\\\\server\\share\\sound\\pain.wav"),
            PathBuf::from("sound/pain.wav")
        );
        assert_eq!(
            sanitize_entry_path("progs//player.mdl"),
            PathBuf::from("progs/player.mdl")
        );
    }

    #[test]
    fn windows_components() {
        assert_eq!(sanitize_windows_component("what?.txt"), "what_.txt");
        assert_eq!(sanitize_windows_component("a<b>c|d\"e*f:g"), "a_b_c_d_e_f_g");
        assert_eq!(sanitize_windows_component("trailing..."), "trailing");
    }

    #[test]
    fn names_for_added_files() {
        assert_eq!(archive_name_for(Path::new("gfx/palette.lmp")), "gfx/palette.lmp");
        assert_eq!(archive_name_for(Path::new("/abs/./maps/e1m1.bsp")), "abs/maps/e1m1.bsp");
        assert_eq!(archive_name_for(Path::new("../up.txt")), "up.txt");
    }
}
