//! Shared fixtures for the CLI tests: a stand-in exiftool and a command builder
//! isolated from the user's real config file.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const FAKE_DATE: &str = "2024_01_15_143052";

/// Writes a `/bin/sh` script that answers `-ver` and prints a `-T` style report,
/// giving every existing file argument `default_date` unless `overrides` names it.
/// A date of `-` mimics a file without metadata.
pub fn fake_exiftool(dir: &Path, default_date: &str, overrides: &[(&str, &str)]) -> PathBuf {
    let mut cases = String::new();
    for (name, date) in overrides {
        cases.push_str(&format!("    {name}) d='{date}' ;;\n"));
    }
    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"-ver\" ]; then echo 12.76; exit 0; fi\n\
         echo 'Warning: [minor] fake exiftool diagnostic' >&2\n\
         for f in \"$@\"; do\n\
         \x20 [ -f \"$f\" ] || continue\n\
         \x20 n=$(basename \"$f\")\n\
         \x20 d='{default_date}'\n\
         \x20 case \"$n\" in\n{cases}    *) ;;\n  esac\n\
         \x20 printf '%s\\t%s\\t-\\n' \"$n\" \"$d\"\n\
         done\n\
         exit 0\n"
    );
    write_script(dir, "exiftool", &script)
}

/// Answers `-ver`, then hangs on every report request.
pub fn hanging_exiftool(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "exiftool_hang",
        "#!/bin/sh\nif [ \"$1\" = \"-ver\" ]; then echo 12.76; exit 0; fi\nexec sleep 30\n",
    )
}

/// Like [`hanging_exiftool`], but the shell stays the parent of the sleeping
/// process, so killing the script leaves the pipes held open by `sleep`.
pub fn wrapped_hanging_exiftool(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "exiftool_wrapped",
        "#!/bin/sh\nif [ \"$1\" = \"-ver\" ]; then echo 12.76; exit 0; fi\nsleep 30\necho done\n",
    )
}

/// Reports `date` for every file but stalls whenever `stall_on` is among the arguments.
pub fn stalling_exiftool(dir: &Path, stall_on: &str, date: &str) -> PathBuf {
    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"-ver\" ]; then echo 12.76; exit 0; fi\n\
         for f in \"$@\"; do\n\
         \x20 [ -f \"$f\" ] || continue\n\
         \x20 n=$(basename \"$f\")\n\
         \x20 if [ \"$n\" = '{stall_on}' ]; then sleep 30; fi\n\
         \x20 printf '%s\\t%s\\t-\\n' \"$n\" '{date}'\n\
         done\n\
         exit 0\n"
    );
    write_script(dir, "exiftool_stall", &script)
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// The binary with `PHOTO_ORGANIZER_CONFIG` pointed at `config` (which may not exist).
pub fn organizer(config: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("photo_organizer"));
    cmd.env(photo_organizer::CONFIG_ENV, config);
    cmd
}

pub fn write_photo(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let p = dir.join(name);
    fs::write(&p, contents).unwrap();
    p
}
