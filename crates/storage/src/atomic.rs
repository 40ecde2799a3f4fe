//! Whole-file replacement that never leaves a half-written target behind.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Write `bytes` to `path` by writing a sibling temp file and renaming it over
/// the target.
///
/// On failure the temp file is removed and any existing target is untouched.
///
/// # Errors
///
/// Returns the underlying `io::Error` from directory creation, writing,
/// syncing or renaming.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let tmp = dir.join(temp_name(path));
    let result = write_and_rename(&tmp, path, bytes);
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_and_rename(tmp: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp, target)
}

fn temp_name(target: &Path) -> String {
    let stem = target
        .file_name()
        .map_or_else(|| "file".into(), |n| n.to_string_lossy());
    format!(".{stem}.{}.tmp", Uuid::new_v4().simple())
}
