//! Filesystem helpers built on `cap-std` and `camino`.

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

/// Open a UTF-8 file path for reading using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Ensure the parent directory for `path` exists.
///
/// Only the missing tail of the parent is created, relative to the deepest
/// ancestor that already exists.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) else {
        return Ok(());
    };
    let (existing, missing) = deepest_existing_dir(parent)?;
    if missing.as_str().is_empty() {
        return Ok(());
    }
    existing.create_dir_all(missing)
}

/// Whether `path` exists and is a regular file.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "path has no file name"))?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or(Utf8Path::new("."));
    fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?
        .metadata(file_name)
        .map(|meta| meta.is_file())
}

/// Open the deepest existing ancestor of `path`, returning it with the
/// remaining components that still need creating.
fn deepest_existing_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, &Utf8Path)> {
    for ancestor in path.ancestors() {
        let candidate = if ancestor.as_str().is_empty() {
            Utf8Path::new(".")
        } else {
            ancestor
        };
        match fs_utf8::Dir::open_ambient_dir(candidate, ambient_authority()) {
            Ok(dir) => {
                let missing = path.strip_prefix(ancestor).map_err(io::Error::other)?;
                return Ok((dir, missing));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no existing ancestor of {path}"),
    ))
}
