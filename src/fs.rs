//! Blocking file helpers used by the key/value storage. Writes go to a temporary sibling file
//! first and are renamed into place.

use crate::Result;
use anyhow::Context;
use std::io::{ErrorKind, Write};
use std::path::Path;

pub(crate) fn create_dir_all(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::create_dir_all(path).context(format!("Unable to create directory {}", path.display()))
}

/// Reads the file at `path`. A file that does not exist is `Ok(None)`.
pub(crate) fn read_optional(path: impl AsRef<Path>) -> Result<Option<String>> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(Some(s)),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(None),
            _ => Err(e).context(format!("Unable to read file {}", path.display())),
        },
    }
}

pub(crate) fn write_atomic(path: impl AsRef<Path>, data: impl AsRef<[u8]>) -> Result<()> {
    let path = path.as_ref();
    let tmp = path.with_extension("tmp");
    let mut f = std::fs::File::create(&tmp)
        .context(format!("Unable to create file {}", tmp.display()))?;
    f.write_all(data.as_ref())
        .context(format!("Unable to write data to {}", tmp.display()))?;
    f.sync_all()
        .context(format!("Unable to flush data to {}", tmp.display()))?;
    std::fs::rename(&tmp, path).context(format!(
        "Unable to move '{}' to '{}'",
        tmp.display(),
        path.display()
    ))
}

/// Removes the file at `path`. A file that does not exist is not an error.
pub(crate) fn remove_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match std::fs::remove_file(path) {
        Ok(_) => Ok(()),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(()),
            _ => Err(e).context(format!("Unable to remove file {}", path.display())),
        },
    }
}

#[test]
fn write_then_read_test() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let path = tempdir.path().join("x.json");
    assert!(read_optional(&path).unwrap().is_none());
    write_atomic(&path, "[1]").unwrap();
    assert_eq!(read_optional(&path).unwrap().as_deref(), Some("[1]"));
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn remove_missing_file_test() {
    let tempdir = tempfile::TempDir::new().unwrap();
    let path = tempdir.path().join("missing.json");
    remove_file(&path).unwrap();
    write_atomic(&path, "{}").unwrap();
    remove_file(&path).unwrap();
    assert!(!path.exists());
}
