//! Small file helpers shared by the app file, registry and config store

use crate::{Error, Result};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;

/// Read a file to a string, returning `None` if it does not exist.
pub(crate) async fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(e, Some(path.to_path_buf()), "read_to_string")),
    }
}

/// Write `contents` to `path` through a uniquely named sibling temp file
/// that is renamed into place.
///
/// The parent directory is created if needed. Concurrent writers never share
/// a temp file; the last rename wins.
pub(crate) async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .await
        .map_err(|e| Error::io(e, Some(parent.clone()), "create_dir_all"))?;

    let target = path.to_path_buf();
    let contents = contents.to_owned();
    tokio::task::spawn_blocking(move || persist_via_temp(&parent, &target, &contents))
        .await
        .map_err(|e| {
            Error::io(
                std::io::Error::other(e),
                Some(path.to_path_buf()),
                "spawn_blocking",
            )
        })?
}

fn persist_via_temp(dir: &Path, target: &Path, contents: &str) -> Result<()> {
    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| Error::io(e, Some(dir.to_path_buf()), "create"))?;

    temp.write_all(contents.as_bytes())
        .map_err(|e| Error::io(e, Some(temp.path().to_path_buf()), "write_all"))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| Error::io(e, Some(temp.path().to_path_buf()), "sync_all"))?;

    temp.persist(target)
        .map_err(|e| Error::io(e.error, Some(target.to_path_buf()), "rename"))?;
    Ok(())
}
