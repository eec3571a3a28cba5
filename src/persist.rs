//! JSON document persistence shared by the cache and the stats ledger.
//!
//! Load contract: a missing or zero-length file is "nothing stored yet";
//! anything else that fails to parse is a [`SkaldError::Configuration`].
//! Saves go through a sibling `.tmp` file and a rename, so a crash mid-write
//! leaves the previous document intact.

use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Result, SkaldError};

/// Read and parse a JSON document.
///
/// Returns `Ok(None)` when the file does not exist or is empty.
pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(SkaldError::Configuration(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&content).map(Some).map_err(|e| {
        SkaldError::Configuration(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Serialize `value` and atomically replace the file at `path`.
pub(crate) fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            SkaldError::Persistence(format!("failed to create {}: {e}", parent.display()))
        })?;
    }

    let json = serde_json::to_string_pretty(value)?;
    let tmp_path = tmp_path(path);
    write_private(&tmp_path, json.as_bytes()).map_err(|e| {
        SkaldError::Persistence(format!("failed to write {}: {e}", tmp_path.display()))
    })?;
    fs::rename(&tmp_path, path).map_err(|e| {
        SkaldError::Persistence(format!(
            "failed to rename {} → {}: {e}",
            tmp_path.display(),
            path.display()
        ))
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Owner read/write only: these files record what the user has been committing.
#[cfg(unix)]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
