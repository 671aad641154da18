//! Fixture file output.
//!
//! The fixture is written to a sibling `.tmp` file and renamed into place,
//! so an existing fixture is either fully replaced or left untouched.

use std::path::{Path, PathBuf};

use chainlink_rounds::{Fixture, Result};

/// Default fixture location, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "test/data.json";

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize `fixture` as compact JSON and atomically write it to `path`.
///
/// Missing parent directories are created; an existing file is overwritten.
///
/// # Errors
///
/// Returns [`chainlink_rounds::Error::Json`] if serialization fails and
/// [`chainlink_rounds::Error::Io`] if the directory or file cannot be written.
pub fn write_fixture(path: &Path, fixture: &Fixture) -> Result<()> {
    let json = fixture.to_json()?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    let tmp = tmp_path(path);
    std::fs::write(&tmp, json.as_bytes())?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }

    tracing::info!(path = %path.display(), feeds = fixture.len(), "fixture written");
    Ok(())
}
