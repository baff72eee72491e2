//! Default file locations under the `data/` directory.

use std::path::{Path, PathBuf};

/// Returns the `data/` directory, relative to the working directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Returns the default event database path.
#[must_use]
pub fn default_db_path() -> PathBuf {
    data_dir().join("quake_risk.duckdb")
}

/// Returns the default region boundaries path.
#[must_use]
pub fn default_regions_path() -> PathBuf {
    data_dir().join("regions.geojson")
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
