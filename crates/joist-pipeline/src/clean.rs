//! Output directory removal.

use std::io;
use std::path::Path;

/// Delete `dir` and everything under it. A missing directory is not an error.
pub fn clean_dir(dir: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
