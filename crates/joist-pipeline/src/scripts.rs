//! Final placement of the pre-built script bundle.

use std::fs;
use std::path::{Path, PathBuf};

/// Errors from the script task.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("script bundle not found: {0}")]
    Missing(PathBuf),

    #[error("failed to copy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Copy `source` into `out_dir` under a new base filename.
///
/// Only the base name changes; the extension and the bytes are untouched
/// (`materialize.min.js` with basename `scripts.min` lands as
/// `scripts.min.js`). Bundling and minification are assumed to have happened
/// upstream.
///
/// Returns the path of the written file.
pub fn finalize_script(
    source: &Path,
    out_dir: &Path,
    basename: &str,
) -> Result<PathBuf, ScriptError> {
    if !source.is_file() {
        return Err(ScriptError::Missing(source.to_path_buf()));
    }

    let file_name = match source.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{basename}.{ext}"),
        None => basename.to_string(),
    };
    let target = out_dir.join(file_name);

    fs::create_dir_all(out_dir).map_err(|e| ScriptError::Io {
        path: out_dir.to_path_buf(),
        source: e,
    })?;
    fs::copy(source, &target).map_err(|e| ScriptError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;

    Ok(target)
}
