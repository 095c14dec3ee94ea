//! Glob-driven file copying that preserves source sub-paths.

use std::fs;
use std::path::{Path, PathBuf};

/// Errors from the copy tasks.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("no file matches '{0}'")]
    MissingSource(String),

    #[error("failed to copy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Copy every file matched by `patterns` into `dest`.
///
/// Sub-paths are preserved relative to each pattern's base: the directory
/// prefix before the first wildcard component, or the file's own parent for a
/// wildcard-free pattern. A wildcard-free pattern that matches nothing is an
/// error; a wildcard pattern that matches nothing copies zero files. Partial
/// copies are not rolled back on failure.
///
/// Returns the number of files written.
pub fn copy_globs(patterns: &[String], dest: &Path) -> Result<usize, CopyError> {
    let mut copied = 0;

    for pattern in patterns {
        let base = glob_base(pattern);
        let entries = glob::glob(pattern).map_err(|e| CopyError::Pattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        let mut matched = false;
        for entry in entries {
            let path = entry.map_err(|e| CopyError::Io {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            matched = true;

            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&base).unwrap_or(&path);
            let target = dest.join(relative);

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|source| CopyError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::copy(&path, &target).map_err(|source| CopyError::Io {
                path: path.clone(),
                source,
            })?;
            copied += 1;
        }

        if !matched && !has_wildcard(pattern) {
            return Err(CopyError::MissingSource(pattern.clone()));
        }
    }

    Ok(copied)
}

/// Base directory a pattern's matches are made relative to.
fn glob_base(pattern: &str) -> PathBuf {
    let path = Path::new(pattern);
    let mut base = PathBuf::new();

    for component in path.iter() {
        if component.to_string_lossy().contains(['*', '?', '[']) {
            return base;
        }
        base.push(component);
    }

    // No wildcard at all: the pattern names a single file.
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn base_stops_at_first_wildcard() {
        assert_eq!(glob_base("src/pages/**/*.html"), Path::new("src/pages"));
        assert_eq!(glob_base("src/assets/**/*"), Path::new("src/assets"));
        assert_eq!(glob_base("*.html"), Path::new(""));
    }

    #[test]
    fn base_of_literal_is_its_parent() {
        assert_eq!(glob_base("src/index.html"), Path::new("src"));
    }

    #[test]
    fn copies_preserving_sub_paths() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let out = temp.path().join("out");

        fs::create_dir_all(src.join("assets/img")).unwrap();
        fs::write(src.join("assets/logo.svg"), "<svg/>").unwrap();
        fs::write(src.join("assets/img/icon.png"), "png").unwrap();

        let patterns = vec![format!("{}/assets/**/*", src.display())];
        let copied = copy_globs(&patterns, &out).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(out.join("logo.svg")).unwrap(), "<svg/>");
        assert_eq!(fs::read_to_string(out.join("img/icon.png")).unwrap(), "png");
    }

    #[test]
    fn literal_pattern_lands_in_dest_root() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        let out = temp.path().join("out");

        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("index.html"), "<html></html>").unwrap();

        let patterns = vec![format!("{}/index.html", src.display())];
        copy_globs(&patterns, &out).unwrap();

        assert!(out.join("index.html").is_file());
    }

    #[test]
    fn missing_literal_source_is_an_error() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("out");

        let patterns = vec![format!("{}/index.html", temp.path().display())];
        let err = copy_globs(&patterns, &out).unwrap_err();

        assert!(matches!(err, CopyError::MissingSource(_)));
    }

    #[test]
    fn empty_wildcard_match_copies_nothing() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("out");

        let patterns = vec![format!("{}/pages/**/*.html", temp.path().display())];
        let copied = copy_globs(&patterns, &out).unwrap();

        assert_eq!(copied, 0);
        assert!(!out.exists());
    }
}
