//! SCSS compilation and CSS post-processing.
//!
//! Compilation is delegated to `grass`; the compiled text then flows through
//! an ordered list of [`CssTransform`] stages. The only stage shipped is the
//! vendor prefixer, backed by `lightningcss` with browserslist targets.

use std::fs;
use std::path::{Path, PathBuf};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};

/// Errors from the style task.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// Syntax error or unresolved partial, with grass's file/line diagnostic.
    #[error("scss compilation failed: {0}")]
    Compile(String),

    #[error("invalid browserslist query: {0}")]
    BrowserQuery(String),

    #[error("css transform '{stage}' failed: {message}")]
    Transform {
        stage: &'static str,
        message: String,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One stage of the CSS post-processing list.
///
/// Stages run in order; each receives the previous stage's full output.
pub trait CssTransform: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, css: &str) -> Result<String, String>;
}

/// Adds vendor-prefixed property variants for the configured browser set.
#[derive(Debug)]
pub struct VendorPrefixer {
    browsers: Option<Browsers>,
}

impl VendorPrefixer {
    /// Resolve browserslist query strings into concrete browser versions.
    pub fn from_query(query: &[String]) -> Result<Self, StyleError> {
        let browsers = Browsers::from_browserslist(query)
            .map_err(|e| StyleError::BrowserQuery(e.to_string()))?;
        Ok(Self { browsers })
    }
}

impl CssTransform for VendorPrefixer {
    fn name(&self) -> &'static str {
        "autoprefix"
    }

    fn apply(&self, css: &str) -> Result<String, String> {
        let targets = match self.browsers.clone() {
            Some(browsers) => Targets::from(browsers),
            None => Targets::default(),
        };

        let mut sheet =
            StyleSheet::parse(css, ParserOptions::default()).map_err(|e| e.to_string())?;
        sheet
            .minify(MinifyOptions {
                targets,
                ..MinifyOptions::default()
            })
            .map_err(|e| e.to_string())?;

        // Prefixing only; whitespace minification stays off.
        let out = sheet
            .to_css(PrinterOptions {
                targets,
                ..PrinterOptions::default()
            })
            .map_err(|e| e.to_string())?;

        Ok(out.code)
    }
}

/// Compile `entry` to CSS, run it through `transforms` in order, and write
/// the result to `out_dir/<entry-stem>.css`.
///
/// Returns the path of the written file.
pub fn compile_stylesheet(
    entry: &Path,
    out_dir: &Path,
    transforms: &[Box<dyn CssTransform>],
) -> Result<PathBuf, StyleError> {
    let mut css = grass::from_path(entry, &grass::Options::default())
        .map_err(|e| StyleError::Compile(e.to_string()))?;

    for stage in transforms {
        css = stage.apply(&css).map_err(|message| StyleError::Transform {
            stage: stage.name(),
            message,
        })?;
    }

    let stem = entry
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("styles");
    let target = out_dir.join(format!("{stem}.css"));

    fs::create_dir_all(out_dir).map_err(|source| StyleError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;
    fs::write(&target, css).map_err(|source| StyleError::Io {
        path: target.clone(),
        source,
    })?;

    Ok(target)
}
