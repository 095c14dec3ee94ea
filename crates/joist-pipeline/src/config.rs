//! Build configuration and the fixed project layout.

use std::path::PathBuf;

/// Paths and settings for one site build.
///
/// Everything is derived from a source root and an output root, so the whole
/// layout relocates together. The content tasks write to non-overlapping
/// sub-paths of the output root: pages at the top level, assets under
/// `assets/`, styles under `css/`, scripts under `js/`.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Source root
    pub source_dir: PathBuf,

    /// Output root
    pub output_dir: PathBuf,

    /// Glob patterns for HTML pages, copied into the output root
    pub html_globs: Vec<String>,

    /// Glob pattern for static assets
    pub asset_glob: String,

    /// Destination for copied assets
    pub asset_dir: PathBuf,

    /// SCSS entry point; partials resolve relative to its directory
    pub style_entry: PathBuf,

    /// Destination directory for compiled CSS
    pub style_dir: PathBuf,

    /// Pre-built, pre-minified script bundle
    pub script_source: PathBuf,

    /// Destination directory for the finalized bundle
    pub script_dir: PathBuf,

    /// Base filename the bundle is renamed to (extension preserved)
    pub script_basename: String,

    /// browserslist query consumed by the vendor prefixer
    pub browsers: Vec<String>,
}

impl SiteConfig {
    /// Derive the full layout from a source root and an output root.
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        let source_dir: PathBuf = source.into();
        let output_dir: PathBuf = output.into();

        Self {
            html_globs: vec![
                format!("{}/index.html", source_dir.display()),
                format!("{}/pages/**/*.html", source_dir.display()),
            ],
            asset_glob: format!("{}/assets/**/*", source_dir.display()),
            asset_dir: output_dir.join("assets"),
            style_entry: source_dir.join("sass/materialize.scss"),
            style_dir: output_dir.join("css"),
            script_source: source_dir.join("js/bin/materialize.min.js"),
            script_dir: output_dir.join("js"),
            script_basename: "scripts.min".to_string(),
            browsers: vec!["defaults".to_string()],
            source_dir,
            output_dir,
        }
    }

    /// Directory watched for asset changes.
    pub fn assets_source_dir(&self) -> PathBuf {
        self.source_dir.join("assets")
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new("src", "build")
    }
}
