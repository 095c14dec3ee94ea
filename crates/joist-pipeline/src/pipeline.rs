//! The build pipeline: five tasks and the graph that orders them.
//!
//! `clean` runs to completion before any content task touches the output
//! directory; the four content tasks then run concurrently with
//! non-overlapping output sub-paths.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::clean::clean_dir;
use crate::config::SiteConfig;
use crate::copy::{copy_globs, CopyError};
use crate::scripts::{finalize_script, ScriptError};
use crate::styles::{compile_stylesheet, CssTransform, StyleError, VendorPrefixer};
use crate::task::{parallel, sequence, task, TaskError, TaskGraph};

/// Errors from the individual build tasks.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Copy(#[from] CopyError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("failed to remove output directory: {0}")]
    Clean(#[source] std::io::Error),
}

/// Handle to the configured build tasks.
///
/// Cheap to clone; the dev server holds one to re-run individual tasks when
/// sources change.
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<SiteConfig>,
}

impl Pipeline {
    pub fn new(config: SiteConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Remove the output directory.
    pub async fn clean(&self) -> Result<(), PipelineError> {
        clean_dir(&self.config.output_dir).map_err(PipelineError::Clean)?;
        tracing::info!("cleaned {}", self.config.output_dir.display());
        Ok(())
    }

    /// Copy HTML pages into the output root.
    pub async fn copy_html(&self) -> Result<(), PipelineError> {
        let copied = copy_globs(&self.config.html_globs, &self.config.output_dir)?;
        tracing::info!("copied {copied} page(s)");
        Ok(())
    }

    /// Copy static assets into the output assets directory.
    pub async fn copy_assets(&self) -> Result<(), PipelineError> {
        let copied = copy_globs(
            std::slice::from_ref(&self.config.asset_glob),
            &self.config.asset_dir,
        )?;
        tracing::info!("copied {copied} asset(s)");
        Ok(())
    }

    /// Compile the SCSS entry point and vendor-prefix the result.
    pub async fn compile_styles(&self) -> Result<(), PipelineError> {
        let prefixer = VendorPrefixer::from_query(&self.config.browsers)?;
        let transforms: Vec<Box<dyn CssTransform>> = vec![Box::new(prefixer)];

        let target =
            compile_stylesheet(&self.config.style_entry, &self.config.style_dir, &transforms)?;
        tracing::info!("wrote {}", target.display());
        Ok(())
    }

    /// Rename the pre-built bundle into the output scripts directory.
    pub async fn finalize_scripts(&self) -> Result<(), PipelineError> {
        let target = finalize_script(
            &self.config.script_source,
            &self.config.script_dir,
            &self.config.script_basename,
        )?;
        tracing::info!("wrote {}", target.display());
        Ok(())
    }

    /// `clean`, then the four content tasks concurrently.
    pub fn build_graph(&self) -> TaskGraph {
        sequence(vec![
            self.leaf("clean", |p| async move { p.clean().await }),
            parallel(vec![
                self.leaf("html", |p| async move { p.copy_html().await }),
                self.leaf("assets", |p| async move { p.copy_assets().await }),
                self.leaf("css", |p| async move { p.compile_styles().await }),
                self.leaf("js", |p| async move { p.finalize_scripts().await }),
            ]),
        ])
    }

    /// Run the full build graph once.
    pub async fn build(&self) -> Result<(), TaskError> {
        let start = Instant::now();
        self.build_graph().run().await?;
        tracing::info!("build finished in {}ms", start.elapsed().as_millis());
        Ok(())
    }

    fn leaf<F, Fut>(&self, name: &'static str, f: F) -> TaskGraph
    where
        F: Fn(Pipeline) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), PipelineError>> + Send + 'static,
    {
        let pipeline = self.clone();
        task(name, move || f(pipeline.clone()))
    }
}
