//! Build command.

use std::path::Path;

use anyhow::Result;
use joist_pipeline::Pipeline;

use crate::config;

/// Run the build command.
pub async fn run(config_path: &Path) -> Result<()> {
    tracing::info!("Building site...");

    let file = config::load(config_path)?;
    let pipeline = Pipeline::new(file.site_config());

    pipeline.build().await?;

    tracing::info!("Output: {}", pipeline.config().output_dir.display());

    Ok(())
}
