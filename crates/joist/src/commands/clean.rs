//! Clean command.

use std::path::Path;

use anyhow::Result;
use joist_pipeline::Pipeline;

use crate::config;

/// Run the clean command.
pub async fn run(config_path: &Path) -> Result<()> {
    let file = config::load(config_path)?;
    let pipeline = Pipeline::new(file.site_config());

    pipeline.clean().await?;

    Ok(())
}
