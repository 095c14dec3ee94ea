//! Serve command: build, then watch and serve with live reload.

use std::path::Path;

use anyhow::Result;
use joist_pipeline::Pipeline;
use joist_server::{DevServer, DevServerConfig};

use crate::config;

/// Run the serve command.
///
/// The dev server is never started if the build fails.
pub async fn run(config_path: &Path, port: Option<u16>, no_open: bool) -> Result<()> {
    let file = config::load(config_path)?;
    let pipeline = Pipeline::new(file.site_config());

    tracing::info!("Building site...");
    pipeline.build().await?;

    let server_config = DevServerConfig {
        host: file.serve.host.clone(),
        port: port.unwrap_or(file.serve.port),
        open: !no_open && file.serve.open,
    };

    DevServer::new(server_config, pipeline).start().await?;

    Ok(())
}
