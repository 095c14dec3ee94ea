//! site.toml loading.

use std::fs;
use std::path::Path;

use anyhow::Result;
use joist_pipeline::SiteConfig;
use serde::Deserialize;

/// Configuration file structure (site.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    site: SiteSection,
    #[serde(default)]
    browsers: BrowsersSection,
    #[serde(default)]
    pub serve: ServeSection,
}

#[derive(Debug, Deserialize)]
struct SiteSection {
    #[serde(default = "default_source")]
    source: String,
    #[serde(default = "default_output")]
    output: String,
}

#[derive(Debug, Deserialize)]
struct BrowsersSection {
    /// browserslist query consumed by the vendor prefixer
    #[serde(default = "default_query")]
    query: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServeSection {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_open")]
    pub open: bool,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
        }
    }
}

impl Default for BrowsersSection {
    fn default() -> Self {
        Self {
            query: default_query(),
        }
    }
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            open: default_open(),
        }
    }
}

fn default_source() -> String {
    "src".to_string()
}
fn default_output() -> String {
    "build".to_string()
}
fn default_query() -> Vec<String> {
    vec!["defaults".to_string()]
}
fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_open() -> bool {
    true
}

/// Load configuration from site.toml if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

impl ConfigFile {
    /// Pipeline paths and browser query from `[site]` and `[browsers]`.
    pub fn site_config(&self) -> SiteConfig {
        let mut site = SiteConfig::new(&self.site.source, &self.site.output);
        site.browsers = self.browsers.query.clone();
        site
    }
}
