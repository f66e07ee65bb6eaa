use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use book_explorer_core::pagination::MAX_PAGE_SIZE;

use crate::render::ViewMode;

/// Default location of the optional config file.
pub const DEFAULT_CONFIG_PATH: &str = "./config/books.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
            user_agent: None,
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://www.googleapis.com/books/v1/volumes".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowseConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold: usize,
    #[serde(default = "default_viewport_rows")]
    pub viewport_rows: usize,
    #[serde(default)]
    pub view: ViewMode,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            scroll_threshold: default_scroll_threshold(),
            viewport_rows: default_viewport_rows(),
            view: ViewMode::default(),
        }
    }
}

fn default_page_size() -> usize {
    20
}
fn default_scroll_threshold() -> usize {
    book_explorer_core::scroll::DEFAULT_SCROLL_THRESHOLD
}
fn default_viewport_rows() -> usize {
    24
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Load the config at `path`, or the defaults when no path was given and
/// the default file does not exist.
pub fn resolve_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                load_config(default)
            } else {
                Ok(Config::minimal())
            }
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let base_url = &config.catalog.base_url;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        anyhow::bail!(
            "catalog.base_url must be an http(s) URL, got '{}'",
            base_url
        );
    }

    if config.catalog.timeout_secs == 0 {
        anyhow::bail!("catalog.timeout_secs must be >= 1");
    }

    if !(1..=MAX_PAGE_SIZE).contains(&config.browse.page_size) {
        anyhow::bail!("browse.page_size must be in [1, {}]", MAX_PAGE_SIZE);
    }

    if config.browse.viewport_rows == 0 {
        anyhow::bail!("browse.viewport_rows must be >= 1");
    }

    Ok(())
}
