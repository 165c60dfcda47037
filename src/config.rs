use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::models::Kingdom;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub sources: Vec<FeedSourceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Grist document id; falls back to the GRIST_DOC_ID environment
    /// variable when absent.
    #[serde(default)]
    pub doc_id: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,
    /// Catalog column holding the dataset name.
    #[serde(default = "default_name_field")]
    pub name_field: String,
    /// Catalog column holding the stable tag.
    #[serde(default = "default_tag_field")]
    pub tag_field: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_table() -> String {
    "Datasets".to_string()
}
fn default_catalog_base_url() -> String {
    "https://docs.getgrist.com".to_string()
}
fn default_name_field() -> String {
    "nome".to_string()
}
fn default_tag_field() -> String {
    "tag".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_basename")]
    pub basename: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            basename: default_basename(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_basename() -> String {
    "missing_resources".to_string()
}

/// One IPT feed source.
#[derive(Debug, Deserialize, Clone)]
pub struct FeedSourceConfig {
    pub id: String,
    pub base_url: String,
    pub rss_url: String,
    /// Kingdom assigned when no title keyword matches.
    pub default_kingdom: Kingdom,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.sources.is_empty() {
        anyhow::bail!("At least one [[sources]] entry is required");
    }

    let mut seen = HashSet::new();
    for source in &config.sources {
        if source.id.is_empty() {
            anyhow::bail!("Source id must not be empty");
        }
        if source.rss_url.is_empty() {
            anyhow::bail!("Source '{}' has an empty rss_url", source.id);
        }
        if !seen.insert(source.id.as_str()) {
            anyhow::bail!("Duplicate source id: '{}'", source.id);
        }
    }

    if config.catalog.timeout_secs == 0 {
        anyhow::bail!("catalog.timeout_secs must be > 0");
    }
    if config.catalog.name_field.is_empty() || config.catalog.tag_field.is_empty() {
        anyhow::bail!("catalog.name_field and catalog.tag_field must not be empty");
    }

    Ok(config)
}
