use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

/// TOML-backed run profile loaded from disk.
/// Secrets (API keys, chat id) stay as env vars.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub search: SearchConfig,
    pub queries: QueryConfig,
    pub prompt: PromptConfig,
    /// Free-form values referenced from the prompt as `{{config.report.*}}`.
    #[serde(default)]
    pub report: Option<toml::Table>,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub language: String,
    pub search_in: String,
    pub lookback_days: u32,
    pub page_size: u32,
    pub primary_pages: u32,
    pub fallback_pages: u32,
    pub target_count: usize,
    /// Lower bound of the fallback trigger: fallback runs below `max(floor, target / 2)`.
    pub fallback_floor: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: "ru".to_string(),
            search_in: "title,description,content".to_string(),
            lookback_days: 30,
            page_size: 100,
            primary_pages: 3,
            fallback_pages: 2,
            target_count: 15,
            fallback_floor: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Used when the CLI does not override it.
    pub primary: String,
    /// Left-hand OR group of the combined query.
    pub generic_terms: Vec<String>,
    /// Right-hand OR group of the combined query.
    pub brands: Vec<String>,
    /// Searched after the combined and primary queries, in order.
    pub topics: Vec<String>,
}

impl QueryConfig {
    pub fn combined_query(&self) -> String {
        build_combined_query(&self.generic_terms, &self.brands)
    }

    /// Full ordered query set: combined query, then the primary query, then topics.
    /// The combined query never embeds `primary`.
    pub fn query_set(&self, primary: &str) -> Vec<String> {
        let mut queries = Vec::with_capacity(self.topics.len() + 2);
        let combined = self.combined_query();
        if !combined.is_empty() {
            queries.push(combined);
        }
        queries.push(primary.to_string());
        queries.extend(self.topics.iter().cloned());
        queries
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    /// Path relative to the profile file.
    pub template: PathBuf,
    #[serde(default)]
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeliveryConfig {
    pub chunk_limit: usize,
    pub disable_link_preview: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            chunk_limit: 4000,
            disable_link_preview: true,
        }
    }
}

impl FileConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.search.target_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.target_count",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.search.page_size == 0 || self.search.page_size > 100 {
            return Err(ConfigError::InvalidValue {
                field: "search.page_size",
                reason: format!("{} is outside 1..=100", self.search.page_size),
            });
        }
        if self.delivery.chunk_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "delivery.chunk_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.queries.primary.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "queries.primary",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// `(a OR "b c") AND (d OR "e f")`. Multi-word terms are double-quoted.
/// Either group may be empty, in which case only the other is emitted.
pub fn build_combined_query(generic_terms: &[String], brands: &[String]) -> String {
    fn group(terms: &[String]) -> Option<String> {
        let parts: Vec<String> = terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| {
                if t.contains(char::is_whitespace) {
                    format!("\"{t}\"")
                } else {
                    t.to_string()
                }
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(format!("({})", parts.join(" OR ")))
        }
    }

    match (group(generic_terms), group(brands)) {
        (Some(g), Some(b)) => format!("{g} AND {b}"),
        (Some(g), None) => g,
        (None, Some(b)) => b,
        (None, None) => String::new(),
    }
}

/// Load and parse a TOML profile.
pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    Ok(config)
}

/// Load and parse the raw TOML value tree (for template variable resolution).
pub fn load_toml_value(path: &Path) -> Result<toml::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let value: toml::Value = content
        .parse()
        .with_context(|| format!("Failed to parse config as TOML: {}", path.display()))?;
    Ok(value)
}
