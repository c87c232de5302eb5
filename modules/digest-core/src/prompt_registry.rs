use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

use crate::file_config::FileConfig;
use crate::template::{resolve_config_vars, resolve_runtime_vars, validate_template};

/// Runtime variables the digest prompt may reference.
const DIGEST_RUNTIME_VARS: &[&str] = &["sources", "lookback_days"];

/// Holds the pre-resolved digest template (config vars resolved, runtime vars intact).
#[derive(Debug, Clone)]
pub struct PromptRegistry {
    digest: String,
}

impl PromptRegistry {
    /// Load the prompt file, resolve config vars, validate runtime vars.
    pub fn load(config: &FileConfig, config_dir: &Path, toml_value: &toml::Value) -> Result<Self> {
        let full_path = config_dir.join(&config.prompt.template);
        let content = std::fs::read_to_string(&full_path).with_context(|| {
            format!("Failed to read digest prompt file: {}", full_path.display())
        })?;

        let digest = Self::from_template(&content, toml_value)
            .with_context(|| format!("Invalid digest prompt: {}", full_path.display()))?;
        Ok(digest)
    }

    /// Build from template text already in memory.
    pub fn from_template(content: &str, toml_value: &toml::Value) -> Result<Self> {
        if content.trim().is_empty() {
            anyhow::bail!("Prompt template is empty");
        }

        let resolved = resolve_config_vars(content, toml_value)
            .context("Failed to resolve config variables")?;

        validate_template(&resolved, toml_value, DIGEST_RUNTIME_VARS)
            .context("Template validation failed")?;

        if !resolved.contains("{{sources}}") {
            anyhow::bail!("Prompt template never references {{{{sources}}}}");
        }

        Ok(Self { digest: resolved })
    }

    /// Digest prompt with the numbered source block and lookback window filled in.
    pub fn digest_prompt(&self, sources: &str, lookback_days: u32) -> String {
        let days = lookback_days.to_string();
        resolve_runtime_vars(
            &self.digest,
            &HashMap::from([("sources", sources), ("lookback_days", days.as_str())]),
        )
    }
}
