use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use digest_core::PromptRegistry;

use crate::traits::TextGenerator;

/// Turns a numbered source block into a citation-annotated market digest.
pub struct DigestSynthesizer {
    generator: Arc<dyn TextGenerator>,
    prompts: PromptRegistry,
    lookback_days: u32,
    temperature: f32,
}

impl DigestSynthesizer {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        prompts: PromptRegistry,
        lookback_days: u32,
        temperature: f32,
    ) -> Self {
        Self {
            generator,
            prompts,
            lookback_days,
            temperature,
        }
    }

    /// Full prompt text for a numbered source block.
    pub fn prompt_for(&self, numbered_text: &str) -> String {
        self.prompts.digest_prompt(numbered_text, self.lookback_days)
    }

    /// One request, no retry. Provider errors propagate.
    pub async fn synthesize(&self, numbered_text: &str) -> Result<String> {
        let prompt = self.prompt_for(numbered_text);
        info!(
            prompt_chars = prompt.chars().count(),
            temperature = self.temperature,
            "Requesting digest"
        );

        let digest = self
            .generator
            .generate(&prompt, self.temperature)
            .await
            .context("Digest synthesis failed")?;

        info!(digest_chars = digest.chars().count(), "Digest received");
        Ok(digest)
    }
}
