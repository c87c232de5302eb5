use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::traits::PromptBuilder;
use crate::util::truncate_to_char_boundary;

use super::types::*;
use super::OpenAi;

pub struct OpenAiPromptBuilder {
    agent: OpenAi,
    input: String,
    temperature: Option<f32>,
}

impl OpenAiPromptBuilder {
    pub(crate) fn new(agent: OpenAi, input: String) -> Self {
        Self {
            agent,
            input,
            temperature: None,
        }
    }

    /// The prompt goes out as a single user message.
    fn wire_messages(&self) -> Vec<WireMessage> {
        vec![WireMessage::user(&self.input)]
    }

    fn request(&self) -> ChatRequest {
        let mut request = ChatRequest::new(&self.agent.model).messages(self.wire_messages());

        if let Some(temp) = self.temperature {
            if accepts_temperature(&self.agent.model) {
                request = request.temperature(temp);
            } else {
                warn!(
                    model = %self.agent.model,
                    temperature = temp,
                    "Model does not accept a sampling temperature, sending without it"
                );
            }
        }

        request
    }
}

#[async_trait]
impl PromptBuilder for OpenAiPromptBuilder {
    fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    async fn send(self) -> Result<String> {
        let client = self.agent.client();
        let request = self.request();

        debug!(
            prompt_preview = truncate_to_char_boundary(&self.input, 120),
            "Sending prompt"
        );

        let response = client.chat(&request).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No choices in response"))?;

        if let Some(ref reason) = choice.finish_reason {
            debug!(finish_reason = %reason, "OpenAI completion finished");
        }

        choice
            .message
            .content
            .ok_or_else(|| anyhow!("No response from OpenAI"))
    }
}
