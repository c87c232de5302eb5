// Trait seams for the digest pipeline's three external providers.
//
// NewsSearcher: one page of news search results
// TextGenerator: one prompt in, one completion out
// MessageSender: one chat message out
//
// Production impls wrap the client crates; `testing` has in-memory doubles.

use anyhow::Result;
use async_trait::async_trait;

use ai_client::{Agent, OpenAi, PromptBuilder};
use newsapi_client::{ApiArticle, EverythingQuery, NewsApiClient};
use telegram_client::TelegramClient;

// ---------------------------------------------------------------------------
// NewsSearcher
// ---------------------------------------------------------------------------

#[async_trait]
pub trait NewsSearcher: Send + Sync {
    /// Fetch one page of articles. Any failure (status, body, transport,
    /// timeout) is an `Err`; the caller decides whether it is fatal.
    async fn search(&self, query: &EverythingQuery) -> Result<Vec<ApiArticle>>;
}

#[async_trait]
impl NewsSearcher for NewsApiClient {
    async fn search(&self, query: &EverythingQuery) -> Result<Vec<ApiArticle>> {
        Ok(self.everything(query).await?.articles)
    }
}

// ---------------------------------------------------------------------------
// TextGenerator
// ---------------------------------------------------------------------------

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` as a single user message and return the completion text.
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String>;
}

#[async_trait]
impl TextGenerator for OpenAi {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        self.prompt(prompt).temperature(temperature).send().await
    }
}

// ---------------------------------------------------------------------------
// MessageSender
// ---------------------------------------------------------------------------

#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, text: &str, disable_link_preview: bool) -> Result<()>;
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send(&self, text: &str, disable_link_preview: bool) -> Result<()> {
        self.send_message(text, disable_link_preview).await?;
        Ok(())
    }
}
