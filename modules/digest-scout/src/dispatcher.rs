use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::traits::MessageSender;

/// Split `text` into trimmed, non-empty chunks of at most `limit` characters.
///
/// Each cut lands on the last newline inside the window, else the last space,
/// else exactly at the limit. The tail shorter than `limit` is taken whole.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.is_empty() || limit == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut parts = Vec::new();
    let mut start = 0;

    while start < len {
        let end = (start + limit).min(len);
        let cut = if end < len {
            let window = &chars[start..end];
            window
                .iter()
                .rposition(|&c| c == '\n')
                .or_else(|| window.iter().rposition(|&c| c == ' '))
                .map(|offset| start + offset)
                .filter(|&cut| cut > start)
                .unwrap_or(end)
        } else {
            end
        };
        parts.push(chars[start..cut].iter().collect::<String>());
        start = cut;
    }

    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// What happened to a digest handed to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// No delivery credentials configured.
    Skipped,
    Sent { chunks: usize },
}

/// Sends a digest to the chat in order, chunk by chunk.
pub struct Dispatcher {
    sender: Option<Arc<dyn MessageSender>>,
    chunk_limit: usize,
    disable_link_preview: bool,
}

impl Dispatcher {
    pub fn new(
        sender: Option<Arc<dyn MessageSender>>,
        chunk_limit: usize,
        disable_link_preview: bool,
    ) -> Self {
        Self {
            sender,
            chunk_limit,
            disable_link_preview,
        }
    }

    /// A dispatcher that never sends.
    pub fn disabled() -> Self {
        Self::new(None, 4000, true)
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    /// Send every chunk in order. The first failed chunk aborts the rest.
    pub async fn deliver(&self, text: &str) -> Result<Delivery> {
        let Some(sender) = &self.sender else {
            info!("Telegram: skipped (no TG_TOKEN or CHAT_ID)");
            return Ok(Delivery::Skipped);
        };

        let chunks = split_message(text, self.chunk_limit);
        let total = chunks.len();

        for (i, chunk) in chunks.iter().enumerate() {
            sender
                .send(chunk, self.disable_link_preview)
                .await
                .with_context(|| format!("Failed to send chunk {} of {}", i + 1, total))?;
            info!(chunk = i + 1, of = total, "Telegram: chunk sent");
        }

        Ok(Delivery::Sent { chunks: total })
    }
}
