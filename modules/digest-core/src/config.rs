use crate::error::{ConfigError, ConfigResult};

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Application configuration loaded from environment variables.
/// Contains only secrets and env-specific values; the query set, prompt and
/// search knobs live in the TOML FileConfig.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // News search
    pub newsapi_key: String,

    // AI / LLM
    pub openai_api_key: String,
    pub openai_model: String,

    // Delivery
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::MissingEnv(key));

        Ok(Self {
            newsapi_key: required("NEWSAPI_KEY")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            telegram_bot_token: get("TG_TOKEN"),
            telegram_chat_id: get("CHAT_ID"),
        })
    }

    /// Bot token and chat id, only when both are configured.
    pub fn telegram(&self) -> Option<(&str, &str)> {
        match (&self.telegram_bot_token, &self.telegram_chat_id) {
            (Some(token), Some(chat_id)) => Some((token.as_str(), chat_id.as_str())),
            _ => None,
        }
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let head: String = val.chars().take(5).collect();
            format!("{}...({} chars)", head, val.chars().count())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  NEWSAPI_KEY: {}", preview(&self.newsapi_key));
        tracing::info!("  OPENAI_API_KEY: {}", preview(&self.openai_api_key));
        tracing::info!("  OPENAI_MODEL: {}", self.openai_model);
        tracing::info!("  TG_TOKEN: {}", preview_opt(&self.telegram_bot_token));
        tracing::info!("  CHAT_ID: {}", preview_opt(&self.telegram_chat_id));
    }
}
