pub mod error;

pub use error::{Result, TelegramError};

use std::time::Duration;

use serde::{Deserialize, Serialize};

const BASE_URL: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct TelegramOptions {
    pub bot_token: String,
    pub chat_id: String,
}

/// Form body for `sendMessage`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub disable_web_page_preview: bool,
}

/// Bot API envelope. The `result` payload is not needed and is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
}

pub struct TelegramClient {
    client: reqwest::Client,
    options: TelegramOptions,
    base_url: String,
}

impl TelegramClient {
    pub fn new(options: TelegramOptions) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            options,
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.options.bot_token, method)
    }

    /// Post one text message to the configured chat.
    pub async fn send_message(&self, text: &str, disable_link_preview: bool) -> Result<ApiResponse> {
        let form = SendMessage {
            chat_id: &self.options.chat_id,
            text,
            disable_web_page_preview: disable_link_preview,
        };

        let resp = self
            .client
            .post(self.endpoint("sendMessage"))
            .form(&form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(TelegramError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ApiResponse = serde_json::from_str(&resp.text().await?)?;
        if !body.ok {
            return Err(TelegramError::Api {
                status: status.as_u16(),
                message: body.description.unwrap_or_default(),
            });
        }

        tracing::debug!(chat_id = %self.options.chat_id, chars = text.chars().count(), "Telegram message sent");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TelegramClient {
        TelegramClient::new(TelegramOptions {
            bot_token: "123:abc".to_string(),
            chat_id: "-10042".to_string(),
        })
    }

    #[test]
    fn endpoint_embeds_bot_token() {
        assert_eq!(
            client().endpoint("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn form_encodes_preview_flag() {
        let form = SendMessage {
            chat_id: "-10042",
            text: "hello world",
            disable_web_page_preview: true,
        };
        let value = serde_json::to_value(&form).unwrap();
        assert_eq!(value["disable_web_page_preview"], true);
        assert_eq!(value["chat_id"], "-10042");
    }

    #[test]
    fn error_envelope_parses_description() {
        let body: ApiResponse =
            serde_json::from_str(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
                .unwrap();
        assert!(!body.ok);
        assert_eq!(body.description.as_deref(), Some("Bad Request: chat not found"));
    }

    mod http {
        use super::*;
        use httpmock::prelude::*;

        fn client(server: &MockServer) -> TelegramClient {
            TelegramClient::new(TelegramOptions {
                bot_token: "123:abc".to_string(),
                chat_id: "-10042".to_string(),
            })
            .with_base_url(&server.base_url())
        }

        #[tokio::test]
        async fn ok_response_is_success() {
            let server = MockServer::start_async().await;
            let mock = server
                .mock_async(|when, then| {
                    when.method(POST).path("/bot123:abc/sendMessage");
                    then.status(200)
                        .body(r#"{"ok":true,"result":{"message_id":7}}"#);
                })
                .await;

            let body = client(&server).send_message("hello", true).await.unwrap();

            mock.assert_async().await;
            assert!(body.ok);
        }

        #[tokio::test]
        async fn error_status_is_api_error() {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(POST).path("/bot123:abc/sendMessage");
                    then.status(400)
                        .body(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#);
                })
                .await;

            let err = client(&server).send_message("hello", true).await.unwrap_err();

            match err {
                TelegramError::Api { status, message } => {
                    assert_eq!(status, 400);
                    assert!(message.contains("chat not found"));
                }
                other => panic!("expected Api error, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn ok_false_on_success_status_is_api_error() {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(POST).path("/bot123:abc/sendMessage");
                    then.status(200)
                        .body(r#"{"ok":false,"description":"Forbidden: bot was blocked by the user"}"#);
                })
                .await;

            let err = client(&server).send_message("hello", true).await.unwrap_err();

            assert!(matches!(
                err,
                TelegramError::Api { status: 200, ref message } if message == "Forbidden: bot was blocked by the user"
            ));
        }

        #[tokio::test]
        async fn malformed_body_is_parse_error() {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(POST).path("/bot123:abc/sendMessage");
                    then.status(200).body("<html></html>");
                })
                .await;

            let err = client(&server).send_message("hello", true).await.unwrap_err();

            assert!(matches!(err, TelegramError::Parse(_)));
        }
    }
}
