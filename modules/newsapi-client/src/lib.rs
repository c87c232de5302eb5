pub mod error;
pub mod types;

pub use error::{NewsApiError, Result};
pub use types::{ApiArticle, EverythingQuery, EverythingResponse, SortBy};

use std::time::Duration;

use types::ApiErrorBody;

const BASE_URL: &str = "https://newsapi.org/v2";

/// Search calls give up after this long; the caller treats it like any other failed page.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

pub struct NewsApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl NewsApiClient {
    pub fn new(api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key: api_key.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Fetch one page of `/everything` results.
    pub async fn everything(&self, query: &EverythingQuery) -> Result<EverythingResponse> {
        let url = format!("{}/everything", self.base_url);

        let mut params = query.params();
        params.push(("apiKey", self.api_key.clone()));

        tracing::debug!(q = %query.q, page = query.page, sort_by = %query.sort_by, "NewsAPI request");

        let resp = self.client.get(&url).query(&params).send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|e| match (e.code, e.message) {
                    (_, Some(message)) => Some(message),
                    (Some(code), None) => Some(code),
                    (None, None) => None,
                })
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(NewsApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: EverythingResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            total_results = parsed.total_results,
            articles = parsed.articles.len(),
            "NewsAPI response"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_base_url_strips_trailing_slash() {
        let client = NewsApiClient::new("key").with_base_url("http://localhost:9000/v2/");
        assert_eq!(client.base_url, "http://localhost:9000/v2");
    }
}

#[cfg(test)]
mod http_tests {
    use super::*;
    use chrono::NaiveDate;
    use httpmock::prelude::*;

    fn query() -> EverythingQuery {
        EverythingQuery {
            q: "Самокат доставка".to_string(),
            language: "ru".to_string(),
            sort_by: SortBy::PublishedAt,
            search_in: "title,description,content".to_string(),
            page_size: 100,
            page: 1,
            from: NaiveDate::from_ymd_opt(2026, 9, 16).unwrap(),
            to: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        }
    }

    fn client(server: &MockServer) -> NewsApiClient {
        NewsApiClient::new("test-key").with_base_url(&server.base_url())
    }

    #[tokio::test]
    async fn sends_query_params_and_parses_articles() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/everything")
                    .query_param("q", "Самокат доставка")
                    .query_param("language", "ru")
                    .query_param("sortBy", "publishedAt")
                    .query_param("pageSize", "100")
                    .query_param("apiKey", "test-key");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"status":"ok","totalResults":1,"articles":[{"title":"T","description":null,"url":"https://a"}]}"#);
            })
            .await;

        let response = client(&server).everything(&query()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.total_results, Some(1));
        assert_eq!(response.articles.len(), 1);
        assert_eq!(response.articles[0].url.as_deref(), Some("https://a"));
    }

    #[tokio::test]
    async fn error_status_carries_provider_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/everything");
                then.status(429)
                    .body(r#"{"status":"error","code":"rateLimited","message":"You have made too many requests"}"#);
            })
            .await;

        let err = client(&server).everything(&query()).await.unwrap_err();

        match err {
            NewsApiError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "You have made too many requests");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_status_falls_back_to_code() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/everything");
                then.status(401).body(r#"{"status":"error","code":"apiKeyInvalid"}"#);
            })
            .await;

        let err = client(&server).everything(&query()).await.unwrap_err();

        assert!(matches!(
            err,
            NewsApiError::Api { status: 401, ref message } if message == "apiKeyInvalid"
        ));
    }

    #[tokio::test]
    async fn error_status_without_json_is_unknown_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/everything");
                then.status(502).body("<html>Bad Gateway</html>");
            })
            .await;

        let err = client(&server).everything(&query()).await.unwrap_err();

        assert!(matches!(
            err,
            NewsApiError::Api { status: 502, ref message } if message == "Unknown error"
        ));
    }

    #[tokio::test]
    async fn malformed_success_body_is_parse_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/everything");
                then.status(200).body("not json");
            })
            .await;

        let err = client(&server).everything(&query()).await.unwrap_err();

        assert!(matches!(err, NewsApiError::Parse(_)));
    }
}
