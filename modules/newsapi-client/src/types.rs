use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordering of `/everything` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortBy {
    #[serde(rename = "publishedAt")]
    PublishedAt,
    #[serde(rename = "relevancy")]
    Relevancy,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Relevancy => "relevancy",
        }
    }
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One page request against `GET /v2/everything`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EverythingQuery {
    pub q: String,
    pub language: String,
    pub sort_by: SortBy,
    /// Comma-separated field list, e.g. `title,description,content`.
    pub search_in: String,
    pub page_size: u32,
    pub page: u32,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl EverythingQuery {
    /// Query-string pairs in the order the API documents them. The API key is
    /// appended by the client.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("q", self.q.clone()),
            ("language", self.language.clone()),
            ("sortBy", self.sort_by.as_str().to_string()),
            ("searchIn", self.search_in.clone()),
            ("pageSize", self.page_size.to_string()),
            ("page", self.page.to_string()),
            ("from", self.from.format("%Y-%m-%d").to_string()),
            ("to", self.to.format("%Y-%m-%d").to_string()),
        ]
    }
}

/// Successful `/everything` body.
#[derive(Debug, Clone, Deserialize)]
pub struct EverythingResponse {
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Vec<ApiArticle>,
}

/// A single article as returned by NewsAPI. Every field is nullable upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Error body sent with non-200 responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
