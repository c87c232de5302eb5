// Test doubles for the digest pipeline.
//
// Three mocks matching the three trait boundaries:
// - MockSearcher (NewsSearcher): (query, sort, page) → articles or failure
// - MockGenerator (TextGenerator): canned completion, records prompts
// - MockSender (MessageSender): records chunks, can fail on the Nth call
//
// Plus helpers for building articles and small search/query profiles.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use digest_core::{QueryConfig, SearchConfig};
use newsapi_client::{ApiArticle, EverythingQuery, SortBy};

use crate::traits::{MessageSender, NewsSearcher, TextGenerator};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Article with a title, a derived description, and the given URL.
pub fn article(url: &str, title: &str) -> ApiArticle {
    ApiArticle {
        title: Some(title.to_string()),
        description: Some(format!("about {title}")),
        url: Some(url.to_string()),
    }
}

/// `count` articles with URLs `https://news.test/{prefix}/{n}`.
pub fn articles(prefix: &str, count: usize) -> Vec<ApiArticle> {
    (1..=count)
        .map(|n| article(&format!("https://news.test/{prefix}/{n}"), &format!("{prefix} {n}")))
        .collect()
}

/// Query profile with no combined query: the set is `[primary, topics...]`.
pub fn plain_queries(topics: &[&str]) -> QueryConfig {
    QueryConfig {
        primary: "primary".to_string(),
        generic_terms: Vec::new(),
        brands: Vec::new(),
        topics: topics.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn test_search_config() -> SearchConfig {
    SearchConfig::default()
}

// ---------------------------------------------------------------------------
// MockSearcher
// ---------------------------------------------------------------------------

type PageKey = (String, SortBy, u32);

/// Page-keyed news searcher. Unregistered pages return an empty list.
/// Builder pattern: `.on_page()`, `.fail_page()`.
pub struct MockSearcher {
    pages: HashMap<PageKey, Vec<ApiArticle>>,
    failures: HashSet<PageKey>,
    requests: Mutex<Vec<EverythingQuery>>,
}

impl MockSearcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            failures: HashSet::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on_page(mut self, query: &str, sort_by: SortBy, page: u32, items: Vec<ApiArticle>) -> Self {
        self.pages.insert((query.to_string(), sort_by, page), items);
        self
    }

    pub fn fail_page(mut self, query: &str, sort_by: SortBy, page: u32) -> Self {
        self.failures.insert((query.to_string(), sort_by, page));
        self
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<EverythingQuery> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsSearcher for MockSearcher {
    async fn search(&self, query: &EverythingQuery) -> Result<Vec<ApiArticle>> {
        self.requests.lock().unwrap().push(query.clone());

        let key = (query.q.clone(), query.sort_by, query.page);
        if self.failures.contains(&key) {
            bail!("MockSearcher: API error (status 500) for {:?} page {}", query.q, query.page);
        }
        Ok(self.pages.get(&key).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MockGenerator
// ---------------------------------------------------------------------------

/// Returns a canned completion (or error) and records `(prompt, temperature)`.
pub struct MockGenerator {
    reply: std::result::Result<String, String>,
    calls: Mutex<Vec<(String, f32)>>,
}

impl MockGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, f32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_string(), temperature));
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => bail!("MockGenerator: {message}"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockSender
// ---------------------------------------------------------------------------

/// Records delivered chunks. `fail_on_call(n)` makes the n-th send (1-based) fail.
pub struct MockSender {
    fail_on: Option<usize>,
    calls: Mutex<usize>,
    sent: Mutex<Vec<(String, bool)>>,
}

impl MockSender {
    pub fn new() -> Self {
        Self {
            fail_on: None,
            calls: Mutex::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    /// Successfully delivered chunks, in order.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn link_preview_flags(&self) -> Vec<bool> {
        self.sent.lock().unwrap().iter().map(|(_, f)| *f).collect()
    }

    /// Attempted sends, including the failed one.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Default for MockSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageSender for MockSender {
    async fn send(&self, text: &str, disable_link_preview: bool) -> Result<()> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if self.fail_on == Some(call) {
            bail!("MockSender: Telegram error: 400 Bad Request");
        }
        self.sent
            .lock()
            .unwrap()
            .push((text.to_string(), disable_link_preview));
        Ok(())
    }
}
