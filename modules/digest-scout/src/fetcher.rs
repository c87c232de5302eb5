use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use tracing::{info, warn};

use digest_core::{QueryConfig, SearchConfig};
use newsapi_client::{ApiArticle, EverythingQuery, SortBy};

use crate::traits::NewsSearcher;

/// Characters of a query shown in progress logs.
const QUERY_PREVIEW_CHARS: usize = 60;

/// A deduplicated news item. `url` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
}

/// Result of offering one upstream item to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Added,
    Duplicate,
    MissingUrl,
    Full,
}

/// First-seen-ordered set of articles keyed by URL, capped at `capacity`.
#[derive(Debug, Clone)]
pub struct ArticleIndex {
    capacity: usize,
    articles: Vec<Article>,
    seen: HashSet<String>,
}

impl ArticleIndex {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            articles: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.articles.len() >= self.capacity
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn admit(&mut self, item: ApiArticle) -> Admission {
        if self.is_full() {
            return Admission::Full;
        }
        let url = match item.url {
            Some(url) if !url.is_empty() => url,
            _ => return Admission::MissingUrl,
        };
        if !self.seen.insert(url.clone()) {
            return Admission::Duplicate;
        }
        self.articles.push(Article {
            title: item.title.unwrap_or_default(),
            description: item.description.unwrap_or_default(),
            url,
        });
        Admission::Added
    }

    /// Number the first `limit` articles from 1 in insertion order.
    pub fn into_source_list(self, limit: usize) -> SourceList {
        let entries: Vec<NumberedArticle> = self
            .articles
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, article)| NumberedArticle {
                index: i + 1,
                article,
            })
            .collect();
        let index_to_url = entries
            .iter()
            .map(|e| (e.index, e.article.url.clone()))
            .collect();
        SourceList {
            entries,
            index_to_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedArticle {
    pub index: usize,
    pub article: Article,
}

impl std::fmt::Display for NumberedArticle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} — {} ({})",
            self.index, self.article.title, self.article.description, self.article.url
        )
    }
}

/// Numbered sources handed to the synthesizer, plus the index → URL map used
/// to rewrite its citations. Indices are contiguous from 1 and never re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    entries: Vec<NumberedArticle>,
    index_to_url: BTreeMap<usize, String>,
}

impl SourceList {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[NumberedArticle] {
        &self.entries
    }

    pub fn index_to_url(&self) -> &BTreeMap<usize, String> {
        &self.index_to_url
    }

    /// One `[i] title — description (url)` line per source. Empty when there are no sources.
    pub fn numbered_text(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Counters from one fetch call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchStats {
    pub queries_run: u32,
    pub pages_requested: u32,
    pub pages_failed: u32,
    pub items_received: u32,
    pub primary_pass_articles: usize,
    pub fallback_used: bool,
    pub unique_articles: usize,
}

impl std::fmt::Display for FetchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== News Fetch Complete ===")?;
        writeln!(f, "Queries run:        {}", self.queries_run)?;
        writeln!(f, "Pages requested:    {}", self.pages_requested)?;
        writeln!(f, "Pages failed:       {}", self.pages_failed)?;
        writeln!(f, "Items received:     {}", self.items_received)?;
        writeln!(f, "Primary pass:       {}", self.primary_pass_articles)?;
        writeln!(
            f,
            "Fallback pass:      {}",
            if self.fallback_used { "yes" } else { "no" }
        )?;
        write!(f, "Unique articles:    {}", self.unique_articles)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    pub sources: SourceList,
    pub stats: FetchStats,
}

/// Inclusive `[from, to]` publish-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn ending(to: NaiveDate, lookback_days: u32) -> Self {
        let from = to
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        Self { from, to }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pass {
    name: &'static str,
    sort_by: SortBy,
    pages: u32,
}

/// Multi-query paginated news collector with a relevance-sorted fallback.
pub struct ArticleFetcher {
    searcher: Arc<dyn NewsSearcher>,
    search: SearchConfig,
    queries: QueryConfig,
}

impl ArticleFetcher {
    pub fn new(searcher: Arc<dyn NewsSearcher>, search: SearchConfig, queries: QueryConfig) -> Self {
        Self {
            searcher,
            search,
            queries,
        }
    }

    /// Fetch up to `target_count` unique articles over the window ending today (UTC).
    pub async fn fetch(&self, primary_query: &str, target_count: usize) -> FetchOutcome {
        let today = Utc::now().date_naive();
        self.fetch_as_of(primary_query, target_count, today).await
    }

    /// Same as [`fetch`](Self::fetch) with an explicit "today". Never fails:
    /// page errors are logged and counted, an empty source list means no data.
    pub async fn fetch_as_of(
        &self,
        primary_query: &str,
        target_count: usize,
        today: NaiveDate,
    ) -> FetchOutcome {
        if target_count == 0 {
            return FetchOutcome::default();
        }

        let mut stats = FetchStats::default();

        let window = DateWindow::ending(today, self.search.lookback_days);
        let queries = self.queries.query_set(primary_query);

        info!(from = %window.from, to = %window.to, "Searching news window");
        info!(primary_query, "Primary query");
        info!(queries = queries.len(), "Total queries to run");

        let mut index = ArticleIndex::new(target_count);

        let primary = Pass {
            name: "primary",
            sort_by: SortBy::PublishedAt,
            pages: self.search.primary_pages,
        };
        self.run_pass(primary, &queries, &window, &mut index, &mut stats)
            .await;

        stats.primary_pass_articles = index.len();
        info!(unique = index.len(), "Unique articles after primary pass");

        let threshold = self.search.fallback_floor.max(target_count / 2);
        if index.len() < threshold {
            info!(
                found = index.len(),
                threshold, "Too few articles, retrying sorted by relevance"
            );
            stats.fallback_used = true;
            let fallback = Pass {
                name: "fallback",
                sort_by: SortBy::Relevancy,
                pages: self.search.fallback_pages,
            };
            self.run_pass(fallback, &queries, &window, &mut index, &mut stats)
                .await;
        }

        let sources = index.into_source_list(target_count);
        stats.unique_articles = sources.len();

        if sources.is_empty() {
            info!("No articles available for the digest");
        } else {
            info!(sources = sources.len(), "Building digest from articles");
        }

        FetchOutcome { sources, stats }
    }

    async fn run_pass(
        &self,
        pass: Pass,
        queries: &[String],
        window: &DateWindow,
        index: &mut ArticleIndex,
        stats: &mut FetchStats,
    ) {
        let total = queries.len();

        for (i, q) in queries.iter().enumerate() {
            if index.is_full() {
                info!(pass = pass.name, limit = index.len(), "Article limit reached, stopping search");
                break;
            }

            stats.queries_run += 1;
            info!(
                pass = pass.name,
                query = i + 1,
                of = total,
                text = %query_preview(q),
                "Running query"
            );

            for page in 1..=pass.pages {
                let request = EverythingQuery {
                    q: q.clone(),
                    language: self.search.language.clone(),
                    sort_by: pass.sort_by,
                    search_in: self.search.search_in.clone(),
                    page_size: self.search.page_size,
                    page,
                    from: window.from,
                    to: window.to,
                };

                stats.pages_requested += 1;
                let items = match self.searcher.search(&request).await {
                    Ok(items) => items,
                    Err(e) => {
                        stats.pages_failed += 1;
                        warn!(pass = pass.name, page, error = %e, "News page failed, skipping");
                        continue;
                    }
                };

                info!(pass = pass.name, page, found = items.len(), "News page fetched");
                stats.items_received += items.len() as u32;

                for item in items {
                    if index.admit(item) == Admission::Full {
                        break;
                    }
                }

                if index.is_full() {
                    break;
                }
            }
        }
    }
}

/// First 60 characters of a query, with `...` when cut.
fn query_preview(q: &str) -> String {
    let mut chars = q.chars();
    let head: String = chars.by_ref().take(QUERY_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
