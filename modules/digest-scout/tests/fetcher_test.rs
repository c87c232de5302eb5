//! Fetcher behavior against an in-memory news searcher: pass ordering,
//! dedup, the target cap, fallback triggering, and page failure handling.

use std::sync::Arc;

use chrono::NaiveDate;

use digest_core::QueryConfig;
use digest_scout::fetcher::ArticleFetcher;
use digest_scout::testing::{articles, plain_queries, test_search_config, MockSearcher};
use newsapi_client::SortBy;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn fetcher(searcher: Arc<MockSearcher>, queries: QueryConfig) -> ArticleFetcher {
    ArticleFetcher::new(searcher, test_search_config(), queries)
}

#[tokio::test]
async fn dedups_by_url_and_stops_at_target() {
    let mut topic_page = articles("a", 5);
    topic_page.extend(articles("b", 10));
    let searcher = Arc::new(
        MockSearcher::new()
            .on_page("primary", SortBy::PublishedAt, 1, articles("a", 10))
            .on_page("t1", SortBy::PublishedAt, 1, topic_page),
    );

    let outcome = fetcher(searcher.clone(), plain_queries(&["t1"]))
        .fetch_as_of("primary", 12, today())
        .await;

    assert_eq!(outcome.sources.len(), 12);
    let urls = outcome.sources.index_to_url();
    assert_eq!(urls[&1], "https://news.test/a/1");
    assert_eq!(urls[&10], "https://news.test/a/10");
    assert_eq!(urls[&11], "https://news.test/b/1");
    assert_eq!(urls[&12], "https://news.test/b/2");
    assert!(!outcome.stats.fallback_used);

    // Three primary pages, then the topic stops after its first page.
    assert_eq!(searcher.request_count(), 4);
}

#[tokio::test]
async fn numbering_follows_first_seen_order() {
    let searcher = Arc::new(
        MockSearcher::new()
            .on_page("primary", SortBy::PublishedAt, 1, articles("x", 2))
            .on_page("primary", SortBy::PublishedAt, 2, articles("y", 2))
            .on_page("t1", SortBy::PublishedAt, 1, articles("x", 3)),
    );

    let outcome = fetcher(searcher, plain_queries(&["t1"]))
        .fetch_as_of("primary", 5, today())
        .await;

    let order: Vec<&str> = outcome
        .sources
        .entries()
        .iter()
        .map(|e| e.article.url.as_str())
        .collect();
    assert_eq!(
        order,
        vec![
            "https://news.test/x/1",
            "https://news.test/x/2",
            "https://news.test/y/1",
            "https://news.test/y/2",
            "https://news.test/x/3",
        ]
    );
    let indices: Vec<usize> = outcome.sources.entries().iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn fallback_adds_relevance_results_when_too_few() {
    let mut relevance_page = articles("p", 3);
    relevance_page.extend(articles("r", 2));
    let searcher = Arc::new(
        MockSearcher::new()
            .on_page("primary", SortBy::PublishedAt, 1, articles("p", 3))
            .on_page("primary", SortBy::Relevancy, 1, relevance_page),
    );

    let outcome = fetcher(searcher.clone(), plain_queries(&["t1"]))
        .fetch_as_of("primary", 15, today())
        .await;

    assert!(outcome.stats.fallback_used);
    assert_eq!(outcome.stats.primary_pass_articles, 3);
    assert_eq!(outcome.sources.len(), 5);
    let urls = outcome.sources.index_to_url();
    assert_eq!(urls[&1], "https://news.test/p/1");
    assert_eq!(urls[&4], "https://news.test/r/1");
    assert_eq!(urls[&5], "https://news.test/r/2");

    let requests = searcher.requests();
    let fallback: Vec<_> = requests
        .iter()
        .filter(|r| r.sort_by == SortBy::Relevancy)
        .collect();
    assert_eq!(requests.len(), 2 * 3 + 2 * 2);
    assert_eq!(fallback.len(), 4);
    assert!(fallback.iter().all(|r| r.page <= 2));
    // Primary-pass requests all precede fallback requests.
    assert!(requests[..6].iter().all(|r| r.sort_by == SortBy::PublishedAt));
}

#[tokio::test]
async fn no_fallback_when_threshold_met() {
    let searcher = Arc::new(
        MockSearcher::new().on_page("primary", SortBy::PublishedAt, 1, articles("p", 8)),
    );

    let outcome = fetcher(searcher.clone(), plain_queries(&[]))
        .fetch_as_of("primary", 15, today())
        .await;

    assert_eq!(outcome.sources.len(), 8);
    assert!(!outcome.stats.fallback_used);
    assert!(searcher
        .requests()
        .iter()
        .all(|r| r.sort_by == SortBy::PublishedAt));
}

#[tokio::test]
async fn failed_page_is_skipped() {
    let searcher = Arc::new(
        MockSearcher::new()
            .fail_page("primary", SortBy::PublishedAt, 1)
            .on_page("primary", SortBy::PublishedAt, 2, articles("p", 8)),
    );

    let outcome = fetcher(searcher, plain_queries(&[]))
        .fetch_as_of("primary", 10, today())
        .await;

    assert_eq!(outcome.stats.pages_failed, 1);
    assert_eq!(outcome.sources.len(), 8);
    assert!(!outcome.stats.fallback_used);
}

#[tokio::test]
async fn every_page_failing_yields_empty_sources() {
    let searcher = Arc::new(
        MockSearcher::new()
            .fail_page("primary", SortBy::PublishedAt, 1)
            .fail_page("primary", SortBy::PublishedAt, 2)
            .fail_page("primary", SortBy::PublishedAt, 3)
            .fail_page("primary", SortBy::Relevancy, 1)
            .fail_page("primary", SortBy::Relevancy, 2),
    );

    let outcome = fetcher(searcher, plain_queries(&[]))
        .fetch_as_of("primary", 10, today())
        .await;

    assert!(outcome.sources.is_empty());
    assert_eq!(outcome.stats.pages_failed, 5);
    assert_eq!(outcome.sources.numbered_text(), "");
}

#[tokio::test]
async fn paging_stops_once_target_reached() {
    let searcher = Arc::new(
        MockSearcher::new().on_page("primary", SortBy::PublishedAt, 1, articles("p", 20)),
    );

    let outcome = fetcher(searcher.clone(), plain_queries(&["t1", "t2"]))
        .fetch_as_of("primary", 5, today())
        .await;

    assert_eq!(outcome.sources.len(), 5);
    assert_eq!(searcher.request_count(), 1);
}

#[tokio::test]
async fn zero_target_makes_no_requests() {
    let searcher = Arc::new(MockSearcher::new());

    let outcome = fetcher(searcher.clone(), plain_queries(&["t1"]))
        .fetch_as_of("primary", 0, today())
        .await;

    assert!(outcome.sources.is_empty());
    assert_eq!(searcher.request_count(), 0);
}

#[tokio::test]
async fn combined_query_runs_first_with_profile_params() {
    let queries = QueryConfig {
        primary: "рынок e-grocery Россия".to_string(),
        generic_terms: vec!["e-grocery".to_string(), "доставка продуктов".to_string()],
        brands: vec!["Самокат".to_string()],
        topics: vec!["Самокат доставка".to_string()],
    };
    let searcher = Arc::new(MockSearcher::new());

    let outcome = fetcher(searcher.clone(), queries)
        .fetch_as_of("рынок e-grocery Россия", 15, today())
        .await;
    assert!(outcome.sources.is_empty());

    let requests = searcher.requests();
    let first = &requests[0];
    assert_eq!(first.q, r#"(e-grocery OR "доставка продуктов") AND (Самокат)"#);
    assert_eq!(first.language, "ru");
    assert_eq!(first.page_size, 100);
    assert_eq!(first.page, 1);
    assert_eq!(first.search_in, "title,description,content");
    assert_eq!(first.sort_by, SortBy::PublishedAt);
    assert_eq!(first.to, today());
    assert_eq!(first.from, NaiveDate::from_ymd_opt(2026, 9, 16).unwrap());

    // combined, primary, topic: three pages each, then two fallback pages each.
    assert_eq!(requests[3].q, "рынок e-grocery Россия");
    assert_eq!(requests[6].q, "Самокат доставка");
    assert_eq!(requests.len(), 3 * 3 + 3 * 2);
}
