use anyhow::Result;
use tracing::{error, info};

use crate::citations::rewrite_citations;
use crate::dispatcher::{Delivery, Dispatcher};
use crate::fetcher::{ArticleFetcher, FetchStats, SourceList};
use crate::synthesizer::DigestSynthesizer;

/// A synthesized digest with citations rewritten to URLs.
#[derive(Debug, Clone)]
pub struct Digest {
    /// Final text, citation markers replaced by URLs.
    pub text: String,
    /// Text as returned by the generator.
    pub raw: String,
    pub sources: SourceList,
    pub stats: FetchStats,
}

/// Result of the stages before delivery.
#[derive(Debug, Clone)]
pub enum Composed {
    /// The fetch found nothing; synthesis did not run.
    Empty(FetchStats),
    Ready(Digest),
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing was found; synthesis and delivery did not run.
    NoArticles { stats: FetchStats },
    /// A digest was produced. Delivery errors are reported here, not raised.
    Completed {
        digest: Digest,
        delivery: Result<Delivery>,
    },
}

/// Fetch → synthesize → rewrite → deliver, one stage after another.
pub struct DigestPipeline {
    fetcher: ArticleFetcher,
    synthesizer: DigestSynthesizer,
    dispatcher: Dispatcher,
}

impl DigestPipeline {
    pub fn new(
        fetcher: ArticleFetcher,
        synthesizer: DigestSynthesizer,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            fetcher,
            synthesizer,
            dispatcher,
        }
    }

    /// Everything up to delivery.
    pub async fn compose(&self, primary_query: &str, target_count: usize) -> Result<Composed> {
        let fetched = self.fetcher.fetch(primary_query, target_count).await;
        info!("{}", fetched.stats);

        if fetched.sources.is_empty() {
            return Ok(Composed::Empty(fetched.stats));
        }

        let raw = self
            .synthesizer
            .synthesize(&fetched.sources.numbered_text())
            .await?;
        let text = rewrite_citations(&raw, fetched.sources.index_to_url());

        Ok(Composed::Ready(Digest {
            text,
            raw,
            sources: fetched.sources,
            stats: fetched.stats,
        }))
    }

    /// Full run. Synthesis errors propagate; delivery errors are logged and
    /// returned inside the outcome.
    pub async fn run(&self, primary_query: &str, target_count: usize) -> Result<RunOutcome> {
        let digest = match self.compose(primary_query, target_count).await? {
            Composed::Ready(digest) => digest,
            Composed::Empty(stats) => {
                info!("No news for the selected period and queries");
                return Ok(RunOutcome::NoArticles { stats });
            }
        };

        let delivery = self.dispatcher.deliver(&digest.text).await;
        match &delivery {
            Ok(Delivery::Sent { chunks }) => info!(chunks, "Digest delivered to Telegram"),
            Ok(Delivery::Skipped) => {}
            Err(e) => {
                let message = format!("{e:#}");
                error!(error = %message, "Telegram delivery failed");
            }
        }

        Ok(RunOutcome::Completed { digest, delivery })
    }
}
