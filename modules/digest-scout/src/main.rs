use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::OpenAi;
use digest_core::{load_config, load_toml_value, AppConfig, PromptRegistry};
use digest_scout::dispatcher::Dispatcher;
use digest_scout::fetcher::ArticleFetcher;
use digest_scout::pipeline::{DigestPipeline, RunOutcome};
use digest_scout::synthesizer::DigestSynthesizer;
use digest_scout::traits::MessageSender;
use newsapi_client::NewsApiClient;
use telegram_client::{TelegramClient, TelegramOptions};

#[derive(Parser)]
#[command(name = "digest", about = "Collect recent news, summarize it, and post it to Telegram")]
struct Cli {
    /// Path to the TOML run profile
    #[arg(long, default_value = "config/digest.toml")]
    config: PathBuf,

    /// Primary query (overrides `queries.primary`)
    #[arg(long)]
    query: Option<String>,

    /// Number of sources to collect (overrides `search.target_count`)
    #[arg(long)]
    count: Option<usize>,

    /// Print the digest without sending it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("digest=info".parse()?))
        .init();

    let cli = Cli::parse();

    info!("News digest starting...");

    let config = AppConfig::from_env()?;
    let profile = load_config(&cli.config)?;
    let toml_value = load_toml_value(&cli.config)?;
    let config_dir = cli.config.parent().unwrap_or(Path::new("."));
    let prompts = PromptRegistry::load(&profile, config_dir, &toml_value)?;

    let primary_query = cli
        .query
        .unwrap_or_else(|| profile.queries.primary.clone());
    let target_count = cli.count.unwrap_or(profile.search.target_count);

    let searcher = Arc::new(NewsApiClient::new(&config.newsapi_key));
    let generator = Arc::new(OpenAi::new(&config.openai_api_key, &config.openai_model));

    let sender: Option<Arc<dyn MessageSender>> = match config.telegram() {
        _ if cli.dry_run => {
            info!("Dry run: Telegram delivery disabled");
            None
        }
        Some((bot_token, chat_id)) => Some(Arc::new(TelegramClient::new(TelegramOptions {
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        }))),
        None => None,
    };

    let fetcher = ArticleFetcher::new(searcher, profile.search.clone(), profile.queries.clone());
    let synthesizer = DigestSynthesizer::new(
        generator,
        prompts,
        profile.search.lookback_days,
        profile.prompt.temperature,
    );
    let dispatcher = Dispatcher::new(
        sender,
        profile.delivery.chunk_limit,
        profile.delivery.disable_link_preview,
    );

    let pipeline = DigestPipeline::new(fetcher, synthesizer, dispatcher);

    match pipeline.run(&primary_query, target_count).await? {
        RunOutcome::NoArticles { .. } => {
            println!("No news for the selected period and queries.");
        }
        RunOutcome::Completed { digest, .. } => {
            println!("{}", digest.text);
        }
    }

    info!("News digest finished");
    Ok(())
}
