//! # search_app
//!
//! Runs one search through the search store and prints the results.
//!
//! ## Startup Sequence
//!
//! 1. Parse CLI arguments and initialise structured logging.
//! 2. Connect a NATS fetch source to the search service subject.
//! 3. Build the search store and watch its loading flag.
//! 4. Call `fetch_search_result` and print the ordered results.

mod output;
mod search;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use store_core::{SettlementPolicy, StoreFactory};
use store_net::{Encoding, NatsSource, NatsSourceConfig};

use search::{SearchQuery, SearchStore};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Only the most recent search may update the results.
    LatestOnly,
    /// The search that settles last wins.
    LastSettled,
}

impl From<PolicyArg> for SettlementPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::LatestOnly => SettlementPolicy::LatestOnly,
            PolicyArg::LastSettled => SettlementPolicy::LastSettled,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    Json,
    Messagepack,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Json => Encoding::Json,
            EncodingArg::Messagepack => Encoding::MessagePack,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "search_app", about = "Search documents through a NATS search service")]
struct Args {
    /// Free-text query
    query: String,

    /// Search method (repeatable)
    #[arg(short, long = "method")]
    methods: Vec<String>,

    /// Corpus id to search in (repeatable)
    #[arg(short, long = "corpus")]
    corpora: Vec<i64>,

    /// NATS server URL (defaults to $NATS_URL or nats://localhost:4222)
    #[arg(short, long)]
    nats_url: Option<String>,

    /// Subject the search service answers on
    #[arg(short, long, default_value = "dualtext.search")]
    subject: String,

    /// Reply timeout in milliseconds
    #[arg(short, long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Payload encoding
    #[arg(long, value_enum, default_value = "json")]
    encoding: EncodingArg,

    /// Settlement policy for overlapping searches
    #[arg(long, value_enum, default_value = "latest-only")]
    policy: PolicyArg,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn search_query(&self) -> SearchQuery {
        let query = self
            .methods
            .iter()
            .fold(SearchQuery::new(&self.query), |query, method| query.method(method));
        self.corpora
            .iter()
            .fold(query, |query, &corpus| query.corpus(corpus))
    }

    fn source_config(&self) -> NatsSourceConfig {
        let config = NatsSourceConfig::new(&self.subject)
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_encoding(self.encoding.into());
        match &self.nats_url {
            Some(url) => config.with_nats_url(url),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("search_app=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let query = args.search_query();

    let source: NatsSource<SearchQuery, search::Document> =
        NatsSource::connect(args.source_config()).await?;
    let factory = StoreFactory::new().with_policy(args.policy.into());
    let store = SearchStore::new(&factory, source);

    let watcher = search::watch_loading(store.view());

    info!(query = query.query, methods = ?query.method, corpora = ?query.corpus, "searching");
    let outcome = store.fetch_search_result(&query).await;

    let results = store.results();
    let loading = store.is_loading();
    drop(store);
    match watcher.await {
        Ok(transitions) => debug!(transitions, "loading watcher finished"),
        Err(err) => warn!(error = %err, "loading watcher stopped unexpectedly"),
    }

    let settlement = outcome?;
    info!(?settlement, count = results.len(), loading, "search complete");

    if args.json {
        println!("{}", output::render_json(&results)?);
    } else {
        print!("{}", output::render_table(&results));
    }
    Ok(())
}
