use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod fetcher;
use fetcher::FetcherClient;

mod ledger;
use ledger::LedgerStore;

mod server;
use server::{run_server, RequestsLoggingLevel, ServerConfig};

#[derive(Parser, Debug)]
struct CliArgs {
    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// URL of the fetcher service for catalog search and audio extraction.
    #[clap(long)]
    pub fetcher_url: Option<String>,

    /// Timeout in seconds for fetcher requests.
    #[clap(long, default_value_t = 300)]
    pub fetcher_timeout_sec: u64,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let ledger = LedgerStore::new();

    // Create fetcher client if URL is configured
    let fetcher_client = cli_args.fetcher_url.map(|url| {
        info!("Fetcher service configured at {}", url);
        Arc::new(FetcherClient::new(url, cli_args.fetcher_timeout_sec))
    });

    if let Some(client) = &fetcher_client {
        if let Err(err) = client.health_check().await {
            info!("Fetcher service not reachable yet: {}", err);
        }
    }

    let media_fetcher = fetcher_client
        .clone()
        .map(|c| c as Arc<dyn fetcher::MediaFetcher>);
    let catalog_search = fetcher_client.map(|c| c as Arc<dyn fetcher::CatalogSearch>);

    let config = ServerConfig {
        requests_logging_level: cli_args.logging_level,
        port: cli_args.port,
        frontend_dir_path: cli_args.frontend_dir_path,
    };

    info!("Ready to serve at port {}!", config.port);
    run_server(ledger, media_fetcher, catalog_search, config).await
}
