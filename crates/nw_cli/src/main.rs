use anyhow::Context;
use clap::Parser;
use nw_core::{ArticleStorage, BlockingArticleStorage, Error, Result};
use nw_newsapi::client::{DEFAULT_ENDPOINT, DEFAULT_QUERY};
use nw_newsapi::{NewsApiClient, NewsApiConfig};
use nw_storage::{
    BackendKind, StoreConfig, DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_URL,
};
use nw_web::{AppState, BlockingAppState};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{error, info};

mod logging;

const HEALTH_CHECK_RETRIES: u32 = 3;
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);
const HEALTH_CHECK_DELAY: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(author, version, about = "News article API over MongoDB", long_about = None)]
pub struct Cli {
    /// Storage backend
    #[arg(long, value_enum, env = "NW_STORAGE", default_value = "mongodb")]
    storage: BackendKind,
    #[arg(long, env = "NW_MONGODB_URL", default_value = DEFAULT_URL)]
    mongodb_url: String,
    #[arg(long, env = "NW_DATABASE", default_value = DEFAULT_DATABASE)]
    database: String,
    #[arg(long, env = "NW_COLLECTION", default_value = DEFAULT_COLLECTION)]
    collection: String,
    /// NewsAPI key; `fetch` and POST /fetch-news are unavailable without it
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    newsapi_key: Option<String>,
    #[arg(long, env = "NW_NEWSAPI_QUERY", default_value = DEFAULT_QUERY)]
    newsapi_query: String,
    #[arg(long, env = "NW_NEWSAPI_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    newsapi_endpoint: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Mode {
    /// Handlers await the async driver
    Nonblocking,
    /// Handlers run the sync driver on the blocking thread pool
    Blocking,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long, env = "NW_BIND", default_value = "127.0.0.1:8000")]
        bind: SocketAddr,
        #[arg(long, value_enum, env = "NW_MODE", default_value = "nonblocking")]
        mode: Mode,
        /// Runtime worker threads (nonblocking) or blocking pool size (blocking)
        #[arg(long, env = "NW_WORKERS", value_parser = clap::value_parser!(u16).range(1..))]
        workers: Option<u16>,
    },
    /// Fetch articles from NewsAPI and store them
    Fetch {
        /// Run in periodic mode with the specified interval (e.g. 1h, 30m, 1h 15m)
        #[arg(long)]
        interval: Option<humantime::Duration>,
    },
    /// Print stored articles as JSON lines
    List,
}

impl Cli {
    fn store_config(&self) -> StoreConfig {
        StoreConfig::default()
            .with_url(self.mongodb_url.clone())
            .with_database(self.database.clone())
            .with_collection(self.collection.clone())
    }

    fn news_api_config(&self) -> Option<NewsApiConfig> {
        self.newsapi_key.as_ref().map(|key| {
            NewsApiConfig::new(key.clone())
                .with_endpoint(self.newsapi_endpoint.clone())
                .with_query(self.newsapi_query.clone())
        })
    }
}

type HealthCheck = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Run `check` until it passes, giving each attempt `HEALTH_CHECK_TIMEOUT`
/// and waiting `HEALTH_CHECK_DELAY` between attempts.
async fn check_storage_with_retry<F>(check: F, storage_type: BackendKind) -> Result<()>
where
    F: Fn() -> HealthCheck,
{
    let mut retries = 0;
    let mut last_error = None;

    while retries < HEALTH_CHECK_RETRIES {
        match tokio::time::timeout(HEALTH_CHECK_TIMEOUT, check()).await {
            Ok(Ok(())) => {
                info!("🏦 Storage backend is reachable (using {})", storage_type);
                return Ok(());
            }
            Ok(Err(e)) => last_error = Some(e),
            Err(timeout_error) => {
                last_error = Some(Error::Storage(format!(
                    "Storage health check timed out: {}",
                    timeout_error
                )));
            }
        }
        retries += 1;
        if retries < HEALTH_CHECK_RETRIES {
            info!(
                "Storage health check failed, retrying {}/{}...",
                retries, HEALTH_CHECK_RETRIES
            );
            tokio::time::sleep(HEALTH_CHECK_DELAY).await;
        }
    }

    Err(last_error.unwrap_or_else(|| {
        Error::Storage("Storage health check failed after all retries".to_string())
    }))
}

/// Ping, then create indexes. Both need the server, so both are retried.
fn async_health_check(storage: &Arc<dyn ArticleStorage>) -> impl Fn() -> HealthCheck {
    let storage = storage.clone();
    move || -> HealthCheck {
        let storage = storage.clone();
        Box::pin(async move {
            storage.ping().await?;
            storage.prepare().await
        })
    }
}

fn blocking_health_check(storage: &Arc<dyn BlockingArticleStorage>) -> impl Fn() -> HealthCheck {
    let storage = storage.clone();
    move || -> HealthCheck {
        let storage = storage.clone();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                storage.ping()?;
                storage.prepare()
            })
            .await
            .map_err(|e| Error::Storage(format!("Storage health check panicked: {}", e)))?
        })
    }
}

async fn open_storage(cli: &Cli) -> Result<Arc<dyn ArticleStorage>> {
    let storage = nw_storage::create_storage(cli.storage, &cli.store_config())
        .await
        .with_context(|| format!("Failed to open {} storage", cli.storage))?;
    Ok(storage)
}

fn open_blocking_storage(cli: &Cli) -> Result<Arc<dyn BlockingArticleStorage>> {
    let storage = nw_storage::create_blocking_storage(cli.storage, &cli.store_config())
        .with_context(|| format!("Failed to open {} storage (blocking)", cli.storage))?;
    Ok(storage)
}

fn build_runtime(mode: Mode, workers: Option<u16>) -> Result<Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(workers) = workers.map(usize::from) {
        match mode {
            Mode::Nonblocking => builder.worker_threads(workers),
            Mode::Blocking => builder.max_blocking_threads(workers),
        };
    }
    let runtime = builder.build().context("Failed to build the tokio runtime")?;
    Ok(runtime)
}

fn serve(cli: &Cli, bind: SocketAddr, mode: Mode, workers: Option<u16>) -> Result<()> {
    let news_api = cli.news_api_config();
    if news_api.is_none() {
        info!("🔑 NEWSAPI_KEY not set, POST /fetch-news is disabled");
    }

    match mode {
        Mode::Nonblocking => {
            let runtime = build_runtime(mode, workers)?;
            runtime.block_on(async {
                let storage = open_storage(cli).await?;
                check_storage_with_retry(async_health_check(&storage), cli.storage).await?;

                let mut state = AppState::new(storage);
                if let Some(news_api) = news_api {
                    state = state.with_news_api(NewsApiClient::new(news_api)?);
                }
                info!("⚡ Serving in non-blocking mode");
                nw_web::serve(nw_web::create_app(state), bind).await
            })
        }
        Mode::Blocking => {
            // The sync driver must be built outside the runtime.
            let storage = open_blocking_storage(cli)?;
            let runtime = build_runtime(mode, workers)?;
            runtime.block_on(async {
                check_storage_with_retry(blocking_health_check(&storage), cli.storage).await?;

                let mut state = BlockingAppState::new(storage);
                if let Some(news_api) = news_api {
                    state = state.with_news_api(news_api);
                }
                info!("🧱 Serving in blocking mode");
                nw_web::serve(nw_web::create_blocking_app(state), bind).await
            })
        }
    }
}

async fn fetch(cli: &Cli, interval: Option<Duration>) -> Result<()> {
    let news_api = cli
        .news_api_config()
        .ok_or_else(|| Error::NewsApi("NEWSAPI_KEY is not set".to_string()))?;
    let client = NewsApiClient::new(news_api)?;

    let storage = open_storage(cli).await?;
    check_storage_with_retry(async_health_check(&storage), cli.storage).await?;

    let Some(interval) = interval else {
        let report = nw_newsapi::fetch_and_store(&client, storage.as_ref()).await?;
        info!("✅ {}", report.message());
        return Ok(());
    };

    info!("Running in periodic mode with {} interval", humantime::format_duration(interval));
    loop {
        info!("Starting fetch cycle");
        match nw_newsapi::fetch_and_store(&client, storage.as_ref()).await {
            Ok(report) => info!(
                "✅ {} ({} new, {} updated, {} unchanged, {} skipped)",
                report.message(),
                report.new,
                report.updated,
                report.unchanged,
                report.skipped
            ),
            Err(e) => error!("Error during fetch: {}", e),
        }
        info!("Waiting {} before next fetch", humantime::format_duration(interval));
        tokio::time::sleep(interval).await;
    }
}

async fn list(cli: &Cli) -> Result<()> {
    let storage = open_storage(cli).await?;
    for article in storage.list_articles().await? {
        println!("{}", serde_json::to_string(&article)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logging();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { bind, mode, workers } => serve(&cli, *bind, *mode, *workers),
        Commands::Fetch { interval } => {
            let interval = interval.as_ref().map(|d| **d);
            build_runtime(Mode::Nonblocking, None)?.block_on(fetch(&cli, interval))
        }
        Commands::List => build_runtime(Mode::Nonblocking, None)?.block_on(list(&cli)),
    }
}
