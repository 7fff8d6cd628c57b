mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tx_watcher::{
    decode_transaction_events, registry, Config, HttpTransactionSource, PollOptions,
    TransactionPoller, TransactionResponse,
};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first
    let mut config = Config::load_from(&cli.config)?;
    if let Some(api) = &cli.api {
        config.api.address = api.clone();
    }

    // Initialize logging, RUST_LOG wins over the configured level
    init_tracing(&config.service.log_level);

    match cli.command {
        Command::Watch {
            hash,
            events,
            timeout,
            fail_fast,
        } => watch(&config, &hash, &events, timeout, fail_fast).await,
        Command::Decode { file, events } => decode(&file, &events),
        Command::Events => list_events(),
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn watch(
    config: &Config,
    hash: &str,
    events: &[String],
    timeout: Option<u64>,
    fail_fast: bool,
) -> Result<()> {
    let definitions = registry::resolve(events)?;

    let mut poller_config = config.poller.clone();
    if let Some(secs) = timeout {
        poller_config.timeout_secs = secs;
    }
    poller_config.fail_fast_on_permanent |= fail_fast;
    poller_config.validate()?;
    let options = PollOptions::from(&poller_config);

    let source = HttpTransactionSource::from_config(&config.api)?;
    info!("Using transactions API at {}", source.api_address());
    let poller = TransactionPoller::new(source).with_options(options);

    // Cancel the poll on Ctrl-C
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            signal_cancel.cancel();
        }
    });

    match poller.poll_with_cancel(hash, &definitions, &cancel).await {
        Ok(decoded) => {
            println!("{}", serde_json::to_string_pretty(&decoded)?);
            Ok(())
        }
        Err(e) => {
            error!("Watching transaction {} failed: {}", hash, e);
            Err(e.into())
        }
    }
}

fn decode(file: &std::path::Path, events: &[String]) -> Result<()> {
    let definitions = registry::resolve(events)?;
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let response: TransactionResponse = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    if response.status.is_failure() {
        warn!("Transaction status: {}", response.status);
    } else {
        info!("Transaction status: {}", response.status);
    }

    let decoded = decode_transaction_events(&response, &definitions);
    println!("{}", serde_json::to_string_pretty(&decoded)?);
    Ok(())
}

fn list_events() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&registry::all())?);
    Ok(())
}
