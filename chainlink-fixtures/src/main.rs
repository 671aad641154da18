//! Chainlink round fixture generator CLI.
//!
//! Reads the latest round and the preceding rounds of every price feed
//! registered for a network and writes them to a JSON fixture.
//!
//! # Usage
//!
//! ```bash
//! # Ten rounds per mainnet feed into test/data.json, endpoint from $API_TEMPLATE
//! API_TEMPLATE=https://{network}.infura.io/v3/<key> chainlink-fixtures fetch
//!
//! # Three rounds per Polygon feed via an explicit endpoint
//! chainlink-fixtures fetch --chain polygon-mainnet --rounds 3 --rpc https://polygon-rpc.com
//!
//! # Show the feed registry
//! chainlink-fixtures list
//!
//! # Read description, decimals and latest round of each feed
//! chainlink-fixtures describe --chain mainnet
//! ```

use std::path::PathBuf;

use alloy::providers::{Provider, ProviderBuilder};
use alloy::transports::http::reqwest::Url;
use anyhow::{Context, Result};
use chainlink_fixtures::config::{self, Config};
use chainlink_fixtures::output;
use chainlink_rounds::history::{self, DEFAULT_ROUNDS};
use chainlink_rounds::{Network, ProviderSource, RoundSource};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

/// Chainlink price-feed round fixture generator.
#[derive(Debug, Parser)]
#[command(name = "chainlink-fixtures", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Options shared by commands that talk to an RPC endpoint.
#[derive(Debug, Args)]
struct RpcArgs {
    /// Network whose feeds are read.
    #[arg(long, default_value = Network::DEFAULT.name())]
    chain: String,

    /// RPC endpoint or template; `{network}` is replaced by the network name.
    #[arg(long, env = config::RPC_ENV)]
    rpc: Option<String>,

    /// Optional TOML configuration file.
    #[arg(long, default_value = "chainlink-fixtures.toml")]
    config: PathBuf,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Collect round history for every feed of a network and write the fixture.
    Fetch {
        #[command(flatten)]
        rpc: RpcArgs,

        /// Records per feed, including the latest round.
        #[arg(
            long,
            default_value_t = DEFAULT_ROUNDS,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        rounds: usize,

        /// Fixture path; overwritten if it exists.
        #[arg(long, default_value = output::DEFAULT_OUTPUT)]
        output: PathBuf,
    },

    /// Print feed metadata and latest round for every feed of a network.
    Describe {
        #[command(flatten)]
        rpc: RpcArgs,
    },

    /// List all known networks and feeds.
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Fetch {
            rpc,
            rounds,
            output,
        } => cmd_fetch(rpc, rounds, output).await,
        Command::Describe { rpc } => cmd_describe(rpc).await,
        Command::List => {
            cmd_list();
            Ok(())
        }
    }
}

/// Resolve network and endpoint, then build a provider-backed round source.
///
/// The network name is validated before anything touches the network.
fn connect(args: &RpcArgs) -> Result<(Network, ProviderSource<impl Provider>)> {
    let network = Network::from_name(&args.chain)?;
    let config = Config::load(&args.config)?;
    let url = config.resolve_rpc(network, args.rpc.as_deref())?;

    tracing::info!(%network, host = host_of(&url), "connecting");

    let provider = ProviderBuilder::new().connect_http(url);
    Ok((
        network,
        ProviderSource::new(provider).with_timeout(config.timeout()),
    ))
}

/// Host part of an endpoint; the full URL often carries an API key.
fn host_of(url: &Url) -> &str {
    url.host_str().unwrap_or("<none>")
}

/// Execute the `fetch` subcommand.
async fn cmd_fetch(args: RpcArgs, rounds: usize, out_path: PathBuf) -> Result<()> {
    let (network, source) = connect(&args)?;

    tracing::info!(%network, rounds, output = %out_path.display(), "starting fetch");

    let fixture = history::collect_network(&source, network, rounds)
        .await
        .with_context(|| format!("collecting {network} rounds"))?;

    output::write_fixture(&out_path, &fixture)
        .with_context(|| format!("writing {}", out_path.display()))?;

    tracing::info!(%network, feeds = fixture.len(), rounds, "fetch finished");
    Ok(())
}

/// Render a feed's `updatedAt` as a UTC timestamp.
fn format_updated_at(updated_at: alloy::primitives::U256) -> String {
    i64::try_from(updated_at)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map_or_else(|| updated_at.to_string(), |t| t.to_rfc3339())
}

/// Execute the `describe` subcommand.
#[allow(clippy::print_stdout, reason = "command output")]
async fn cmd_describe(args: RpcArgs) -> Result<()> {
    let (network, source) = connect(&args)?;

    println!(
        "{:<6} {:<44} {:<14} {:<9} {:<8} {:<22} Updated",
        "Token", "Oracle", "Description", "Decimals", "Version", "Round"
    );
    println!("{}", "-".repeat(130));

    for feed in network.feeds() {
        let meta = source
            .metadata(feed.address)
            .await
            .with_context(|| format!("reading {} metadata", feed.token))?;
        let latest = source
            .latest_round_data(feed.address)
            .await
            .with_context(|| format!("reading {} latest round", feed.token))?;
        println!(
            "{:<6} {:<44} {:<14} {:<9} {:<8} {:<22} {}",
            feed.token.symbol(),
            feed.address.to_checksum(None),
            meta.description,
            meta.decimals,
            meta.version,
            latest.round_id,
            format_updated_at(latest.updated_at),
        );
    }

    Ok(())
}

/// Execute the `list` subcommand.
#[allow(clippy::print_stdout, reason = "command output")]
fn cmd_list() {
    println!("{:<18} {:<10} {:<6} Oracle", "Network", "Chain ID", "Token");
    println!("{}", "-".repeat(80));

    for network in Network::ALL {
        for feed in network.feeds() {
            println!(
                "{:<18} {:<10} {:<6} {}",
                network.name(),
                network.chain_id(),
                feed.token.symbol(),
                feed.address.to_checksum(None),
            );
        }
    }
}
