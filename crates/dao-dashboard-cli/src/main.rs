use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dao_dashboard_cache::{AuctionEventBinding, CacheState, DashboardCache, DashboardView, RpcLogWatcher};
use dao_dashboard_sync::{DashboardAggregator, DashboardClient, RpcProposalStateResolver};
use dao_dashboard_types::Address;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod render;

use crate::config::{DashboardConfig, RpcOverride};
use crate::render::{render_tx_types, render_view};

#[derive(Parser)]
#[clap(author, version, about = "DAO dashboard: auctions and open proposals for a wallet", long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// JSON configuration file
    #[clap(long)]
    config: Option<PathBuf>,

    /// Dashboard API base URL
    #[clap(long)]
    api_url: Option<String>,

    /// JSON-RPC endpoint for a chain, as CHAIN=URL (repeatable)
    #[clap(long = "rpc", value_name = "CHAIN=URL")]
    rpc: Vec<RpcOverride>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dashboard for an address once
    Show {
        /// Wallet address
        address: Address,
    },

    /// Keep the dashboard up to date with auction events until Ctrl-C
    Watch {
        /// Wallet address
        address: Address,
    },

    /// List the transaction builder shortcuts
    TxTypes,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "dao_dashboard=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    config.apply_overrides(cli.api_url.clone(), &cli.rpc);

    match &cli.command {
        Commands::Show { address } => show(&config, address).await,
        Commands::Watch { address } => watch(&config, address).await,
        Commands::TxTypes => {
            print!("{}", render_tx_types());
            Ok(())
        }
    }
}

fn build_cache(config: &DashboardConfig) -> Result<Arc<DashboardCache>> {
    let client = DashboardClient::new(&config.client_config())
        .context("Failed to create dashboard API client")?;

    let resolver = config
        .rpc_clients()?
        .into_iter()
        .fold(RpcProposalStateResolver::new(), |resolver, (chain, rpc)| {
            resolver.with_endpoint(chain, rpc)
        });

    let aggregator = DashboardAggregator::new(Arc::new(client), Arc::new(resolver));
    Ok(Arc::new(DashboardCache::new(Arc::new(aggregator))))
}

fn print_state(config: &DashboardConfig, address: &Address, state: &CacheState) {
    let view = DashboardView::resolve(Some(address), state, Utc::now(), &config.view_config());
    print!("{}", render_view(Some(address), &view));
}

async fn show(config: &DashboardConfig, address: &Address) -> Result<()> {
    let cache = build_cache(config)?;

    let outcome = cache.get(address).await;
    print_state(config, address, &cache.peek(address).await);

    outcome.map(|_| ()).context("Dashboard could not be loaded")
}

async fn watch(config: &DashboardConfig, address: &Address) -> Result<()> {
    let cache = build_cache(config)?;

    let watcher = config
        .rpc_clients()?
        .into_iter()
        .fold(RpcLogWatcher::new(config.poll_interval()), |watcher, (chain, rpc)| {
            watcher.with_chain(chain, rpc)
        });

    let result = cache.get(address).await;
    print_state(config, address, &cache.peek(address).await);
    let result = result.context("Initial dashboard load failed")?;

    let mut binding = AuctionEventBinding::bind(cache.clone(), &watcher, address, &result);
    let mut updates = cache.subscribe(address).await;
    updates.borrow_and_update();

    println!("{}", "Watching for auction events, Ctrl-C to stop".dimmed());

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    warn!("Cache entry for {} went away", address);
                    break;
                }

                let state = updates.borrow_and_update().state.clone();
                if state.is_pending() {
                    continue;
                }

                print_state(config, address, &state);
                if let CacheState::Ready(result) = &state {
                    binding.rebind(cache.clone(), &watcher, result);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch for {}", address);
                break;
            }
        }
    }

    Ok(())
}
