//! Gas quote tool for the vault SDK.
//!
//! This binary prints the current gas price quote of the configured gas
//! station a few times, showing when the cache serves it, and optionally
//! prepares a transaction with an estimated gas limit for raw calldata.

mod config;
mod error;

use std::{process::exit, sync::Arc, time::Duration};

use alloy::{
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::client::RpcClient,
};
use clap::Parser;
use tracing::{error, info};
use url::Url;
use vault_sdk::{
    Chain,
    config::GasStationConfig,
    gas::{BufferPolicy, GasEstimator, ProviderSimulator},
    num,
    planner::TxPlanner,
    types::{GasQuote, TxOverrides},
};

use config::{CliConfig, ConfigError, EnvConfig};
use error::Result;

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    let cli_config = CliConfig::parse();

    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(env_config, cli_config).await {
        error!(%e, "gas quote failed");
        exit(1);
    }
}

async fn run(env_config: EnvConfig, cli_config: CliConfig) -> Result<()> {
    let station = cli_config.to_station_config(GasStationConfig::from_env()?)?;
    let cache = Arc::new(station.build()?);
    info!(oracle = %station.oracle_kind()?, ?cache, "gas station ready");

    let interval = Duration::from_millis(cli_config.interval_ms);
    for sample in 1..=cli_config.samples {
        let cached = cache.is_valid();
        let quote = cache.get_price().await?;
        println!(
            "#{sample} {} {}",
            if cached { "cached " } else { "fetched" },
            describe(&quote)
        );
        if sample < cli_config.samples {
            tokio::time::sleep(interval).await;
        }
    }

    let Some(request) = cli_config.to_gas_limit_request() else {
        return Ok(());
    };

    let node_url = Url::parse(
        env_config
            .node_rpc_url
            .as_deref()
            .ok_or(ConfigError::MissingRpcUrl)?,
    )?;
    let provider =
        DynProvider::new(ProviderBuilder::new().connect_client(RpcClient::new_http(node_url)));
    let chain = Chain::from_id(provider.get_chain_id().await?)?;
    let buffer = cli_config
        .buffer
        .unwrap_or_else(|| BufferPolicy::default().for_chain(&chain));
    let request = request.with_buffer_percentage(buffer);
    info!(chain = chain.name(), buffer, "estimating gas limit");

    let planner = TxPlanner::new(cache, GasEstimator::new(ProviderSimulator::new(provider)));
    let tx = planner.prepare(&request, TxOverrides::default()).await?;
    println!("{}", serde_json::to_string_pretty(&tx)?);

    Ok(())
}

fn describe(quote: &GasQuote) -> String {
    if quote.is_empty() {
        return "network default".to_string();
    }
    let gwei = |label: &str, value: Option<u128>| {
        value.map(|v| format!("{label}={} gwei", num::GWEI.format(v)))
    };
    [
        gwei("gasPrice", quote.gas_price),
        gwei("maxPriorityFeePerGas", quote.max_priority_fee_per_gas),
        gwei("maxFeePerGas", quote.max_fee_per_gas),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}
