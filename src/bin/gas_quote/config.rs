//! Configuration for the gas quote tool.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): node URL and the
//!   `GAS_STATION_*` backend settings
//! - CLI arguments: sampling and the optional call to estimate

use alloy::primitives::{Address, Bytes};
use clap::Parser;
use vault_sdk::{config::GasStationConfig, types::GasLimitRequest};

/// Environment configuration (connection details).
#[derive(Debug, serde::Deserialize)]
pub struct EnvConfig {
    /// RPC URL of the node used for gas estimation
    pub node_rpc_url: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }
}

/// CLI arguments of the gas quote tool.
#[derive(Debug, Parser)]
#[command(name = "gas-quote")]
#[command(about = "Print cached gas price quotes and estimate gas limits")]
pub struct CliConfig {
    /// Gas oracle, overrides GAS_STATION_ORACLE
    #[arg(long)]
    pub oracle: Option<String>,

    /// Gas tier for tiered oracles (slow, average, fast)
    #[arg(long)]
    pub tier: Option<String>,

    /// Number of quotes to print
    #[arg(long, default_value = "3")]
    pub samples: u32,

    /// Delay between quotes in milliseconds
    #[arg(long, default_value = "1000")]
    pub interval_ms: u64,

    /// Contract to estimate a call against
    #[arg(long)]
    pub estimate_to: Option<Address>,

    /// Hex calldata of the call
    #[arg(long, default_value = "0x")]
    pub calldata: Bytes,

    /// Caller address of the call
    #[arg(long)]
    pub from: Option<Address>,

    /// Gas buffer percentage, chain default if not set
    #[arg(long)]
    pub buffer: Option<u32>,

    /// Gas limit to use when the estimation fails
    #[arg(long)]
    pub manual_override: Option<u64>,
}

impl CliConfig {
    /// Applies CLI overrides to the environment gas station settings.
    pub fn to_station_config(&self, mut station: GasStationConfig) -> Result<GasStationConfig, ConfigError> {
        if self.samples == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if let Some(oracle) = &self.oracle {
            station.oracle = Some(oracle.clone());
        }
        if let Some(tier) = &self.tier {
            station.tier = Some(tier.clone());
        }
        Ok(station)
    }

    /// Call to estimate, if `--estimate-to` is set. The buffer is left at
    /// the default and picked per chain by the caller.
    pub fn to_gas_limit_request(&self) -> Option<GasLimitRequest> {
        let target = self.estimate_to?;
        let mut request = GasLimitRequest::new(target, "raw", self.calldata.clone());
        if let Some(from) = self.from {
            request = request.with_caller(from);
        }
        if let Some(gas_limit) = self.manual_override {
            request = request.with_manual_override(gas_limit);
        }
        Some(request)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("samples must be at least 1")]
    ZeroSamples,

    #[error("NODE_RPC_URL is required to estimate gas")]
    MissingRpcUrl,
}
