//! Gas station configuration from `GAS_STATION_*` environment variables.
//!
//! | Variable                           | Meaning                                   |
//! |------------------------------------|-------------------------------------------|
//! | `GAS_STATION_ORACLE`               | backend, see [`OracleKind`]               |
//! | `GAS_STATION_API_KEY`              | key of the hosted backend                 |
//! | `GAS_STATION_VALIDITY_MS`          | cache validity window, default 10000      |
//! | `GAS_STATION_TIER`                 | `slow`, `average` or `fast` (etherscan)   |
//! | `GAS_STATION_FIXED_GAS_PRICE_GWEI` | price of the `fixed` backend              |
//! | `GAS_STATION_RPC_URL`              | node of the `node` backend                |
//!
//! Values are only validated when the cache is built, so a bad oracle name
//! surfaces as [`GasError::Configuration`] rather than as an env error.

use std::{fmt, str::FromStr, time::Duration};

use url::Url;

use crate::{
    error::GasError,
    gas::{
        GasPriceCache, GasTier, PriceFetcher,
        fetcher::{FixedGasPrice, NetworkDefault, PriorityFeeRpc, TieredGasOracle},
    },
    num,
};

const ENV_PREFIX: &str = "GAS_STATION_";

/// Upstream the gas station reads prices from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OracleKind {
    #[default]
    NetworkDefault,
    Fixed,
    Polygon,
    Infura,
    Alchemy,
    Etherscan,
    Node,
}

impl fmt::Display for OracleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NetworkDefault => "default",
            Self::Fixed => "fixed",
            Self::Polygon => "polygon",
            Self::Infura => "infura",
            Self::Alchemy => "alchemy",
            Self::Etherscan => "etherscan",
            Self::Node => "node",
        })
    }
}

impl FromStr for OracleKind {
    type Err = GasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "default" | "network-default" => Ok(Self::NetworkDefault),
            "fixed" => Ok(Self::Fixed),
            "polygon" => Ok(Self::Polygon),
            "infura" => Ok(Self::Infura),
            "alchemy" => Ok(Self::Alchemy),
            "etherscan" => Ok(Self::Etherscan),
            "node" => Ok(Self::Node),
            other => Err(GasError::config(format!("unknown gas oracle {other:?}"))),
        }
    }
}

#[derive(Clone, Default, derive_more::Debug, serde::Deserialize)]
pub struct GasStationConfig {
    pub oracle: Option<String>,

    #[debug(skip)]
    pub api_key: Option<String>,

    pub validity_ms: Option<u64>,

    pub tier: Option<String>,

    pub fixed_gas_price_gwei: Option<String>,

    pub rpc_url: Option<Url>,
}

impl GasStationConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed(ENV_PREFIX).from_env()
    }

    /// Config from explicit prefixed `(name, value)` pairs, e.g.
    /// `("GAS_STATION_ORACLE", "etherscan")`.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX).from_iter(pairs)
    }

    pub fn oracle_kind(&self) -> Result<OracleKind, GasError> {
        self.oracle.as_deref().map_or(Ok(OracleKind::default()), |s| s.parse())
    }

    pub fn tier(&self) -> Result<GasTier, GasError> {
        self.tier.as_deref().map_or(Ok(GasTier::default()), |s| s.parse())
    }

    pub fn validity_window(&self) -> Duration {
        self.validity_ms
            .map_or(crate::gas::DEFAULT_VALIDITY_WINDOW, Duration::from_millis)
    }

    /// Backend selected by [`Self::oracle`].
    pub fn fetcher(&self) -> Result<Box<dyn PriceFetcher>, GasError> {
        let fetcher: Box<dyn PriceFetcher> = match self.oracle_kind()? {
            OracleKind::NetworkDefault => Box::new(NetworkDefault),
            OracleKind::Fixed => {
                let gwei = self.fixed_gas_price_gwei.as_deref().ok_or_else(|| {
                    GasError::config("fixed oracle needs GAS_STATION_FIXED_GAS_PRICE_GWEI")
                })?;
                let gas_price = num::GWEI
                    .parse(gwei)
                    .map_err(|e| GasError::config(format!("fixed gas price: {e}")))?;
                Box::new(FixedGasPrice::new(gas_price))
            }
            OracleKind::Polygon => Box::new(FixedGasPrice::polygon()),
            OracleKind::Infura => Box::new(PriorityFeeRpc::infura_mainnet(self.api_key.clone())),
            OracleKind::Alchemy => Box::new(PriorityFeeRpc::alchemy_arbitrum(self.api_key.clone())),
            OracleKind::Etherscan => Box::new(TieredGasOracle::etherscan(
                self.api_key.clone(),
                self.tier()?,
            )),
            OracleKind::Node => {
                let url = self
                    .rpc_url
                    .clone()
                    .ok_or_else(|| GasError::config("node oracle needs GAS_STATION_RPC_URL"))?;
                Box::new(PriorityFeeRpc::node(url))
            }
        };
        Ok(fetcher)
    }

    pub fn build(&self) -> Result<GasPriceCache, GasError> {
        GasPriceCache::with_validity_window(self.fetcher()?, self.validity_window())
    }
}
