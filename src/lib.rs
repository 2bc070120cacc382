//! Vault SDK gas station.
//!
//! # Overview
//!
//! Client-side pricing of state-changing calls to the vault contracts.
//!
//! Use [`gas::GasPriceCache`] with one of the [`gas::fetcher`] backends to
//! get the current gas price terms without hitting the upstream on every
//! call, and [`gas::GasEstimator`] to get a buffered gas limit for a call
//! described by [`types::GasLimitRequest`].
//!
//! [`planner::TxPlanner`] combines both into a ready
//! [`alloy::rpc::types::TransactionRequest`], with caller
//! [`types::TxOverrides`] taking precedence over the estimate, and the
//! estimate over the quote.
//!
//! [`config::GasStationConfig`] builds a cache from `GAS_STATION_*`
//! environment variables.
//!
//! See `./tests` for examples.
//!
//! # Limitations/follow-ups
//!
//! * Quotes are refreshed on demand only, there is no background refresh.
//!
//! * Failed upstream calls and simulations are not retried.
//!
//! # Testing
//!
//! [`testing`] module provides scripted fetcher and simulator doubles.

pub mod config;
pub mod deployment;
pub mod error;
pub mod gas;
pub mod num;
pub mod planner;
pub mod testing;
pub mod types;

use alloy::primitives::{Address, address};

use crate::error::GasError;

const ETHEREUM_MAINNET_ID: u64 = 1;
const ARBITRUM_ONE_ID: u64 = 42161;

const ETHEREUM_MAINNET_TOKENS: &[(&str, Address)] = &[
    ("stETH", address!("0xae7ab96520DE3A18E5e111B5EaAb095312D7fE84")),
    ("USDT", address!("0xdAC17F958D2ee523a2206206994597C13D831ec7")),
    ("wBTC", address!("0x2260fac5e5542a773aa44fbcfedf7c193bc2c599")),
];

const ARBITRUM_ONE_TOKENS: &[(&str, Address)] = &[
    ("USDT", address!("0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9")),
    ("wBTC", address!("0x2f2a2543b76a4166549f7aab2e75bef0aefc5b0f")),
];

#[derive(Clone, Debug, PartialEq, Eq)]
/// Chain the vault contracts are deployed on.
pub struct Chain {
    chain_id: u64,
    name: &'static str,
    tokens: &'static [(&'static str, Address)],
}

impl Chain {
    pub fn ethereum_mainnet() -> Self {
        Self {
            chain_id: ETHEREUM_MAINNET_ID,
            name: "ethereum-mainnet",
            tokens: ETHEREUM_MAINNET_TOKENS,
        }
    }

    pub fn arbitrum_one() -> Self {
        Self {
            chain_id: ARBITRUM_ONE_ID,
            name: "arbitrum-one-mainnet",
            tokens: ARBITRUM_ONE_TOKENS,
        }
    }

    /// Supported chain with the given numeric id.
    pub fn from_id(chain_id: u64) -> Result<Self, GasError> {
        match chain_id {
            ETHEREUM_MAINNET_ID => Ok(Self::ethereum_mainnet()),
            ARBITRUM_ONE_ID => Ok(Self::arbitrum_one()),
            other => Err(GasError::config(format!("unsupported chain id {other}"))),
        }
    }

    pub fn is_supported(chain_id: u64) -> bool {
        Self::from_id(chain_id).is_ok()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_ethereum_mainnet(&self) -> bool {
        self.chain_id == ETHEREUM_MAINNET_ID
    }

    /// Address of a well-known token by symbol, case-insensitive.
    pub fn token(&self, symbol: &str) -> Option<Address> {
        self.tokens
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(symbol))
            .map(|(_, address)| *address)
    }

    pub fn tokens(&self) -> &'static [(&'static str, Address)] {
        self.tokens
    }
}
