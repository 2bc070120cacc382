use std::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU8, Ordering},
};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::PriceFetcher;
use crate::{error::GasError, num, types::GasQuote};

const ETHERSCAN_API: &str = "https://api.etherscan.io/api";

/// Speed tier of a multi-tier gas price recommendation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GasTier {
    Slow = 0,
    Average = 1,
    #[default]
    Fast = 2,
}

impl GasTier {
    fn from_repr(value: u8) -> Self {
        match value {
            0 => Self::Slow,
            1 => Self::Average,
            _ => Self::Fast,
        }
    }
}

impl fmt::Display for GasTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Slow => "slow",
            Self::Average => "average",
            Self::Fast => "fast",
        })
    }
}

impl FromStr for GasTier {
    type Err = GasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slow" | "safe" => Ok(Self::Slow),
            "average" | "propose" | "standard" => Ok(Self::Average),
            "fast" => Ok(Self::Fast),
            other => Err(GasError::config(format!("unknown gas tier {other:?}"))),
        }
    }
}

/// Legacy gas price picked from the slow/average/fast recommendation of
/// the Etherscan gas tracker.
///
/// The tier can be switched at any time through a shared reference; the
/// switch takes effect on the next fetch.
#[derive(derive_more::Debug)]
pub struct TieredGasOracle {
    endpoint: String,
    #[debug(skip)]
    api_key: Option<String>,
    #[debug("{}", GasTier::from_repr(tier.load(Ordering::Relaxed)))]
    tier: AtomicU8,
    #[debug(skip)]
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GasOracleResponse {
    #[serde(default)]
    message: Option<String>,
    result: GasOracleResult,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GasOracleResult {
    Tiers(GasOracleTiers),
    Message(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GasOracleTiers {
    slow_gas_price: String,
    propose_gas_price: String,
    fast_gas_price: String,
}

impl GasOracleTiers {
    fn select(&self, tier: GasTier) -> &str {
        match tier {
            GasTier::Slow => &self.slow_gas_price,
            GasTier::Average => &self.propose_gas_price,
            GasTier::Fast => &self.fast_gas_price,
        }
    }
}

impl TieredGasOracle {
    pub fn etherscan(api_key: Option<String>, tier: GasTier) -> Self {
        Self::with_endpoint(ETHERSCAN_API, api_key, tier)
    }

    /// Gas tracker API compatible with Etherscan served from `endpoint`.
    pub fn with_endpoint(endpoint: impl Into<String>, api_key: Option<String>, tier: GasTier) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            tier: AtomicU8::new(tier as u8),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn tier(&self) -> GasTier {
        GasTier::from_repr(self.tier.load(Ordering::Relaxed))
    }

    pub fn set_tier(&self, tier: GasTier) {
        self.tier.store(tier as u8, Ordering::Relaxed);
    }

    fn request_url(&self) -> Result<Url, GasError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| GasError::config("etherscan api key is not configured"))?;
        Url::parse_with_params(
            &self.endpoint,
            &[
                ("module", "gastracker"),
                ("action", "gasoracle"),
                ("apikey", api_key),
            ],
        )
        .map_err(|e| GasError::config(format!("etherscan endpoint: {e}")))
    }
}

#[async_trait]
impl PriceFetcher for TieredGasOracle {
    fn name(&self) -> &'static str {
        "etherscan"
    }

    #[instrument(skip_all, err)]
    async fn fetch_quote(&self) -> Result<GasQuote, GasError> {
        let url = self.request_url()?;
        let upstream = |e: reqwest::Error| GasError::upstream("etherscan", e.without_url());

        let response: GasOracleResponse = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        let tier = self.tier();
        let gas_price =
            gas_price_from_response(&response, tier).map_err(|e| GasError::upstream("etherscan", e))?;
        debug!(%tier, gas_price_gwei = %num::GWEI.format(gas_price), "tiered gas price fetched");
        Ok(GasQuote::legacy(gas_price))
    }
}

fn gas_price_from_response(response: &GasOracleResponse, tier: GasTier) -> Result<u128, String> {
    match &response.result {
        GasOracleResult::Tiers(tiers) => num::GWEI
            .parse(tiers.select(tier))
            .map_err(|e| e.to_string()),
        GasOracleResult::Message(message) => Err(format!(
            "{}: {message}",
            response.message.as_deref().unwrap_or("error")
        )),
    }
}
