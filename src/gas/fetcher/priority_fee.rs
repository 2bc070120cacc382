use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use super::PriceFetcher;
use crate::{
    error::GasError,
    num,
    types::{GasPrice, GasQuote},
};

const INFURA_MAINNET: &str = "https://mainnet.infura.io/v3/";
const ALCHEMY_ARBITRUM: &str = "https://arb-mainnet.g.alchemy.com/v2/";

const MAX_PRIORITY_FEE_METHOD: &str = "eth_maxPriorityFeePerGas";

/// Where a [`PriorityFeeRpc`] sends its JSON-RPC request.
#[derive(Clone, derive_more::Debug)]
pub enum RpcEndpoint {
    /// Hosted provider addressed as `{base}{api_key}`. The key is checked
    /// when the first request is made.
    Keyed {
        base: String,
        #[debug(skip)]
        api_key: Option<String>,
    },

    /// Complete node URL, e.g. a self-hosted node.
    Url(Url),
}

impl RpcEndpoint {
    fn resolve(&self, source_name: &'static str) -> Result<Url, GasError> {
        match self {
            Self::Keyed { base, api_key } => {
                let api_key = api_key
                    .as_deref()
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| {
                        GasError::config(format!("{source_name} api key is not configured"))
                    })?;
                Url::parse(&format!("{base}{api_key}"))
                    .map_err(|e| GasError::config(format!("{source_name} endpoint: {e}")))
            }
            Self::Url(url) => Ok(url.clone()),
        }
    }
}

/// EIP-1559 tip recommendation fetched with `eth_maxPriorityFeePerGas`
/// from a JSON-RPC node.
#[derive(Clone, derive_more::Debug)]
pub struct PriorityFeeRpc {
    name: &'static str,
    endpoint: RpcEndpoint,
    #[debug(skip)]
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: [(); 0],
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<String>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl PriorityFeeRpc {
    pub fn new(name: &'static str, endpoint: RpcEndpoint) -> Self {
        Self {
            name,
            endpoint,
            http: reqwest::Client::new(),
        }
    }

    /// Infura, Ethereum mainnet.
    pub fn infura_mainnet(api_key: Option<String>) -> Self {
        Self::new(
            "infura",
            RpcEndpoint::Keyed {
                base: INFURA_MAINNET.to_string(),
                api_key,
            },
        )
    }

    /// Alchemy, Arbitrum One.
    pub fn alchemy_arbitrum(api_key: Option<String>) -> Self {
        Self::new(
            "alchemy",
            RpcEndpoint::Keyed {
                base: ALCHEMY_ARBITRUM.to_string(),
                api_key,
            },
        )
    }

    /// Any node exposing `eth_maxPriorityFeePerGas`.
    pub fn node(url: Url) -> Self {
        Self::new("node", RpcEndpoint::Url(url))
    }

    /// Shares a connection pool with other upstream clients.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn endpoint(&self) -> &RpcEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl PriceFetcher for PriorityFeeRpc {
    fn name(&self) -> &'static str {
        self.name
    }

    #[instrument(skip_all, err)]
    async fn fetch_quote(&self) -> Result<GasQuote, GasError> {
        let url = self.endpoint.resolve(self.name)?;
        let upstream = |e: reqwest::Error| GasError::upstream(self.name, e.without_url());

        let response: JsonRpcResponse = self
            .http
            .post(url)
            .json(&JsonRpcRequest {
                jsonrpc: "2.0",
                id: 1,
                method: MAX_PRIORITY_FEE_METHOD,
                params: [],
            })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(upstream)?
            .json()
            .await
            .map_err(upstream)?;

        let tip = priority_fee_from_response(response)
            .map_err(|reason| GasError::upstream(self.name, reason))?;
        debug!(max_priority_fee_gwei = %num::GWEI.format(tip), "priority fee fetched");
        Ok(GasQuote::priority_fee(tip))
    }
}

fn priority_fee_from_response(response: JsonRpcResponse) -> Result<GasPrice, String> {
    match response {
        JsonRpcResponse {
            error: Some(JsonRpcError { code, message }),
            ..
        } => Err(format!("rpc error {code}: {message}")),
        JsonRpcResponse {
            result: Some(result),
            ..
        } => parse_quantity(&result),
        _ => Err("response has neither result nor error".to_string()),
    }
}

/// Parses a JSON-RPC hex quantity such as `"0x3b9aca00"`.
fn parse_quantity(value: &str) -> Result<GasPrice, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| format!("quantity {value:?} is not 0x-prefixed"))?;
    if digits.is_empty() {
        return Err(format!("quantity {value:?} has no digits"));
    }
    GasPrice::from_str_radix(digits, 16).map_err(|e| format!("quantity {value:?}: {e}"))
}
