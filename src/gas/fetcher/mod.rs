//! Upstream gas-price sources a [`super::GasPriceCache`] can be built on.

mod fixed;
mod priority_fee;
mod tiered;

use std::sync::Arc;

use async_trait::async_trait;

pub use fixed::{FixedGasPrice, POLYGON_GAS_PRICE};
pub use priority_fee::{PriorityFeeRpc, RpcEndpoint};
pub use tiered::{GasTier, TieredGasOracle};

use crate::{error::GasError, types::GasQuote};

/// Capability to fetch a fresh [`GasQuote`] from some upstream.
///
/// Implementations perform exactly one upstream call per invocation and
/// report every network or parse failure as [`GasError::UpstreamFetch`].
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Short source name for logs and errors.
    fn name(&self) -> &'static str;

    async fn fetch_quote(&self) -> Result<GasQuote, GasError>;
}

#[async_trait]
impl<T: PriceFetcher + ?Sized> PriceFetcher for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn fetch_quote(&self) -> Result<GasQuote, GasError> {
        (**self).fetch_quote().await
    }
}

#[async_trait]
impl<T: PriceFetcher + ?Sized> PriceFetcher for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn fetch_quote(&self) -> Result<GasQuote, GasError> {
        (**self).fetch_quote().await
    }
}

/// Source used when no live gas-price service is configured: always an
/// empty quote, leaving fee fields to the node.
#[derive(Clone, Copy, Debug, Default)]
pub struct NetworkDefault;

#[async_trait]
impl PriceFetcher for NetworkDefault {
    fn name(&self) -> &'static str {
        "network-default"
    }

    async fn fetch_quote(&self) -> Result<GasQuote, GasError> {
        Ok(GasQuote::empty())
    }
}
