//! Price and gas terms for a contract call, merged into one transaction.

use std::sync::Arc;

use alloy::rpc::types::TransactionRequest;
use tracing::debug;

use crate::{
    error::GasError,
    gas::{GasEstimator, GasPriceCache, GasSimulator, PriceFetcher},
    types::{GasLimitRequest, TxOverrides},
};

/// Prepares transactions from a shared [`GasPriceCache`] and a
/// [`GasEstimator`].
///
/// Precedence of every field is caller overrides, then the gas estimate,
/// then the cached quote.
pub struct TxPlanner<F = Box<dyn PriceFetcher>, S = Box<dyn GasSimulator>> {
    cache: Arc<GasPriceCache<F>>,
    estimator: GasEstimator<S>,
}

impl<F: PriceFetcher, S: GasSimulator> TxPlanner<F, S> {
    pub fn new(cache: Arc<GasPriceCache<F>>, estimator: GasEstimator<S>) -> Self {
        Self { cache, estimator }
    }

    pub fn cache(&self) -> &Arc<GasPriceCache<F>> {
        &self.cache
    }

    pub fn estimator(&self) -> &GasEstimator<S> {
        &self.estimator
    }

    /// Caller overrides completed with the gas limit and the quote.
    ///
    /// The quote and the estimate are requested concurrently.
    pub async fn overrides(
        &self,
        request: &GasLimitRequest,
        overrides: TxOverrides,
    ) -> Result<TxOverrides, GasError> {
        let (quote, overrides) = futures::try_join!(
            self.cache.get_price(),
            self.estimator.with_estimated_gas_limit(request, overrides),
        )?;
        let overrides = overrides.with_quote(&quote);
        debug!(method = request.method(), ?overrides, "transaction overrides prepared");
        Ok(overrides)
    }

    /// Unsigned transaction for `request` with the merged overrides applied.
    pub async fn prepare(
        &self,
        request: &GasLimitRequest,
        overrides: TxOverrides,
    ) -> Result<TransactionRequest, GasError> {
        let overrides = self.overrides(request, overrides).await?;
        Ok(overrides.apply(request.to_transaction_request()))
    }
}
