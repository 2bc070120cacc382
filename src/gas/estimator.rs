use std::sync::Arc;

use alloy::{contract::RawCallBuilder, network::Ethereum, providers::Provider};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::{
    Chain,
    error::{GasError, SimulationFailure},
    types::{GasLimit, GasLimitRequest, TxOverrides},
};

/// Capability to dry-run a call and report the gas it would consume.
#[async_trait]
pub trait GasSimulator: Send + Sync {
    async fn simulate(&self, request: &GasLimitRequest) -> Result<GasLimit, SimulationFailure>;
}

#[async_trait]
impl<T: GasSimulator + ?Sized> GasSimulator for Box<T> {
    async fn simulate(&self, request: &GasLimitRequest) -> Result<GasLimit, SimulationFailure> {
        (**self).simulate(request).await
    }
}

#[async_trait]
impl<T: GasSimulator + ?Sized> GasSimulator for Arc<T> {
    async fn simulate(&self, request: &GasLimitRequest) -> Result<GasLimit, SimulationFailure> {
        (**self).simulate(request).await
    }
}

/// [`GasSimulator`] backed by `eth_estimateGas` on an `alloy` provider.
///
/// The call is sent through the contract call layer with the request's
/// target, calldata, caller and value, so failures are classified from
/// [`alloy::contract::Error`].
#[derive(Clone, Debug)]
pub struct ProviderSimulator<P> {
    provider: P,
}

impl<P> ProviderSimulator<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P> GasSimulator for ProviderSimulator<P>
where
    P: Provider + Send + Sync,
{
    async fn simulate(&self, request: &GasLimitRequest) -> Result<GasLimit, SimulationFailure> {
        let mut call =
            RawCallBuilder::<_, Ethereum>::new_raw(&self.provider, request.calldata().clone())
                .to(request.target());
        if let Some(caller) = request.caller() {
            call = call.from(caller);
        }
        if let Some(value) = request.value() {
            call = call.value(value);
        }
        Ok(call.estimate_gas().await?)
    }
}

/// Gas limit after adding `buffer_percentage` percent of `estimate`,
/// rounded down and saturated at [`GasLimit::MAX`].
pub fn apply_buffer(estimate: GasLimit, buffer_percentage: u32) -> GasLimit {
    let buffer = u128::from(estimate) * u128::from(buffer_percentage) / 100;
    GasLimit::try_from(u128::from(estimate) + buffer).unwrap_or(GasLimit::MAX)
}

/// Buffer percentages chosen per chain by contract-call wrappers.
///
/// Ethereum mainnet gets its own buffer because gas there is expensive
/// enough that over-provisioning matters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferPolicy {
    pub ethereum_mainnet: u32,
    pub other: u32,
}

impl BufferPolicy {
    pub const fn new(ethereum_mainnet: u32, other: u32) -> Self {
        Self {
            ethereum_mainnet,
            other,
        }
    }

    pub fn for_chain(&self, chain: &Chain) -> u32 {
        if chain.is_ethereum_mainnet() {
            self.ethereum_mainnet
        } else {
            self.other
        }
    }
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self::new(50, 100)
    }
}

/// Best-effort gas-limit estimation with a safety buffer and a caller
/// supplied fallback.
#[derive(Debug)]
pub struct GasEstimator<S = Box<dyn GasSimulator>> {
    simulator: S,
}

impl<S: GasSimulator> GasEstimator<S> {
    pub fn new(simulator: S) -> Self {
        Self { simulator }
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    /// Runs the simulation once and adds the request's buffer to the result.
    ///
    /// When the simulation fails the request's manual override is returned
    /// as is, without buffer. Without an override the classified failure is
    /// returned as [`GasError::Estimation`].
    #[instrument(skip_all, fields(method = request.method()), err)]
    pub async fn estimate(&self, request: &GasLimitRequest) -> Result<GasLimit, GasError> {
        match self.simulator.simulate(request).await {
            Ok(estimate) => {
                let gas_limit = apply_buffer(estimate, request.buffer_percentage());
                debug!(estimate, gas_limit, "gas limit estimated");
                Ok(gas_limit)
            }
            Err(failure) => match request.manual_override() {
                Some(gas_limit) => {
                    warn!(%failure, gas_limit, "gas estimation failed, using manual override");
                    Ok(gas_limit)
                }
                None => Err(GasError::Estimation {
                    method: request.method().to_string(),
                    failure,
                }),
            },
        }
    }

    /// Fills `gas_limit` in `overrides` with an estimate.
    ///
    /// A gas limit the caller already set is kept and no simulation runs.
    pub async fn with_estimated_gas_limit(
        &self,
        request: &GasLimitRequest,
        overrides: TxOverrides,
    ) -> Result<TxOverrides, GasError> {
        if overrides.gas_limit.is_some() {
            return Ok(overrides);
        }
        let gas_limit = self.estimate(request).await?;
        Ok(overrides.with_gas_limit(gas_limit))
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, Bytes};

    use super::*;
    use crate::testing::ScriptedSimulator;

    fn request() -> GasLimitRequest {
        GasLimitRequest::new(Address::ZERO, "withdraw(uint256)", Bytes::from_static(&[1, 2, 3, 4]))
    }

    #[test]
    fn test_apply_buffer() {
        assert_eq!(apply_buffer(100_000, 50), 150_000);
        assert_eq!(apply_buffer(100_000, 0), 100_000);
        assert_eq!(apply_buffer(99_999, 20), 119_998);
        assert_eq!(apply_buffer(21_000, 100), 42_000);
        assert_eq!(apply_buffer(u64::MAX, 100), u64::MAX);
    }

    #[tokio::test]
    async fn test_estimate_adds_buffer() {
        let estimator = GasEstimator::new(ScriptedSimulator::succeeding(100_000));
        let gas_limit = estimator
            .estimate(&request().with_buffer_percentage(50))
            .await
            .unwrap();
        assert_eq!(gas_limit, 150_000);

        assert_eq!(estimator.estimate(&request()).await.unwrap(), 120_000);
        assert_eq!(estimator.simulator().calls(), 2);
    }

    #[tokio::test]
    async fn test_manual_override_on_failure() {
        let estimator = GasEstimator::new(ScriptedSimulator::failing(SimulationFailure::Reverted(
            "paused".to_string(),
        )));
        let gas_limit = estimator
            .estimate(&request().with_manual_override(200_000).with_buffer_percentage(50))
            .await
            .unwrap();
        assert_eq!(gas_limit, 200_000);
        assert_eq!(estimator.simulator().calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_without_override() {
        let estimator = GasEstimator::new(ScriptedSimulator::failing(SimulationFailure::OutOfGas));
        match estimator.estimate(&request()).await {
            Err(GasError::Estimation { method, failure }) => {
                assert_eq!(method, "withdraw(uint256)");
                assert_eq!(failure, SimulationFailure::OutOfGas);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_explicit_gas_limit_skips_simulation() {
        let estimator = GasEstimator::new(ScriptedSimulator::succeeding(100_000));
        let overrides = TxOverrides {
            gas_limit: Some(75_000),
            ..Default::default()
        };
        let merged = estimator
            .with_estimated_gas_limit(&request(), overrides)
            .await
            .unwrap();
        assert_eq!(merged.gas_limit, Some(75_000));
        assert_eq!(estimator.simulator().calls(), 0);

        let merged = estimator
            .with_estimated_gas_limit(&request(), TxOverrides::default())
            .await
            .unwrap();
        assert_eq!(merged.gas_limit, Some(120_000));
    }

    #[test]
    fn test_buffer_policy_per_chain() {
        let policy = BufferPolicy::new(80, 100);
        assert_eq!(policy.for_chain(&Chain::ethereum_mainnet()), 80);
        assert_eq!(policy.for_chain(&Chain::arbitrum_one()), 100);
    }
}
