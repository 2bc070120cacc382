use async_trait::async_trait;

use super::PriceFetcher;
use crate::{
    error::GasError,
    types::{GasPrice, GasQuote},
};

/// Legacy gas price used on Polygon PoS, 1000 gwei.
pub const POLYGON_GAS_PRICE: GasPrice = 1_000_000_000_000;

/// Constant legacy gas price, for low-fee chains without a live oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedGasPrice {
    gas_price: GasPrice,
}

impl FixedGasPrice {
    pub const fn new(gas_price: GasPrice) -> Self {
        Self { gas_price }
    }

    pub const fn polygon() -> Self {
        Self::new(POLYGON_GAS_PRICE)
    }

    pub fn gas_price(&self) -> GasPrice {
        self.gas_price
    }
}

#[async_trait]
impl PriceFetcher for FixedGasPrice {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn fetch_quote(&self) -> Result<GasQuote, GasError> {
        Ok(GasQuote::legacy(self.gas_price))
    }
}
