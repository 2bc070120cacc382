use serde::Serialize;

use super::GasPrice;

/// One pricing recommendation for a pending transaction.
///
/// Every field is optional: a backend populates the ones relevant to the
/// chain fee model it serves. A quote with no fields set means
/// "no override, use network defaults".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasQuote {
    /// Legacy per-unit price.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<GasPrice>,

    /// EIP-1559 tip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<GasPrice>,

    /// EIP-1559 cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<GasPrice>,
}

impl GasQuote {
    pub const fn empty() -> Self {
        Self {
            gas_price: None,
            max_priority_fee_per_gas: None,
            max_fee_per_gas: None,
        }
    }

    pub const fn legacy(gas_price: GasPrice) -> Self {
        Self {
            gas_price: Some(gas_price),
            max_priority_fee_per_gas: None,
            max_fee_per_gas: None,
        }
    }

    pub const fn priority_fee(max_priority_fee_per_gas: GasPrice) -> Self {
        Self {
            gas_price: None,
            max_priority_fee_per_gas: Some(max_priority_fee_per_gas),
            max_fee_per_gas: None,
        }
    }

    pub const fn with_max_fee_per_gas(mut self, max_fee_per_gas: GasPrice) -> Self {
        self.max_fee_per_gas = Some(max_fee_per_gas);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.gas_price.is_none()
            && self.max_priority_fee_per_gas.is_none()
            && self.max_fee_per_gas.is_none()
    }
}
