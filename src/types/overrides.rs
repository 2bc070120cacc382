use alloy::{network::TransactionBuilder, primitives::U256, rpc::types::TransactionRequest};

use super::{GasLimit, GasPrice, GasQuote};

/// Transaction parameters a caller wants to pin for a contract call.
///
/// Fields set here always win: merging a quote or an estimate only fills
/// the fields that are still unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TxOverrides {
    pub gas_price: Option<GasPrice>,
    pub max_fee_per_gas: Option<GasPrice>,
    pub max_priority_fee_per_gas: Option<GasPrice>,
    pub gas_limit: Option<GasLimit>,
    pub value: Option<U256>,
}

impl TxOverrides {
    pub fn with_gas_limit(mut self, gas_limit: GasLimit) -> Self {
        self.gas_limit.get_or_insert(gas_limit);
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value.get_or_insert(value);
        self
    }

    /// Fills fee fields from the quote that the caller left unset.
    pub fn with_quote(mut self, quote: &GasQuote) -> Self {
        if let Some(gas_price) = quote.gas_price {
            self.gas_price.get_or_insert(gas_price);
        }
        if let Some(tip) = quote.max_priority_fee_per_gas {
            self.max_priority_fee_per_gas.get_or_insert(tip);
        }
        if let Some(cap) = quote.max_fee_per_gas {
            self.max_fee_per_gas.get_or_insert(cap);
        }
        self
    }

    /// Writes every set field into the transaction request.
    pub fn apply(&self, mut tx: TransactionRequest) -> TransactionRequest {
        if let Some(gas_price) = self.gas_price {
            tx = tx.with_gas_price(gas_price);
        }
        if let Some(cap) = self.max_fee_per_gas {
            tx = tx.with_max_fee_per_gas(cap);
        }
        if let Some(tip) = self.max_priority_fee_per_gas {
            tx = tx.with_max_priority_fee_per_gas(tip);
        }
        if let Some(gas_limit) = self.gas_limit {
            tx = tx.with_gas_limit(gas_limit);
        }
        if let Some(value) = self.value {
            tx = tx.with_value(value);
        }
        tx
    }
}
