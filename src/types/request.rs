use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, U256},
    rpc::types::TransactionRequest,
};
use alloy_sol_types::SolCall;

use super::GasLimit;

/// Buffer added on top of a successful gas estimate when the caller
/// does not choose one.
pub const DEFAULT_BUFFER_PERCENTAGE: u32 = 20;

/// One gas-limit estimation attempt for a contract call.
///
/// Build it with [`GasLimitRequest::for_call`] from an `alloy` `sol!`
/// call type, or with [`GasLimitRequest::new`] from pre-encoded calldata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GasLimitRequest {
    target: Address,
    method: String,
    calldata: Bytes,
    caller: Option<Address>,
    value: Option<U256>,
    manual_override: Option<GasLimit>,
    buffer_percentage: u32,
}

impl GasLimitRequest {
    pub fn new(target: Address, method: impl Into<String>, calldata: impl Into<Bytes>) -> Self {
        Self {
            target,
            method: method.into(),
            calldata: calldata.into(),
            caller: None,
            value: None,
            manual_override: None,
            buffer_percentage: DEFAULT_BUFFER_PERCENTAGE,
        }
    }

    /// Request for a typed contract call; the method identifier is the
    /// call's Solidity signature.
    pub fn for_call<C: SolCall>(target: Address, call: &C) -> Self {
        Self::new(target, C::SIGNATURE, call.abi_encode())
    }

    /// Address the simulation runs as.
    pub fn with_caller(mut self, caller: Address) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Native token amount attached to the call.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    /// Gas limit to fall back to when the simulation fails.
    pub fn with_manual_override(mut self, gas_limit: GasLimit) -> Self {
        self.manual_override = Some(gas_limit);
        self
    }

    pub fn with_buffer_percentage(mut self, buffer_percentage: u32) -> Self {
        self.buffer_percentage = buffer_percentage;
        self
    }

    pub fn target(&self) -> Address {
        self.target
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn calldata(&self) -> &Bytes {
        &self.calldata
    }

    pub fn caller(&self) -> Option<Address> {
        self.caller
    }

    pub fn value(&self) -> Option<U256> {
        self.value
    }

    pub fn manual_override(&self) -> Option<GasLimit> {
        self.manual_override
    }

    pub fn buffer_percentage(&self) -> u32 {
        self.buffer_percentage
    }

    /// Unsigned call the simulation and the final transaction share.
    pub fn to_transaction_request(&self) -> TransactionRequest {
        let mut tx = TransactionRequest::default()
            .with_to(self.target)
            .with_input(self.calldata.clone());
        if let Some(caller) = self.caller {
            tx = tx.with_from(caller);
        }
        if let Some(value) = self.value {
            tx = tx.with_value(value);
        }
        tx
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{TxKind, address};

    use super::*;

    alloy::sol! {
        function deposit(uint256 amount, address receiver);
    }

    const VAULT: Address = address!("0x0730AA138062D8Cc54510aa939b533ba7c30f26B");
    const USER: Address = address!("0x1111111111111111111111111111111111111111");

    #[test]
    fn test_request_for_typed_call() {
        let call = depositCall {
            amount: U256::from(1_000),
            receiver: USER,
        };
        let request = GasLimitRequest::for_call(VAULT, &call);

        assert_eq!(request.method(), "deposit(uint256,address)");
        assert_eq!(request.calldata().as_ref(), call.abi_encode().as_slice());
        assert_eq!(request.buffer_percentage(), DEFAULT_BUFFER_PERCENTAGE);
        assert_eq!(request.manual_override(), None);
    }

    #[test]
    fn test_transaction_request_carries_simulation_context() {
        let tx = GasLimitRequest::new(VAULT, "pause()", vec![0x84, 0x56, 0xcb, 0x59])
            .with_caller(USER)
            .with_value(U256::from(42))
            .to_transaction_request();

        assert_eq!(tx.to, Some(TxKind::Call(VAULT)));
        assert_eq!(tx.from, Some(USER));
        assert_eq!(tx.value, Some(U256::from(42)));
        assert_eq!(
            tx.input.input().map(|b| b.to_vec()),
            Some(vec![0x84, 0x56, 0xcb, 0x59])
        );
    }
}
