use std::fmt::Display;

use alloy::{contract, transports};

/// Error returned by the gas station and the gas-limit estimator.
#[derive(Debug, thiserror::Error)]
pub enum GasError {
    #[error("upstream {source_name} failed: {reason}")]
    UpstreamFetch {
        source_name: &'static str,
        reason: String,
    },

    #[error("gas estimation of {method} failed: {failure}")]
    Estimation {
        method: String,
        failure: SimulationFailure,
    },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl GasError {
    pub(crate) fn upstream(source_name: &'static str, reason: impl Display) -> Self {
        Self::UpstreamFetch {
            source_name,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn config(reason: impl Display) -> Self {
        Self::Configuration(reason.to_string())
    }
}

/// Reason the dry-run simulation of a call could not produce
/// a gas estimate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationFailure {
    #[error("call reverted: {0}")]
    Reverted(String),

    #[error("call ran out of gas")]
    OutOfGas,

    #[error("abi error: {0}")]
    Abi(String),

    #[error("unexpected empty RPC response")]
    NullResp,

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<contract::Error> for SimulationFailure {
    fn from(value: contract::Error) -> Self {
        match value {
            contract::Error::UnknownFunction(_) => Self::Abi(value.to_string()),
            contract::Error::UnknownSelector(_) => Self::Abi(value.to_string()),
            contract::Error::NotADeploymentTransaction => Self::Abi(value.to_string()),
            contract::Error::ContractNotDeployed => Self::Abi(value.to_string()),
            contract::Error::ZeroData(_, _) => Self::Abi(value.to_string()),
            contract::Error::AbiError(_) => Self::Abi(value.to_string()),
            contract::Error::TransportError(rpc_err) => Self::from(rpc_err),
            contract::Error::PendingTransactionError(err) => Self::Transport(err.to_string()),
        }
    }
}

impl<E: Display> From<transports::RpcError<E>> for SimulationFailure {
    fn from(value: transports::RpcError<E>) -> Self {
        match value {
            transports::RpcError::ErrorResp(ref resp) => {
                // Nodes disagree on codes for failed eth_estimateGas, so the
                // message is inspected as well
                let msg = resp.message.to_ascii_lowercase();
                if msg.contains("gas required exceeds")
                    || (resp.code == -32603 && (msg.contains("out of gas") || msg.contains("oog")))
                {
                    Self::OutOfGas
                } else if resp.code == 3 || msg.contains("revert") {
                    Self::Reverted(resp.message.to_string())
                } else {
                    Self::Transport(value.to_string())
                }
            }
            transports::RpcError::NullResp => Self::NullResp,
            _ => Self::Transport(value.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_resp(code: i64, message: &str) -> transports::TransportError {
        transports::RpcError::ErrorResp(
            serde_json::from_value(serde_json::json!({ "code": code, "message": message }))
                .unwrap(),
        )
    }

    #[test]
    fn test_classify_execution_reverted() {
        assert_eq!(
            SimulationFailure::from(error_resp(3, "execution reverted: paused")),
            SimulationFailure::Reverted("execution reverted: paused".to_string())
        );
        assert!(matches!(
            SimulationFailure::from(error_resp(-32000, "Execution reverted")),
            SimulationFailure::Reverted(_)
        ));
    }

    #[test]
    fn test_classify_out_of_gas() {
        assert_eq!(
            SimulationFailure::from(error_resp(-32603, "Out of gas")),
            SimulationFailure::OutOfGas
        );
    }

    #[test]
    fn test_classify_gas_allowance_exceeded() {
        assert_eq!(
            SimulationFailure::from(error_resp(
                -32000,
                "gas required exceeds allowance (30000000)"
            )),
            SimulationFailure::OutOfGas
        );
    }

    #[test]
    fn test_classify_contract_errors() {
        assert_eq!(
            SimulationFailure::from(contract::Error::TransportError(error_resp(
                3,
                "execution reverted: paused"
            ))),
            SimulationFailure::Reverted("execution reverted: paused".to_string())
        );
        assert!(matches!(
            SimulationFailure::from(contract::Error::UnknownFunction("harvest".to_string())),
            SimulationFailure::Abi(_)
        ));
        assert!(matches!(
            SimulationFailure::from(contract::Error::ContractNotDeployed),
            SimulationFailure::Abi(_)
        ));
    }

    #[test]
    fn test_classify_other_rpc_errors() {
        assert!(matches!(
            SimulationFailure::from(error_resp(-32005, "rate limited")),
            SimulationFailure::Transport(_)
        ));
        assert_eq!(
            SimulationFailure::from(transports::TransportError::NullResp),
            SimulationFailure::NullResp
        );
    }

    #[test]
    fn test_error_display() {
        let err = GasError::Estimation {
            method: "deposit(uint256)".to_string(),
            failure: SimulationFailure::OutOfGas,
        };
        assert_eq!(
            err.to_string(),
            "gas estimation of deposit(uint256) failed: call ran out of gas"
        );
        assert_eq!(
            GasError::upstream("etherscan", "status 502").to_string(),
            "upstream etherscan failed: status 502"
        );
    }
}
