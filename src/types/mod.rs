mod overrides;
mod quote;
mod request;

pub use overrides::TxOverrides;
pub use quote::GasQuote;
pub use request::{DEFAULT_BUFFER_PERCENTAGE, GasLimitRequest};

/// Gas limit of a transaction, in gas units.
pub type GasLimit = u64;

/// Amount of the native token in base units (wei) per gas unit.
pub type GasPrice = u128;
