//! Transaction pricing.
//!
//! [`GasPriceCache`] keeps the latest quote of one [`PriceFetcher`] for a
//! validity window, [`GasEstimator`] turns a dry-run simulation into a gas
//! limit. The two are independent; [`crate::planner::TxPlanner`] merges both
//! into a transaction.

mod cache;
mod estimator;
pub mod fetcher;

pub use cache::{DEFAULT_VALIDITY_WINDOW, GasPriceCache};
pub use estimator::{BufferPolicy, GasEstimator, GasSimulator, ProviderSimulator, apply_buffer};
pub use fetcher::{GasTier, PriceFetcher};
