//! Example: Watch Etherscan gas tiers through a gas price cache.
//!
//! Run with: ETHERSCAN_API_KEY=... cargo run --example watch_gas

use std::time::Duration;

use vault_sdk::{
    gas::{GasPriceCache, GasTier, fetcher::TieredGasOracle},
    num,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api_key = std::env::var("ETHERSCAN_API_KEY").ok();
    let cache = GasPriceCache::with_validity_window(
        TieredGasOracle::etherscan(api_key, GasTier::Fast),
        Duration::from_secs(5),
    )?;

    for tier in [GasTier::Fast, GasTier::Average, GasTier::Slow] {
        // Tier changes only show up after the cached quote is dropped
        cache.fetcher().set_tier(tier);
        cache.purge();

        for _ in 0..3 {
            let quote = cache.get_price().await?;
            if let Some(gas_price) = quote.gas_price {
                println!("{tier:>7}: {} gwei", num::GWEI.format(gas_price));
            }
            tokio::time::sleep(Duration::from_secs(2)).await;
        }
    }

    Ok(())
}
