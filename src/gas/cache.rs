use std::{
    fmt,
    sync::{PoisonError, RwLock},
    time::Duration,
};

use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, info};

use super::fetcher::PriceFetcher;
use crate::{error::GasError, types::GasQuote};

/// Validity window used unless another one is configured.
pub const DEFAULT_VALIDITY_WINDOW: Duration = Duration::from_millis(10_000);

/// Quote and the instant it was stored, always set together.
#[derive(Clone, Copy, Debug)]
struct CachedQuote {
    quote: GasQuote,
    updated_at: Instant,
}

/// Time-bounded cache of the latest quote from one [`PriceFetcher`].
///
/// The upstream is only called from [`Self::get_price`] when the cached
/// quote is older than the validity window, or from an explicit
/// [`Self::refresh`]. Concurrent [`Self::get_price`] callers that find the
/// cache stale wait for a single in-flight refresh instead of each calling
/// the upstream.
///
/// Intended to be shared (e.g. behind an [`std::sync::Arc`]) by every call
/// site of one network client.
pub struct GasPriceCache<F = Box<dyn PriceFetcher>> {
    fetcher: F,
    validity_window: Duration,
    state: RwLock<Option<CachedQuote>>,
    refresh_lock: Mutex<()>,
}

impl<F: PriceFetcher> GasPriceCache<F> {
    /// Empty cache with [`DEFAULT_VALIDITY_WINDOW`].
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            validity_window: DEFAULT_VALIDITY_WINDOW,
            state: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Empty cache with a custom validity window, which must be non-zero.
    pub fn with_validity_window(fetcher: F, validity_window: Duration) -> Result<Self, GasError> {
        if validity_window.is_zero() {
            return Err(GasError::config("gas price validity window must be positive"));
        }
        Ok(Self {
            validity_window,
            ..Self::new(fetcher)
        })
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn validity_window(&self) -> Duration {
        self.validity_window
    }

    /// Instant the cached quote was fetched at, if any.
    pub fn last_updated_at(&self) -> Option<Instant> {
        self.cached().map(|cached| cached.updated_at)
    }

    /// Whether a quote is cached and younger than the validity window.
    pub fn is_valid(&self) -> bool {
        self.valid_quote().is_some()
    }

    /// Drops the cached quote so the next [`Self::get_price`] refreshes.
    pub fn purge(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = None;
        debug!(source = self.fetcher.name(), "gas quote cache purged");
    }

    /// Fetches a new quote and stores it, regardless of the cache validity.
    ///
    /// On failure the previously cached quote is left untouched.
    pub async fn refresh(&self) -> Result<(), GasError> {
        let _guard = self.refresh_lock.lock().await;
        self.fetch_and_store().await.map(|_| ())
    }

    /// Cached quote when still valid, otherwise a freshly fetched one.
    ///
    /// Upstream failures are returned unchanged; there is no retry.
    pub async fn get_price(&self) -> Result<GasQuote, GasError> {
        if let Some(quote) = self.valid_quote() {
            debug!(source = self.fetcher.name(), "gas quote cache hit");
            return Ok(quote);
        }

        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while this one was waiting
        if let Some(quote) = self.valid_quote() {
            debug!(source = self.fetcher.name(), "gas quote refreshed concurrently");
            return Ok(quote);
        }
        self.fetch_and_store().await
    }

    async fn fetch_and_store(&self) -> Result<GasQuote, GasError> {
        let quote = self.fetcher.fetch_quote().await?;
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(CachedQuote {
            quote,
            updated_at: Instant::now(),
        });
        info!(
            source = self.fetcher.name(),
            gas_price = ?quote.gas_price,
            max_priority_fee_per_gas = ?quote.max_priority_fee_per_gas,
            max_fee_per_gas = ?quote.max_fee_per_gas,
            "gas quote refreshed"
        );
        Ok(quote)
    }

    fn cached(&self) -> Option<CachedQuote> {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn valid_quote(&self) -> Option<GasQuote> {
        self.cached()
            .filter(|cached| cached.updated_at.elapsed() < self.validity_window)
            .map(|cached| cached.quote)
    }
}

impl<F: PriceFetcher> fmt::Debug for GasPriceCache<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GasPriceCache")
            .field("source", &self.fetcher.name())
            .field("validity_window", &self.validity_window)
            .field("cached", &self.cached())
            .finish()
    }
}
