//! Test doubles for the gas station.
//!
//! [`ScriptedFetcher`] serves a fixed quote, optionally after a delay, and
//! fails on demand. [`ScriptedSimulator`] returns a fixed simulation result.
//! Both count their invocations, so tests can assert how often the upstream
//! was hit.

use std::{
    collections::VecDeque,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    error::{GasError, SimulationFailure},
    gas::{GasSimulator, PriceFetcher},
    types::{GasLimit, GasLimitRequest, GasQuote},
};

#[derive(Debug)]
pub struct ScriptedFetcher {
    quote: Mutex<GasQuote>,
    failures: Mutex<VecDeque<String>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(quote: GasQuote) -> Self {
        Self {
            quote: Mutex::new(quote),
            failures: Mutex::new(VecDeque::new()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleeps for `delay` on every fetch before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Quote served by subsequent fetches.
    pub fn set_quote(&self, quote: GasQuote) {
        *self.quote.lock().unwrap_or_else(PoisonError::into_inner) = quote;
    }

    /// Makes the next fetch fail with `reason`. Calls queue up.
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reason.into());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceFetcher for ScriptedFetcher {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_quote(&self) -> Result<GasQuote, GasError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match failure {
            Some(reason) => Err(GasError::upstream(self.name(), reason)),
            None => Ok(*self.quote.lock().unwrap_or_else(PoisonError::into_inner)),
        }
    }
}

#[derive(Debug)]
pub struct ScriptedSimulator {
    result: Result<GasLimit, SimulationFailure>,
    calls: AtomicUsize,
}

impl ScriptedSimulator {
    pub fn succeeding(gas: GasLimit) -> Self {
        Self {
            result: Ok(gas),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(failure: SimulationFailure) -> Self {
        Self {
            result: Err(failure),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GasSimulator for ScriptedSimulator {
    async fn simulate(&self, _request: &GasLimitRequest) -> Result<GasLimit, SimulationFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}
