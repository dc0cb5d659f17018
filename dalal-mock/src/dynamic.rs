use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use dalal_core::connector::BarsByTicker;
use dalal_core::{DalalError, PriceSeriesProvider, PricePoint, QuoteFeed, Registry};

use crate::fixtures;

/// Instruction for how one call should behave.
#[derive(Debug, Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Return the provided value after sleeping.
    Delay(Duration, T),
    /// Fail immediately with the provided error.
    Fail(DalalError),
    /// Hang indefinitely (simulate a stalled upstream).
    Hang,
}

async fn play<T>(behavior: MockBehavior<T>) -> Result<T, DalalError> {
    match behavior {
        MockBehavior::Return(v) => Ok(v),
        MockBehavior::Delay(d, v) => {
            tokio::time::sleep(d).await;
            Ok(v)
        }
        MockBehavior::Fail(e) => Err(e),
        MockBehavior::Hang => {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }
}

struct FeedState {
    default: MockBehavior<BarsByTicker>,
    script: VecDeque<MockBehavior<BarsByTicker>>,
    requests: Vec<Vec<String>>,
}

/// Test-side handle steering a [`MockQuoteFeed`].
#[derive(Clone)]
pub struct FeedController {
    state: Arc<Mutex<FeedState>>,
}

impl FeedController {
    /// Behavior used once the script is exhausted.
    pub async fn set_default(&self, behavior: MockBehavior<BarsByTicker>) {
        self.state.lock().await.default = behavior;
    }

    /// Queue a behavior for the next unscripted call.
    pub async fn push_next(&self, behavior: MockBehavior<BarsByTicker>) {
        self.state.lock().await.script.push_back(behavior);
    }

    /// Tickers requested by each call so far, in call order.
    pub async fn requests(&self) -> Vec<Vec<String>> {
        self.state.lock().await.requests.clone()
    }

    /// Number of calls so far.
    pub async fn call_count(&self) -> usize {
        self.state.lock().await.requests.len()
    }
}

/// Quote feed whose responses are scripted by a [`FeedController`].
///
/// Bars returned by a `Return` or `Delay` behavior are filtered down to the
/// tickers actually requested, so one full map can serve bulk and batched
/// calls alike. Out of the box it serves [`fixtures::bars_for`] every
/// ticker of [`Registry::nse_large_caps`].
pub struct MockQuoteFeed {
    name: &'static str,
    state: Arc<Mutex<FeedState>>,
}

impl MockQuoteFeed {
    /// Create a feed and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<dyn QuoteFeed>, FeedController) {
        let all = fixtures::bars_for(&Registry::nse_large_caps().venue_tickers());
        let state = Arc::new(Mutex::new(FeedState {
            default: MockBehavior::Return(all),
            script: VecDeque::new(),
            requests: Vec::new(),
        }));
        let controller = FeedController {
            state: Arc::clone(&state),
        };
        (Arc::new(Self { name, state }) as Arc<dyn QuoteFeed>, controller)
    }
}

fn only_requested(mut bars: BarsByTicker, tickers: &[String]) -> BarsByTicker {
    bars.retain(|k, _| tickers.contains(k));
    bars
}

#[async_trait]
impl QuoteFeed for MockQuoteFeed {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn daily_bars(&self, tickers: &[String]) -> Result<BarsByTicker, DalalError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push(tickers.to_vec());
            let scripted = guard.script.pop_front();
            scripted.unwrap_or_else(|| guard.default.clone())
        };
        let behavior = match behavior {
            MockBehavior::Return(b) => MockBehavior::Return(only_requested(b, tickers)),
            MockBehavior::Delay(d, b) => MockBehavior::Delay(d, only_requested(b, tickers)),
            other => other,
        };
        play(behavior).await
    }
}

#[derive(Default)]
struct SeriesState {
    rules: HashMap<String, MockBehavior<Vec<PricePoint>>>,
    calls: HashMap<String, usize>,
}

/// Test-side handle steering a [`MockSeriesProvider`].
#[derive(Clone)]
pub struct SeriesController {
    state: Arc<Mutex<SeriesState>>,
}

impl SeriesController {
    /// Set the behavior of `series` calls for `symbol`.
    pub async fn set_series(&self, symbol: &str, behavior: MockBehavior<Vec<PricePoint>>) {
        self.state
            .lock()
            .await
            .rules
            .insert(symbol.to_string(), behavior);
    }

    /// Number of `series` calls made for `symbol`.
    pub async fn calls(&self, symbol: &str) -> usize {
        self.state.lock().await.calls.get(symbol).copied().unwrap_or(0)
    }

    /// Number of `series` calls across all symbols.
    pub async fn total_calls(&self) -> usize {
        self.state.lock().await.calls.values().sum()
    }
}

/// Price-series provider with per-symbol scripted behavior.
///
/// Symbols without a rule yield an empty series.
pub struct MockSeriesProvider {
    name: &'static str,
    state: Arc<Mutex<SeriesState>>,
}

impl MockSeriesProvider {
    /// Create a provider and its controller.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn PriceSeriesProvider>, SeriesController) {
        let state = Arc::new(Mutex::new(SeriesState::default()));
        let controller = SeriesController {
            state: Arc::clone(&state),
        };
        (
            Arc::new(Self { name, state }) as Arc<dyn PriceSeriesProvider>,
            controller,
        )
    }
}

#[async_trait]
impl PriceSeriesProvider for MockSeriesProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn series(&self, symbol: &str) -> Result<Vec<PricePoint>, DalalError> {
        let behavior = {
            let mut guard = self.state.lock().await;
            *guard.calls.entry(symbol.to_string()).or_default() += 1;
            guard.rules.get(symbol).cloned()
        };
        match behavior {
            Some(b) => play(b).await,
            None => Ok(Vec::new()),
        }
    }
}
