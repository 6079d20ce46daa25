//! Last-known exchange state and change detection.
//!
//! Each fetch completion runs the same sequence: validate the response,
//! extract the tracked fields, compare-and-update the stored state, and on a
//! real change hand the new state to the [`ChangeNotifier`] exactly once.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use wallet_watch_core::{
    extract_status, Exchange, ExchangeState, ExchangeStatus, ExtractError, TrackedAsset,
};
use wallet_watch_feeds::{FetchError, StatusResponse};

/// Receiver of exchange state transitions.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Called once per detected transition, after the state has been stored.
    async fn notify(&self, state: &ExchangeState);
}

/// Why a poll result was discarded without touching state.
#[derive(Debug)]
pub enum SkipReason {
    Fetch(FetchError),
    HttpStatus(u16),
    Payload(ExtractError),
}

/// Result of feeding one poll result into the tracker.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// Nothing stored, nothing notified.
    Skipped(SkipReason),
    /// Poll succeeded, tracked fields unchanged.
    Unchanged,
    /// Tracked fields changed; the notifier has been invoked with this state.
    Changed(ExchangeState),
}

impl UpdateOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, UpdateOutcome::Changed(_))
    }
}

/// Holds one [`ExchangeState`] per exchange and detects transitions.
pub struct StateTracker {
    asset: TrackedAsset,
    states: DashMap<Exchange, ExchangeState>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl StateTracker {
    /// Create a tracker with every exchange in its initial state.
    pub fn new(asset: TrackedAsset, notifier: Arc<dyn ChangeNotifier>) -> Self {
        let states = DashMap::new();
        for &exchange in Exchange::all() {
            states.insert(exchange, ExchangeState::initial(exchange));
        }
        Self {
            asset,
            states,
            notifier,
        }
    }

    pub fn asset(&self) -> &TrackedAsset {
        &self.asset
    }

    /// Current state of one exchange.
    pub fn state(&self, exchange: Exchange) -> ExchangeState {
        self.states
            .get(&exchange)
            .map(|s| s.value().clone())
            .unwrap_or_else(|| ExchangeState::initial(exchange))
    }

    /// Current state of all exchanges, in status-report order.
    pub fn snapshot(&self) -> Vec<ExchangeState> {
        Exchange::all().iter().map(|&e| self.state(e)).collect()
    }

    /// Atomically store `status`. Returns the new state if it changed.
    fn store(&self, status: ExchangeStatus) -> Option<ExchangeState> {
        let exchange = status.exchange();
        let mut entry = self
            .states
            .entry(exchange)
            .or_insert_with(|| ExchangeState::initial(exchange));
        entry
            .apply(status, Utc::now())
            .then(|| entry.value().clone())
    }

    /// Apply an extracted status and notify on change.
    ///
    /// The store is atomic but notification is not ordered: two overlapping
    /// transitions of one exchange may be announced in either order, so the
    /// last message a subscriber sees can lag the stored state until the
    /// next change.
    pub async fn apply_status(&self, status: ExchangeStatus) -> UpdateOutcome {
        let exchange = status.exchange();

        // The map guard is released here, before the notifier runs
        let changed = self.store(status);

        match changed {
            Some(state) => {
                info!(exchange = %exchange, status = ?state.status, "Status changed");
                self.notifier.notify(&state).await;
                UpdateOutcome::Changed(state)
            }
            None => {
                debug!(exchange = %exchange, "Status unchanged");
                UpdateOutcome::Unchanged
            }
        }
    }

    /// Feed one fetch completion into the tracker.
    ///
    /// Failed fetches, non-200 responses and unusable payloads are logged and
    /// skipped; they never mutate state or reach the notifier.
    pub async fn handle_response(
        &self,
        exchange: Exchange,
        result: Result<StatusResponse, FetchError>,
    ) -> UpdateOutcome {
        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                warn!(
                    exchange = %exchange,
                    error = %e,
                    transient = e.is_transient(),
                    "Status request failed"
                );
                return UpdateOutcome::Skipped(SkipReason::Fetch(e));
            }
        };

        if !resp.is_ok() {
            warn!(
                exchange = %exchange,
                http_status = resp.http_status,
                body = %resp.body,
                "Status request returned non-200"
            );
            return UpdateOutcome::Skipped(SkipReason::HttpStatus(resp.http_status));
        }

        match extract_status(exchange, &self.asset, &resp.body) {
            Ok(status) => self.apply_status(status).await,
            Err(e) => {
                warn!(exchange = %exchange, error = %e, "Unusable status payload");
                UpdateOutcome::Skipped(SkipReason::Payload(e))
            }
        }
    }
}
