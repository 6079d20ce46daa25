//! Periodic polling scheduler.
//!
//! The first cycle fires immediately on start, then one per period. A cycle
//! spawns one task per exchange and returns without waiting for them, so a
//! slow or hanging exchange never delays the schedule or the other exchanges.

use crate::tracker::{StateTracker, UpdateOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use wallet_watch_core::Exchange;
use wallet_watch_feeds::StatusSource;

/// Default polling period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Scheduler lifecycle. There is no pause; stop is permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Running,
    Stopped,
}

/// Start one polling cycle: query every exchange concurrently.
///
/// Each returned handle resolves once that exchange's response has been fed
/// through the tracker (and the notifier, on change).
pub fn poll_cycle(
    source: &Arc<dyn StatusSource>,
    tracker: &Arc<StateTracker>,
) -> Vec<JoinHandle<UpdateOutcome>> {
    Exchange::all()
        .iter()
        .map(|&exchange| {
            let source = Arc::clone(source);
            let tracker = Arc::clone(tracker);
            tokio::spawn(async move {
                let result = source.fetch_status(exchange).await;
                tracker.handle_response(exchange, result).await
            })
        })
        .collect()
}

/// Fixed-interval polling scheduler.
pub struct Poller {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn the scheduler. It is running as soon as this returns.
    pub fn start(
        source: Arc<dyn StatusSource>,
        tracker: Arc<StateTracker>,
        period: Duration,
    ) -> Self {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            info!(period_secs = period.as_secs(), "Starting status poller");

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut cycle: u64 = 0;

            loop {
                tokio::select! {
                    biased;

                    // Stop request or every handle dropped
                    _ = stop_rx.changed() => break,

                    _ = ticker.tick() => {
                        cycle += 1;
                        debug!(cycle, "Polling cycle");
                        poll_cycle(&source, &tracker);
                    }
                }
            }

            info!(cycles = cycle, "Status poller stopped");
        });

        Self { stop_tx, handle }
    }

    /// Cancel the timer. In-flight requests run to completion.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn state(&self) -> PollerState {
        if *self.stop_tx.borrow() || self.handle.is_finished() {
            PollerState::Stopped
        } else {
            PollerState::Running
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == PollerState::Running
    }

    /// Stop and wait for the timer task to exit.
    pub async fn shutdown(self) {
        self.stop();
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::ChangeNotifier;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use wallet_watch_core::{ExchangeState, ExchangeStatus, TrackedAsset};
    use wallet_watch_feeds::{FetchError, StatusResponse};

    /// Serves canned payloads; exchanges listed in `hang` never respond.
    struct MockSource {
        calls: Mutex<HashMap<Exchange, usize>>,
        hang: Vec<Exchange>,
    }

    impl MockSource {
        fn new(hang: Vec<Exchange>) -> Self {
            Self {
                calls: Mutex::new(HashMap::new()),
                hang,
            }
        }

        fn calls(&self, exchange: Exchange) -> usize {
            self.calls
                .lock()
                .unwrap()
                .get(&exchange)
                .copied()
                .unwrap_or(0)
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().values().sum()
        }
    }

    #[async_trait]
    impl StatusSource for MockSource {
        async fn fetch_status(&self, exchange: Exchange) -> Result<StatusResponse, FetchError> {
            *self.calls.lock().unwrap().entry(exchange).or_default() += 1;

            if self.hang.contains(&exchange) {
                std::future::pending::<()>().await;
            }

            let body = match exchange {
                Exchange::Cryptopia => {
                    json!({"Success": true, "Data": [{"Id": 582, "Status": "OK"}]})
                }
                Exchange::HitBtc => {
                    json!({"id": "SMART", "payinEnabled": true, "payoutEnabled": true})
                }
                Exchange::CoinExchange => {
                    json!({"success": "1", "result": {"WalletStatus": "online"}})
                }
            };
            Ok(StatusResponse {
                exchange,
                http_status: 200,
                body,
            })
        }
    }

    #[derive(Default)]
    struct CountingNotifier {
        count: AtomicUsize,
    }

    #[async_trait]
    impl ChangeNotifier for CountingNotifier {
        async fn notify(&self, _state: &ExchangeState) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn setup(hang: Vec<Exchange>) -> (Arc<MockSource>, Arc<StateTracker>, Arc<CountingNotifier>) {
        let source = Arc::new(MockSource::new(hang));
        let notifier = Arc::new(CountingNotifier::default());
        let tracker = Arc::new(StateTracker::new(
            TrackedAsset::default(),
            notifier.clone(),
        ));
        (source, tracker, notifier)
    }

    #[tokio::test]
    async fn test_poll_cycle_queries_every_exchange() {
        let (source, tracker, notifier) = setup(vec![]);
        let dyn_source: Arc<dyn StatusSource> = source.clone();

        let handles = poll_cycle(&dyn_source, &tracker);
        assert_eq!(handles.len(), 3);
        for handle in handles {
            assert!(handle.await.unwrap().is_changed());
        }

        for &exchange in Exchange::all() {
            assert_eq!(source.calls(exchange), 1);
        }
        assert_eq!(notifier.count.load(Ordering::SeqCst), 3);
        assert_eq!(
            tracker.state(Exchange::CoinExchange).status,
            ExchangeStatus::CoinExchange {
                wallet: "online".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_fires_immediately_then_periodically() {
        let (source, tracker, notifier) = setup(vec![]);
        let poller = Poller::start(source.clone(), tracker, Duration::from_secs(60));
        assert!(poller.is_running());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(source.total_calls(), 3);
        assert_eq!(notifier.count.load(Ordering::SeqCst), 3);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.total_calls(), 6);
        // Second cycle saw identical payloads
        assert_eq!(notifier.count.load(Ordering::SeqCst), 3);

        poller.stop();
        assert_eq!(poller.state(), PollerState::Stopped);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(source.total_calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_exchange_does_not_block_others_or_schedule() {
        let (source, tracker, notifier) = setup(vec![Exchange::Cryptopia]);
        let poller = Poller::start(source.clone(), tracker.clone(), Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(notifier.count.load(Ordering::SeqCst), 2);
        assert!(tracker.state(Exchange::Cryptopia).last_updated.is_none());

        // Next tick fires although the first Cryptopia request never finished
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(Exchange::Cryptopia), 2);
        assert_eq!(source.calls(Exchange::HitBtc), 2);

        poller.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_timer_task() {
        let (source, tracker, _) = setup(vec![]);
        let poller = Poller::start(source, tracker, Duration::from_secs(60));
        poller.stop();
        poller.stop();
        assert!(!poller.is_running());
        tokio::time::timeout(Duration::from_secs(5), poller.shutdown())
            .await
            .expect("poller task exits after stop");
    }
}
