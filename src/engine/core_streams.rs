use futures::Stream;
use tokio::runtime::Builder;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_stream::wrappers::{UnboundedReceiverStream, WatchStream};

use super::TimerEvent;
use crate::config::AppConfig;
use crate::timer::TimerState;

use super::CountdownEngine;

impl CountdownEngine {
    // ========================================================================
    // STREAM SUBSCRIPTIONS
    // ========================================================================

    pub fn subscribe_state(&self) -> watch::Receiver<TimerState> {
        self.inner.state_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> mpsc::UnboundedReceiver<TimerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut broadcast_rx = self.inner.event_tx.subscribe();

        std::thread::spawn(move || {
            let rt = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create Tokio runtime");
            rt.block_on(async move {
                while let Ok(event) = broadcast_rx.recv().await {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            });
        });

        rx
    }

    pub fn event_receiver(&self) -> broadcast::Receiver<TimerEvent> {
        self.inner.event_tx.subscribe()
    }

    // ========================================================================
    // ASYNC STREAM ADAPTERS
    // ========================================================================

    pub async fn state_stream(&self) -> impl Stream<Item = TimerState> + Unpin {
        WatchStream::new(self.subscribe_state())
    }

    pub async fn event_stream(&self) -> impl Stream<Item = TimerEvent> + Unpin {
        UnboundedReceiverStream::new(self.subscribe_events())
    }

    // ========================================================================
    // SNAPSHOT HELPERS
    // ========================================================================

    /// Clone of the current timer state.
    pub fn snapshot(&self) -> TimerState {
        self.inner
            .state
            .lock()
            .map(|state| state.clone())
            .unwrap_or_else(|err| err.into_inner().clone())
    }

    /// Check whether a countdown is currently armed (best effort).
    pub fn is_running(&self) -> bool {
        self.snapshot().is_running
    }

    /// Milliseconds elapsed since the engine was created (used for event timestamps).
    pub fn uptime_ms(&self) -> u64 {
        self.inner
            .time_source
            .now()
            .saturating_duration_since(self.inner.start_instant)
            .as_millis() as u64
    }

    /// Snapshot the current app configuration (tooling helper).
    pub fn config_snapshot(&self) -> AppConfig {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .unwrap_or_else(|err| err.into_inner().clone())
    }
}
