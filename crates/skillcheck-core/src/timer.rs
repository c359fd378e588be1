//! Countdown timer that feeds ticks to a session.
//!
//! The timer is a spawned task writing [`Tick`] messages into a channel; the
//! owner of the session reads them and calls `tick`. Dropping or cancelling
//! the [`Countdown`] stops the task, after which the receiver drains and then
//! yields `None`.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Default tick cadence.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

/// One timer period has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// 1-based sequence number.
    pub seq: u64,
}

/// Handle to a running countdown task.
#[derive(Debug)]
pub struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Start emitting a tick every `period`, the first one after one period.
    pub fn spawn(period: Duration) -> (Self, mpsc::Receiver<Tick>) {
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut seq = 0u64;
            loop {
                interval.tick().await;
                seq += 1;
                if tx.send(Tick { seq }).await.is_err() {
                    tracing::debug!("tick receiver dropped, stopping countdown");
                    break;
                }
            }
        });
        (Self { handle }, rx)
    }

    /// Stop emitting ticks.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Whether the task has stopped.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
