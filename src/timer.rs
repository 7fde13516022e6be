//! Periodic advance scheduler.
//!
//! Each armed scheduler is a spawned task tied to its own cancellation token.
//! Dropping the [`Ticker`] cancels the task. Ticks carry the generation the
//! ticker was armed with so a tick already queued when the ticker was
//! replaced can be recognised and ignored.

use crate::session::{EventSender, SessionEvent};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

pub struct Ticker {
    generation: u64,
    period: Duration,
    _guard: DropGuard,
}

impl Ticker {
    /// Start ticking every `period`; the first tick fires one full period
    /// from now.
    pub fn spawn(period: Duration, generation: u64, events: EventSender) -> Self {
        let token = CancellationToken::new();
        let cancel = token.clone();

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if !events.send(SessionEvent::AdvanceDue { generation }) {
                            break;
                        }
                    }
                }
            }
            tracing::trace!(generation, "advance scheduler stopped");
        });

        Self {
            generation,
            period,
            _guard: token.drop_guard(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
