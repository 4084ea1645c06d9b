//! Delivery loop for scheduled posts
//!
//! The scheduler is an explicit abstraction over a store, a publisher, and a
//! clock rather than a literal loop, so a single tick can be driven
//! deterministically in tests. One tick scans the store, partitions it into
//! due and not-due posts, and delivers due posts strictly one at a time in
//! store order. A failed delivery retains the post for the next tick; a post
//! is never discarded because one attempt failed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use crate::client::Publisher;
use crate::clock::Clock;
use crate::error::Result;
use crate::store::QueueStore;

/// What one scan-and-deliver pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    pub delivered: usize,
    pub failed: usize,
    pub pending: usize,
}

pub struct Scheduler<S, P, C> {
    store: S,
    publisher: P,
    clock: C,
}

impl<S: QueueStore, P: Publisher, C: Clock> Scheduler<S, P, C> {
    pub fn new(store: S, publisher: P, clock: C) -> Self {
        Self {
            store,
            publisher,
            clock,
        }
    }

    /// Runs one scan-and-deliver pass.
    ///
    /// The store is written back only when a delivery succeeded; a pass that
    /// delivers nothing leaves the document bytes alone.
    pub async fn tick(&self) -> Result<TickOutcome> {
        let posts = self.store.load().await?;
        let loaded = posts.len();
        let now = self.clock.now_local();

        let mut outcome = TickOutcome::default();
        let mut retained = Vec::with_capacity(posts.len());

        for post in posts {
            if !post.is_due(now) {
                retained.push(post);
                continue;
            }

            info!(id = %post.id, scheduled = %post.schedule_time, "delivering scheduled post");
            let image = post.image.as_ref().map(std::path::Path::new);

            match self.publisher.publish(&post.text, image).await {
                Ok(()) => {
                    info!(id = %post.id, "scheduled post delivered");
                    outcome.delivered += 1;
                }
                Err(e) => {
                    warn!(id = %post.id, error = %e, "delivery failed, retaining post for next tick");
                    outcome.failed += 1;
                    retained.push(post);
                }
            }
        }

        if retained.len() != loaded {
            self.store.save(&retained).await?;
        }

        outcome.pending = retained.len();
        Ok(outcome)
    }

    /// Runs tick-sleep forever, until the shutdown flag is set by an
    /// external signal. The loop has no termination condition of its own.
    pub async fn run(&self, poll_interval: u64, shutdown: Arc<AtomicBool>) -> Result<()> {
        info!(poll_interval, "scheduler loop starting");

        loop {
            if shutdown.load(Ordering::Relaxed) {
                info!("shutdown requested, stopping scheduler loop");
                break;
            }

            match self.tick().await {
                Ok(outcome) if outcome.delivered > 0 || outcome.failed > 0 => {
                    info!(
                        delivered = outcome.delivered,
                        failed = outcome.failed,
                        pending = outcome.pending,
                        "tick complete"
                    );
                }
                Ok(_) => {}
                Err(e) => error!(error = %e, "tick failed"),
            }

            // Sleep until the next poll, checking the flag every second so
            // shutdown stays responsive.
            for _ in 0..poll_interval {
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
                sleep(Duration::from_secs(1)).await;
            }
        }

        Ok(())
    }
}
