//! Injectable clock capability
//!
//! Signing timestamps and due-time checks both read the wall clock. Routing
//! them through a trait keeps signature output and daemon ticks reproducible
//! in tests (see [`crate::mock::FixedClock`]).

use chrono::{Local, NaiveDateTime, Utc};

pub trait Clock: Send + Sync {
    /// Current Unix time in whole seconds, used for `oauth_timestamp`.
    fn unix_timestamp(&self) -> i64;

    /// Current local wall-clock time, used for schedule parsing and
    /// due-time partitioning. Scheduled posts are local-time semantics.
    fn now_local(&self) -> NaiveDateTime;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        Utc::now().timestamp()
    }

    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
