//! Test doubles for deterministic scheduling and signing
//!
//! Available for all builds (not just unit tests) so integration tests can
//! drive the scheduler and signer without network access or a real clock.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::client::Publisher;
use crate::clock::Clock;
use crate::error::{PlatformError, Result};
use crate::signing::NonceSource;

/// A publisher that records deliveries and fails on configured texts.
#[derive(Debug, Clone, Default)]
pub struct MockPublisher {
    fail_on: HashSet<String>,
    published: Arc<Mutex<Vec<String>>>,
}

impl MockPublisher {
    /// A publisher for which every delivery succeeds.
    pub fn success() -> Self {
        Self::default()
    }

    /// A publisher that simulates a network failure for posts whose text is
    /// in `texts`.
    pub fn failing_on(texts: &[&str]) -> Self {
        Self {
            fail_on: texts.iter().map(|t| t.to_string()).collect(),
            published: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Texts delivered so far, in delivery order.
    pub fn published(&self) -> Vec<String> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, text: &str, _image: Option<&Path>) -> Result<()> {
        if self.fail_on.contains(text) {
            return Err(
                PlatformError::Network(format!("simulated network failure for '{}'", text)).into(),
            );
        }
        self.published.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// A clock frozen at a chosen instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    local: NaiveDateTime,
    unix: i64,
}

impl FixedClock {
    pub fn new(local: NaiveDateTime) -> Self {
        Self {
            local,
            unix: local.and_utc().timestamp(),
        }
    }

    /// Fixes local time and Unix timestamp independently, for signing tests
    /// that pin `oauth_timestamp` exactly.
    pub fn at_unix(local: NaiveDateTime, unix: i64) -> Self {
        Self { local, unix }
    }
}

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> i64 {
        self.unix
    }

    fn now_local(&self) -> NaiveDateTime {
        self.local
    }
}

/// A nonce source returning a fixed value, for byte-exact header assertions.
#[derive(Debug, Clone)]
pub struct FixedNonce {
    value: String,
}

impl FixedNonce {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl NonceSource for FixedNonce {
    fn nonce(&self) -> Result<String> {
        Ok(self.value.clone())
    }
}
