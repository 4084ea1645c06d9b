//! Chirp - post to X (Twitter) from the command line, now or later
//!
//! This library provides OAuth1.0a request signing, the X API client, and a
//! durable scheduled-post queue with a polling delivery loop. The CLI
//! binaries (`chirp-post`, `chirp-queue`, `chirp-send`) are thin wrappers
//! over the operations in [`service`] and [`daemon`].

pub mod client;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod daemon;
pub mod error;
pub mod logging;
pub mod mock;
pub mod schedule;
pub mod service;
pub mod signing;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use client::{Publisher, TwitterClient};
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use credentials::Credentials;
pub use daemon::{Scheduler, TickOutcome};
pub use error::{ChirpError, Result};
pub use store::{JsonFileStore, QueueStore};
pub use types::ScheduledPost;
