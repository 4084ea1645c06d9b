//! CLI-facing operations
//!
//! Thin orchestration over the client, store, and schedule parser. All
//! input validation happens here, before any network call or store
//! mutation.

use std::path::Path;

use tracing::info;

use crate::client::Publisher;
use crate::clock::Clock;
use crate::error::{ChirpError, Result};
use crate::schedule::parse_schedule;
use crate::store::QueueStore;
use crate::types::ScheduledPost;

fn validate_text(text: &str) -> Result<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ChirpError::InvalidInput(
            "Post text cannot be empty".to_string(),
        ));
    }
    Ok(text)
}

/// Posts immediately, uploading the attachment first if one is given.
pub async fn post_now(
    publisher: &dyn Publisher,
    text: &str,
    image: Option<&Path>,
) -> Result<()> {
    let text = validate_text(text)?;
    publisher.publish(text, image).await
}

/// Queues a post for later delivery.
///
/// Validation (empty text, unparseable time, due time not strictly in the
/// future) completes before the store is touched.
pub async fn create_scheduled(
    store: &dyn QueueStore,
    clock: &dyn Clock,
    text: &str,
    image: Option<String>,
    when: &str,
) -> Result<ScheduledPost> {
    let text = validate_text(text)?;
    let now = clock.now_local();
    let schedule_time = parse_schedule(when, now)?;

    if schedule_time <= now {
        return Err(ChirpError::InvalidInput(format!(
            "Schedule time {} is not in the future",
            schedule_time
        )));
    }

    let post = ScheduledPost::new(text.to_string(), image, schedule_time);
    store.append(post.clone()).await?;

    info!(id = %post.id, scheduled = %post.schedule_time, "queued scheduled post");
    Ok(post)
}

/// Lists pending posts in store order.
pub async fn list_pending(store: &dyn QueueStore) -> Result<Vec<ScheduledPost>> {
    store.load().await
}

/// Cancels a pending post by id. Unknown ids fail without touching the
/// store.
pub async fn cancel(store: &dyn QueueStore, id: &str) -> Result<()> {
    if !store.remove(id).await? {
        return Err(ChirpError::InvalidInput(format!(
            "No scheduled post found with id {}",
            id
        )));
    }

    info!(id, "cancelled scheduled post");
    Ok(())
}
