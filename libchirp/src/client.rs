//! X (Twitter) API client
//!
//! Issues the two supported request shapes: JSON tweet creation and
//! form-encoded media upload. Authentication is delegated entirely to the
//! signing module; every non-2xx response is terminal for that call and the
//! remote error body is surfaced verbatim, since the remote API's error
//! vocabulary is outside our control. Retry policy, if any, belongs to the
//! caller.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::credentials::Credentials;
use crate::error::{PlatformError, Result};
use crate::signing::{NonceSource, OauthSigner, OsNonceSource};
use crate::types::ImageMimeType;

pub const TWEET_ENDPOINT: &str = "https://api.twitter.com/2/tweets";
pub const MEDIA_UPLOAD_ENDPOINT: &str = "https://upload.twitter.com/1.1/media/upload.json";

/// Fixed per-request timeout; there is no other cancellation mechanism for
/// an in-flight call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Delivery seam for the daemon and the immediate-post path.
///
/// `TwitterClient` is the real implementation; tests drive the scheduler
/// with [`crate::mock::MockPublisher`].
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Uploads the attachment (if any) and creates the post.
    async fn publish(&self, text: &str, image: Option<&Path>) -> Result<()>;
}

#[derive(Serialize)]
struct TweetPayload<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<TweetMediaBlock<'a>>,
}

#[derive(Serialize)]
struct TweetMediaBlock<'a> {
    media_ids: &'a [String],
}

/// The upload endpoint answers with either a media id or one of two error
/// shapes.
#[derive(Deserialize)]
struct MediaUploadResponse {
    #[serde(default)]
    media_id_string: Option<String>,
    #[serde(default)]
    error: Option<RemoteMessage>,
    #[serde(default)]
    errors: Vec<RemoteMessage>,
}

#[derive(Deserialize)]
struct RemoteMessage {
    #[serde(default)]
    message: String,
}

pub struct TwitterClient {
    http: reqwest::Client,
    credentials: Credentials,
    clock: Arc<dyn Clock>,
    nonce_source: Arc<dyn NonceSource>,
    tweet_endpoint: String,
    upload_endpoint: String,
}

impl TwitterClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PlatformError::Network(format!("building HTTP client: {}", e)))?;

        Ok(Self {
            http,
            credentials,
            clock: Arc::new(SystemClock),
            nonce_source: Arc::new(OsNonceSource),
            tweet_endpoint: TWEET_ENDPOINT.to_string(),
            upload_endpoint: MEDIA_UPLOAD_ENDPOINT.to_string(),
        })
    }

    /// Overrides both endpoints. Used by HTTP-level tests to point the
    /// client at a local mock server.
    pub fn with_endpoints(
        mut self,
        tweet_endpoint: impl Into<String>,
        upload_endpoint: impl Into<String>,
    ) -> Self {
        self.tweet_endpoint = tweet_endpoint.into();
        self.upload_endpoint = upload_endpoint.into();
        self
    }

    fn signer(&self) -> OauthSigner<'_> {
        OauthSigner::new(
            &self.credentials,
            self.clock.as_ref(),
            self.nonce_source.as_ref(),
        )
    }

    /// Creates a tweet, attaching any previously uploaded media ids.
    pub async fn post_tweet(&self, text: &str, media_ids: &[String]) -> Result<()> {
        let payload = TweetPayload {
            text,
            media: if media_ids.is_empty() {
                None
            } else {
                Some(TweetMediaBlock { media_ids })
            },
        };

        // JSON bodies contribute no parameters to the signature.
        let header = self
            .signer()
            .authorization_header("POST", &self.tweet_endpoint, &[])?;

        let response = self
            .http
            .post(&self.tweet_endpoint)
            .header(AUTHORIZATION, header)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error("posting tweet", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error("reading tweet response", e))?;

        if !status.is_success() {
            return Err(remote_error(status, &body).into());
        }

        debug!(status = status.as_u16(), "tweet created");
        Ok(())
    }

    /// Uploads a media file and returns its remote id.
    pub async fn upload_media(&self, path: &Path) -> Result<String> {
        let data = std::fs::read(path).map_err(|e| {
            PlatformError::Posting(format!("reading media {}: {}", path.display(), e))
        })?;

        let mut params = vec![("media_data".to_string(), general_purpose::STANDARD.encode(&data))];

        if let Some(mime) = ImageMimeType::detect(path, &data) {
            debug!(%mime, path = %path.display(), "detected image attachment");
            params.push(("media_category".to_string(), "tweet_image".to_string()));
        }

        let header = self
            .signer()
            .authorization_header("POST", &self.upload_endpoint, &params)?;

        let response = self
            .http
            .post(&self.upload_endpoint)
            .header(AUTHORIZATION, header)
            .form(&params)
            .send()
            .await
            .map_err(|e| transport_error("uploading media", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error("reading media upload response", e))?;

        if !status.is_success() {
            return Err(remote_error(status, &body).into());
        }

        let parsed: MediaUploadResponse = serde_json::from_str(&body).map_err(|e| {
            PlatformError::Posting(format!("decoding media upload response: {}", e))
        })?;

        if let Some(id) = parsed.media_id_string {
            return Ok(id);
        }

        let message = parsed
            .error
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
            .or_else(|| {
                parsed
                    .errors
                    .into_iter()
                    .map(|e| e.message)
                    .find(|m| !m.is_empty())
            })
            .unwrap_or(body);

        Err(PlatformError::Posting(format!("media upload failed: {}", message)).into())
    }
}

#[async_trait]
impl Publisher for TwitterClient {
    async fn publish(&self, text: &str, image: Option<&Path>) -> Result<()> {
        let mut media_ids = Vec::new();
        if let Some(path) = image {
            media_ids.push(self.upload_media(path).await?);
        }
        self.post_tweet(text, &media_ids).await
    }
}

fn transport_error(context: &str, error: reqwest::Error) -> PlatformError {
    PlatformError::Network(format!("{}: {}", context, error))
}

/// Classifies a non-2xx response. Credential and permission failures become
/// authentication errors; everything else is a posting error. The remote
/// body is passed through verbatim either way.
fn remote_error(status: StatusCode, body: &str) -> PlatformError {
    let message = format!("twitter API error ({}): {}", status.as_u16(), body.trim());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PlatformError::Authentication(message)
        }
        _ => PlatformError::Posting(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_classifies_credential_failures() {
        let err = remote_error(StatusCode::UNAUTHORIZED, "bad token");
        assert!(matches!(err, PlatformError::Authentication(_)));

        let err = remote_error(StatusCode::FORBIDDEN, "no permission");
        assert!(matches!(err, PlatformError::Authentication(_)));
    }

    #[test]
    fn test_remote_error_other_statuses_are_posting_errors() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
        ] {
            let err = remote_error(status, "body");
            assert!(matches!(err, PlatformError::Posting(_)));
        }
    }

    #[test]
    fn test_remote_error_preserves_body_verbatim() {
        let body = "{\"detail\":\"duplicate tweet\"}";
        let err = remote_error(StatusCode::FORBIDDEN, body);
        assert!(format!("{}", err).contains(body));
    }

    #[test]
    fn test_tweet_payload_shape() {
        let ids = vec!["123".to_string()];
        let with_media = TweetPayload {
            text: "hi",
            media: Some(TweetMediaBlock { media_ids: &ids }),
        };
        let json = serde_json::to_value(&with_media).unwrap();
        assert_eq!(json["text"], "hi");
        assert_eq!(json["media"]["media_ids"][0], "123");

        let without_media = TweetPayload {
            text: "hi",
            media: None,
        };
        let json = serde_json::to_string(&without_media).unwrap();
        assert!(!json.contains("media"));
    }

    #[test]
    fn test_media_response_error_shapes() {
        let single: MediaUploadResponse =
            serde_json::from_str("{\"error\":{\"message\":\"too large\"}}").unwrap();
        assert_eq!(single.error.unwrap().message, "too large");

        let list: MediaUploadResponse =
            serde_json::from_str("{\"errors\":[{\"message\":\"bad media\"}]}").unwrap();
        assert_eq!(list.errors[0].message, "bad media");

        let ok: MediaUploadResponse =
            serde_json::from_str("{\"media_id_string\":\"42\"}").unwrap();
        assert_eq!(ok.media_id_string.as_deref(), Some("42"));
    }
}
