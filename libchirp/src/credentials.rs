//! OAuth1.0a credential material
//!
//! Four opaque strings supplied by the configuration layer. The two secrets
//! are wrapped in `SecretString` so they are zeroed on drop and redacted in
//! debug output. Credentials live in process memory only and are never
//! written to the queue document.

use secrecy::{ExposeSecret, SecretString};

#[derive(Debug)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: SecretString,
    pub access_token: String,
    pub access_secret: SecretString,
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        access_token: impl Into<String>,
        access_secret: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: SecretString::from(api_secret.into()),
            access_token: access_token.into(),
            access_secret: SecretString::from(access_secret.into()),
        }
    }

    pub fn api_secret(&self) -> &str {
        self.api_secret.expose_secret()
    }

    pub fn access_secret(&self) -> &str {
        self.access_secret.expose_secret()
    }
}
