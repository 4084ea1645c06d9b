//! OAuth1.0a request signing
//!
//! Builds the `Authorization` header for X (Twitter) API calls: canonical
//! parameter string, signing base string, HMAC-SHA1 signature. The only
//! sources of non-determinism are the nonce and the timestamp, both injected
//! as capabilities so conformance tests can assert exact header bytes.
//!
//! Percent-encoding follows RFC 5849: `A-Za-z0-9-_.~` pass through, space
//! becomes `%20` (never `+`), everything else `%XX`. The same encoding is
//! applied in the base string and in the final header.

use std::borrow::Cow;

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;
use url::Url;

use crate::clock::Clock;
use crate::credentials::Credentials;
use crate::error::{PlatformError, Result};

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// Capability for generating single-use nonces.
///
/// A predictable nonce is a signing-security defect, so there is no fallback
/// path: if randomness fails, signing fails.
pub trait NonceSource: Send + Sync {
    /// Returns a 32-character hex nonce (16 random bytes).
    fn nonce(&self) -> Result<String>;
}

/// OS-backed randomness for nonces.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsNonceSource;

impl NonceSource for OsNonceSource {
    fn nonce(&self) -> Result<String> {
        let mut buf = [0u8; 16];
        rand::rngs::OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| PlatformError::Signing(format!("generating nonce: {}", e)))?;
        Ok(hex::encode(buf))
    }
}

/// Builds OAuth1.0a `Authorization` headers for a fixed set of credentials.
pub struct OauthSigner<'a> {
    credentials: &'a Credentials,
    clock: &'a dyn Clock,
    nonce_source: &'a dyn NonceSource,
}

impl<'a> OauthSigner<'a> {
    pub fn new(
        credentials: &'a Credentials,
        clock: &'a dyn Clock,
        nonce_source: &'a dyn NonceSource,
    ) -> Self {
        Self {
            credentials,
            clock,
            nonce_source,
        }
    }

    /// Signs a request and returns the `Authorization` header value.
    ///
    /// `body_params` are the form-encoded body parameters of the request, if
    /// any; JSON bodies contribute no parameters. Query parameters are taken
    /// from `url` itself.
    pub fn authorization_header(
        &self,
        method: &str,
        url: &str,
        body_params: &[(String, String)],
    ) -> Result<String> {
        let nonce = self.nonce_source.nonce()?;
        let timestamp = self.clock.unix_timestamp().to_string();

        let mut oauth_params = vec![
            ("oauth_consumer_key", self.credentials.api_key.clone()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp", timestamp),
            ("oauth_token", self.credentials.access_token.clone()),
            ("oauth_version", OAUTH_VERSION.to_string()),
        ];

        let (base_url, query_params) = normalize_url(url)?;

        // Union of body, protocol, and query parameters.
        let mut all_params: Vec<(String, String)> = Vec::new();
        all_params.extend(body_params.iter().cloned());
        all_params.extend(
            oauth_params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone())),
        );
        all_params.extend(query_params);

        let parameter_string = encode_and_join(&all_params);
        let base_string = signing_base_string(method, &base_url, &parameter_string);
        let signature = self.sign_base_string(&base_string)?;

        oauth_params.push(("oauth_signature", signature));
        oauth_params.sort_by(|a, b| a.0.cmp(b.0));

        let header_params: Vec<String> = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect();

        Ok(format!("OAuth {}", header_params.join(", ")))
    }

    fn sign_base_string(&self, base_string: &str) -> Result<String> {
        let signing_key = format!(
            "{}&{}",
            percent_encode(self.credentials.api_secret()),
            percent_encode(self.credentials.access_secret())
        );

        let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
            .map_err(|e| PlatformError::Signing(format!("initializing HMAC: {}", e)))?;
        mac.update(base_string.as_bytes());

        Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// RFC 5849 percent-encoding.
pub fn percent_encode(input: &str) -> Cow<'_, str> {
    urlencoding::encode(input)
}

/// Normalizes a request URL for signing: lowercase scheme and host, path
/// case preserved, empty path as `/`, query split into parameters, fragment
/// dropped. Non-default ports are kept in the base URL.
fn normalize_url(raw: &str) -> Result<(String, Vec<(String, String)>)> {
    let parsed =
        Url::parse(raw).map_err(|e| PlatformError::Signing(format!("parsing URL: {}", e)))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| PlatformError::Signing(format!("URL has no host: {}", raw)))?;

    let base = match parsed.port() {
        Some(port) => format!("{}://{}:{}{}", parsed.scheme(), host, port, parsed.path()),
        None => format!("{}://{}{}", parsed.scheme(), host, parsed.path()),
    };

    let query_params = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    Ok((base, query_params))
}

/// Percent-encodes every pair, sorts by encoded key then encoded value, and
/// joins as `key=value` pairs with `&`.
fn encode_and_join(params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k).into_owned(), percent_encode(v).into_owned()))
        .collect();
    encoded.sort();

    let pairs: Vec<String> = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    pairs.join("&")
}

fn signing_base_string(method: &str, base_url: &str, parameter_string: &str) -> String {
    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(base_url),
        percent_encode(parameter_string)
    )
}
