//! Error types for Chirp

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChirpError>;

#[derive(Error, Debug)]
pub enum ChirpError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Queue store error: {0}")]
    Store(#[from] StoreError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ChirpError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ChirpError::InvalidInput(_) => 3,
            ChirpError::Platform(PlatformError::Authentication(_)) => 2,
            ChirpError::Platform(_) => 1,
            ChirpError::Config(_) => 1,
            ChirpError::Store(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
}

/// Errors from the persisted schedule document.
///
/// Every variant carries the document path so a failure can be diagnosed
/// without extra logging context. An absent document is not an error;
/// `QueueStore::load` maps it to an empty queue before this type is reached.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read queue document {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to write queue document {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("Corrupt queue document {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request signing failed: {0}")]
    Signing(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = ChirpError::InvalidInput("Empty text".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_authentication_error() {
        let platform_error = PlatformError::Authentication("Bad token".to_string());
        let error = ChirpError::Platform(platform_error);
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_posting_error() {
        let platform_error = PlatformError::Posting("Remote rejected tweet".to_string());
        let error = ChirpError::Platform(platform_error);
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_network_error() {
        let platform_error = PlatformError::Network("Connection timed out".to_string());
        let error = ChirpError::Platform(platform_error);
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_store_error() {
        let store_error = StoreError::Read {
            path: "queue.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let error = ChirpError::Store(store_error);
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_config_error() {
        let config_error = ConfigError::MissingCredentials("TWITTER_API_KEY".to_string());
        let error = ChirpError::Config(config_error);
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_store_error_includes_path() {
        let error = StoreError::Parse {
            path: "/tmp/queue.json".to_string(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        let message = format!("{}", error);
        assert!(message.contains("/tmp/queue.json"));
        assert!(message.contains("Corrupt queue document"));
    }

    #[test]
    fn test_error_message_formatting_authentication() {
        let error = ChirpError::Platform(PlatformError::Authentication(
            "twitter API error (401): invalid token".to_string(),
        ));
        let message = format!("{}", error);
        assert_eq!(
            message,
            "Platform error: Authentication failed: twitter API error (401): invalid token"
        );
    }

    #[test]
    fn test_error_message_preserves_remote_body() {
        // Non-2xx responses surface the remote body verbatim
        let error = PlatformError::Posting(
            "twitter API error (403): {\"detail\":\"You are not permitted\"}".to_string(),
        );
        let message = format!("{}", error);
        assert!(message.contains("{\"detail\":\"You are not permitted\"}"));
    }

    #[test]
    fn test_error_conversion_from_platform_error() {
        let platform_error = PlatformError::Network("test".to_string());
        let chirp_error: ChirpError = platform_error.into();

        match chirp_error {
            ChirpError::Platform(_) => {}
            _ => panic!("Expected ChirpError::Platform"),
        }
    }

    #[test]
    fn test_error_conversion_from_store_error() {
        let store_error = StoreError::Write {
            path: "queue.json".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        let chirp_error: ChirpError = store_error.into();

        match chirp_error {
            ChirpError::Store(_) => {}
            _ => panic!("Expected ChirpError::Store"),
        }
    }

    #[test]
    fn test_platform_error_clone() {
        // PlatformError must be cloneable so the daemon can log and retain
        let original = PlatformError::Network("Connection failed".to_string());
        let cloned = original.clone();

        assert_eq!(format!("{}", original), format!("{}", cloned));
    }

    #[test]
    fn test_exit_code_consistency() {
        let auth = ChirpError::Platform(PlatformError::Authentication("a".to_string()));
        let posting = ChirpError::Platform(PlatformError::Posting("b".to_string()));
        let network = ChirpError::Platform(PlatformError::Network("c".to_string()));
        let signing = ChirpError::Platform(PlatformError::Signing("d".to_string()));
        let invalid = ChirpError::InvalidInput("e".to_string());

        assert_eq!(auth.exit_code(), 2);
        assert_eq!(posting.exit_code(), 1);
        assert_eq!(network.exit_code(), 1);
        assert_eq!(signing.exit_code(), 1);
        assert_eq!(invalid.exit_code(), 3);
    }
}
