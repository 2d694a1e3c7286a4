//! Error types for configd-client.

use std::time::Duration;

/// Result type alias for configd-client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Broad classification of a [`ClientError`].
///
/// Validation errors are returned synchronously and never start a polling
/// task. Transport and handler errors end a running session and surface
/// through its completion signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A construction or session parameter was rejected.
    Validation,
    /// The client environment (settings, runtime, features) is unusable.
    Configuration,
    /// Fetching or decoding a configuration failed.
    Transport,
    /// The caller-supplied change handler reported a failure.
    Handler,
    /// The polling task stopped without reporting an outcome.
    Aborted,
}

/// Errors that can occur when constructing a client or polling configd.
///
/// Every variant is `Clone` so a single terminal outcome can be handed to
/// any number of waiters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The base URL was empty.
    #[error("empty url")]
    EmptyUrl,

    /// The source identity was empty.
    #[error("empty source")]
    EmptySource,

    /// The instance identity was empty.
    #[error("empty instance")]
    EmptyInstance,

    /// The schema identifier was empty.
    #[error("schema_id is required")]
    EmptySchemaId,

    /// The configuration identifier was empty.
    #[error("config_id is required")]
    EmptyConfigId,

    /// The poll interval was outside the accepted bounds.
    #[error("interval must be between 1 second and 1 minute (got {interval:?})")]
    InvalidInterval {
        /// The rejected interval
        interval: Duration,
    },

    /// The per-request timeout was zero.
    #[error("request timeout must be greater than zero")]
    InvalidTimeout,

    /// The base URL could not be parsed or cannot carry a path.
    #[error("Invalid url '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// An identity value cannot be sent as an HTTP header.
    #[error("Invalid value for header '{name}': {reason}")]
    InvalidHeader {
        /// Header name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Client settings could not be loaded or deserialized.
    #[error("Failed to load client settings: {0}")]
    Settings(String),

    /// A session was started outside a tokio runtime.
    #[error("Polling requires a running tokio runtime")]
    NoRuntime,

    /// Attempted to use a feature that is not enabled.
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(&'static str),

    /// The request could not be sent or the response could not be read.
    #[error("HTTP request to {url} failed: {message}")]
    Transport {
        /// Requested URL
        url: String,
        /// Underlying transport error
        message: String,
    },

    /// The service answered with a non-success status code.
    #[error("HTTP request to {url} failed with status {status}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// A response body or payload could not be decoded.
    #[error("Failed to decode configuration: {message}")]
    Decode {
        /// Underlying decode error
        message: String,
    },

    /// The change handler rejected a snapshot.
    #[error("Change handler failed for version {version}: {message}")]
    Handler {
        /// Version of the snapshot the handler was processing
        version: i64,
        /// Error reported by the handler
        message: String,
    },

    /// The polling task ended without delivering an outcome.
    #[error("Polling session aborted before reporting an outcome")]
    SessionAborted,
}

impl ClientError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyUrl
            | Self::EmptySource
            | Self::EmptyInstance
            | Self::EmptySchemaId
            | Self::EmptyConfigId
            | Self::InvalidInterval { .. }
            | Self::InvalidTimeout
            | Self::InvalidUrl { .. }
            | Self::InvalidHeader { .. } => ErrorKind::Validation,
            Self::Settings(_) | Self::NoRuntime | Self::FeatureNotEnabled(_) => {
                ErrorKind::Configuration
            }
            Self::Transport { .. } | Self::Status { .. } | Self::Decode { .. } => {
                ErrorKind::Transport
            }
            Self::Handler { .. } => ErrorKind::Handler,
            Self::SessionAborted => ErrorKind::Aborted,
        }
    }

    /// Returns `true` for errors that are raised before any task is started.
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        ClientError::Settings(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_kinds() {
        assert_eq!(ClientError::EmptyUrl.kind(), ErrorKind::Validation);
        assert_eq!(ClientError::EmptyConfigId.kind(), ErrorKind::Validation);
        assert!(
            ClientError::InvalidInterval {
                interval: Duration::from_millis(10)
            }
            .is_validation()
        );
        assert!(ClientError::InvalidTimeout.is_validation());
        assert!(
            ClientError::InvalidUrl {
                url: "::".to_string(),
                reason: "relative URL without a base".to_string(),
            }
            .is_validation()
        );
    }

    #[test]
    fn test_runtime_kinds() {
        let transport = ClientError::Status {
            url: "http://localhost/schemas/s/configs/c".to_string(),
            status: 404,
        };
        assert_eq!(transport.kind(), ErrorKind::Transport);
        assert!(!transport.is_validation());

        let handler = ClientError::Handler {
            version: 3,
            message: "boom".to_string(),
        };
        assert_eq!(handler.kind(), ErrorKind::Handler);
        assert_eq!(ClientError::SessionAborted.kind(), ErrorKind::Aborted);
        assert_eq!(ClientError::NoRuntime.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(ClientError::EmptySchemaId.to_string(), "schema_id is required");
        assert_eq!(
            ClientError::Handler {
                version: 2,
                message: "bad port".to_string()
            }
            .to_string(),
            "Change handler failed for version 2: bad port"
        );
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let err: ClientError = err.into();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
