//! Error types for verification client operations.
//!
//! Every call-level failure surfaces as a [`WlcError`]. Per-event failures of a
//! login trace batch are reported in-band on the acknowledgments and never
//! become errors.

use std::fmt;

use crate::crypto::CipherError;

/// Error codes for FFI and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum WlcErrorCode {
    /// Invalid client configuration
    Config = 1000,
    /// Parameter object could not be serialized
    Serialization = 2000,
    /// Cipher initialization or sealing failed
    Crypto = 3000,
    /// Transport/network layer error
    Transport = 4000,
    /// Connection failed
    ConnectionFailed = 4001,
    /// Connection timeout
    ConnectionTimeout = 4002,
    /// Call cancelled by the caller
    Cancelled = 5000,
    /// Caller-supplied deadline elapsed
    DeadlineExceeded = 5001,
    /// Response body could not be decoded
    Decode = 6000,
}

/// Error type for verification client operations.
#[derive(Debug)]
pub enum WlcError {
    /// Client configuration is invalid (e.g. malformed shared secret).
    Config {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Request parameters could not be serialized.
    Serialization(String),

    /// Encryption failed.
    Crypto(String),

    /// Request construction or network I/O failed.
    Transport(String),

    /// Connection failed.
    ConnectionFailed {
        /// Target endpoint
        target: String,
        /// Underlying error message
        reason: String,
    },

    /// Transport-level timeout.
    ConnectionTimeout {
        /// Operation that timed out
        operation: String,
        /// Timeout duration in milliseconds, when known
        timeout_ms: Option<u64>,
    },

    /// The caller cancelled the call.
    Cancelled,

    /// The caller's deadline elapsed before the call completed.
    DeadlineExceeded,

    /// Response body is not valid JSON or does not match the expected shape.
    Decode(String),
}

impl WlcError {
    /// Get the error code for FFI/logging.
    pub fn code(&self) -> WlcErrorCode {
        match self {
            Self::Config { .. } => WlcErrorCode::Config,
            Self::Serialization(_) => WlcErrorCode::Serialization,
            Self::Crypto(_) => WlcErrorCode::Crypto,
            Self::Transport(_) => WlcErrorCode::Transport,
            Self::ConnectionFailed { .. } => WlcErrorCode::ConnectionFailed,
            Self::ConnectionTimeout { .. } => WlcErrorCode::ConnectionTimeout,
            Self::Cancelled => WlcErrorCode::Cancelled,
            Self::DeadlineExceeded => WlcErrorCode::DeadlineExceeded,
            Self::Decode(_) => WlcErrorCode::Decode,
        }
    }

    /// Returns true if the request may have reached the service.
    ///
    /// Failures before the request left the process (configuration,
    /// serialization, encryption) are definitely undelivered. Everything else
    /// must be treated as unknown delivery and reconciled with a query.
    pub fn is_delivery_unknown(&self) -> bool {
        !matches!(
            self,
            Self::Config { .. } | Self::Serialization(_) | Self::Crypto(_)
        )
    }

    /// Create a configuration error.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for WlcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { field, reason } => write!(f, "invalid {}: {}", field, reason),
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
            Self::Crypto(msg) => write!(f, "crypto error: {}", msg),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::ConnectionFailed { target, reason } => {
                write!(f, "connection to {} failed: {}", target, reason)
            }
            Self::ConnectionTimeout {
                operation,
                timeout_ms,
            } => match timeout_ms {
                Some(ms) => write!(f, "{} timed out after {}ms", operation, ms),
                None => write!(f, "{} timed out", operation),
            },
            Self::Cancelled => write!(f, "call cancelled"),
            Self::DeadlineExceeded => write!(f, "deadline exceeded"),
            Self::Decode(msg) => write!(f, "decode error: {}", msg),
        }
    }
}

impl std::error::Error for WlcError {}

impl From<CipherError> for WlcError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::InvalidKey(reason) => Self::config("secret_key", reason),
            other => Self::Crypto(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(WlcError::Cancelled.code(), WlcErrorCode::Cancelled);
        assert_eq!(
            WlcError::config("secret_key", "bad").code(),
            WlcErrorCode::Config
        );
        assert_eq!(WlcErrorCode::Decode as i32, 6000);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            WlcError::config("secret_key", "not hex").to_string(),
            "invalid secret_key: not hex"
        );
        assert_eq!(
            WlcError::ConnectionTimeout {
                operation: "check".into(),
                timeout_ms: Some(1000)
            }
            .to_string(),
            "check timed out after 1000ms"
        );
    }

    #[test]
    fn test_error_display() {
        let err = WlcError::config("secret_key", "not valid hex");
        assert_eq!(err.to_string(), "invalid secret_key: not valid hex");

        let err = WlcError::ConnectionTimeout {
            operation: "check".to_string(),
            timeout_ms: Some(1500),
        };
        assert!(err.to_string().contains("1500ms"));
    }

    #[test]
    fn test_delivery_unknown() {
        assert!(!WlcError::Serialization("x".into()).is_delivery_unknown());
        assert!(!WlcError::Crypto("x".into()).is_delivery_unknown());
        assert!(WlcError::Transport("reset".into()).is_delivery_unknown());
        assert!(WlcError::Decode("eof".into()).is_delivery_unknown());
        assert!(WlcError::Cancelled.is_delivery_unknown());
    }

    #[test]
    fn test_cipher_key_error_maps_to_config() {
        let err: WlcError = CipherError::InvalidKey("7 bytes".into()).into();
        assert_eq!(err.code(), WlcErrorCode::Config);

        let err: WlcError = CipherError::EncryptFailed("aead".into()).into();
        assert_eq!(err.code(), WlcErrorCode::Crypto);
    }
}
