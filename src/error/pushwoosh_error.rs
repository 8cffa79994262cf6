use crate::external::TransportError;
use thiserror::Error;

/// Crate-wide error type for building and dispatching Pushwoosh messages.
///
/// Send-time failures are split into distinct variants so callers can react
/// to an unknown device list without inspecting message text.
#[derive(Error, Debug)]
pub enum PushwooshError {
    /// A message setter received a value outside its accepted set
    #[error("Invalid argument for {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// The transport failed and the single retry (if any) did not recover
    #[error("Failed to create message(s)")]
    Communication {
        #[source]
        source: TransportError,
    },

    /// The API answered with a non-200 status code
    #[error("Pushwoosh API error {status_code}: {message}")]
    Api { status_code: i64, message: String },

    /// The API accepted the request but flagged recipient devices as unknown
    #[error("Pushwoosh reported {} unknown device(s)", devices.len())]
    UnknownDevices { devices: Vec<String> },

    /// The request envelope could not be encoded as JSON
    #[error("Failed to encode createMessage request")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    /// The response body was not the JSON shape the API documents
    #[error("Invalid createMessage response")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    /// The client could not be built from the given settings
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PushwooshError {
    pub(crate) fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PushwooshError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Device tokens the API rejected, if this is an unknown-device failure
    pub fn unknown_devices(&self) -> Option<&[String]> {
        match self {
            PushwooshError::UnknownDevices { devices } => Some(devices),
            _ => None,
        }
    }

    pub fn is_communication(&self) -> bool {
        matches!(self, PushwooshError::Communication { .. })
    }
}

/// Type alias for Result with PushwooshError
pub type PushwooshResult<T> = Result<T, PushwooshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_devices_accessor() {
        let err = PushwooshError::UnknownDevices {
            devices: vec!["abc".to_string(), "def".to_string()],
        };
        assert_eq!(
            err.unknown_devices(),
            Some(&["abc".to_string(), "def".to_string()][..])
        );
        assert_eq!(err.to_string(), "Pushwoosh reported 2 unknown device(s)");

        let err = PushwooshError::Api {
            status_code: 210,
            message: "Argument error".to_string(),
        };
        assert!(err.unknown_devices().is_none());
        assert!(!err.is_communication());
    }

    #[test]
    fn test_communication_keeps_source() {
        let err = PushwooshError::Communication {
            source: TransportError::Status {
                status: 502,
                body: "Bad Gateway".to_string(),
            },
        };
        assert!(err.is_communication());
        let source = std::error::Error::source(&err).expect("source should be kept");
        assert!(source.to_string().contains("502"));
    }
}
