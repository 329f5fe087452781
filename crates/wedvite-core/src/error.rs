//! Error types module
//!
//! All record-store failures are unified under the `AppError` enum. Tier backends
//! convert their own errors into `AppError::Storage`, so callers only ever match on
//! one type.
//!
//! Reads never surface a parse failure: a corrupt blob degrades to an empty list.
//! Every write-path error propagates to the caller.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like bad input
    Debug,
    /// Warning level - for recoverable issues like capacity pressure
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "CAPACITY_EXCEEDED")
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same operation later can succeed
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Storage capacity exceeded: {percentage:.1}% used after removing {evicted} old invitation(s)")]
    CapacityExceeded { percentage: f64, evicted: usize },

    #[error("Integrity check failed for '{key}': wrote {written_bytes} bytes, read back {read_bytes} bytes")]
    IntegrityCheckFailed {
        key: String,
        written_bytes: usize,
        read_bytes: usize,
    },

    #[error("Staging write failed ({transient}) and durable fallback failed: {durable}")]
    FallbackFailed {
        transient: String,
        #[source]
        durable: Box<AppError>,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

}

/// Result type for record store operations
pub type AppResult<T> = Result<T, AppError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(format!("JSON error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (&'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::CapacityExceeded { .. } => (
            "CAPACITY_EXCEEDED",
            false,
            Some("Delete some invitations manually to free space"),
            LogLevel::Warn,
        ),
        AppError::IntegrityCheckFailed { .. } => (
            "INTEGRITY_CHECK_FAILED",
            true,
            Some("Free some space and save again"),
            LogLevel::Error,
        ),
        AppError::FallbackFailed { .. } => (
            "SAVE_FAILED",
            false,
            Some("Delete some invitations manually to free space"),
            LogLevel::Error,
        ),
        AppError::Storage(_) => (
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        AppError::Serialization(_) => (
            "SERIALIZATION_ERROR",
            false,
            Some("Check the invitation data and try again"),
            LogLevel::Warn,
        ),
        AppError::NotFound(_) => (
            "NOT_FOUND",
            false,
            Some("Verify the invitation ID exists"),
            LogLevel::Debug,
        ),
        AppError::InvalidInput(_) => (
            "INVALID_INPUT",
            false,
            Some("Check the input and try again"),
            LogLevel::Debug,
        ),
        AppError::Config(_) => (
            "CONFIG_ERROR",
            false,
            Some("Check the environment configuration"),
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name
    pub fn error_type(&self) -> &str {
        match self {
            AppError::CapacityExceeded { .. } => "CapacityExceeded",
            AppError::IntegrityCheckFailed { .. } => "IntegrityCheckFailed",
            AppError::FallbackFailed { .. } => "FallbackFailed",
            AppError::Storage(_) => "Storage",
            AppError::Serialization(_) => "Serialization",
            AppError::NotFound(_) => "NotFound",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Config(_) => "Config",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).1
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::CapacityExceeded {
                percentage,
                evicted,
            } => format!(
                "Storage is still {:.0}% full after removing {} old invitation(s). Please delete some invitations manually.",
                percentage, evicted
            ),
            AppError::IntegrityCheckFailed { .. } => {
                "Your invitation could not be saved completely. Storage may be full.".to_string()
            }
            AppError::FallbackFailed { durable, .. } => durable.client_message(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Serialization(_) => "Invitation data could not be encoded".to_string(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::Config(ref msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_capacity_exceeded() {
        let err = AppError::CapacityExceeded {
            percentage: 95.4,
            evicted: 2,
        };
        assert_eq!(err.error_code(), "CAPACITY_EXCEEDED");
        assert!(!err.is_recoverable());
        assert!(err.client_message().contains("95%"));
        assert!(err.client_message().contains("2 old invitation"));
        assert_eq!(err.log_level(), LogLevel::Warn);
        assert!(err.to_string().contains("95.4%"));
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Invitation abc not found".to_string());
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Invitation abc not found");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_fallback_failed_carries_durable_cause() {
        let err = AppError::FallbackFailed {
            transient: "quota exceeded".to_string(),
            durable: Box::new(AppError::CapacityExceeded {
                percentage: 99.0,
                evicted: 0,
            }),
        };
        assert_eq!(err.error_code(), "SAVE_FAILED");
        assert!(err.client_message().contains("delete some invitations"));
        let details = err.detailed_message();
        assert!(details.contains("Caused by: Storage capacity exceeded"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = AppError::from(parse_err);
        assert_eq!(err.error_type(), "Serialization");
    }
}
