use std::time::Duration;
use thiserror::Error;

/// Failure modes of the device location provider (permission prompt,
/// fix acquisition). These are the provider's taxonomy; the workflow
/// surfaces them as `CheckError::LocationUnavailable`.
#[derive(Error, Debug)]
pub enum LocationError {
    #[error("location permission denied: {0}")]
    PermissionDenied(String),

    #[error("no position fix within {0:?}")]
    Timeout(Duration),

    #[error("device location not supported: {0}")]
    Unsupported(String),
}

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Location unavailable: {0}")]
    LocationUnavailable(#[from] LocationError),

    #[error("No campus locations configured")]
    NoCampusConfigured,

    #[error("Attendance requires an in-range verification first")]
    NotVerified,

    #[error("No signed-in user")]
    NotSignedIn,

    #[error("Directory request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Record store error: {message}")]
    StoreError { message: String },

    #[error("Submission rejected: {message}")]
    SubmissionError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Device,
    Network,
    Config,
    Storage,
    Processing,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Informational; the run still counts as a success.
    Low,
    /// Transient or user-recoverable; retry is expected to help.
    Medium,
    /// Bad data or configuration; needs a fix before retrying.
    High,
    /// System-level failure (filesystem, environment).
    Critical,
}

impl CheckError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CheckError::LocationUnavailable(_) => ErrorCategory::Device,
            CheckError::ApiError(_) => ErrorCategory::Network,
            CheckError::NoCampusConfigured
            | CheckError::ConfigError { .. }
            | CheckError::InvalidConfigValueError { .. }
            | CheckError::MissingConfigError { .. } => ErrorCategory::Config,
            CheckError::StoreError { .. } | CheckError::IoError(_) => ErrorCategory::Storage,
            CheckError::CsvError(_)
            | CheckError::ZipError(_)
            | CheckError::SerializationError(_) => ErrorCategory::Processing,
            CheckError::NotVerified
            | CheckError::NotSignedIn
            | CheckError::SubmissionError { .. } => ErrorCategory::User,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CheckError::LocationUnavailable(_)
            | CheckError::ApiError(_)
            | CheckError::NotVerified
            | CheckError::NotSignedIn
            | CheckError::SubmissionError { .. } => ErrorSeverity::Medium,
            CheckError::NoCampusConfigured
            | CheckError::ConfigError { .. }
            | CheckError::InvalidConfigValueError { .. }
            | CheckError::MissingConfigError { .. }
            | CheckError::StoreError { .. }
            | CheckError::CsvError(_)
            | CheckError::ZipError(_)
            | CheckError::SerializationError(_) => ErrorSeverity::High,
            CheckError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Message shown to the student, phrased as the situation rather than the
    /// mechanism. Never a raw Debug dump.
    pub fn user_friendly_message(&self) -> String {
        match self {
            CheckError::LocationUnavailable(inner) => {
                format!("Failed to get your location ({})", inner)
            }
            CheckError::NoCampusConfigured => "No campus locations found".to_string(),
            CheckError::NotVerified => "Please verify your location first".to_string(),
            CheckError::NotSignedIn => "Please sign in to mark attendance".to_string(),
            CheckError::ApiError(_) => {
                "Could not reach the campus directory. Please try again.".to_string()
            }
            CheckError::StoreError { .. } => {
                "Failed to save the record. Please try again.".to_string()
            }
            CheckError::SubmissionError { message } => message.clone(),
            CheckError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration problem in '{}': {}", field, reason)
            }
            CheckError::MissingConfigError { field } => {
                format!("Configuration is missing '{}'", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CheckError::LocationUnavailable(LocationError::PermissionDenied(_)) => {
                "Allow location access for this device and retry".to_string()
            }
            CheckError::LocationUnavailable(LocationError::Timeout(_)) => {
                "Move to a spot with better reception and retry".to_string()
            }
            CheckError::LocationUnavailable(LocationError::Unsupported(_)) => {
                "Report a position explicitly with --lat and --lon".to_string()
            }
            CheckError::NoCampusConfigured => {
                "Add at least one active [[campus]] entry to the roster file".to_string()
            }
            CheckError::NotVerified => {
                "Run a location check before recording attendance".to_string()
            }
            CheckError::NotSignedIn => "Provide --student-id (or sign in)".to_string(),
            CheckError::ApiError(_) => {
                "Check the directory endpoint URL and your network connection".to_string()
            }
            CheckError::ConfigError { .. }
            | CheckError::InvalidConfigValueError { .. }
            | CheckError::MissingConfigError { .. } => {
                "Fix the reported field in the roster file and rerun".to_string()
            }
            CheckError::StoreError { .. } => {
                "Retry; if it persists, check the record store".to_string()
            }
            CheckError::SubmissionError { .. } => {
                "Provide submission text or an attachment URL".to_string()
            }
            CheckError::IoError(_) => "Check the output path exists and is writable".to_string(),
            CheckError::CsvError(_)
            | CheckError::ZipError(_)
            | CheckError::SerializationError(_) => {
                "Rerun the export; the bundle was not written".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_errors_map_to_device_category() {
        let err = CheckError::from(LocationError::Timeout(Duration::from_secs(10)));
        assert_eq!(err.category(), ErrorCategory::Device);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert!(err
            .user_friendly_message()
            .contains("Failed to get your location"));
    }

    #[test]
    fn test_empty_roster_is_a_config_problem() {
        let err = CheckError::NoCampusConfigured;
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.user_friendly_message(), "No campus locations found");
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = CheckError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only output dir",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
