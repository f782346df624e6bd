use thiserror::Error;

/// Configuration resolution failures, keyed by the env var that caused them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("missing required value for {key}")]
    MissingValue { key: String },
}

/// Failure taxonomy for the external lawyer-directory call.
///
/// Every variant maps to a distinct user-facing fallback; none of them are
/// allowed to surface to the end user as a raw error.
#[derive(Debug, Error)]
pub enum LawyerSearchError {
    /// No API key configured. Detected before any network call is attempted.
    #[error("lawyer search API key is not configured")]
    MissingApiKey,
    /// The directory rejected the request on quota/rate-limit grounds.
    #[error("{0}")]
    QuotaExceeded(String),
    /// The bounded request deadline expired.
    #[error("{0}")]
    Timeout(String),
    /// The directory answered with a non-success status or a bad payload.
    #[error("{0}")]
    Service(String),
    /// Connection-level failure before any directory response.
    #[error("lawyer search transport failure: {0}")]
    Transport(String),
}

/// Organization lookup failures. The mode resolver fails open on these.
#[derive(Debug, Error)]
pub enum OrganizationLookupError {
    #[error("organization lookup unavailable: {0}")]
    Unavailable(String),
}
