//! Error types for the lanzou-resolver library.

use thiserror::Error;

/// Main error type for link resolution.
///
/// Every variant is fatal to the resolution that raised it. Recoverable
/// anomalies are reported through [`crate::ResolveResult::warnings`] instead.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The owner revoked the share
    #[error("File unshared: {message}")]
    PageUnshared { message: String },

    /// The page is password gated and no password was supplied
    #[error("Password required")]
    PasswordRequired,

    /// The page is password gated and the supplied password was wrong
    #[error("Password incorrect")]
    PasswordIncorrect,

    /// The authorization endpoint refused for a reason other than the password
    #[error("Authorization rejected: {message}")]
    AuthorizationRejected { message: String },

    /// An expected field was missing from the page scripts
    #[error("Pattern not found in page script: {pattern}")]
    PatternNotFound { pattern: String },

    /// The open share page has no download iframe
    #[error("Download iframe not found on share page")]
    IframeNotFound,

    /// The server kept withholding the redirect after the challenge cookie was sent
    #[error("Challenge verification failed: {message}")]
    ChallengeVerificationFailed { message: String },

    /// The final content probe lacked a required header
    #[error("Response missing '{header}' header")]
    MissingFileMetadata { header: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] rquest::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex error
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// CSS selector failed to parse
    #[error("Invalid selector: {0}")]
    Selector(String),

    /// URL could not be parsed or joined
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid server response: {0}")]
    InvalidResponse(String),
}

impl ResolveError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::PageUnshared { .. } => "page_unshared",
            ResolveError::PasswordRequired => "password_required",
            ResolveError::PasswordIncorrect => "password_incorrect",
            ResolveError::AuthorizationRejected { .. } => "authorization_rejected",
            ResolveError::PatternNotFound { .. } => "pattern_not_found",
            ResolveError::IframeNotFound => "iframe_not_found",
            ResolveError::ChallengeVerificationFailed { .. } => "challenge_verification_failed",
            ResolveError::MissingFileMetadata { .. } => "missing_file_metadata",
            ResolveError::Http(_) => "http",
            ResolveError::Json(_) => "json",
            ResolveError::Regex(_) => "regex",
            ResolveError::Selector(_) => "selector",
            ResolveError::InvalidUrl(_) => "invalid_url",
            ResolveError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Result type alias for lanzou-resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;
