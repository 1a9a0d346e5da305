// error.rs

use reqwest::StatusCode;
use std::fmt;

/// Main error type for FortiGate API operations
#[derive(Debug)]
pub enum FgtError {
    /// Parse URL failed
    InvalidUrl(String),
    /// Network/connection error (e.g., timeout, DNS failure, TLS handshake)
    Transport(String),
    /// Server answered with a non-success status code
    RequestFailed { status: StatusCode, message: String },
    /// Login reached the appliance but no CSRF token was issued
    AuthenticationFailed(String),
    /// Login response lacked a cookie the session depends on
    MissingRequiredCookie(String),
    /// Unsupported HTTP method or API kind
    InvalidArgument(String),
    /// Response body is not valid JSON
    Decode(String),
    /// Request attempted without a valid session
    NotAuthenticated,
    /// Invalid configuration
    ConfigurationError(String),
    /// Generic IO error wrapper (e.g., CA certificate file)
    IoError(String),
}

impl fmt::Display for FgtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            Self::Transport(msg) => write!(f, "Transport error: {}", msg),
            Self::RequestFailed { status, message } => {
                write!(f, "HTTP request failed with status {}: {}", status, message)
            }
            Self::AuthenticationFailed(msg) => write!(f, "Authentication failed: {}", msg),
            Self::MissingRequiredCookie(name) => write!(f, "Response did not include the required cookie '{}'", name),
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Self::Decode(msg) => write!(f, "Decode error: {}", msg),
            Self::NotAuthenticated => write!(f, "Not authenticated: login before issuing API requests"),
            Self::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            Self::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for FgtError {}

// Conversion implementations
impl From<url::ParseError> for FgtError {
    fn from(e: url::ParseError) -> Self {
        Self::InvalidUrl(e.to_string())
    }
}

impl From<reqwest::Error> for FgtError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::RequestFailed { status, message: err.to_string() }
        } else if err.is_builder() {
            Self::ConfigurationError(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for FgtError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::TimedOut => Self::Transport(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for FgtError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
