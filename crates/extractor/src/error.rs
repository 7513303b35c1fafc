// ABOUTME: Error types for job extraction including the ErrorCode enum and ExtractError struct.
// ABOUTME: Provides categorized errors with convenience constructors, boolean helpers and HTTP status mapping.

use std::fmt;

/// Error codes representing the categories of extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,
    UnsupportedPlatform,
    NotFound,
    NetworkFailure,
    Timeout,
    ParsingFailed,
    InternalServer,
    Cancelled,
}

impl ErrorCode {
    /// Machine-readable identifier, stable across releases.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::UnsupportedPlatform => "UNSUPPORTED_PLATFORM",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::NetworkFailure => "NETWORK_FAILURE",
            ErrorCode::Timeout => "TIMEOUT_ERROR",
            ErrorCode::ParsingFailed => "PARSING_FAILED",
            ErrorCode::InternalServer => "INTERNAL_SERVER_ERROR",
            ErrorCode::Cancelled => "CANCELLED",
        }
    }

    /// HTTP status an API layer should answer with for this category.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::ValidationFailed | ErrorCode::UnsupportedPlatform => 400,
            ErrorCode::NotFound => 404,
            ErrorCode::Timeout => 408,
            ErrorCode::ParsingFailed => 422,
            ErrorCode::Cancelled => 499,
            ErrorCode::NetworkFailure => 502,
            ErrorCode::InternalServer => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "validation failed",
            ErrorCode::UnsupportedPlatform => "unsupported platform",
            ErrorCode::NotFound => "not found",
            ErrorCode::NetworkFailure => "network failure",
            ErrorCode::Timeout => "timeout",
            ErrorCode::ParsingFailed => "parsing failed",
            ErrorCode::InternalServer => "internal error",
            ErrorCode::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// The error type for every extraction operation.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "extract: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {:#}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    /// Create an error with an explicit code.
    pub fn new(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create a ValidationFailed error.
    pub fn validation(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::ValidationFailed, url, op, source)
    }

    /// Create an UnsupportedPlatform error.
    pub fn unsupported_platform(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::UnsupportedPlatform, url, op, source)
    }

    /// Create a NotFound error.
    pub fn not_found(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::NotFound, url, op, source)
    }

    /// Create a NetworkFailure error.
    pub fn network(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::NetworkFailure, url, op, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Timeout, url, op, source)
    }

    /// Create a ParsingFailed error.
    pub fn parsing(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::ParsingFailed, url, op, source)
    }

    /// Create an InternalServer error.
    pub fn internal(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InternalServer, url, op, source)
    }

    /// Create a Cancelled error.
    pub fn cancelled(url: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::Cancelled,
            url,
            op,
            Some(anyhow::anyhow!("request cancelled")),
        )
    }

    pub fn is_validation(&self) -> bool {
        self.code == ErrorCode::ValidationFailed
    }

    pub fn is_unsupported_platform(&self) -> bool {
        self.code == ErrorCode::UnsupportedPlatform
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    pub fn is_network(&self) -> bool {
        self.code == ErrorCode::NetworkFailure
    }

    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    pub fn is_parsing(&self) -> bool {
        self.code == ErrorCode::ParsingFailed
    }

    pub fn is_internal(&self) -> bool {
        self.code == ErrorCode::InternalServer
    }

    pub fn is_cancelled(&self) -> bool {
        self.code == ErrorCode::Cancelled
    }
}
