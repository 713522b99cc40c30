//! Error types for the catalog maintenance engine.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based process exit codes (0/1/2/3, see spec §6)
//! - Structured JSON output for `--pipe` / non-TTY consumers

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes.
///
/// Every code maps to one of the four process exit codes defined in
/// spec §6: `0` success, `1` operation failure / non-zero check finding,
/// `2` invalid argument, `3` fatal environment error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidArgument,
    UriParseError,
    BackendUnavailable,
    AuthorizationRequired,
    Open,
    Schema,
    Transaction,
    Query,
    Constraint,
    IntegrityViolation,
    UnknownVersion,
    UnsupportedVersion,
    OutOfMemory,
    Cancelled,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::UriParseError => "URI_PARSE_ERROR",
            Self::BackendUnavailable => "BACKEND_UNAVAILABLE",
            Self::AuthorizationRequired => "AUTHORIZATION_REQUIRED",
            Self::Open => "OPEN",
            Self::Schema => "SCHEMA",
            Self::Transaction => "TRANSACTION",
            Self::Query => "QUERY",
            Self::Constraint => "CONSTRAINT",
            Self::IntegrityViolation => "INTEGRITY_VIOLATION",
            Self::UnknownVersion => "UNKNOWN_VERSION",
            Self::UnsupportedVersion => "UNSUPPORTED_VERSION",
            Self::OutOfMemory => "OUT_OF_MEMORY",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Process exit code for this error category (spec §6).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidArgument | Self::UriParseError => 2,
            Self::BackendUnavailable
            | Self::Open
            | Self::AuthorizationRequired
            | Self::OutOfMemory => 3,
            Self::Schema
            | Self::Transaction
            | Self::Query
            | Self::Constraint
            | Self::IntegrityViolation
            | Self::UnknownVersion
            | Self::UnsupportedVersion
            | Self::Cancelled => 1,
        }
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur while operating on a catalog.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("could not parse database URI '{uri}': {reason}")]
    UriParse { uri: String, reason: String },

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("authorization required for {server}")]
    AuthorizationRequired { server: String },

    #[error("could not open catalog: {0}")]
    Open(String),

    #[error("schema operation failed: {0}")]
    Schema(String),

    #[error("transaction aborted: {0}")]
    Transaction(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("integrity check found {count} violation(s): {detail}")]
    IntegrityViolation { count: u64, detail: String },

    #[error("unknown catalog schema version {version}")]
    UnknownVersion { version: i64 },

    #[error("unsupported catalog schema version {version} (minimum supported is 6)")]
    UnsupportedVersion { version: i64 },

    #[error("out of memory: {0}")]
    OutOfMemory(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("sql error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::UriParse { .. } => ErrorCode::UriParseError,
            Self::BackendUnavailable(_) => ErrorCode::BackendUnavailable,
            Self::AuthorizationRequired { .. } => ErrorCode::AuthorizationRequired,
            Self::Open(_) => ErrorCode::Open,
            Self::Schema(_) => ErrorCode::Schema,
            Self::Transaction(_) => ErrorCode::Transaction,
            Self::Query(_) => ErrorCode::Query,
            Self::Constraint(_) => ErrorCode::Constraint,
            Self::IntegrityViolation { .. } => ErrorCode::IntegrityViolation,
            Self::UnknownVersion { .. } => ErrorCode::UnknownVersion,
            Self::UnsupportedVersion { .. } => ErrorCode::UnsupportedVersion,
            Self::OutOfMemory(_) => ErrorCode::OutOfMemory,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Sqlite(_) | Self::Sqlx(_) => ErrorCode::Query,
            Self::Io(_) => ErrorCode::Open,
        }
    }

    /// Process exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Structured JSON representation for `--pipe` / non-TTY consumers.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "exit_code": code.exit_code(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_spec_categories() {
        assert_eq!(ErrorCode::InvalidArgument.exit_code(), 2);
        assert_eq!(ErrorCode::UriParseError.exit_code(), 2);
        assert_eq!(ErrorCode::Open.exit_code(), 3);
        assert_eq!(ErrorCode::BackendUnavailable.exit_code(), 3);
        assert_eq!(ErrorCode::Schema.exit_code(), 1);
        assert_eq!(ErrorCode::IntegrityViolation.exit_code(), 1);
    }

    #[test]
    fn structured_json_carries_exit_code() {
        let err = Error::UnknownVersion { version: 42 };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "UNKNOWN_VERSION");
        assert_eq!(json["error"]["exit_code"], 1);
    }
}
