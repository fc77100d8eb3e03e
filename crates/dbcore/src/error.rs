//! Error types for dbcore

use thiserror::Error;

/// Result type alias for dbcore operations
pub type DbResult<T> = Result<T, DbError>;

/// Error kinds surfaced by adapters and the execution wrapper.
///
/// Nothing inside this crate recovers from these; every variant propagates
/// to the caller as produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DbError {
    /// Connecting to the backend failed, or the connection became unusable
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// The backend rejected a query or statement
    #[error("Execution error [{code}]: {message} (query: {query})")]
    Execution {
        code: String,
        message: String,
        query: String,
    },

    /// A value could not be rendered as a SQL literal
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A template placeholder had no binding (strict rendering only)
    #[error("Template key missing: {0}")]
    TemplateKeyMissing(String),

    /// Operation not valid in the current connection or transaction state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The adapter does not provide this capability
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Structurally invalid input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration could not be loaded or validated
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create an execution error carrying the backend code and offending query text
    pub fn execution(
        code: impl Into<String>,
        message: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self::Execution {
            code: code.into(),
            message: message.into(),
            query: query.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an invalid-state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Check if this is a connection error
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Check if this is an execution error
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution { .. })
    }

    /// The offending query text, for execution errors.
    pub fn query(&self) -> Option<&str> {
        match self {
            Self::Execution { query, .. } => Some(query),
            _ => None,
        }
    }

    /// The backend-reported error code, for execution errors.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Execution { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for DbError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
