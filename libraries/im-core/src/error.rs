/// Core error types for the identity manager
use thiserror::Error;

/// Result type alias using `ImError`
pub type Result<T> = std::result::Result<T, ImError>;

/// Coarse failure classification reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    PermissionDenied,
    NotFound,
    Internal,
}

/// Core error type for the identity manager
#[derive(Error, Debug)]
pub enum ImError {
    /// Missing or malformed request data
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The request would break a dependency rule
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Storage or invariant failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl ImError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Internal(_) | Self::Database(_) | Self::Serialization(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for ImError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
