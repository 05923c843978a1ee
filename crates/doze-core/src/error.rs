//! Error types for request dispatch.
//!
//! [`DispatchError`] is the error type handlers, middleware and the dispatcher
//! share. Every variant maps to an HTTP status code, and can be rendered as a
//! JSON [`ErrorEnvelope`] for clients.

use doze_router::MatchError;
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`DispatchError`].
pub type DispatchResult<T> = Result<T, DispatchError>;

/// An error raised while dispatching a single request.
///
/// # Example
///
/// ```
/// use doze_core::DispatchError;
/// use http::StatusCode;
///
/// fn load(id: i64) -> Result<String, DispatchError> {
///     if id < 0 {
///         return Err(DispatchError::handler("negative ids are not stored"));
///     }
///     Ok(format!("user-{id}"))
/// }
///
/// let err = load(-1).unwrap_err();
/// assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
/// ```
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No route matches the path.
    #[error("no route matches {path}")]
    NotFound {
        /// The requested path.
        path: String,
    },

    /// A route matches the path but not the method.
    #[error("method {method} is not allowed for {path}")]
    MethodNotAllowed {
        /// The requested path.
        path: String,
        /// The requested method.
        method: Method,
        /// Methods the route handles.
        allowed: Vec<Method>,
    },

    /// Writing the response to the transport failed.
    #[error("failed to send response: {0}")]
    Send(#[from] std::io::Error),

    /// A handler or middleware failed.
    #[error("handler error: {message}")]
    Handler {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The request body could not be decoded.
    #[error("invalid request body: {0}")]
    Body(#[from] serde_json::Error),

    /// Query string or form data could not be decoded.
    #[error("invalid form data: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    /// A handler or middleware panicked.
    #[error("handler panicked: {0}")]
    Panic(String),
}

impl DispatchError {
    /// Creates a handler error with a message.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a handler error with a source error.
    pub fn handler_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Handler {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Body(_) | Self::Form(_) => StatusCode::BAD_REQUEST,
            Self::Send(_) | Self::Handler { .. } | Self::Panic(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            Self::Send(_) => "SEND_FAILED",
            Self::Handler { .. } => "HANDLER_ERROR",
            Self::Body(_) => "INVALID_BODY",
            Self::Form(_) => "INVALID_FORM",
            Self::Panic(_) => "INTERNAL_ERROR",
        }
    }

    /// Converts this error to a serializable error envelope.
    ///
    /// Server-side failures get a generic message so internals are not
    /// leaked to clients.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        let message = if self.status_code().is_server_error() {
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message,
            },
            request_id: request_id.map(ToString::to_string),
        }
    }
}

impl From<MatchError> for DispatchError {
    fn from(err: MatchError) -> Self {
        match err {
            MatchError::NotFound { path } => Self::NotFound { path },
            MatchError::MethodNotAllowed {
                path,
                method,
                allowed,
            } => Self::MethodNotAllowed {
                path,
                method,
                allowed,
            },
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}
