//! Error types and classification of Contentful error responses.
//!
//! Every non-2xx/3xx response body is decoded into an [`ErrorEnvelope`] and
//! mapped onto one [`Error`] variant by its `sys.id` discriminator. API
//! variants keep the request, the response, and the decoded envelope so
//! callers can inspect headers, status codes, and request IDs.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::client::VERSION_HEADER;
use crate::http::{HttpError, HttpRequest, HttpResponse};
use crate::types::Sys;

/// Fixed message for `NotFound` responses, independent of the payload.
pub const NOT_FOUND_MESSAGE: &str = "the requested resource can not be found";

/// Body of an error response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<Sys>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl ErrorEnvelope {
    /// The discriminator (`sys.id`), e.g. `NotFound`.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.sys.as_ref().and_then(|sys| sys.id.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDetail>,
}

/// One field-level failure inside `details.errors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ErrorDetail {
    fn details_text(&self) -> String {
        match &self.details {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Path segments joined as `/a/b`; non-string segments are skipped.
    #[must_use]
    pub fn path_string(&self) -> String {
        match &self.path {
            Some(Value::Array(segments)) => segments
                .iter()
                .filter_map(Value::as_str)
                .fold(String::new(), |mut acc, seg| {
                    acc.push('/');
                    acc.push_str(seg);
                    acc
                }),
            _ => String::new(),
        }
    }
}

/// Structural per-item error returned inside a successful response
/// (e.g. an unresolvable link). Data only, never raised.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuralError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sys: Option<Sys>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Everything known about a failed API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiErrorContext {
    pub request: HttpRequest,
    pub response: HttpResponse,
    pub envelope: ErrorEnvelope,
}

impl ApiErrorContext {
    #[must_use]
    pub fn status(&self) -> u16 {
        self.response.status
    }

    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.envelope.request_id.as_deref()
    }

    /// The version the request carried in `X-Contentful-Version`.
    #[must_use]
    pub fn sent_version(&self) -> Option<&str> {
        self.request.header(VERSION_HEADER)
    }
}

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The resource does not exist.
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound { context: Box<ApiErrorContext> },

    /// Quota exhausted. Retried automatically when the server says when.
    #[error("{message}")]
    RateLimit {
        message: String,
        context: Box<ApiErrorContext>,
    },

    /// The access token is invalid or expired.
    #[error("{message}")]
    Unauthorized {
        message: String,
        context: Box<ApiErrorContext>,
    },

    /// Validation failed or links could not be resolved.
    #[error("{message}")]
    Validation {
        message: String,
        details: Vec<ErrorDetail>,
        context: Box<ApiErrorContext>,
    },

    /// The version sent did not match the stored version.
    #[error("Version {sent_version} is mismatched")]
    VersionConflict {
        sent_version: String,
        context: Box<ApiErrorContext>,
    },

    /// Any other error envelope; the message is the envelope as JSON.
    #[error("{message}")]
    Api {
        message: String,
        context: Box<ApiErrorContext>,
    },

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A continuation URL came back without a `sync_token` parameter.
    #[error("continuation URL carries no sync token: {url}")]
    MissingSyncToken { url: String },

    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Create an invalid request error.
    #[inline]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Check if this error is a rate limit error (retryable).
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimit { .. })
    }

    /// The API context, for errors classified from a server response.
    pub fn context(&self) -> Option<&ApiErrorContext> {
        match self {
            Self::NotFound { context }
            | Self::RateLimit { context, .. }
            | Self::Unauthorized { context, .. }
            | Self::Validation { context, .. }
            | Self::VersionConflict { context, .. }
            | Self::Api { context, .. } => Some(context),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if any.
    pub fn status(&self) -> Option<u16> {
        self.context().map(ApiErrorContext::status)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classify an error response.
///
/// The body is decoded into an [`ErrorEnvelope`]; if that fails the decode
/// error itself is returned as [`Error::Json`].
pub fn classify(request: &HttpRequest, response: &HttpResponse) -> Error {
    let envelope: ErrorEnvelope = match serde_json::from_slice(&response.body) {
        Ok(envelope) => envelope,
        Err(e) => return Error::Json(e),
    };

    let kind = envelope.kind().unwrap_or_default().to_string();
    let message = envelope.message.clone().unwrap_or_default();
    let context = Box::new(ApiErrorContext {
        request: request.clone(),
        response: response.clone(),
        envelope,
    });

    match kind.as_str() {
        "NotFound" => Error::NotFound { context },
        "RateLimitExceeded" => Error::RateLimit { message, context },
        "AccessTokenInvalid" => Error::Unauthorized { message, context },
        "ValidationFailed" | "UnresolvedLinks" => {
            let details = context
                .envelope
                .details
                .as_ref()
                .map(|d| d.errors.clone())
                .unwrap_or_default();
            Error::Validation {
                message: validation_message(&details),
                details,
                context,
            }
        }
        "VersionMismatch" | "Conflict" => Error::VersionConflict {
            sent_version: context.sent_version().unwrap_or_default().to_string(),
            context,
        },
        _ => Error::Api {
            message: serde_json::to_string(&context.envelope).unwrap_or_default(),
            context,
        },
    }
}

/// Build the human-readable message for a validation failure.
///
/// A unique-field violation anywhere in the list suppresses the message.
pub fn validation_message(details: &[ErrorDetail]) -> String {
    let mut msg = String::new();

    for detail in details {
        match detail.name.as_deref() {
            Some("uniqueFieldIds" | "uniqueFieldApiNames") => return String::new(),
            Some("notResolvable") => {
                if matches!(detail.path, Some(Value::Array(_))) {
                    let _ = write!(
                        msg,
                        "errorName: notResolvable, path: {}",
                        detail.path_string()
                    );
                }
            }
            _ => {
                msg.push_str(&detail.details_text());
                msg.push('\n');
            }
        }
    }

    msg
}

/// Get a short, single-line error message suitable for logs.
pub fn short_error_message(err: &Error) -> String {
    let full = match err {
        Error::Api { context, .. } => {
            let kind = context.envelope.kind().unwrap_or("Unknown");
            format!("HTTP {}: {}", context.status(), kind)
        }
        Error::Validation { .. } => "Validation failed".to_string(),
        Error::Json(_) => "JSON parse error".to_string(),
        other => other.to_string(),
    };
    full.lines().next().unwrap_or_default().to_string()
}
