//! Error envelope.
//!
//! Grounded on `examples/original_source/errors.go`'s `APIError`: a
//! user-facing message, an internal message, and an optional wrapped cause.
//! `errors.go`'s `NewAPIError`/`Restore` pair (build-or-pass-through) becomes
//! [`ApiError::wrap`] here; its `MarshalJSON` becomes [`ApiError::envelope`].

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

/// Failures that can occur while decoding the bytes of a single box.
///
/// These never reach a client directly — every box reader's caller wraps
/// them in an [`ApiError`] carrying the user-facing message appropriate to
/// where the failure happened.
#[derive(Debug, Error)]
pub enum ParseFault {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("box declared size {declared} is smaller than its header")]
    BoxTooSmall { declared: u64 },
    #[error("unsupported box version {0}")]
    UnsupportedVersion(u8),
    #[error("first top-level box is not ftyp or moov")]
    NotMp4,
    #[error("major brand {0:?} is not in the supported codec table")]
    UnsupportedBrand([u8; 4]),
    #[error("metadata buffer exceeds the {0}-byte bound")]
    MetadataTooLarge(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// `{"Error":<message>,"Time":<RFC-822 timestamp>}`, in that field order.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "Error")]
    pub error: String,
    #[serde(rename = "Time")]
    pub time: String,
}

/// The service's single error type. Carries a message safe to show a
/// caller, a more detailed internal message, and the cause that produced it
/// (itself possibly another `ApiError`, if a lower layer already wrapped).
pub struct ApiError {
    user_message: String,
    internal_message: String,
    cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ApiError {
    pub const INVALID_MP4: &'static str = "file is not a valid MP4";
    pub const CODEC_NOT_SUPPORTED: &'static str = "codec not supported";
    pub const METADATA_READ: &'static str = "error reading container / track / stream metadata";
    pub const SERVER_ERROR: &'static str = "server-side error";

    pub fn new(
        user_message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ApiError {
            user_message: user_message.into(),
            internal_message: cause.to_string(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn invalid_mp4(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(Self::INVALID_MP4, cause)
    }

    pub fn codec_not_supported(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(Self::CODEC_NOT_SUPPORTED, cause)
    }

    pub fn metadata_read(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(Self::METADATA_READ, cause)
    }

    pub fn server_error(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::new(Self::SERVER_ERROR, cause)
    }

    /// If `err` is already an `ApiError`, returns it unchanged. Otherwise
    /// wraps it with `user_message`. Mirrors `errors.go`'s `NewAPIError`
    /// called only when the recovered value isn't already one of our own.
    pub fn wrap(
        user_message: impl Into<String>,
        err: Box<dyn std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        match err.downcast::<ApiError>() {
            Ok(existing) => *existing,
            Err(err) => ApiError {
                user_message: user_message.into(),
                internal_message: err.to_string(),
                cause: Some(err),
            },
        }
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: self.user_message.clone(),
            time: rfc822_now(),
        }
    }
}

fn rfc822_now() -> String {
    // Go's time.RFC822 layout is "02 Jan 06 15:04 MST"; we always report UTC.
    Utc::now().format("%d %b %y %H:%M UTC").to_string()
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `internal_message` is already `cause.to_string()` (see `new`/`wrap`);
        // the cause itself is kept around only so `source()` can expose it,
        // not to be reprinted here.
        write!(f, "{}", self.internal_message)
    }
}

impl fmt::Debug for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiError")
            .field("user_message", &self.user_message)
            .field("internal_message", &self.internal_message)
            .field("cause", &self.cause.as_ref().map(|c| c.to_string()))
            .finish()
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

/// Failures still answer `200 OK`, with the error envelope as the body.
/// Letting `ApiError` implement `IntoResponse` directly is what lets
/// handlers return `Result<Json<T>, ApiError>` and have `?` just work.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(user_message = %self.user_message, chain = %cause_chain(&self), "request failed");
        (StatusCode::OK, Json(self.envelope())).into_response()
    }
}

/// Walks `Error::source()` all the way down, joining each level with " <- ".
/// This only ever reaches the error log, never the client.
fn cause_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut chain = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        chain.push_str(" <- ");
        chain.push_str(&source.to_string());
        current = source.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_has_exactly_two_keys_in_order() {
        let err = ApiError::invalid_mp4(ParseFault::NotMp4);
        let json = serde_json::to_string(&err.envelope()).unwrap();
        assert_eq!(
            json,
            format!(
                "{{\"Error\":\"file is not a valid MP4\",\"Time\":\"{}\"}}",
                rfc822_now()
            )
        );
    }

    #[test]
    fn display_concatenates_internal_message_and_cause() {
        let err = ApiError::metadata_read(ParseFault::UnsupportedVersion(7));
        assert_eq!(err.to_string(), "unsupported box version 7");
    }

    #[test]
    fn wrap_passes_through_an_existing_envelope_unchanged() {
        let original = ApiError::codec_not_supported(ParseFault::UnsupportedBrand(*b"xyz1"));
        let original_message = original.user_message().to_string();
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(original);
        let wrapped = ApiError::wrap("server-side error", boxed);
        assert_eq!(wrapped.user_message(), original_message);
    }

    #[test]
    fn wrap_builds_a_new_envelope_for_a_foreign_error() {
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(ParseFault::NotMp4);
        let wrapped = ApiError::wrap("server-side error", boxed);
        assert_eq!(wrapped.user_message(), "server-side error");
    }
}
