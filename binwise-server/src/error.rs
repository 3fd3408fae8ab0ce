use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use binwise_core::{DetectError, InputError, RecognizeError};

/// Error returned by every handler, rendered as `{success: false, error, message}`.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    message: &'a str,
}

impl ApiError {
    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: "not_found",
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_input",
            message: message.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.kind,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<DetectError> for ApiError {
    fn from(err: DetectError) -> Self {
        let (status, kind) = match &err {
            DetectError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "detector_unavailable"),
            DetectError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "detector_timeout"),
            DetectError::Malformed(_) => (StatusCode::BAD_GATEWAY, "detector_malformed"),
        };
        tracing::warn!(error = %err, status = status.as_u16(), "detection failed");
        Self {
            status,
            kind,
            message: err.to_string(),
        }
    }
}

impl From<RecognizeError> for ApiError {
    fn from(err: RecognizeError) -> Self {
        match err {
            RecognizeError::Input(err) => err.into(),
            RecognizeError::Detect(err) => err.into(),
        }
    }
}
