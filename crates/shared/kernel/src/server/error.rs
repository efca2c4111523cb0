use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use spore_domain::DomainError;
use spore_domain::api::ErrorResponse;
use std::borrow::Cow;
use tracing::{error, warn};

/// Error returned by every handler; rendered as `{"detail": "..."}`.
#[spore_derive::spore_error]
pub enum ApiError {
    /// Field values that parse but break a domain rule (422).
    #[error("{source}{}", format_context(.context))]
    Validation { source: DomainError, context: Option<Cow<'static, str>> },

    /// Query or body that does not deserialize into the expected shape (422).
    #[error("{message}{}", format_context(.context))]
    Unprocessable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Well-formed request the server refuses, e.g. an unsupported upload (400).
    #[error("{message}{}", format_context(.context))]
    BadRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Anything that went wrong on our side (500).
    #[error("{message}{}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest { message: message.into(), context: None }
    }

    pub fn unprocessable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Unprocessable { message: message.into(), context: None }
    }
}

impl From<super::ApiStateError> for ApiError {
    fn from(e: super::ApiStateError) -> Self {
        Self::Internal { message: e.to_string().into(), context: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();
        if status.is_server_error() {
            error!(status = status.as_u16(), detail = %detail, "Request failed");
        } else {
            warn!(status = status.as_u16(), detail = %detail, "Request rejected");
        }
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
