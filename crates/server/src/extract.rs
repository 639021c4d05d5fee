use axum::{
    extract::{
        rejection::{FormRejection, PathRejection},
        FromRequest, FromRequestParts,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::error::{ApiError, ErrorCode};

/// `Path` whose rejections are reported as JSON `ApiError`s.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ExtractRejection))]
pub(crate) struct ApiPath<T>(pub(crate) T);

/// `Form` whose rejections are reported as JSON `ApiError`s.
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(ExtractRejection))]
pub(crate) struct ApiForm<T>(pub(crate) T);

/// Keeps the extractor's own status code and swaps the plain-text body for
/// an `ApiError`.
#[derive(Debug)]
pub(crate) struct ExtractRejection {
    status: StatusCode,
    error: ApiError,
}

impl ExtractRejection {
    fn validation(status: StatusCode, message: String) -> Self {
        Self {
            status,
            error: ApiError::new(ErrorCode::Validation, message),
        }
    }
}

impl From<PathRejection> for ExtractRejection {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for ExtractRejection {
    fn from(rejection: FormRejection) -> Self {
        Self::validation(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ExtractRejection {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}
