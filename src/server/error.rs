use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::extractors::VideoId;
use crate::TranscriptError;

pub(crate) const PIPELINE_FAILURE_MESSAGE: &str = "Failed to fetch transcript. Please try again.";
pub(crate) const UNEXPECTED_FAILURE_MESSAGE: &str = "Failed to process request";

/// Error leaving the HTTP surface: a status plus a JSON body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

impl ApiError {
    /// No identifier in the submitted URL; nothing internal is exposed
    pub fn invalid_url() -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                message: TranscriptError::InvalidUrl.to_string(),
                error: None,
                video_id: None,
            },
        }
    }

    /// The fetch pipeline failed for a known video
    pub fn pipeline(err: &TranscriptError, video_id: &VideoId) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                message: PIPELINE_FAILURE_MESSAGE.to_string(),
                error: Some(err.to_string()),
                video_id: Some(video_id.to_string()),
            },
        }
    }

    /// Anything else, optionally carrying the error text
    pub fn unexpected(detail: Option<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                message: UNEXPECTED_FAILURE_MESSAGE.to_string(),
                error: detail,
                video_id: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        ApiError::unexpected(Some(err.into().to_string()))
    }
}

pub type ApiResult<T, E = ApiError> = Result<T, E>;
