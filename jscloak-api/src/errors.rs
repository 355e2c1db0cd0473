use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use jscloak_core::{HandleError, HandleErrorKind, RequestId};
use thiserror::Error;

use crate::models::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        request_id: RequestId,
    },

    #[error("obfuscation failed: {message}")]
    Transform {
        message: String,
        request_id: RequestId,
    },

    #[error("invalid request: {message}")]
    BadRequest {
        message: String,
        request_id: RequestId,
    },

    #[error("too many requests, try again later")]
    RateLimited {
        request_id: RequestId,
        retry_after_secs: u64,
    },

    #[error("internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn request_id(&self) -> Option<&RequestId> {
        match self {
            ApiError::Validation { request_id, .. }
            | ApiError::Transform { request_id, .. }
            | ApiError::BadRequest { request_id, .. }
            | ApiError::RateLimited { request_id, .. } => Some(request_id),
            ApiError::InternalError(_) => None,
        }
    }

    fn body(&self) -> ErrorResponse {
        let request_id = self.request_id().map(|id| id.to_string());
        match self {
            ApiError::Transform { message, .. } => ErrorResponse {
                error: "obfuscation failed".to_string(),
                message: Some(message.clone()),
                request_id,
            },
            ApiError::Validation { message, .. } => ErrorResponse {
                error: message.clone(),
                message: None,
                request_id,
            },
            other => ErrorResponse {
                error: other.to_string(),
                message: None,
                request_id,
            },
        }
    }
}

impl From<HandleError> for ApiError {
    fn from(err: HandleError) -> Self {
        let HandleError { request_id, kind } = err;
        match kind {
            HandleErrorKind::Validation(validation) => ApiError::Validation {
                message: validation.to_string(),
                request_id,
            },
            HandleErrorKind::Transform(transform) => ApiError::Transform {
                message: transform.message,
                request_id,
            },
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let ApiError::RateLimited {
            retry_after_secs, ..
        } = self
        {
            builder.insert_header((header::RETRY_AFTER, retry_after_secs.to_string()));
        }
        builder.json(self.body())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Transform { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
