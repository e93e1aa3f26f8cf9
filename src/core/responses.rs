use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use redis::RedisError;
use serde::Serialize;
use std::fmt::{Display, Formatter};
use validator::ValidationErrors;

pub const ACCESS_DENIED_PATH: &str = "/Account/AccessDenied";

#[derive(Debug, PartialEq)]
pub enum AppErrorType {
    NotFoundError,
    DbError,
    AuthError,
    PayloadValidationError,
    CacheError,
    InternalServerError,
    ForbiddenError,
}

#[derive(Debug, PartialEq)]
pub struct AppError {
    pub error_type: AppErrorType,
    pub message: Option<String>,
    pub cause: Option<String>,
}

#[derive(Serialize)]
pub struct AppErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<&'static str>,
}

impl AppError {
    /// Text shown to the caller. Storage and cache failures never leak their cause.
    pub fn message(&self) -> String {
        match self {
            AppError {
                error_type:
                    AppErrorType::DbError | AppErrorType::CacheError | AppErrorType::InternalServerError,
                ..
            } => "An unexpected error has occurred, please try again".to_string(),
            AppError {
                message: Some(message),
                ..
            } => message.clone(),
            AppError {
                message: None,
                error_type: AppErrorType::NotFoundError,
                ..
            } => "The requested item was not found".to_string(),
            AppError {
                message: None,
                error_type: AppErrorType::ForbiddenError,
                ..
            } => "Access denied".to_string(),
            _ => "An unexpected error has occurred".to_string(),
        }
    }

    pub fn db_error(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::DbError,
            message: None,
        }
    }

    pub fn not_found() -> AppError {
        AppError {
            cause: None,
            error_type: AppErrorType::NotFoundError,
            message: None,
        }
    }

    pub fn access_denied() -> AppError {
        AppError {
            cause: None,
            error_type: AppErrorType::ForbiddenError,
            message: None,
        }
    }

    pub fn unauthorized(error: impl ToString) -> AppError {
        AppError {
            cause: None,
            error_type: AppErrorType::AuthError,
            message: Some(error.to_string()),
        }
    }

    pub fn validation(error: impl ToString) -> AppError {
        AppError {
            cause: None,
            error_type: AppErrorType::PayloadValidationError,
            message: Some(error.to_string()),
        }
    }

    pub fn internal_error(error: impl ToString) -> AppError {
        AppError {
            cause: Some(error.to_string()),
            error_type: AppErrorType::InternalServerError,
            message: None,
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::internal_error(error)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        AppError::db_error(error)
    }
}

impl From<RedisError> for AppError {
    fn from(error: RedisError) -> Self {
        AppError {
            cause: Some(error.to_string()),
            message: None,
            error_type: AppErrorType::CacheError,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();

        AppError::validation(messages.join("; "))
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.error_type {
            AppErrorType::AuthError => StatusCode::UNAUTHORIZED,
            AppErrorType::DbError
            | AppErrorType::CacheError
            | AppErrorType::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            AppErrorType::NotFoundError => StatusCode::NOT_FOUND,
            AppErrorType::PayloadValidationError => StatusCode::BAD_REQUEST,
            AppErrorType::ForbiddenError => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!(
                error.cause = ?self.cause,
                error.kind = ?self.error_type,
                "request failed"
            );
        }

        let redirect = match self.error_type {
            AppErrorType::ForbiddenError => Some(ACCESS_DENIED_PATH),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(AppErrorResponse {
            success: false,
            message: self.message(),
            redirect,
        })
    }
}

#[derive(Serialize)]
pub struct AppSuccessResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> AppSuccessResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }
}
