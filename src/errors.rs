use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

#[derive(thiserror::Error, Debug)]
pub enum AuthenticationError {
    #[error("Missing Authorization header value")]
    MissingHeader,
    #[error("Invalid Authorization header value")]
    InvalidHeader,
    #[error("Unsupported authentication scheme, only Bearer is supported")]
    UnknownAuthScheme,
    #[error("Invalid token")]
    InvalidToken,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthenticationError::MissingHeader
            | AuthenticationError::InvalidHeader
            | AuthenticationError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthenticationError::UnknownAuthScheme => StatusCode::BAD_REQUEST,
            AuthenticationError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let detail = match self {
            AuthenticationError::Other(_) => "Unexpected error during authentication".to_owned(),
            other => other.to_string(),
        };

        problem(status, "/problem/authentication", "Authentication failed", &detail)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Payload is larger than {0} bytes")]
    PayloadTooLarge(usize),
    #[error("Unsupported media type {0}")]
    UnsupportedMediaType(String),
    #[error("Authentication error {0:?}")]
    Authentication(#[from] AuthenticationError),
    #[error("Database error: {0}")]
    Database(sqlx::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(object_type: &str, id: impl std::fmt::Display) -> Self {
        ApiError::NotFound(format!(
            "Object of type {} with id {} was not found",
            object_type, id
        ))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidArgument(message.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => ApiError::NotFound("Object not found".to_owned()),
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                ApiError::Conflict("An object with the same identifier already exists".to_owned())
            }
            sqlx::Error::Database(db_error) if db_error.is_foreign_key_violation() => {
                ApiError::Conflict("The object is still referenced by other objects".to_owned())
            }
            _ => ApiError::Database(error),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Authentication(error) => error.status_code(),
            ApiError::Database(_) | ApiError::Storage(_) | ApiError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            ApiError::Authentication(error) => error.error_response(),
            ApiError::NotFound(detail) => {
                problem(status, "/problem/not-found", "Object not found", detail)
            }
            ApiError::InvalidArgument(detail) => {
                problem(status, "/problem/invalid-argument", "Invalid argument", detail)
            }
            ApiError::Conflict(detail) => problem(status, "/problem/conflict", "Conflict", detail),
            ApiError::PayloadTooLarge(_) => problem(
                status,
                "/problem/payload-too-large",
                "Payload too large",
                &self.to_string(),
            ),
            ApiError::UnsupportedMediaType(_) => problem(
                status,
                "/problem/unsupported-media-type",
                "Unsupported media type",
                &self.to_string(),
            ),
            ApiError::Database(error) => {
                tracing::error!("Database error: {:?}", error);
                problem(
                    status,
                    "/problem/database",
                    "Error with the database",
                    "Unexpected error with the database",
                )
            }
            ApiError::Storage(error) => {
                tracing::error!("Storage error: {:?}", error);
                problem(
                    status,
                    "/problem/storage",
                    "Error with the image storage",
                    "Unexpected error with the image storage",
                )
            }
            ApiError::Unexpected(error) => {
                tracing::error!("Unexpected error: {:?}", error);
                HttpResponse::build(status).finish()
            }
        }
    }
}

fn problem(status: StatusCode, problem_type: &str, title: &str, detail: &str) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("application/problem+json")
        .json(json!({
            "type": problem_type,
            "title": title,
            "status": status.as_u16(),
            "detail": detail,
        }))
}
