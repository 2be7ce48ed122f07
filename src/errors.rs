use axum::http::StatusCode;
use chrono::NaiveDate;
use thiserror::Error;

/// Integrity problems in the daily feed or in a request against it.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("malformed date {0:?}, expected DD-MM-YYYY")]
    MalformedDate(String),

    #[error("record for {current} is not after {previous}")]
    OutOfOrder {
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("category {0:?} has no maximum range")]
    UnknownCategory(String),

    #[error("unknown granularity {0:?}")]
    UnknownGranularity(String),

    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected category range tables. Raised at startup, before serving.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("category {category:?} on {date} has no maximum range")]
    UnknownCategory { category: String, date: NaiveDate },

    #[error("maximum range for {0:?} must be positive")]
    NonPositiveMax(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::MalformedDate(_) | DataError::UnknownGranularity(_) => {
                Self::bad_request(err.to_string())
            }
            DataError::UnknownCategory(_) | DataError::OutOfOrder { .. } => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: err.to_string(),
            },
            DataError::Io(_) | DataError::Json(_) => Self::internal(err),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
