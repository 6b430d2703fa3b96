use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{event, Level};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            ApiError::Internal(ref err) => {
                event!(Level::ERROR, "Request failed: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn bad_request_carries_its_reason() {
        let err = ApiError::BadRequest("stops must not be negative".to_string());
        assert_eq!(err.to_string(), "Bad Request: stops must not be negative");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_errors_hide_their_cause() {
        let err = ApiError::from(anyhow!("serializer exploded"));
        assert_eq!(err.to_string(), "Internal Server Error");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
