//! Mapping of generation failures onto HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;

use crate::error::GenerationError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    rate_limited: bool,
}

/// Error half of every API handler.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    rate_limited: bool,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            rate_limited: false,
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            status: StatusCode::REQUEST_TIMEOUT,
            message: format!("Request timed out after {} seconds", after.as_secs()),
            rate_limited: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            rate_limited: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        let status = match &err {
            GenerationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            e if e.is_rate_limited() => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::BAD_GATEWAY,
        };
        let message = match &err {
            GenerationError::InvalidInput(_) => err.to_string(),
            _ => err.user_message(),
        };
        Self {
            status,
            message,
            rate_limited: err.is_rate_limited(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            rate_limited: self.rate_limited,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::resilience::classifier::FailureClass;

    #[test]
    fn test_status_mapping() {
        let invalid: ApiError = GenerationError::InvalidInput("topic must not be empty".into()).into();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert!(!invalid.rate_limited);

        let exhausted: ApiError = GenerationError::CredentialsExhausted {
            last: ProviderError::Status {
                status: 429,
                message: "quota".into(),
            },
            class: FailureClass::Quota,
        }
        .into();
        assert_eq!(exhausted.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(exhausted.rate_limited);
        assert!(exhausted.message.contains("GEMINI_API_KEYS"));

        let expired: ApiError = GenerationError::CredentialsExhausted {
            last: ProviderError::Status {
                status: 400,
                message: "API key expired. Please renew the API key.".into(),
            },
            class: FailureClass::Quota,
        }
        .into();
        assert_eq!(expired.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(expired.rate_limited);

        let none: ApiError = GenerationError::NoActiveCredentials.into();
        assert_eq!(none.status(), StatusCode::TOO_MANY_REQUESTS);

        let other: ApiError = GenerationError::Provider(ProviderError::Other("boom".into())).into();
        assert_eq!(other.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(other.message, "Generation failed: boom");
    }
}
