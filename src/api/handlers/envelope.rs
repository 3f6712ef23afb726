use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::users::UserError;

/// Body of every `/api/users*` response.
///
/// On failure `result` is `null` and the reasons are in `error_messages`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResponseEnvelope<T> {
    pub is_success: bool,
    pub result: Option<T>,
    pub message: String,
    pub error_messages: Vec<String>,
}

impl<T> ResponseEnvelope<T> {
    #[must_use]
    pub fn success(result: T) -> Self {
        Self {
            is_success: true,
            result: Some(result),
            message: String::new(),
            error_messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            result: None,
            message: String::new(),
            error_messages: vec![message.into()],
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    /// The request could not be parsed (bad path segment or JSON body).
    BadRequest(String),
    User(UserError),
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        Self::User(err)
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::User(err) => match err {
                UserError::InvalidInput(_) | UserError::Page(_) => StatusCode::BAD_REQUEST,
                UserError::NotFound(_) => StatusCode::NOT_FOUND,
                UserError::AlreadyBlocked(_)
                | UserError::LoginTaken(_)
                | UserError::AdminExists
                | UserError::Guard(_) => StatusCode::CONFLICT,
                UserError::MissingLookup(_)
                | UserError::Password(_)
                | UserError::HashTask(_)
                | UserError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(message) => message,
            Self::User(err) if err.is_internal() => {
                error!("Failed to handle user request: {err}");
                "Internal server error".to_string()
            }
            Self::User(err) => {
                warn!("Rejected user request: {err}");
                err.to_string()
            }
        };

        (status, Json(ResponseEnvelope::<()>::failure(message))).into_response()
    }
}
