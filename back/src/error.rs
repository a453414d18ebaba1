use api::v1::{Detail, FieldError};
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("TODO with id {0} not found")]
    NotFound(String),

    #[error("invalid request: {0:?}")]
    Validation(Vec<FieldError>),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn field(loc: &[&str], msg: impl Into<String>, kind: &str) -> Self {
        Error::Validation(vec![FieldError::new(loc, msg, kind)])
    }
}

impl From<Vec<FieldError>> for Error {
    fn from(errors: Vec<FieldError>) -> Self {
        Error::Validation(errors)
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match &rejection {
            JsonRejection::MissingJsonContentType(_) => "content_type",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            _ => "model_attributes_type",
        };
        Error::field(&["body"], rejection.body_text(), kind)
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::field(&["path", "id"], rejection.body_text(), "int_parsing")
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        debug!(status = status.as_u16(), error = %self, "request failed");

        match self {
            Error::NotFound(_) => (
                status,
                Json(Detail {
                    detail: self.to_string(),
                }),
            )
                .into_response(),
            Error::Validation(errors) => (status, Json(Detail { detail: errors })).into_response(),
        }
    }
}
