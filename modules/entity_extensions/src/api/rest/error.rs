//! HTTP error mapping to RFC-9457 Problem Details

use crate::contract::ExtensionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Serialize)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl From<ExtensionError> for Problem {
    fn from(error: ExtensionError) -> Self {
        map_domain_error(error)
    }
}

/// Map extension errors to HTTP Problem Details
///
/// Storage details are logged, not exposed.
pub fn map_domain_error(error: ExtensionError) -> Problem {
    match error {
        ExtensionError::Validation { message } => {
            Problem::new(StatusCode::BAD_REQUEST, "Validation Error").with_detail(message)
        }

        ExtensionError::UnknownJunction { table, value } => Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Unknown Junction Value",
        )
        .with_detail(format!("'{}' does not resolve for {}", value, table)),

        ExtensionError::Storage { message } => {
            tracing::error!("Extension storage error: {}", message);
            Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Extension Storage Error")
                .with_detail("Extension data could not be stored or read")
        }

        ExtensionError::Internal => Problem::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        )
        .with_detail("An unexpected error occurred"),
    }
}
