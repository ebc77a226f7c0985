use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain_types::errors::ApplicationErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid host for socket: {0}")]
    AddressError(#[from] std::net::AddrParseError),
    #[error("Error while connecting/creating sockets: {0}")]
    IoError(#[from] std::io::Error),
}

/// Report wrapper that renders an [`ApplicationErrorResponse`] as the HTTP
/// response for a failed handler.
#[derive(Debug)]
pub struct AppErrorResponse(pub error_stack::Report<ApplicationErrorResponse>);

impl From<error_stack::Report<ApplicationErrorResponse>> for AppErrorResponse {
    fn from(report: error_stack::Report<ApplicationErrorResponse>) -> Self {
        Self(report)
    }
}

impl IntoResponse for AppErrorResponse {
    fn into_response(self) -> Response {
        let (status, api_error) = match self.0.current_context() {
            ApplicationErrorResponse::Unauthorized(api_error) => {
                (StatusCode::UNAUTHORIZED, api_error.clone())
            }
            ApplicationErrorResponse::InternalServerError(api_error) => {
                (StatusCode::INTERNAL_SERVER_ERROR, api_error.clone())
            }
            ApplicationErrorResponse::NotFound(api_error) => {
                (StatusCode::NOT_FOUND, api_error.clone())
            }
            ApplicationErrorResponse::BadRequest(api_error) => {
                (StatusCode::BAD_REQUEST, api_error.clone())
            }
        };
        tracing::warn!(error = ?self.0, status = %status, "request failed");
        (status, Json(api_error)).into_response()
    }
}
