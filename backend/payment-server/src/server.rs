pub mod health_check;
pub mod payments;
pub mod refunds;
pub mod tickets;

use axum::response::Redirect;
use common_enums::FlashLevel;
use common_utils::errors::ParsingError;
use domain_types::{
    errors::{ApiError, ApplicationErrorResponse},
    types::{EventPaymentSettings, HostPlatform},
    Registration,
};
use error_stack::{report, Report};
use interfaces::errors::{GatewayError, StorageError};
use uuid::Uuid;

use crate::{app::AppState, consts, error::AppErrorResponse};

/// Flash message surfaced on the host platform's registration page after a
/// redirect.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Flash {
    pub message: String,
    pub level: FlashLevel,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: FlashLevel::Success,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: FlashLevel::Info,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: FlashLevel::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: FlashLevel::Error,
        }
    }
}

/// Query parameter selecting a registration on token-keyed routes
#[derive(Debug, serde::Deserialize)]
pub struct TokenParams {
    pub token: Uuid,
}

/// The host platform's registration page for this event and form
pub fn registration_page_url(host: &HostPlatform, event_id: u64, reg_form_id: u64) -> String {
    format!(
        "{}/event/{}/registrations/{}/register",
        host.base_url.trim_end_matches('/'),
        event_id,
        reg_form_id
    )
}

/// 303 back to the registration page, with the flash carried as query
/// parameters for the host platform to render.
pub fn flash_redirect(
    host: &HostPlatform,
    event_id: u64,
    reg_form_id: u64,
    flash: &Flash,
) -> Redirect {
    let url = format!(
        "{}?{}={}&{}={}",
        registration_page_url(host, event_id, reg_form_id),
        consts::FLASH_MESSAGE_PARAM,
        urlencoding::encode(&flash.message),
        consts::FLASH_LEVEL_PARAM,
        flash.level,
    );
    Redirect::to(&url)
}

pub(crate) fn bad_request(sub_code: &str, message: &str) -> AppErrorResponse {
    AppErrorResponse(report!(ApplicationErrorResponse::BadRequest(ApiError {
        sub_code: sub_code.to_string(),
        error_identifier: 400,
        error_message: message.to_string(),
        error_object: None,
    })))
}

pub(crate) fn not_found(sub_code: &str, message: &str) -> AppErrorResponse {
    AppErrorResponse(report!(ApplicationErrorResponse::NotFound(ApiError {
        sub_code: sub_code.to_string(),
        error_identifier: 404,
        error_message: message.to_string(),
        error_object: None,
    })))
}

pub(crate) fn storage_failure(report: Report<StorageError>) -> AppErrorResponse {
    AppErrorResponse(report.change_context(ApplicationErrorResponse::InternalServerError(
        ApiError {
            sub_code: "STORAGE_FAILURE".to_string(),
            error_identifier: 500,
            error_message: "The registration store rejected the operation".to_string(),
            error_object: None,
        },
    )))
}

pub(crate) fn gateway_failure(report: Report<GatewayError>) -> AppErrorResponse {
    AppErrorResponse(report.change_context(ApplicationErrorResponse::InternalServerError(
        ApiError {
            sub_code: "GATEWAY_FAILURE".to_string(),
            error_identifier: 500,
            error_message: "Building the gateway payload failed".to_string(),
            error_object: None,
        },
    )))
}

pub(crate) fn conversion_failure(report: Report<ParsingError>) -> AppErrorResponse {
    AppErrorResponse(report.change_context(ApplicationErrorResponse::InternalServerError(
        ApiError {
            sub_code: "AMOUNT_CONVERSION_FAILURE".to_string(),
            error_identifier: 500,
            error_message: "The recorded amount could not be rendered for the gateway".to_string(),
            error_object: None,
        },
    )))
}

/// Settings for the event, rejecting events that have SJTU payments disabled
/// or no billing identity at all.
pub(crate) async fn event_settings(
    state: &AppState,
    event_id: u64,
) -> Result<EventPaymentSettings, AppErrorResponse> {
    state
        .events
        .event_settings(event_id)
        .await
        .map_err(storage_failure)?
        .filter(|settings| settings.enabled)
        .ok_or_else(|| {
            bad_request(
                "PAYMENTS_NOT_ENABLED",
                "SJTU payments are not enabled for this event",
            )
        })
}

/// Look up a registration by token and pin it to the event and form in the
/// request path.
pub(crate) async fn registration_by_token(
    state: &AppState,
    token: Uuid,
    event_id: u64,
    reg_form_id: u64,
) -> Result<Registration, AppErrorResponse> {
    let registration = state
        .registrations
        .find_registration(token)
        .await
        .map_err(storage_failure)?
        .ok_or_else(|| not_found("UNKNOWN_REGISTRATION", "no registration with this token"))?;

    if registration.event_id != event_id || registration.registration_form_id != reg_form_id {
        return Err(bad_request(
            "REGISTRATION_MISMATCH",
            "the registration does not belong to this event and form",
        ));
    }

    Ok(registration)
}
