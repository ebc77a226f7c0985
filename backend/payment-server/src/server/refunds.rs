use axum::{
    extract::{Path, Query, State},
    Json,
};
use common_enums::Currency;
use common_utils::types::{AmountConvertor, StringMajorUnit, StringMajorUnitForConnector};
use domain_types::{BillNumber, Registration, Transaction};
use interfaces::errors::StorageError;
use sjtu_gateway::{
    consts::{PROVIDER_NAME, REFUND_REASON},
    transformers::RefundInfo,
};
use tracing::info;

use crate::{
    app::AppState,
    error::AppErrorResponse,
    metrics, server,
    server::{Flash, TokenParams},
};

/// What a manager is about to refund, shown before they commit.
#[derive(Debug, serde::Serialize)]
pub struct RefundConfirmation {
    pub billno: BillNumber,
    /// Refund amount as a major-unit decimal string
    pub amount: String,
    pub currency: Currency,
}

#[derive(Debug, serde::Serialize)]
pub struct RefundOutcome {
    pub success: bool,
    /// Where the manager's browser should go next
    pub redirect: String,
    pub flash: Flash,
}

#[derive(Debug, serde::Serialize)]
pub struct SetRefundResponse {
    pub success: bool,
    /// New value of the refund-allowed flag
    pub allow_refund: bool,
}

/// Refund preview for the manager confirmation dialog.
#[tracing::instrument(name = "sjtu_refund_confirm", skip_all)]
pub async fn confirm(
    State(state): State<AppState>,
    Path((event_id, reg_form_id)): Path<(u64, u64)>,
    Query(params): Query<TokenParams>,
) -> Result<Json<RefundConfirmation>, AppErrorResponse> {
    let registration =
        server::registration_by_token(&state, params.token, event_id, reg_form_id).await?;
    let transaction = sjtu_transaction(&registration)?;
    let amount = refund_amount(transaction)?;

    Ok(Json(RefundConfirmation {
        billno: BillNumber::from_token(registration.token),
        amount: amount.get_amount_as_string(),
        currency: transaction.currency,
    }))
}

/// Send the refund to the gateway. Only transactions a manager has opened up
/// via `set_refund` can be refunded, and the gateway's verdict is surfaced
/// verbatim when it rejects.
#[tracing::instrument(name = "sjtu_refund", skip_all)]
pub async fn execute(
    State(state): State<AppState>,
    Path((event_id, reg_form_id)): Path<(u64, u64)>,
    Query(params): Query<TokenParams>,
) -> Result<Json<RefundOutcome>, AppErrorResponse> {
    info!("SJTU_REFUND_FLOW: initiated");

    let registration =
        server::registration_by_token(&state, params.token, event_id, reg_form_id).await?;
    let event = server::event_settings(&state, event_id).await?;
    let transaction = sjtu_transaction(&registration)?;
    let redirect = server::registration_page_url(&state.config.host_platform, event_id, reg_form_id);

    if !transaction.allow_refund() {
        return Ok(Json(RefundOutcome {
            success: false,
            redirect,
            flash: Flash::error("Refunds are not enabled for this transaction."),
        }));
    }

    let refund = RefundInfo {
        billno: BillNumber::from_token(registration.token),
        billamt: refund_amount(transaction)?,
        feeitemid: event.feeitemid.clone(),
        reason: REFUND_REASON.to_string(),
    };
    let outcome = match state.gateway.refund(&event, refund).await {
        Some(result) if result.is_success() => {
            metrics::REFUNDS_ACCEPTED.inc();
            info!(billno = %BillNumber::from_token(registration.token), "Gateway accepted the refund");
            RefundOutcome {
                success: true,
                redirect,
                flash: Flash::success("Your refund request has been processed."),
            }
        }
        Some(result) => {
            metrics::REFUNDS_REJECTED.inc();
            tracing::warn!(
                refund_state = %result.refund_state,
                msg = %result.message(),
                "Gateway rejected the refund"
            );
            RefundOutcome {
                success: false,
                redirect,
                flash: Flash::error(format!(
                    "Please contact the event manager. {}",
                    result.message()
                )),
            }
        }
        None => {
            metrics::REFUNDS_REJECTED.inc();
            RefundOutcome {
                success: false,
                redirect,
                flash: Flash::error("Please contact the event manager."),
            }
        }
    };

    Ok(Json(outcome))
}

/// Flip the refund-allowed flag on the registration's SJTU transaction.
#[tracing::instrument(name = "sjtu_set_refund", skip_all)]
pub async fn set_refund(
    State(state): State<AppState>,
    Path((event_id, reg_form_id)): Path<(u64, u64)>,
    Query(params): Query<TokenParams>,
) -> Result<Json<SetRefundResponse>, AppErrorResponse> {
    server::registration_by_token(&state, params.token, event_id, reg_form_id).await?;

    match state
        .registrations
        .toggle_refund_flag(params.token, PROVIDER_NAME)
        .await
    {
        Ok(allow_refund) => Ok(Json(SetRefundResponse {
            success: true,
            allow_refund,
        })),
        Err(report) => {
            let response = match report.current_context() {
                StorageError::TransactionNotFound => server::not_found(
                    "NO_SJTU_TRANSACTION",
                    "the registration has no SJTU transaction",
                ),
                StorageError::RegistrationNotFound => server::not_found(
                    "UNKNOWN_REGISTRATION",
                    "no registration with this token",
                ),
            };
            Err(response)
        }
    }
}

/// The registration's SJTU transaction, without which there is nothing to
/// refund.
fn sjtu_transaction(registration: &Registration) -> Result<&Transaction, AppErrorResponse> {
    registration
        .transaction
        .as_ref()
        .filter(|transaction| transaction.provider == PROVIDER_NAME)
        .ok_or_else(|| {
            server::not_found(
                "NO_SJTU_TRANSACTION",
                "the registration has no SJTU transaction",
            )
        })
}

/// Refunds always cover the recorded amount in full.
fn refund_amount(transaction: &Transaction) -> Result<StringMajorUnit, AppErrorResponse> {
    StringMajorUnitForConnector
        .convert(transaction.amount, transaction.currency)
        .map_err(server::conversion_failure)
}
