use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Form, Json,
};
use common_enums::{RegistrationState, TransactionAction};
use domain_types::{BillNumber, PaymentResult, RecordTransactionRequest, Registration};
use interfaces::stores::RecordOutcome;
use sjtu_gateway::{
    checkout::{build_checkout_form, CheckoutForm},
    consts::PROVIDER_NAME,
    envelope, transformers, xml,
};
use tracing::info;

use crate::{
    app::AppState,
    error::AppErrorResponse,
    metrics, server,
    server::{Flash, TokenParams},
    service,
};

/// Success-redirect parameters. Unlike enveloped responses, the gateway
/// sends the signature and the payload here as two separate parameters.
#[derive(Debug, serde::Deserialize)]
pub struct SignedDataParams {
    pub sign: String,
    pub data: String,
}

/// Signature over the bare bill number, as sent by the host platform's
/// status poller.
#[derive(Debug, serde::Deserialize)]
pub struct SignedBillnoParams {
    pub sign: String,
    pub billno: BillNumber,
}

#[derive(Debug, serde::Serialize)]
pub struct AckResponse {
    pub success: bool,
}

/// Browser returns from the gateway after paying. The outcome is verified and
/// recorded, then the browser is always sent back to the registration page
/// with a flash describing what happened.
#[tracing::instrument(name = "sjtu_success", skip_all)]
pub async fn success(
    State(state): State<AppState>,
    Path((event_id, reg_form_id)): Path<(u64, u64)>,
    Query(params): Query<SignedDataParams>,
) -> Result<Redirect, AppErrorResponse> {
    info!("SJTU_SUCCESS_FLOW: initiated");

    let result: PaymentResult = xml::parse_payload::<transformers::PayResult>(&params.data)
        .map_err(|error| {
            tracing::warn!(?error, "Success redirect carried an unparseable payload");
            server::bad_request(
                "MALFORMED_PAY_RESULT",
                "the data parameter is not a payment result payload",
            )
        })?
        .into();
    let registration = resolve_registration(&state, &result.billno, event_id, reg_form_id).await?;
    let event = server::event_settings(&state, event_id).await?;

    let host = &state.config.host_platform;
    let verified =
        envelope::verify_payload(&event, &state.config.gateway.cert, &params.data, &params.sign)
            .unwrap_or(false);
    if !verified {
        tracing::warn!(billno = %result.billno, "Success redirect failed signature verification");
        metrics::SIGNATURE_FAILURES.inc();
        return Ok(server::flash_redirect(
            host,
            event_id,
            reg_form_id,
            &Flash::error("Payment sign error."),
        ));
    }

    if !service::verify_amount(&registration, &result.billamt) {
        metrics::AMOUNT_MISMATCHES.inc();
        return Ok(server::flash_redirect(
            host,
            event_id,
            reg_form_id,
            &Flash::error("Payment amount error."),
        ));
    }

    if service::is_duplicate(&registration, &result.trade_no) {
        metrics::DUPLICATE_RESULTS.inc();
        return Ok(server::flash_redirect(
            host,
            event_id,
            reg_form_id,
            &Flash::warning("Payment transaction duplicated."),
        ));
    }

    let outcome = state
        .registrations
        .record_payment(registration.token, record_request(&registration, result))
        .await
        .map_err(server::storage_failure)?;
    let flash = match outcome {
        RecordOutcome::Recorded(transaction) => {
            metrics::PAYMENTS_RECORDED.inc();
            info!(trade_no = ?transaction.trade_no(), "Payment recorded from success redirect");
            Flash::success("Your payment request has been processed.")
        }
        RecordOutcome::Duplicate => {
            metrics::DUPLICATE_RESULTS.inc();
            Flash::warning("Payment transaction duplicated.")
        }
    };

    Ok(server::flash_redirect(host, event_id, reg_form_id, &flash))
}

/// Host platform polls for the payment status. The response tells the poller
/// whether to keep polling: `success: true` means not settled yet, keep
/// going; `success: false` means the payment is handled (or the query could
/// not be trusted) and polling should stop.
#[tracing::instrument(name = "sjtu_query", skip_all)]
pub async fn query(
    State(state): State<AppState>,
    Path((event_id, reg_form_id)): Path<(u64, u64)>,
    Form(params): Form<SignedBillnoParams>,
) -> Result<Json<AckResponse>, AppErrorResponse> {
    info!("SJTU_QUERY_FLOW: initiated");

    let registration = resolve_registration(&state, &params.billno, event_id, reg_form_id).await?;
    let event = server::event_settings(&state, event_id).await?;

    let verified = envelope::verify_payload(
        &event,
        &state.config.gateway.cert,
        params.billno.as_str(),
        &params.sign,
    )
    .unwrap_or(false);
    if !verified {
        tracing::warn!(billno = %params.billno, "Status query failed signature verification");
        metrics::SIGNATURE_FAILURES.inc();
        return Ok(Json(AckResponse { success: false }));
    }

    if registration.state != RegistrationState::Unpaid {
        // Already settled on our side. The gateway is not consulted.
        return Ok(Json(AckResponse { success: false }));
    }

    let Some(response) = state.gateway.pay_query(&event, &params.billno).await else {
        metrics::GATEWAY_QUERY_FAILURES.inc();
        return Ok(Json(AckResponse { success: true }));
    };

    for entry in response.entries() {
        if !service::is_payment_state_paid(entry.paystate) {
            continue;
        }
        if !service::verify_amount(&registration, &entry.billamt) {
            metrics::AMOUNT_MISMATCHES.inc();
            continue;
        }

        let request = RecordTransactionRequest {
            provider: PROVIDER_NAME.to_string(),
            amount: registration.price,
            currency: registration.currency,
            action: TransactionAction::Complete,
            data: serde_json::json!({
                "billno": entry.billno,
                "billamt": entry.billamt,
                "trade_no": entry.trade_no,
                "paystate": entry.paystate,
            }),
        };
        let outcome = state
            .registrations
            .record_payment(registration.token, request)
            .await
            .map_err(server::storage_failure)?;
        match outcome {
            RecordOutcome::Recorded(transaction) => {
                metrics::PAYMENTS_RECORDED.inc();
                info!(trade_no = ?transaction.trade_no(), "Payment recorded from status query");
            }
            RecordOutcome::Duplicate => {
                metrics::DUPLICATE_RESULTS.inc();
            }
        }
        return Ok(Json(AckResponse { success: false }));
    }

    // Nothing paid-and-matching yet; the poller should try again.
    Ok(Json(AckResponse { success: true }))
}

/// Browser comes back from the gateway without paying.
#[tracing::instrument(name = "sjtu_cancel", skip_all)]
pub async fn cancel(
    State(state): State<AppState>,
    Path((event_id, reg_form_id)): Path<(u64, u64)>,
) -> Redirect {
    info!("SJTU_CANCEL_FLOW: initiated");

    server::flash_redirect(
        &state.config.host_platform,
        event_id,
        reg_form_id,
        &Flash::info("You cancelled the payment process."),
    )
}

/// Server-to-server acknowledgement endpoint. Recording happens on the
/// success redirect and the status query; this only tells the gateway the
/// notification was received.
pub async fn callback() -> Json<AckResponse> {
    Json(AckResponse { success: true })
}

/// Checkout payload for the host platform to render as a self-submitting
/// form towards the gateway.
#[tracing::instrument(name = "sjtu_checkout", skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    Path((event_id, reg_form_id)): Path<(u64, u64)>,
    Query(params): Query<TokenParams>,
) -> Result<Json<CheckoutForm>, AppErrorResponse> {
    info!("SJTU_CHECKOUT_FLOW: initiated");

    let registration =
        server::registration_by_token(&state, params.token, event_id, reg_form_id).await?;
    let event = server::event_settings(&state, event_id).await?;

    let public_base_url = &state.config.server.public_base_url;
    let return_url = service_route_url(public_base_url, event_id, reg_form_id, "success");
    let query_url = service_route_url(public_base_url, event_id, reg_form_id, "query");

    let form = build_checkout_form(
        &state.config.gateway,
        &event,
        &registration,
        return_url,
        query_url,
    )
    .map_err(server::gateway_failure)?;

    Ok(Json(form))
}

/// Route of this service under its public base URL
fn service_route_url(
    public_base_url: &str,
    event_id: u64,
    reg_form_id: u64,
    endpoint: &str,
) -> String {
    format!(
        "{}/event/{}/registrations/{}/payment/sjtu/{}",
        public_base_url.trim_end_matches('/'),
        event_id,
        reg_form_id,
        endpoint
    )
}

/// Resolve the registration a bill number points at and pin it to the event
/// and form in the request path.
async fn resolve_registration(
    state: &AppState,
    billno: &BillNumber,
    event_id: u64,
    reg_form_id: u64,
) -> Result<Registration, AppErrorResponse> {
    let token = billno.token().map_err(|error| {
        tracing::warn!(%billno, %error, "Bill number does not decode to a registration token");
        server::bad_request(
            "INVALID_BILL_NUMBER",
            "the bill number does not decode to a registration token",
        )
    })?;

    let registration = state
        .registrations
        .find_registration(token)
        .await
        .map_err(server::storage_failure)?
        .ok_or_else(|| {
            server::bad_request(
                "UNKNOWN_REGISTRATION",
                "no registration for this bill number",
            )
        })?;

    if registration.event_id != event_id || registration.registration_form_id != reg_form_id {
        return Err(server::bad_request(
            "REGISTRATION_MISMATCH",
            "the registration does not belong to this event and form",
        ));
    }

    Ok(registration)
}

fn record_request(registration: &Registration, result: PaymentResult) -> RecordTransactionRequest {
    RecordTransactionRequest {
        provider: PROVIDER_NAME.to_string(),
        amount: registration.price,
        currency: registration.currency,
        action: TransactionAction::Complete,
        data: serde_json::json!({
            "billno": result.billno,
            "billamt": result.billamt,
            "trade_no": result.trade_no,
        }),
    }
}
