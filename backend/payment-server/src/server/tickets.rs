use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain_types::BillNumber;
use sjtu_gateway::transformers::Ticket;
use tracing::info;

use crate::{app::AppState, error::AppErrorResponse, metrics, server, server::TokenParams};

#[derive(Debug, serde::Serialize)]
pub struct InvoiceResponse {
    pub success: bool,
    /// Electronic tickets the gateway has issued for this bill, oldest first
    pub tickets: Vec<Ticket>,
}

/// Fetch the electronic tickets (invoices) the gateway issued for a paid
/// registration. Failures are soft: the caller gets `success: false` and an
/// empty list rather than an error page.
#[tracing::instrument(name = "sjtu_invoice", skip_all)]
pub async fn invoice(
    State(state): State<AppState>,
    Path((event_id, reg_form_id)): Path<(u64, u64)>,
    Query(params): Query<TokenParams>,
) -> Result<Json<InvoiceResponse>, AppErrorResponse> {
    info!("SJTU_INVOICE_FLOW: initiated");

    let registration =
        server::registration_by_token(&state, params.token, event_id, reg_form_id).await?;
    let event = server::event_settings(&state, event_id).await?;
    let billno = BillNumber::from_token(registration.token);

    match state.gateway.ticket_query(&event, &billno).await {
        Some(response) => Ok(Json(InvoiceResponse {
            success: true,
            tickets: response.entries().to_vec(),
        })),
        None => {
            metrics::GATEWAY_QUERY_FAILURES.inc();
            Ok(Json(InvoiceResponse {
                success: false,
                tickets: Vec::new(),
            }))
        }
    }
}
