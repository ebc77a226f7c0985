use error_stack::ResultExt;
use lazy_static::lazy_static;
use prometheus::{self, register_int_counter, Encoder, IntCounter, TextEncoder};

lazy_static! {
    pub static ref PAYMENTS_RECORDED: IntCounter = register_int_counter!(
        "payments_recorded_total",
        "Payment transactions recorded from verified gateway results"
    )
    .unwrap();
    pub static ref SIGNATURE_FAILURES: IntCounter = register_int_counter!(
        "signature_failures_total",
        "Inbound payloads whose MD5 signature did not verify"
    )
    .unwrap();
    pub static ref AMOUNT_MISMATCHES: IntCounter = register_int_counter!(
        "amount_mismatches_total",
        "Verified payment results whose amount did not match the registration fee"
    )
    .unwrap();
    pub static ref DUPLICATE_RESULTS: IntCounter = register_int_counter!(
        "duplicate_results_total",
        "Payment results carrying a trade number that was already recorded"
    )
    .unwrap();
    pub static ref GATEWAY_QUERY_FAILURES: IntCounter = register_int_counter!(
        "gateway_query_failures_total",
        "Gateway queries that failed transport, verification or returned a non-success code"
    )
    .unwrap();
    pub static ref REFUNDS_ACCEPTED: IntCounter = register_int_counter!(
        "refunds_accepted_total",
        "Refund requests the gateway accepted"
    )
    .unwrap();
    pub static ref REFUNDS_REJECTED: IntCounter = register_int_counter!(
        "refunds_rejected_total",
        "Refund requests the gateway rejected or that failed outright"
    )
    .unwrap();
}

pub async fn metrics_handler() -> error_stack::Result<String, MetricsError> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode(&metric_families, &mut buffer)
        .change_context(MetricsError::EncodingError)?;
    String::from_utf8(buffer).change_context(MetricsError::Utf8Error)
}

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Error encoding metrics")]
    EncodingError,
    #[error("Error converting metrics to utf8")]
    Utf8Error,
}
