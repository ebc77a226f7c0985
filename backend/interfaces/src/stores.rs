//! Storage seams towards the host platform's registration data

use common_utils::CustomResult;
use domain_types::{
    registration::{Registration, Transaction},
    types::EventPaymentSettings,
    RecordTransactionRequest,
};
use uuid::Uuid;

use crate::errors::StorageError;

/// Outcome of an atomic record attempt
#[derive(Debug, Clone)]
pub enum RecordOutcome {
    /// A new transaction was written and the registration state moved
    Recorded(Transaction),
    /// The same trade number is already on file; nothing was changed
    Duplicate,
}

/// Access to registrations and their payment transactions.
///
/// `record_payment` is the single write path for transactions. Implementations
/// must run the duplicate check and the write as one atomic step per
/// registration, so that two concurrent confirmations of the same trade number
/// cannot both record.
#[async_trait::async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Snapshot of a registration by its token
    async fn find_registration(
        &self,
        token: Uuid,
    ) -> CustomResult<Option<Registration>, StorageError>;

    /// Atomically re-check for a duplicate trade number and record the
    /// transaction, moving the registration state per the request's action
    async fn record_payment(
        &self,
        token: Uuid,
        request: RecordTransactionRequest,
    ) -> CustomResult<RecordOutcome, StorageError>;

    /// Flip the refund-allowed flag on the registration's transaction and
    /// return the new value. Fails when the registration has no transaction
    /// from the given provider.
    async fn toggle_refund_flag(
        &self,
        token: Uuid,
        provider: &str,
    ) -> CustomResult<bool, StorageError>;
}

/// Access to per-event gateway credentials
#[async_trait::async_trait]
pub trait EventSettingsStore: Send + Sync {
    async fn event_settings(
        &self,
        event_id: u64,
    ) -> CustomResult<Option<EventPaymentSettings>, StorageError>;
}
