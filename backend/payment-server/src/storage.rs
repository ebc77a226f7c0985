//! In-memory registration and event-settings store, seeded from
//! configuration.

use std::{collections::HashMap, sync::Arc};

use common_utils::CustomResult;
use domain_types::{
    registration::{Registration, Transaction},
    types::EventPaymentSettings,
    RecordTransactionRequest,
};
use error_stack::report;
use interfaces::{
    errors::StorageError,
    stores::{EventSettingsStore, RecordOutcome, RegistrationStore},
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::configs;

/// Registrations live behind per-registration locks. `record_payment` holds
/// the lock across the duplicate re-check and the write, so two concurrent
/// confirmations of the same trade number cannot both record.
pub struct InMemoryStore {
    registrations: HashMap<Uuid, Arc<Mutex<Registration>>>,
    events: HashMap<u64, EventPaymentSettings>,
}

impl InMemoryStore {
    pub fn new(
        events: HashMap<u64, EventPaymentSettings>,
        registrations: Vec<Registration>,
    ) -> Self {
        Self {
            registrations: registrations
                .into_iter()
                .map(|registration| (registration.token, Arc::new(Mutex::new(registration))))
                .collect(),
            events,
        }
    }

    pub fn from_config(config: &configs::Config) -> Self {
        Self::new(
            config
                .events
                .iter()
                .cloned()
                .map(|seed| (seed.id, seed.settings))
                .collect(),
            config.registrations.clone(),
        )
    }

    fn cell(&self, token: Uuid) -> CustomResult<&Arc<Mutex<Registration>>, StorageError> {
        self.registrations
            .get(&token)
            .ok_or_else(|| report!(StorageError::RegistrationNotFound))
    }
}

#[async_trait::async_trait]
impl RegistrationStore for InMemoryStore {
    async fn find_registration(
        &self,
        token: Uuid,
    ) -> CustomResult<Option<Registration>, StorageError> {
        match self.registrations.get(&token) {
            Some(cell) => Ok(Some(cell.lock().await.clone())),
            None => Ok(None),
        }
    }

    async fn record_payment(
        &self,
        token: Uuid,
        request: RecordTransactionRequest,
    ) -> CustomResult<RecordOutcome, StorageError> {
        let cell = self.cell(token)?;
        let mut registration = cell.lock().await;

        // Re-check under the lock: a concurrent confirmation may have
        // recorded this trade number since the caller last looked.
        let incoming_trade_no = request.data.get("trade_no").and_then(|value| value.as_str());
        if let (Some(existing), Some(incoming)) =
            (registration.transaction.as_ref(), incoming_trade_no)
        {
            if existing.provider == request.provider && existing.trade_no() == Some(incoming) {
                return Ok(RecordOutcome::Duplicate);
            }
        }

        let transaction = Transaction {
            provider: request.provider,
            amount: request.amount,
            currency: request.currency,
            status: request.action.transaction_status(),
            data: request.data,
            recorded_at: common_utils::date_time::now(),
        };
        registration.state = request.action.registration_state();
        registration.transaction = Some(transaction.clone());

        Ok(RecordOutcome::Recorded(transaction))
    }

    async fn toggle_refund_flag(
        &self,
        token: Uuid,
        provider: &str,
    ) -> CustomResult<bool, StorageError> {
        let cell = self.cell(token)?;
        let mut registration = cell.lock().await;

        let transaction = registration
            .transaction
            .as_mut()
            .filter(|transaction| transaction.provider == provider)
            .ok_or_else(|| report!(StorageError::TransactionNotFound))?;

        let allow_refund = !transaction.allow_refund();
        if !transaction.data.is_object() {
            transaction.data = serde_json::Value::Object(serde_json::Map::new());
        }
        if let Some(data) = transaction.data.as_object_mut() {
            data.insert(
                "allow_refund".to_string(),
                serde_json::Value::Bool(allow_refund),
            );
        }

        Ok(allow_refund)
    }
}

#[async_trait::async_trait]
impl EventSettingsStore for InMemoryStore {
    async fn event_settings(
        &self,
        event_id: u64,
    ) -> CustomResult<Option<EventPaymentSettings>, StorageError> {
        Ok(self.events.get(&event_id).cloned())
    }
}
