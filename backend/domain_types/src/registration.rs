//! Host-platform entities payments settle against

use common_enums::{Currency, RegistrationState, TransactionStatus};
use common_utils::types::MinorUnit;
use time::PrimitiveDateTime;
use uuid::Uuid;

/// A participant's registration for an event on the host platform
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Registration {
    /// Opaque token the host platform issued for this registration
    pub token: Uuid,
    pub event_id: u64,
    pub registration_form_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Amount due, in minor units of `currency`
    pub price: MinorUnit,
    pub currency: Currency,
    #[serde(default)]
    pub state: RegistrationState,
    /// Latest payment transaction recorded against this registration, if any
    #[serde(default)]
    pub transaction: Option<Transaction>,
}

impl Registration {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The latest payment transaction recorded against a registration. Each new
/// record replaces the previous one wholesale.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    /// Payment provider that produced this transaction, e.g. "sjtu"
    pub provider: String,
    pub amount: MinorUnit,
    pub currency: Currency,
    pub status: TransactionStatus,
    /// Provider-specific payload captured verbatim at record time
    pub data: serde_json::Value,
    pub recorded_at: PrimitiveDateTime,
}

impl Transaction {
    /// The gateway trade number this transaction was recorded under
    pub fn trade_no(&self) -> Option<&str> {
        self.data.get("trade_no").and_then(|value| value.as_str())
    }

    /// Whether a manager has opened this transaction up for refunding
    pub fn allow_refund(&self) -> bool {
        self.data
            .get("allow_refund")
            .and_then(|value| value.as_bool())
            .unwrap_or(false)
    }
}
