//! Payment outcomes and the recorder's write request

use common_enums::{Currency, TransactionAction};
use common_utils::types::{MinorUnit, StringMajorUnit};

use crate::bill_number::BillNumber;

/// A signed payment outcome reported by the gateway, from the success
/// redirect or a PayQuery poll.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentResult {
    pub billno: BillNumber,
    /// Paid amount as the gateway reports it, a major-unit decimal string
    pub billamt: StringMajorUnit,
    pub trade_no: String,
}

/// Write request handed to the transaction recorder
#[derive(Debug, Clone)]
pub struct RecordTransactionRequest {
    pub provider: String,
    pub amount: MinorUnit,
    pub currency: Currency,
    pub action: TransactionAction,
    /// Provider payload stored verbatim on the transaction
    pub data: serde_json::Value,
}
