pub mod bill_number;
pub mod errors;
pub mod payment;
pub mod registration;
pub mod types;

pub use bill_number::{BillNumber, BillNumberDecodeError};
pub use payment::{PaymentResult, RecordTransactionRequest};
pub use registration::{Registration, Transaction};
