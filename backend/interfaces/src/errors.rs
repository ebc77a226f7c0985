//! Error types at the gateway and storage seams

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Failed to build the request to the gateway")]
    RequestEncodingFailed,
    #[error("Failed to deserialize the gateway response")]
    ResponseDeserializationFailed,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Registration not found")]
    RegistrationNotFound,
    #[error("Registration has no transaction to update")]
    TransactionNotFound,
}
