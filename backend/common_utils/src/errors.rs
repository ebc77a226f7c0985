//! Errors and their custom result type

/// The custom result type used throughout the workspace, built on [`error_stack`]
pub type CustomResult<T, E> = error_stack::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ParsingError {
    /// Failed to serialize the given type into the named format
    #[error("Failed to serialize to {0} format")]
    EncodeError(&'static str),
    /// Failed to parse an i64 amount into a decimal
    #[error("Failed to convert i64 to Decimal")]
    I64ToDecimalConversionFailure,
    /// The decimal amount has no exact i64 representation in minor units
    #[error("Failed to convert Decimal to i64")]
    DecimalToI64ConversionFailure,
    /// Failed to parse an amount string into a decimal
    #[error("Failed to convert string to Decimal: {error}")]
    StringToDecimalConversionFailure { error: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Failed to generate message digest")]
    DigestFailed,
}
