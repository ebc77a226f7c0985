//! Common utilities for the SJTU Pay service

pub mod consts;
pub mod crypto;
pub mod errors;
pub mod ext_traits;
pub mod request;
pub mod types;

pub use errors::{CustomResult, ParsingError};
pub use request::{Method, Request, RequestContent};
pub use types::{AmountConvertor, MinorUnit, StringMajorUnit, StringMajorUnitForConnector};

/// Date and time utilities over the [`time`] crate
pub mod date_time {
    use time::{OffsetDateTime, PrimitiveDateTime};

    /// Create a new [`PrimitiveDateTime`] with the current date and time in UTC.
    pub fn now() -> PrimitiveDateTime {
        let utc_date_time = OffsetDateTime::now_utc();
        PrimitiveDateTime::new(utc_date_time.date(), utc_date_time.time())
    }
}
