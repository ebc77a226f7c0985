//! Extension traits for serde values

use error_stack::ResultExt;
use serde::Serialize;

use crate::errors::{CustomResult, ParsingError};

pub trait Encode<'e>
where
    Self: 'e + std::fmt::Debug,
{
    /// Convert `self` into `serde_json::Value` by using `serde::Serialize`
    fn encode_to_value(&'e self) -> CustomResult<serde_json::Value, ParsingError>
    where
        Self: Serialize;
}

impl<'e, A> Encode<'e> for A
where
    Self: 'e + std::fmt::Debug,
{
    fn encode_to_value(&'e self) -> CustomResult<serde_json::Value, ParsingError>
    where
        Self: Serialize,
    {
        serde_json::to_value(self)
            .change_context(ParsingError::EncodeError("json-value"))
            .attach_printable_lazy(|| format!("Unable to convert {self:?} to a value"))
    }
}
