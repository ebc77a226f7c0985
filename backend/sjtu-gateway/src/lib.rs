pub mod checkout;
pub mod client;
pub mod consts;
pub mod envelope;
pub mod transformers;
pub mod xml;

pub use client::SjtuGateway;
