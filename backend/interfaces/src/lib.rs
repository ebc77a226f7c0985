pub mod errors;
pub mod stores;
pub mod types;
