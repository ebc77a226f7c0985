pub mod app;
pub mod configs;
pub mod consts;
pub mod error;
pub mod logger;
pub mod metrics;
pub mod server;
pub mod service;
pub mod storage;
pub mod utils;
