//! Configuration types shared across the service

use secrecy::Secret;

/// Location and credentials of the SJTU Pay gateway, fixed per deployment
#[derive(Clone, serde::Deserialize, Debug)]
pub struct PaymentSettings {
    /// base url
    pub base_url: String,
    /// Shared secret issued by the gateway operator, mixed into every
    /// signature but never sent on the wire
    pub cert: Secret<String>,
}

/// Per-event billing identity registered with the gateway
#[derive(Clone, serde::Deserialize, Debug)]
pub struct EventPaymentSettings {
    pub enabled: bool,
    /// Event title, used in the order remark shown on the gateway's pages
    pub title: String,
    pub sysid: String,
    pub subsysid: String,
    pub feeitemid: String,
}

/// Where the host platform lives, for redirecting browsers back to
/// registration pages
#[derive(Clone, serde::Deserialize, Debug)]
pub struct HostPlatform {
    pub base_url: String,
}

#[derive(Debug, serde::Deserialize, Clone)]
pub struct Proxy {
    pub http_url: Option<String>,
    pub https_url: Option<String>,
    pub idle_pool_connection_timeout: Option<u64>,
    /// Ceiling on every outbound gateway call, in seconds
    pub request_timeout: Option<u64>,
    pub bypass_proxy_urls: Vec<String>,
}
