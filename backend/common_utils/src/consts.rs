//! Consolidated constants for the payment service

// =============================================================================
// HTTP Headers
// =============================================================================

/// Header key for request ID
pub const X_REQUEST_ID: &str = "x-request-id";

// =============================================================================
// Base64 Engines
// =============================================================================

/// Standard base64 engine with padding, used for form payloads
pub const BASE64_ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// URL-safe base64 engine without padding, used for bill numbers
pub const BASE64_URL_SAFE_NO_PAD_ENGINE: base64::engine::GeneralPurpose =
    base64::engine::general_purpose::URL_SAFE_NO_PAD;

// =============================================================================
// Service Identity
// =============================================================================

/// Constant variable for name, doubles as the environment variable prefix
pub const NAME: &str = "SJTU";

// =============================================================================
// Environment and Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Development,
    Release,
}

impl Env {
    pub const fn current_env() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Release
        }
    }

    pub const fn config_path(self) -> &'static str {
        match self {
            Self::Development => "development.toml",
            Self::Release => "production.toml",
        }
    }
}

impl std::fmt::Display for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Release => write!(f, "release"),
        }
    }
}
