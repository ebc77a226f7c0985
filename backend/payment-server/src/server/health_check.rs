use crate::logger;

/// Liveness probe. Touches no stores and no gateway.
pub async fn health() -> &'static str {
    logger::debug!("health was called");

    "health is good"
}
