#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use common_enums::{Currency, RegistrationState};
use payment_server::configs;
use secrecy::ExposeSecret;

// File loading and environment overrides share process-wide env vars, so both
// run inside one test
#[test]
fn config_loads_from_file_and_environment() {
    let config = configs::Config::new().unwrap();

    assert_eq!(config.common.environment, "development");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.server.public_base_url, "http://localhost:8000");
    assert_eq!(config.metrics.port, 9090);
    assert_eq!(config.gateway.base_url, "https://www.jdcw.sjtu.edu.cn");

    assert_eq!(config.events.len(), 1);
    assert_eq!(config.events[0].id, 1);
    assert_eq!(config.events[0].settings.sysid, "199");
    assert_eq!(config.events[0].settings.subsysid, "01");
    assert!(config.events[0].settings.enabled);

    assert_eq!(config.registrations.len(), 1);
    let registration = &config.registrations[0];
    assert_eq!(registration.event_id, 1);
    assert_eq!(registration.currency, Currency::CNY);
    assert_eq!(registration.state, RegistrationState::Unpaid);
    assert!(registration.transaction.is_none());

    std::env::set_var("SJTU__SERVER__PORT", "9999");
    std::env::set_var("SJTU__GATEWAY__CERT", "env-issued-cert");
    let overridden = configs::Config::new().unwrap();
    std::env::remove_var("SJTU__SERVER__PORT");
    std::env::remove_var("SJTU__GATEWAY__CERT");

    assert_eq!(overridden.server.port, 9999);
    assert_eq!(overridden.gateway.cert.expose_secret(), "env-issued-cert");
    // Everything not overridden still comes from the file
    assert_eq!(overridden.server.host, "127.0.0.1");
}
