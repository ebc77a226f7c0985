//! Setup logging subsystem.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::config;

/// Contains guards necessary for logging
#[derive(Debug)]
pub struct TelemetryGuard {
    _log_guards: Vec<WorkerGuard>,
}

/// Setup logging sub-system specifying the logging configuration, service (binary) name, and a
/// list of external crates for which a more verbose logging must be enabled. All crates within
/// the current cargo workspace are automatically considered for verbose logging.
pub fn setup(
    config: &config::Log,
    service_name: &str,
    crates_to_filter: impl AsRef<[&'static str]>,
) -> TelemetryGuard {
    let mut guards = Vec::new();
    let mut subscriber_layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.console.enabled {
        let (console_writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        guards.push(guard);

        let filtering_directive = config
            .console
            .filtering_directive
            .clone()
            .unwrap_or_else(|| {
                get_envfilter_directive(
                    tracing::Level::WARN,
                    config.console.level.into_level(),
                    crates_to_filter.as_ref(),
                )
            });
        let console_filter = EnvFilter::new(filtering_directive);

        match config.console.log_format {
            config::LogFormat::Default => {
                let logging_layer = fmt::layer()
                    .with_writer(console_writer)
                    .with_filter(console_filter);
                subscriber_layers.push(logging_layer.boxed());
            }
            config::LogFormat::Json => {
                // Disable color output and other ANSI escape codes within
                // error reports when logging in the JSON format
                error_stack::Report::set_color_mode(error_stack::fmt::ColorMode::None);

                let logging_layer = fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(console_writer)
                    .with_filter(console_filter);
                subscriber_layers.push(logging_layer.boxed());
            }
        }
    }

    tracing_subscriber::registry().with(subscriber_layers).init();

    tracing::info!(
        service_name,
        build_version = crate::version!(),
        "Logging subsystem initialized"
    );

    TelemetryGuard {
        _log_guards: guards,
    }
}

/// Env-filter directive granting `filter_log_level` to the workspace crates
/// and the explicitly named targets, with `default_log_level` for everything
/// else.
fn get_envfilter_directive(
    default_log_level: tracing::Level,
    filter_log_level: tracing::Level,
    crates_to_filter: &[&'static str],
) -> String {
    let mut handled_targets = vec![
        "sjtupay_common_enums",
        "sjtupay_common_utils",
        "domain_types",
        "interfaces",
        "external_services",
        "sjtu_gateway",
        "payment_server",
    ];
    handled_targets.extend(crates_to_filter);

    handled_targets
        .iter()
        .map(|target| target.replace('-', "_"))
        .map(|target| format!("{target}={filter_log_level}"))
        .fold(default_log_level.to_string(), |directive, target_directive| {
            format!("{directive},{target_directive}")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_covers_workspace_and_explicit_targets() {
        let directive = get_envfilter_directive(
            tracing::Level::WARN,
            tracing::Level::DEBUG,
            &["payment-server", "tower_http"],
        );

        assert!(directive.starts_with("WARN,"));
        assert!(directive.contains("sjtu_gateway=DEBUG"));
        assert!(directive.contains("payment_server=DEBUG"));
        assert!(directive.contains("tower_http=DEBUG"));
        assert!(!directive.contains('-'));
    }
}
