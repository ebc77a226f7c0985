use std::{future::Future, net, sync::Arc};

use axum::http;
use common_utils::consts;
use interfaces::stores::{EventSettingsStore, RegistrationStore};
use sjtu_gateway::SjtuGateway;
use tokio::{
    signal::unix::{signal, SignalKind},
    sync::oneshot,
};
use tower_http::{request_id::MakeRequestUuid, trace as tower_trace};

use crate::{
    configs, error::ConfigurationError, logger, metrics, server, storage::InMemoryStore, utils,
};

/// # Panics
///
/// Will panic if signal handling fails
pub async fn server_builder(config: configs::Config) -> Result<(), ConfigurationError> {
    let server_config = config.server.clone();
    let socket_addr = net::SocketAddr::new(server_config.host.parse()?, server_config.port);

    // Signal handler
    let (tx, rx) = oneshot::channel();

    #[allow(clippy::expect_used)]
    tokio::spawn(async move {
        let mut sig_int =
            signal(SignalKind::interrupt()).expect("Failed to initialize SIGINT signal handler");
        let mut sig_term =
            signal(SignalKind::terminate()).expect("Failed to initialize SIGTERM signal handler");
        let mut sig_quit =
            signal(SignalKind::quit()).expect("Failed to initialize QUIT signal handler");
        let mut sig_hup =
            signal(SignalKind::hangup()).expect("Failed to initialize SIGHUP signal handler");

        tokio::select! {
            _ = sig_int.recv() => {
                logger::info!("Received SIGINT");
                tx.send(()).expect("Failed to send SIGINT signal");
            }
            _ = sig_term.recv() => {
                logger::info!("Received SIGTERM");
                tx.send(()).expect("Failed to send SIGTERM signal");
            }
            _ = sig_quit.recv() => {
                logger::info!("Received QUIT");
                tx.send(()).expect("Failed to send QUIT signal");
            }
            _ = sig_hup.recv() => {
                logger::info!("Received SIGHUP");
                tx.send(()).expect("Failed to send SIGHUP signal");
            }
        }
    });

    #[allow(clippy::expect_used)]
    let shutdown_signal = async {
        rx.await.expect("Failed to receive shutdown signal");
        logger::info!("Shutdown signal received");
    };

    let service = Service::new(Arc::new(config)).await;

    logger::info!(host = %server_config.host, port = %server_config.port, "starting payment service");

    service.http_server(socket_addr, shutdown_signal).await?;

    Ok(())
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<configs::Config>,
    pub registrations: Arc<dyn RegistrationStore>,
    pub events: Arc<dyn EventSettingsStore>,
    pub gateway: Arc<SjtuGateway>,
}

pub struct Service {
    pub state: AppState,
}

impl Service {
    pub async fn new(config: Arc<configs::Config>) -> Self {
        let store = Arc::new(InMemoryStore::from_config(&config));
        let gateway = Arc::new(SjtuGateway::new(
            config.gateway.clone(),
            config.proxy.clone(),
        ));

        let registrations: Arc<dyn RegistrationStore> = store.clone();
        let events: Arc<dyn EventSettingsStore> = store;

        Self {
            state: AppState {
                registrations,
                events,
                gateway,
                config,
            },
        }
    }

    /// The full application router, layered with tracing and request-id
    /// propagation.
    pub fn router(&self) -> axum::Router {
        let logging_layer = tower_trace::TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                utils::record_fields_from_header(request)
            })
            .on_request(tower_trace::DefaultOnRequest::new().level(tracing::Level::INFO))
            .on_response(
                tower_trace::DefaultOnResponse::new()
                    .level(tracing::Level::INFO)
                    .latency_unit(tower_http::LatencyUnit::Micros),
            )
            .on_failure(
                tower_trace::DefaultOnFailure::new()
                    .latency_unit(tower_http::LatencyUnit::Micros)
                    .level(tracing::Level::ERROR),
            );

        let request_id_layer = tower_http::request_id::SetRequestIdLayer::new(
            http::HeaderName::from_static(consts::X_REQUEST_ID),
            MakeRequestUuid,
        );

        let propagate_request_id_layer = tower_http::request_id::PropagateRequestIdLayer::new(
            http::HeaderName::from_static(consts::X_REQUEST_ID),
        );

        let payment_routes = axum::Router::new()
            .route(
                "/checkout",
                axum::routing::get(server::payments::checkout),
            )
            .route(
                "/success",
                axum::routing::get(server::payments::success).post(server::payments::success),
            )
            .route(
                "/query",
                axum::routing::get(server::payments::query).post(server::payments::query),
            )
            .route(
                "/cancel",
                axum::routing::get(server::payments::cancel).post(server::payments::cancel),
            )
            .route("/invoice", axum::routing::get(server::tickets::invoice))
            .route(
                "/refund",
                axum::routing::get(server::refunds::confirm).post(server::refunds::execute),
            )
            .route(
                "/set_refund",
                axum::routing::get(server::refunds::set_refund),
            );

        axum::Router::new()
            .route(
                "/health",
                axum::routing::get(server::health_check::health),
            )
            .route(
                "/payment/sjtu/callback",
                axum::routing::get(server::payments::callback).post(server::payments::callback),
            )
            .nest(
                "/event/{event_id}/registrations/{reg_form_id}/payment/sjtu",
                payment_routes,
            )
            .with_state(self.state.clone())
            .layer(logging_layer)
            .layer(request_id_layer)
            .layer(propagate_request_id_layer)
    }

    pub async fn http_server(
        self,
        socket: net::SocketAddr,
        shutdown_signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ConfigurationError> {
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(socket).await?;

        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        Ok(())
    }
}

pub async fn metrics_server_builder(config: configs::Config) -> Result<(), ConfigurationError> {
    let listener = config.metrics.tcp_listener().await?;

    let router = axum::Router::new().route(
        "/metrics",
        axum::routing::get(|| async {
            let output = metrics::metrics_handler().await;
            match output {
                Ok(metrics) => Ok(metrics),
                Err(error) => {
                    tracing::error!(?error, "Error fetching metrics");

                    Err((
                        http::StatusCode::INTERNAL_SERVER_ERROR,
                        "Error fetching metrics".to_string(),
                    ))
                }
            }
        }),
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async {
            let output = tokio::signal::ctrl_c().await;
            tracing::error!(?output, "shutting down");
        })
        .await?;

    Ok(())
}
