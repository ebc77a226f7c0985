#![allow(dead_code)]
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    body::Body,
    http::Request,
    response::Response,
    routing::{get, post},
    Router,
};
use common_enums::{Currency, RegistrationState, TransactionStatus};
use common_utils::types::MinorUnit;
use domain_types::{
    registration::{Registration, Transaction},
    types::{EventPaymentSettings, HostPlatform, PaymentSettings, Proxy},
    BillNumber,
};
use payment_server::{
    app::{AppState, Service},
    configs,
    logger::config::{Log, LogConsole},
};
use secrecy::Secret;
use tower::ServiceExt;
use uuid::Uuid;

// Constants for the SJTU gateway test fixtures
pub const CERT: &str = "test-shared-cert";
pub const SYSID: &str = "199";
pub const SUBSYSID: &str = "01";
pub const FEEITEMID: &str = "20230001";
pub const EVENT_ID: u64 = 7;
pub const REG_FORM_ID: u64 = 3;
pub const PRICE_MINOR: i64 = 10000;

pub fn test_token() -> Uuid {
    Uuid::parse_str("01234567-89ab-cdef-0123-456789abcdef").unwrap()
}

pub fn event_settings() -> EventPaymentSettings {
    EventPaymentSettings {
        enabled: true,
        title: "Rust Conf 2023".to_string(),
        sysid: SYSID.to_string(),
        subsysid: SUBSYSID.to_string(),
        feeitemid: FEEITEMID.to_string(),
    }
}

pub fn unpaid_registration(token: Uuid) -> Registration {
    Registration {
        token,
        event_id: EVENT_ID,
        registration_form_id: REG_FORM_ID,
        first_name: "Wei".to_string(),
        last_name: "Chen".to_string(),
        email: "wei.chen@example.com".to_string(),
        price: MinorUnit::new(PRICE_MINOR),
        currency: Currency::CNY,
        state: RegistrationState::Unpaid,
        transaction: None,
    }
}

pub fn paid_registration(token: Uuid, trade_no: &str, allow_refund: bool) -> Registration {
    let mut registration = unpaid_registration(token);
    registration.state = RegistrationState::Complete;
    registration.transaction = Some(Transaction {
        provider: "sjtu".to_string(),
        amount: MinorUnit::new(PRICE_MINOR),
        currency: Currency::CNY,
        status: TransactionStatus::Successful,
        data: serde_json::json!({
            "billno": BillNumber::from_token(token),
            "billamt": "100.00",
            "trade_no": trade_no,
            "allow_refund": allow_refund,
        }),
        recorded_at: common_utils::date_time::now(),
    });
    registration
}

pub fn test_config(gateway_base_url: &str, registrations: Vec<Registration>) -> configs::Config {
    configs::Config {
        common: configs::Common {
            environment: "development".to_string(),
        },
        server: configs::Server {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_base_url: "http://localhost:8000".to_string(),
        },
        metrics: configs::MetricsServer {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        log: Log {
            console: LogConsole {
                enabled: false,
                ..Default::default()
            },
        },
        proxy: Proxy {
            http_url: None,
            https_url: None,
            idle_pool_connection_timeout: Some(90),
            request_timeout: Some(5),
            bypass_proxy_urls: Vec::new(),
        },
        gateway: PaymentSettings {
            base_url: gateway_base_url.to_string(),
            cert: Secret::new(CERT.to_string()),
        },
        host_platform: HostPlatform {
            base_url: "http://events.example.edu".to_string(),
        },
        events: vec![configs::EventSeed {
            id: EVENT_ID,
            settings: event_settings(),
        }],
        registrations,
    }
}

pub async fn app_with_state(config: configs::Config) -> (Router, AppState) {
    let service = Service::new(Arc::new(config)).await;
    let state = service.state.clone();
    (service.router(), state)
}

pub async fn app(config: configs::Config) -> Router {
    app_with_state(config).await.0
}

/// MD5 signature the way the gateway computes it, with the test fixtures'
/// billing identity and cert
pub fn sign(payload: &str) -> String {
    sjtu_gateway::envelope::sign_payload(&event_settings(), &Secret::new(CERT.to_string()), payload)
        .unwrap()
}

pub fn enveloped(payload: &str) -> String {
    format!("{}@{}", sign(payload), payload)
}

pub fn enveloped_encoded(payload: &str) -> String {
    format!("{}@{}", sign(payload), urlencoding::encode(payload))
}

// Wire payloads the gateway would produce

pub fn pay_result_xml(billno: &BillNumber, billamt: &str, trade_no: &str) -> String {
    format!(
        "<payResult><billno>{billno}</billno><billamt>{billamt}</billamt>\
         <trade_no>{trade_no}</trade_no></payResult>"
    )
}

pub fn pay_query_paid_response(
    billno: &BillNumber,
    billamt: &str,
    trade_no: &str,
    paystate: i32,
) -> String {
    enveloped_encoded(&format!(
        "<queryResult><returncode>0000</returncode><billdtls><billdtl>\
         <billno>{billno}</billno><billamt>{billamt}</billamt>\
         <trade_no>{trade_no}</trade_no><paystate>{paystate}</paystate>\
         </billdtl></billdtls></queryResult>"
    ))
}

pub fn pay_query_error_response(returncode: &str) -> String {
    enveloped_encoded(&format!(
        "<queryResult><returncode>{returncode}</returncode>\
         <returnmsg>no payment record</returnmsg></queryResult>"
    ))
}

pub fn ticket_response(billno: &BillNumber) -> String {
    enveloped_encoded(&format!(
        "<ticketResult><returncode>0000</returncode><tickets><ticket>\
         <ticketno>TK2023001</ticketno><billno>{billno}</billno>\
         <ticketdate>2023-09-01</ticketdate>\
         <ticketurl>https://invoice.example/TK2023001.pdf</ticketurl>\
         </ticket></tickets></ticketResult>"
    ))
}

pub fn refund_accepted_response() -> String {
    enveloped("<refundresult><refundState>1</refundState></refundresult>")
}

pub fn refund_rejected_response(msg: &str) -> String {
    enveloped(&format!(
        "<refundresult><refundState>0</refundState><msg>{msg}</msg></refundresult>"
    ))
}

/// Bodies the mock gateway serves per endpoint; unset endpoints answer with
/// an empty body, which clients treat as a malformed envelope.
#[derive(Clone, Default)]
pub struct GatewayResponses {
    pub pay_query: Option<String>,
    pub ticket_query: Option<String>,
    pub refund: Option<String>,
}

pub struct MockGateway {
    pub base_url: String,
    /// Total requests the mock received, for asserting the gateway was (not)
    /// contacted
    pub hits: Arc<AtomicUsize>,
}

impl MockGateway {
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub async fn spawn_gateway(responses: GatewayResponses) -> MockGateway {
    let hits = Arc::new(AtomicUsize::new(0));

    let pay_hits = Arc::clone(&hits);
    let ticket_hits = Arc::clone(&hits);
    let refund_hits = Arc::clone(&hits);
    let pay_body = responses.pay_query.unwrap_or_default();
    let ticket_body = responses.ticket_query.unwrap_or_default();
    let refund_body = responses.refund.unwrap_or_default();

    let router = Router::new()
        .route(
            "/portal/Query_PayQuery.action",
            get(move || {
                pay_hits.fetch_add(1, Ordering::SeqCst);
                let body = pay_body.clone();
                async move { body }
            }),
        )
        .route(
            "/payment_dzp/portal/TicketQuery.action",
            get(move || {
                ticket_hits.fetch_add(1, Ordering::SeqCst);
                let body = ticket_body.clone();
                async move { body }
            }),
        )
        .route(
            "/portal/appRefund.action",
            post(move || {
                refund_hits.fetch_add(1, Ordering::SeqCst);
                let body = refund_body.clone();
                async move { body }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    MockGateway {
        base_url: format!("http://{addr}"),
        hits,
    }
}

// Request helpers

pub fn flow_path(endpoint: &str) -> String {
    format!("/event/{EVENT_ID}/registrations/{REG_FORM_ID}/payment/sjtu/{endpoint}")
}

pub fn success_uri(payload: &str) -> String {
    format!(
        "{}?sign={}&data={}",
        flow_path("success"),
        sign(payload),
        urlencoding::encode(payload)
    )
}

pub fn query_form(billno: &BillNumber) -> String {
    format!("sign={}&billno={}", sign(billno.as_str()), billno)
}

pub async fn get_request(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_form(app: Router, uri: &str, form: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location_header(response: &Response) -> String {
    response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}
