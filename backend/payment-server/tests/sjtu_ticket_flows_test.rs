#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

mod common;

use axum::http::StatusCode;
use common::*;
use domain_types::BillNumber;
use uuid::Uuid;

#[tokio::test]
async fn invoice_lists_the_issued_tickets() {
    let token = test_token();
    let billno = BillNumber::from_token(token);
    let gateway = spawn_gateway(GatewayResponses {
        ticket_query: Some(ticket_response(&billno)),
        ..Default::default()
    })
    .await;
    let app = app(test_config(
        &gateway.base_url,
        vec![paid_registration(token, "2023SJTU001", false)],
    ))
    .await;

    let uri = format!("{}?token={token}", flow_path("invoice"));
    let response = get_request(app, &uri).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["tickets"].as_array().unwrap().len(), 1);
    assert_eq!(body["tickets"][0]["ticketno"], "TK2023001");
    assert_eq!(body["tickets"][0]["billno"], billno.as_str());
    assert_eq!(body["tickets"][0]["ticketdate"], "2023-09-01");
    assert_eq!(
        body["tickets"][0]["ticketurl"],
        "https://invoice.example/TK2023001.pdf"
    );
    assert_eq!(gateway.hit_count(), 1);
}

#[tokio::test]
async fn invoice_degrades_to_an_empty_list_when_the_gateway_fails() {
    let token = test_token();
    let gateway = spawn_gateway(GatewayResponses::default()).await;
    let app = app(test_config(
        &gateway.base_url,
        vec![paid_registration(token, "2023SJTU001", false)],
    ))
    .await;

    let uri = format!("{}?token={token}", flow_path("invoice"));
    let response = get_request(app, &uri).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["tickets"].as_array().unwrap().is_empty());
    assert_eq!(gateway.hit_count(), 1);
}

#[tokio::test]
async fn invoice_with_unknown_token_is_not_found() {
    let gateway = spawn_gateway(GatewayResponses::default()).await;
    let app = app(test_config(&gateway.base_url, Vec::new())).await;

    let uri = format!("{}?token={}", flow_path("invoice"), Uuid::new_v4());
    let response = get_request(app, &uri).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(gateway.hit_count(), 0);
}
