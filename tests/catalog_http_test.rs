//! Integration tests for HttpCatalogClient.
//!
//! Uses wiremock as the catalog provider. Covers item lookup, listing, health,
//! status mapping, and correlation id forwarding.

use std::time::Duration;

use cart_service::catalog::http::CORRELATION_HEADER;
use cart_service::catalog::{CatalogClient, CatalogError, HttpCatalogClient};
use cart_service::context::RequestContext;
use cart_service::model::CatalogItem;
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(mock_server: &MockServer) -> HttpCatalogClient {
    HttpCatalogClient::new(&mock_server.uri()).expect("failed to create client")
}

fn ctx() -> RequestContext {
    RequestContext::with_correlation_id("corr-1", Duration::from_secs(5))
}

fn envelope(data: serde_json::Value) -> serde_json::Value {
    json!({ "meta": { "version": "1.0.0" }, "data": data })
}

#[tokio::test]
async fn test_get_item_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/42"))
        .and(header(CORRELATION_HEADER, "corr-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": "42",
            "name": "Widget",
            "price": "9.99"
        }))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let item = client(&mock_server)
        .get_item(&ctx(), "42")
        .await
        .expect("lookup failed");

    assert_eq!(item, CatalogItem::new("42", "Widget", Decimal::new(999, 2)));
}

#[tokio::test]
async fn test_get_item_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).get_item(&ctx(), "nope").await;
    assert_eq!(result, Err(CatalogError::NotFoundOnProvider("nope".into())));
}

#[tokio::test]
async fn test_get_item_server_error_is_upstream() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/42"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).get_item(&ctx(), "42").await;
    assert!(matches!(result, Err(CatalogError::Upstream(_))), "got {result:?}");
}

#[tokio::test]
async fn test_get_item_unparseable_price_is_upstream() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": "42",
            "name": "Widget",
            "price": "nine"
        }))))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).get_item(&ctx(), "42").await;
    match result {
        Err(CatalogError::Upstream(msg)) => assert!(msg.contains("invalid price"), "{msg}"),
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_item_malformed_body_is_upstream() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).get_item(&ctx(), "42").await;
    assert!(matches!(result, Err(CatalogError::Upstream(_))));
}

#[tokio::test]
async fn test_get_item_times_out_at_deadline() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products/42"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let ctx = RequestContext::new(Duration::from_millis(100));
    let result = client(&mock_server).get_item(&ctx, "42").await;
    assert!(matches!(result, Err(CatalogError::Upstream(_))));
}

#[tokio::test]
async fn test_get_all_items_keeps_provider_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "id": "2", "name": "Gadget", "price": "20.00" },
            { "id": "1", "name": "Widget", "price": "9.99" }
        ]))))
        .mount(&mock_server)
        .await;

    let items = client(&mock_server)
        .get_all_items(&ctx())
        .await
        .expect("listing failed");

    let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1"]);
    assert_eq!(items[0].price, Decimal::new(2000, 2));
}

#[tokio::test]
async fn test_get_all_items_fails_on_one_bad_price() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([
            { "id": "1", "name": "Widget", "price": "9.99" },
            { "id": "2", "name": "Broken", "price": "" }
        ]))))
        .mount(&mock_server)
        .await;

    let result = client(&mock_server).get_all_items(&ctx()).await;
    assert!(matches!(result, Err(CatalogError::Upstream(_))));
}

#[tokio::test]
async fn test_health_ok() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "status": "OK" }))),
        )
        .mount(&mock_server)
        .await;

    assert!(client(&mock_server).health(&ctx()).await);
}

#[tokio::test]
async fn test_health_other_status_is_unhealthy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({ "status": "DEGRADED" }))),
        )
        .mount(&mock_server)
        .await;

    assert!(!client(&mock_server).health(&ctx()).await);
}

#[tokio::test]
async fn test_health_server_error_is_unhealthy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    assert!(!client(&mock_server).health(&ctx()).await);
}

#[tokio::test]
async fn test_base_url_with_path_prefix() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/products/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({
            "id": "7",
            "name": "Lamp",
            "price": "15"
        }))))
        .mount(&mock_server)
        .await;

    let client = HttpCatalogClient::new(&format!("{}/v1/", mock_server.uri()))
        .expect("failed to create client");
    let item = client.get_item(&ctx(), "7").await.expect("lookup failed");
    assert_eq!(item.price, Decimal::from(15));
}
