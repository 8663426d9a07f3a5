//! Operator commands against a wiremock backend

mod support;

use backoffice_app::{execute, Cli, Command};
use clap::Parser;
use serde_json::json;
use support::{closed_port_address, context_for};
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn command(args: &[&str]) -> Command {
    Cli::try_parse_from(std::iter::once("backoffice").chain(args.iter().copied())).expect("parse").command
}

#[tokio::test]
async fn fetch_renders_live_payload_with_its_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "P-1" }])))
        .mount(&server)
        .await;
    let context = context_for(&[server.uri()]).await;

    let output = execute(&context, command(&["fetch", "products", "/products"])).await.unwrap();

    assert_eq!(output["source"]["origin"], "live");
    assert_eq!(output["source"]["address"], server.uri());
    assert_eq!(output["degraded"], false);
    assert_eq!(output["failure"], serde_json::Value::Null);
    assert_eq!(output["payload"][0]["id"], "P-1");
}

#[tokio::test]
async fn fetch_with_every_backend_down_reports_degraded_status() {
    let context = context_for(&[closed_port_address()]).await;

    let output =
        execute(&context, command(&["fetch", "purchase_orders", "/purchase_orders"])).await.unwrap();
    assert_eq!(output["synthetic"], true);
    assert_eq!(output["degraded"], true);
    assert!(output["failure"].is_string());

    let status = execute(&context, command(&["status"])).await.unwrap();
    let families = status["families"].as_array().unwrap();
    let orders = families.iter().find(|f| f["family"] == "purchase_orders").unwrap();
    assert_eq!(orders["state"], "UNAVAILABLE");
    assert_eq!(status["notices"].as_array().unwrap().len(), 1);
    assert_eq!(status["notices"][0]["family"], "purchase_orders");
}

#[tokio::test]
async fn client_rejection_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(ResponseTemplate::new(404)).mount(&server).await;
    let context = context_for(&[server.uri()]).await;

    let result = execute(&context, command(&["fetch", "invoices", "/invoices/missing"])).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn queued_submit_is_listed_then_replayed_on_demand() {
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(ResponseTemplate::new(503)).mount(&server).await;
    let context = context_for(&[server.uri()]).await;

    let outcome = execute(
        &context,
        command(&["submit", "products", "post", "/products", r#"{"name":"Widget"}"#]),
    )
    .await
    .unwrap();
    assert_eq!(outcome["status"], "queued");
    assert!(outcome["notice"].is_string());

    let pending = execute(&context, command(&["pending"])).await.unwrap();
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["family"], "products");
    assert_eq!(pending[0]["method"], "POST");
    assert_eq!(pending[0]["path"], "/products");
    assert_eq!(pending[0]["id"], outcome["mutation_id"]);

    server.reset().await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "P-9" })))
        .expect(1)
        .mount(&server)
        .await;

    let reports = execute(&context, command(&["replay", "products"])).await.unwrap();
    assert_eq!(reports[0]["family"], "products");
    assert_eq!(reports[0]["replayed"].as_array().unwrap().len(), 1);

    let pending = execute(&context, command(&["pending", "products"])).await.unwrap();
    assert_eq!(pending, json!([]));
}

#[tokio::test]
async fn applied_submit_reports_the_answering_backend() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/products/P-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let context = context_for(&[server.uri()]).await;

    let outcome =
        execute(&context, command(&["submit", "products", "DELETE", "/products/P-1"])).await.unwrap();

    assert_eq!(outcome["status"], "applied");
    assert_eq!(outcome["address"], server.uri());
    assert_eq!(outcome["payload"], serde_json::Value::Null);
}

#[tokio::test]
async fn document_fetch_writes_the_output_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/invoices/INV-1/pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7".to_vec()))
        .mount(&server)
        .await;
    let context = context_for(&[server.uri()]).await;
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("invoice.pdf");
    let target_arg = target.to_string_lossy().into_owned();

    let output = execute(
        &context,
        command(&["fetch", "invoices", "/invoices/INV-1/pdf", "--document", "--output", &target_arg]),
    )
    .await
    .unwrap();

    assert_eq!(output["payload"]["bytes"], 8);
    assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.7");
}

#[tokio::test]
async fn document_fetch_without_output_reports_size() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0_u8; 32]))
        .mount(&server)
        .await;
    let context = context_for(&[server.uri()]).await;

    let output =
        execute(&context, command(&["fetch", "invoices", "/invoices/INV-1/pdf", "--document"]))
            .await
            .unwrap();

    assert_eq!(output["payload"], json!({ "bytes": 32 }));
}

#[tokio::test]
async fn rejected_replay_stays_listed_until_discarded() {
    let server = MockServer::start().await;
    Mock::given(any()).respond_with(ResponseTemplate::new(503)).mount(&server).await;
    let context = context_for(&[server.uri()]).await;

    let outcome =
        execute(&context, command(&["submit", "invoices", "PATCH", "/invoices/7", r#"{"total":-1}"#]))
            .await
            .unwrap();
    let id = outcome["mutation_id"].as_str().unwrap().to_string();

    server.reset().await;
    Mock::given(any()).respond_with(ResponseTemplate::new(422)).mount(&server).await;
    let reports = execute(&context, command(&["replay", "invoices"])).await.unwrap();
    assert_eq!(reports[0]["rejected"], json!([id]));
    assert_eq!(execute(&context, command(&["pending"])).await.unwrap().as_array().unwrap().len(), 1);

    let discarded = execute(&context, command(&["discard", &id])).await.unwrap();
    assert_eq!(discarded["discarded"], id);
    assert_eq!(discarded["method"], "PATCH");
    assert_eq!(execute(&context, command(&["pending"])).await.unwrap(), json!([]));
    assert!(execute(&context, command(&["discard", &id])).await.is_err());
}
