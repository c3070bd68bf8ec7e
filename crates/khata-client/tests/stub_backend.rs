//! Client calls against an in-process axum backend.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use khata_client::{
    ApiClient, ClientConfig, ClientError, DocumentService, PayrollService, RequestContext,
};
use khata_core::{
    Document, DocumentKind, LineItem, Money, Quantity, TaxRate, TotalsCalculator,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

const TOKEN: &str = "test-token";
const TENANT: &str = "tenant-7";
const SAVED_ID: &str = "9f8c0a52-6c1e-4c1d-9d0e-2b8f3c6a1e44";
const STRUCTURE_ID: &str = "1b4e28ba-2fa1-11d2-883f-0016d3cca427";

#[derive(Debug, Clone)]
struct Seen {
    method: &'static str,
    path: String,
    query: HashMap<String, String>,
    body: Option<Value>,
}

type Log = Arc<Mutex<Vec<Seen>>>;

fn authorized(headers: &HeaderMap) -> bool {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"));
    let tenant = headers
        .get("x-tenant-id")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == TENANT);
    bearer && tenant
}

fn record(log: &Log, method: &'static str, path: String, query: HashMap<String, String>, body: Option<Value>) {
    log.lock().unwrap().push(Seen {
        method,
        path,
        query,
        body,
    });
}

async fn list_invoices(
    State(log): State<Log>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "bad token" })));
    }
    record(&log, "GET", "/api/sales/invoices".into(), query, None);
    (
        StatusCode::OK,
        Json(json!({
            "data": [
                { "_id": "a1", "invoiceNumber": "INV-1", "customerName": "Acme", "grandTotal": 105, "status": "paid" },
                { "_id": "a2", "invoiceNumber": "INV-2", "customerName": "Globex", "grandTotal": "300.50" }
            ],
            "total": 2
        })),
    )
}

async fn fetch_invoice(headers: HeaderMap, Path(id): Path<String>) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    if id != SAVED_ID {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "no such invoice" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "data": {
                "_id": id,
                "id": id,
                "invoiceNumber": "INV-9",
                "number": "INV-9",
                "invoiceDate": "2024-05-02T00:00:00.000Z",
                "customerName": "Acme",
                "items": [{ "itemName": "Widget", "qty": "2", "rate": 50, "discount": 10, "tax": 5 }],
                "otherCharges": "",
                "amountReceived": 40
            }
        })),
    )
}

async fn create_invoice(State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    record(&log, "POST", "/api/sales/invoices".into(), HashMap::new(), Some(body));
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": { "_id": SAVED_ID, "invoiceNumber": "INV-100" } })),
    )
}

async fn update_invoice(
    State(log): State<Log>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    record(&log, "PUT", format!("/api/sales/invoices/{id}"), HashMap::new(), Some(body));
    (StatusCode::OK, Json(json!({ "_id": id })))
}

async fn fetch_structure(headers: HeaderMap, Path(id): Path<String>) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "_id": id,
            "name": "Staff",
            "components": [
                { "code": "hra", "name": "HRA", "type": "earning", "formula": "basic * 0.4" },
                { "code": "pf", "name": "PF", "type": "deduction", "formula": "(basic + hra) * 0.1" }
            ]
        })),
    )
}

async fn spawn_backend() -> (ApiClient, Log) {
    let log: Log = Arc::default();
    let app = Router::new()
        .route("/api/sales/invoices", get(list_invoices).post(create_invoice))
        .route("/api/sales/invoices/{id}", get(fetch_invoice).put(update_invoice))
        .route("/api/payroll/salary-structures/{id}", get(fetch_structure))
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let api = ApiClient::new(ClientConfig {
        base_url: format!("http://{addr}/api"),
        timeout_secs: 5,
        page_size: 10,
        ..Default::default()
    })
    .unwrap();
    (api, log)
}

fn ctx() -> RequestContext {
    RequestContext::new(TOKEN, TENANT).unwrap()
}

fn draft_invoice() -> Document {
    Document::new(
        DocumentKind::SalesInvoice,
        "INV-100",
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
    )
    .with_party("Acme Traders")
    .with_line(
        LineItem::new(Quantity::from_units(10), Money::from_major(10))
            .with_tax_rate(TaxRate::from_bps(500)),
    )
}

#[tokio::test]
async fn list_sends_context_and_paging() {
    let (api, log) = spawn_backend().await;
    let page = DocumentService::new(api)
        .list(&ctx(), DocumentKind::SalesInvoice, 2)
        .await
        .unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].number, "INV-1");
    assert_eq!(page.items[1].net_total, Money::from_major_minor(300, 50));
    assert_eq!(page.total, Some(2));
    assert_eq!(page.page, 2);
    assert!(!page.has_more());

    let seen = log.lock().unwrap();
    assert_eq!(seen[0].query.get("page").map(String::as_str), Some("2"));
    assert_eq!(seen[0].query.get("limit").map(String::as_str), Some("10"));
}

#[tokio::test]
async fn wrong_tenant_is_unauthorized() {
    let (api, _log) = spawn_backend().await;
    let other = ctx().for_tenant("tenant-8").unwrap();

    let err = DocumentService::new(api)
        .list(&other, DocumentKind::SalesInvoice, 1)
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn fetch_reads_lenient_record() {
    let (api, _log) = spawn_backend().await;
    let id = Uuid::parse_str(SAVED_ID).unwrap();
    let doc = DocumentService::new(api)
        .fetch(&ctx(), DocumentKind::SalesInvoice, id)
        .await
        .unwrap();

    assert_eq!(doc.id, Some(id));
    assert_eq!(doc.number, "INV-9");
    assert_eq!(doc.date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    assert_eq!(doc.lines[0].description, "Widget");

    let totals = doc.totals(&TotalsCalculator::new());
    assert_eq!(totals.net_total, Money::from_major_minor(94, 50));
    assert_eq!(totals.balance_due, Money::from_major_minor(54, 50));
}

#[tokio::test]
async fn fetch_missing_document_is_not_found() {
    let (api, _log) = spawn_backend().await;
    let err = DocumentService::new(api)
        .fetch(&ctx(), DocumentKind::SalesInvoice, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn submit_new_document_posts_recomputed_totals() {
    let (api, log) = spawn_backend().await;
    let receipt = DocumentService::new(api)
        .submit(&ctx(), &draft_invoice(), &TotalsCalculator::new())
        .await
        .unwrap();

    assert!(receipt.created);
    assert_eq!(receipt.id, Some(Uuid::parse_str(SAVED_ID).unwrap()));
    assert_eq!(receipt.number, "INV-100");
    assert_eq!(receipt.totals.net_total, Money::from_major(105));

    let seen = log.lock().unwrap();
    let body = seen[0].body.as_ref().unwrap();
    assert_eq!(seen[0].method, "POST");
    assert_eq!(body["totals"]["subTotal"], json!(100.0));
    assert_eq!(body["totals"]["totalTax"], json!(5.0));
    assert_eq!(body["totals"]["netTotal"], json!(105.0));
}

#[tokio::test]
async fn submit_existing_document_puts_by_id() {
    let (api, log) = spawn_backend().await;
    let mut doc = draft_invoice();
    let id = Uuid::parse_str(SAVED_ID).unwrap();
    doc.id = Some(id);

    let receipt = DocumentService::new(api)
        .submit(&ctx(), &doc, &TotalsCalculator::new())
        .await
        .unwrap();

    assert!(!receipt.created);
    assert_eq!(receipt.id, Some(id));
    let seen = log.lock().unwrap();
    assert_eq!(seen[0].method, "PUT");
    assert_eq!(seen[0].path, format!("/api/sales/invoices/{SAVED_ID}"));
}

#[tokio::test]
async fn invalid_document_is_never_sent() {
    let (api, log) = spawn_backend().await;
    let doc = draft_invoice().with_party("");

    let err = DocumentService::new(api)
        .submit(&ctx(), &doc, &TotalsCalculator::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn payroll_structure_round_trip() {
    let (api, _log) = spawn_backend().await;
    let id = Uuid::parse_str(STRUCTURE_ID).unwrap();
    let payroll = PayrollService::new(api);

    let structure = payroll.fetch_structure(&ctx(), id).await.unwrap();
    assert_eq!(structure.components.len(), 2);

    let slip = payroll
        .payslip(&ctx(), id, Money::from_major(10_000))
        .await
        .unwrap();
    assert_eq!(slip.gross_earnings, Money::from_major(14_000));
    assert_eq!(slip.total_deductions, Money::from_major(1_400));
    assert_eq!(slip.net_pay, Money::from_major(12_600));
}
