use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database};
use serde_json::{json, Value};
use tower::ServiceExt;

use lizsys::app::state::AppState;
use lizsys::routes::routes;

async fn test_app_in(upload_dir: &std::path::Path) -> Router {
    // A single pooled connection so the in-memory database is shared.
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);

    let db = Database::connect(opts).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    routes(AppState::new(db, upload_dir.to_path_buf()))
}

async fn test_app() -> Router {
    test_app_in(&std::env::temp_dir()).await
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn read_json(resp: Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

const BOUNDARY: &str = "lizsys-test-boundary";

struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    fn new() -> Self {
        MultipartBuilder { body: Vec::new() }
    }

    fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    fn file(mut self, name: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn build(mut self, method: &str, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

async fn create_client(app: &Router) -> i64 {
    let resp = send(
        app,
        json_req(
            "POST",
            "/api/clients",
            json!({"name": "Acme", "email": "acme@example.com", "phone": "123"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    read_json(resp).await["id"].as_i64().unwrap()
}

async fn create_contract(app: &Router, client_id: i64, amount: f64) -> i64 {
    let resp = send(
        app,
        json_req(
            "POST",
            "/api/contracts",
            json!({
                "title": "Lease",
                "number": "C-100",
                "amount": amount,
                "startDate": "2024-01-01",
                "endDate": "2024-12-31",
                "dueDate": "2024-01-01",
                "clientId": client_id,
                "status": "active",
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    read_json(resp).await["id"].as_i64().unwrap()
}

#[tokio::test]
async fn startup_fails_when_database_is_unreachable() {
    // The parent directory does not exist, so the sqlite file cannot open;
    // init errors out before any server could start.
    let result =
        lizsys::bootstrap::connect_and_migrate("sqlite:///nonexistent-dir/lizsys.sqlite").await;

    assert!(result.is_err());
}

#[tokio::test]
async fn routes_are_only_reachable_under_api_prefix() {
    let app = test_app().await;

    let with_prefix = send(&app, get("/api/clients")).await;
    assert_eq!(with_prefix.status(), StatusCode::OK);

    let without_prefix = send(&app, get("/clients")).await;
    assert_eq!(without_prefix.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_carries_app_title() {
    let app = test_app().await;

    let resp = send(&app, get("/api/openapi.json")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let doc = read_json(resp).await;
    assert_eq!(doc["info"]["title"], "LIZSYS Backend");
}

#[tokio::test]
async fn client_crud_roundtrip() {
    let app = test_app().await;

    let id = create_client(&app).await;

    let list = read_json(send(&app, get("/api/clients")).await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Acme");

    let resp = send(
        &app,
        json_req(
            "PUT",
            &format!("/api/clients/{id}"),
            json!({"name": "Acme Ltd", "email": "acme@example.com", "phone": "456"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["name"], "Acme Ltd");

    let resp = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/clients/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await["success"], true);

    let list = read_json(send(&app, get("/api/clients")).await).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn client_update_of_unknown_id_is_404() {
    let app = test_app().await;

    let resp = send(
        &app,
        json_req(
            "PUT",
            "/api/clients/42",
            json!({"name": "x", "email": "y", "phone": "z"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn client_creation_requires_all_fields() {
    let app = test_app().await;

    let resp = send(
        &app,
        json_req("POST", "/api/clients", json!({"name": "Acme"})),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn contract_creation_validates_payload() {
    let app = test_app().await;

    // Unparseable date.
    let resp = send(
        &app,
        json_req(
            "POST",
            "/api/contracts",
            json!({
                "title": "Lease",
                "number": "C-1",
                "amount": 100.0,
                "startDate": "not-a-date",
                "endDate": "2024-12-31",
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Non-positive amount.
    let resp = send(
        &app,
        json_req(
            "POST",
            "/api/contracts",
            json!({
                "title": "Lease",
                "number": "C-1",
                "amount": 0.0,
                "startDate": "2024-01-01",
                "endDate": "2024-12-31",
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn new_contract_starts_fully_unpaid() {
    let app = test_app().await;

    let client_id = create_client(&app).await;
    let resp = send(
        &app,
        json_req(
            "POST",
            "/api/contracts",
            json!({
                "title": "Lease",
                "number": "C-2",
                "amount": 500.0,
                "startDate": "2024-01-01",
                "endDate": "2024-12-31",
                "clientId": client_id,
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let contract = read_json(resp).await;
    assert_eq!(contract["remainingBalance"], 500.0);
}

#[tokio::test]
async fn payment_updates_balance_and_charges_late_fee() {
    let app = test_app().await;

    let client_id = create_client(&app).await;
    let contract_id = create_contract(&app, client_id, 1000.0).await;

    // Ten days past the due date -> 10 * 5.0 fee.
    let resp = send(
        &app,
        MultipartBuilder::new()
            .text("clientId", &client_id.to_string())
            .text("contractId", &contract_id.to_string())
            .text("amount", "400")
            .text("date", "2024-01-11")
            .build("POST", "/api/payments"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let payment = read_json(resp).await;
    assert_eq!(payment["lateFee"], 50.0);
    assert_eq!(payment["amount"], 400.0);

    // Balance went from 1000 to 600; paying 700 now would overpay by 100.
    let resp = send(
        &app,
        json_req(
            "POST",
            "/api/payments/1/pre-check",
            json!({"clientId": client_id, "amount": 700.0, "date": "2024-02-01"}),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let check = read_json(resp).await;
    assert_eq!(check["remainingBalance"], 600.0);
    assert_eq!(check["isOverpaid"], true);
    assert_eq!(check["overpaidAmount"], 100.0);

    // Deleting the payment restores the balance.
    let payment_id = payment["id"].as_i64().unwrap();
    let resp = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/payments/{payment_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let check = read_json(
        send(
            &app,
            json_req(
                "POST",
                "/api/payments/1/pre-check",
                json!({"clientId": client_id, "amount": 700.0, "date": "2024-02-01"}),
            ),
        )
        .await,
    )
    .await;
    assert_eq!(check["remainingBalance"], 1000.0);
    assert_eq!(check["isOverpaid"], false);
}

#[tokio::test]
async fn payment_creation_requires_all_fields() {
    let app = test_app().await;

    let resp = send(
        &app,
        MultipartBuilder::new()
            .text("amount", "400")
            .build("POST", "/api/payments"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn payment_against_unknown_contract_is_404() {
    let app = test_app().await;

    let resp = send(
        &app,
        MultipartBuilder::new()
            .text("clientId", "1")
            .text("contractId", "99")
            .text("amount", "400")
            .text("date", "2024-01-11")
            .build("POST", "/api/payments"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn payment_rejects_unsupported_receipt_type() {
    let app = test_app().await;

    let client_id = create_client(&app).await;
    let contract_id = create_contract(&app, client_id, 1000.0).await;

    let resp = send(
        &app,
        MultipartBuilder::new()
            .text("clientId", &client_id.to_string())
            .text("contractId", &contract_id.to_string())
            .text("amount", "400")
            .text("date", "2024-01-01")
            .file("receipt", "notes.txt", "text/plain", b"not a receipt")
            .build("POST", "/api/payments"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // The rejected payment wrote nothing: no row, full balance.
    let rows = read_json(send(&app, get("/api/payments")).await).await;
    assert!(rows.as_array().unwrap().is_empty());

    let check = read_json(
        send(
            &app,
            json_req(
                "POST",
                "/api/payments/1/pre-check",
                json!({"clientId": client_id, "amount": 100.0, "date": "2024-01-01"}),
            ),
        )
        .await,
    )
    .await;
    assert_eq!(check["remainingBalance"], 1000.0);
}

#[tokio::test]
async fn payment_receipt_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app_in(dir.path()).await;

    let client_id = create_client(&app).await;
    let contract_id = create_contract(&app, client_id, 1000.0).await;

    let resp = send(
        &app,
        MultipartBuilder::new()
            .text("clientId", &client_id.to_string())
            .text("contractId", &contract_id.to_string())
            .text("amount", "400")
            .text("date", "2024-01-01")
            .file("receipt", "receipt.pdf", "application/pdf", b"%PDF-1.4 test")
            .build("POST", "/api/payments"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let payment = read_json(resp).await;
    let payment_id = payment["id"].as_i64().unwrap();
    assert_eq!(payment["receiptType"], "pdf");

    let stored_path = std::path::PathBuf::from(payment["receiptPath"].as_str().unwrap());
    assert!(stored_path.exists());

    let stored_name = stored_path.file_name().unwrap().to_str().unwrap();

    let resp = send(
        &app,
        get(&format!("/api/payments/{payment_id}/receipt/{stored_name}")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/pdf"
    );

    // A different filename never serves the stored file.
    let resp = send(
        &app,
        get(&format!("/api/payments/{payment_id}/receipt/other.pdf")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Deleting the payment removes the file as well.
    let resp = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/payments/{payment_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!stored_path.exists());
}

#[tokio::test]
async fn payment_search_filters_by_contract() {
    let app = test_app().await;

    let client_id = create_client(&app).await;
    let contract_id = create_contract(&app, client_id, 1000.0).await;

    for date in ["2024-01-01", "2024-02-01"] {
        let resp = send(
            &app,
            MultipartBuilder::new()
                .text("clientId", &client_id.to_string())
                .text("contractId", &contract_id.to_string())
                .text("amount", "100")
                .text("date", date)
                .build("POST", "/api/payments"),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let rows = read_json(send(&app, get("/api/payments")).await).await;
    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert_eq!(rows[0]["clientName"], "Acme");
    assert_eq!(rows[0]["contractNumber"], "C-100");

    let rows = read_json(
        send(
            &app,
            get(&format!("/api/payments/search?contractId={contract_id}")),
        )
        .await,
    )
    .await;
    assert_eq!(rows.as_array().unwrap().len(), 2);

    let rows = read_json(send(&app, get("/api/payments/search?contractId=999")).await).await;
    assert!(rows.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn asset_crud_and_document_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app_in(dir.path()).await;

    let client_id = create_client(&app).await;

    let resp = send(
        &app,
        json_req(
            "POST",
            "/api/assets",
            json!({
                "name": "Truck",
                "type": "vehicle",
                "status": "leased",
                "clientId": client_id,
                "vin": "VIN123",
            }),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let asset = read_json(resp).await;
    let asset_id = asset["id"].as_i64().unwrap();
    assert_eq!(asset["type"], "vehicle");

    // Missing required fields is a 400.
    let resp = send(&app, json_req("POST", "/api/assets", json!({"name": "x"}))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Upload a document.
    let resp = send(
        &app,
        MultipartBuilder::new()
            .text("type", "insurance")
            .file("document", "policy.pdf", "application/pdf", b"%PDF-1.4 policy")
            .build("POST", &format!("/api/assets/{asset_id}/documents")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let docs = read_json(send(&app, get(&format!("/api/assets/{asset_id}/documents"))).await).await;
    assert_eq!(docs.as_array().unwrap().len(), 1);
    assert_eq!(docs[0]["docType"], "insurance");

    let filename = docs[0]["filename"].as_str().unwrap().to_string();
    assert_eq!(
        docs[0]["url"],
        format!("/api/assets/{asset_id}/documents/{filename}")
    );

    // The legacy /files path serves the same listing.
    let files = read_json(send(&app, get(&format!("/api/assets/{asset_id}/files"))).await).await;
    assert_eq!(files, docs);

    let resp = send(
        &app,
        get(&format!("/api/assets/{asset_id}/documents/{filename}")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pdf");

    // Delete the document; the file goes with it.
    let doc_id = docs[0]["id"].as_i64().unwrap();
    let resp = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/assets/{asset_id}/documents/{doc_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(
        &app,
        get(&format!("/api/assets/{asset_id}/documents/{filename}")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn asset_bulk_upload_requires_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app_in(dir.path()).await;

    let client_id = create_client(&app).await;
    let resp = send(
        &app,
        json_req(
            "POST",
            "/api/assets",
            json!({"name": "Truck", "type": "vehicle", "status": "leased", "clientId": client_id}),
        ),
    )
    .await;
    let asset_id = read_json(resp).await["id"].as_i64().unwrap();

    let resp = send(
        &app,
        MultipartBuilder::new()
            .text("unrelated", "x")
            .build("POST", &format!("/api/assets/{asset_id}/upload")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(
        &app,
        MultipartBuilder::new()
            .file("maintenanceFile", "to.pdf", "application/pdf", b"%PDF")
            .file("insuranceFile", "ins.pdf", "application/pdf", b"%PDF")
            .build("POST", &format!("/api/assets/{asset_id}/upload")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let docs = read_json(send(&app, get(&format!("/api/assets/{asset_id}/documents"))).await).await;
    let types: Vec<_> = docs
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["docType"].as_str().unwrap().to_string())
        .collect();
    assert!(types.contains(&"maintenance".to_string()));
    assert!(types.contains(&"insurance".to_string()));
}

#[tokio::test]
async fn dashboard_aggregates_counts_and_payment_total() {
    let app = test_app().await;

    let stats = read_json(send(&app, get("/api/dashboard-stats")).await).await;
    assert_eq!(stats["clients"], 0);
    assert_eq!(stats["payments"], 0.0);

    let client_id = create_client(&app).await;
    let contract_id = create_contract(&app, client_id, 1000.0).await;

    let resp = send(
        &app,
        MultipartBuilder::new()
            .text("clientId", &client_id.to_string())
            .text("contractId", &contract_id.to_string())
            .text("amount", "250")
            .text("date", "2024-01-01")
            .build("POST", "/api/payments"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let stats = read_json(send(&app, get("/api/dashboard-stats")).await).await;
    assert_eq!(stats["clients"], 1);
    assert_eq!(stats["contracts"], 1);
    assert_eq!(stats["payments"], 250.0);
    assert_eq!(stats["assets"], 0);
}

#[tokio::test]
async fn reports_aggregate_and_filter() {
    let app = test_app().await;

    let client_id = create_client(&app).await;
    let contract_id = create_contract(&app, client_id, 1000.0).await;

    let resp = send(
        &app,
        MultipartBuilder::new()
            .text("clientId", &client_id.to_string())
            .text("contractId", &contract_id.to_string())
            .text("amount", "300")
            .text("date", "2024-01-01")
            .build("POST", "/api/payments"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let income = read_json(send(&app, get("/api/reports/income")).await).await;
    assert_eq!(income["totalIncome"], 300.0);

    let debts = read_json(send(&app, get("/api/reports/debts")).await).await;
    assert_eq!(debts["totalDebt"], 700.0);

    let count = read_json(send(&app, get("/api/reports/contracts-count")).await).await;
    assert_eq!(count["count"], 1);

    let count = read_json(
        send(&app, get("/api/reports/contracts-count?contractStatus=closed")).await,
    )
    .await;
    assert_eq!(count["count"], 0);

    // Contract due 2024-01-01 with balance left is overdue by 2025.
    let overdue = read_json(send(&app, get("/api/reports/overdue?endDate=2025-01-01")).await).await;
    assert_eq!(overdue["totalOverdue"], 700.0);

    let overdue = read_json(send(&app, get("/api/reports/overdue?endDate=2023-01-01")).await).await;
    assert_eq!(overdue["totalOverdue"], 0.0);
}

#[tokio::test]
async fn csv_export_lists_contracts() {
    let app = test_app().await;

    let client_id = create_client(&app).await;
    create_contract(&app, client_id, 1000.0).await;

    let resp = send(&app, get("/api/reports/export/csv")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=contracts_report.csv"
    );

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("id,clientId,assetType,status,createdAt"));
    assert!(lines.next().unwrap().contains("active"));
}

#[tokio::test]
async fn excel_export_is_a_spreadsheet_attachment() {
    let app = test_app().await;

    let client_id = create_client(&app).await;
    create_contract(&app, client_id, 1000.0).await;

    let resp = send(&app, get("/api/reports/export/excel")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=contracts_report.xlsx"
    );

    // xlsx is a zip container.
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..2], b"PK");
}
