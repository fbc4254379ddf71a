//! Router tests: full requests through extractors, handlers and error mapping
//! against an in-memory database.

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use adega_db::{Database, DbConfig};

use crate::config::ApiConfig;
use crate::routes::create_router;
use crate::state::AppState;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

struct TestApp {
    router: Router,
    uploads: TempDir,
}

async fn app() -> TestApp {
    let uploads = tempfile::tempdir().unwrap();
    let config = ApiConfig {
        database_path: ":memory:".to_string(),
        jwt_secret: "router-test-secret-0123456789".to_string(),
        upload_dir: uploads.path().to_path_buf(),
        ..ApiConfig::default()
    };
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    TestApp {
        router: create_router(AppState::new(db, config)),
        uploads,
    }
}

impl TestApp {
    async fn raw(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, bytes.to_vec())
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let (status, _, bytes) = self.raw(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Registers a user, and returns their login token.
    async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "name": "Ana Souza", "email": email, "password": "malbec-2024" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Registers an owner with a fresh store; returns the store token.
    async fn owner(&self, email: &str) -> String {
        let user_token = self.register(email).await;
        let (status, store) = self
            .post("/api/stores", &user_token, json!({ "name": "Adega Central" }))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, session) = self
            .post(
                "/api/auth/switch-store",
                &user_token,
                json!({ "store_id": store["id"] }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{session}");
        assert_eq!(session["role"], "owner");
        session["token"].as_str().unwrap().to_string()
    }

    async fn product(&self, token: &str, name: &str, stock: i64, price_cents: i64) -> String {
        let (status, product) = self
            .post(
                "/api/products",
                token,
                json!({
                    "name": name,
                    "category": "red_wine",
                    "cost_price_cents": price_cents / 2,
                    "sale_price_cents": price_cents,
                    "stock_quantity": stock,
                    "min_stock": 2
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{product}");
        product["id"].as_str().unwrap().to_string()
    }

    async fn sell(&self, token: &str, product_id: &str, quantity: i64) -> (StatusCode, Value) {
        self.post(
            "/api/sales",
            token,
            json!({
                "items": [{ "product_id": product_id, "quantity": quantity }],
                "payment_method": "pix"
            }),
        )
        .await
    }
}

fn multipart(content_type: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = "adega-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"garrafa.png\"\r\n",
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

fn files_under(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                files_under(&path)
            } else {
                1
            }
        })
        .sum()
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = app().await;
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "serving");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_business_routes_require_a_store_token() {
    let app = app().await;

    let (status, body) = app.call(Method::GET, "/api/products", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "NOT_AUTHENTICATED");

    let (status, body) = app.get("/api/products", "not.a.jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");

    let user_token = app.register("ana@adega.test").await;
    let (status, body) = app.get("/api/products", &user_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NO_STORE_SELECTED");
}

#[tokio::test]
async fn test_login_and_store_membership() {
    let app = app().await;
    let owner_token = app.owner("ana@adega.test").await;
    let (_, stores) = app.get("/api/stores", &owner_token).await;
    let store_id = stores[0]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ANA@adega.test", "password": "malbec-2024" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stores"].as_array().unwrap().len(), 1);
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "ana@adega.test", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    // A stranger cannot enter the store.
    let stranger = app.register("bruno@adega.test").await;
    let (status, body) = app
        .post("/api/auth/switch-store", &stranger, json!({ "store_id": store_id }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "STORE_ACCESS_DENIED");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "name": "Ana", "email": "ana@adega.test", "password": "malbec-2024" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE");
}

#[tokio::test]
async fn test_malformed_input_uses_error_body() {
    let app = app().await;
    let token = app.owner("ana@adega.test").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/products")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, _, bytes) = app.raw(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = app
        .post(
            "/api/products",
            &token,
            json!({ "name": "", "category": "red_wine", "cost_price_cents": 1, "sale_price_cents": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn test_checkout_and_cancel_over_http() {
    let app = app().await;
    let token = app.owner("ana@adega.test").await;
    let wine = app.product(&token, "Malbec Reserva", 5, 4990).await;

    let (status, body) = app.sell(&token, &wine, 6).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");

    let (status, receipt) = app.sell(&token, &wine, 2).await;
    assert_eq!(status, StatusCode::CREATED, "{receipt}");
    assert_eq!(receipt["sale"]["total_cents"], 9980);
    let sale_id = receipt["sale"]["id"].as_str().unwrap().to_string();

    let (_, product) = app.get(&format!("/api/products/{wine}"), &token).await;
    assert_eq!(product["stock_quantity"], 3);

    let (status, detail) = app.get(&format!("/api/sales/{sale_id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["items"].as_array().unwrap().len(), 1);

    let cancel_uri = format!("/api/sales/{sale_id}/cancel");
    let (status, body) = app.post(&cancel_uri, &token, json!({ "reason": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, sale) = app
        .post(&cancel_uri, &token, json!({ "reason": "Customer gave up" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sale["status"], "cancelled");

    let (status, body) = app
        .post(&cancel_uri, &token, json!({ "reason": "Again" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_CANCELLED");

    let (_, product) = app.get(&format!("/api/products/{wine}"), &token).await;
    assert_eq!(product["stock_quantity"], 5);

    let (_, movements) = app
        .get(&format!("/api/stock/movements?product_id={wine}"), &token)
        .await;
    assert_eq!(movements.as_array().unwrap().len(), 3);

    let (_, summary) = app.get("/api/reports/summary", &token).await;
    assert_eq!(summary["completed_count"], 0);
    assert_eq!(summary["cancelled_count"], 1);

    let (_, ledger) = app.get("/api/finance/summary", &token).await;
    assert_eq!(ledger["balance_cents"], 0);

    let (status, body) = app.get("/api/sales/00000000-0000-4000-8000-000000000000", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_out_of_range_prices_are_rejected() {
    let app = app().await;
    let token = app.owner("ana@adega.test").await;
    let wine = app.product(&token, "Malbec", 5, 4990).await;

    let (status, body) = app
        .post(
            "/api/sales",
            &token,
            json!({
                "items": [{ "product_id": wine, "quantity": 2, "unit_price_cents": i64::MAX / 2 + 1 }],
                "payment_method": "cash"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .post(
            "/api/products",
            &token,
            json!({
                "name": "Grand Cru",
                "category": "red_wine",
                "cost_price_cents": 0,
                "sale_price_cents": i64::MAX
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, product) = app.get(&format!("/api/products/{wine}"), &token).await;
    assert_eq!(product["stock_quantity"], 5);
}

#[tokio::test]
async fn test_stores_are_isolated() {
    let app = app().await;
    let ana = app.owner("ana@adega.test").await;
    let bruno = app.owner("bruno@adega.test").await;
    let wine = app.product(&ana, "Malbec", 5, 4990).await;

    let (status, _) = app.get(&format!("/api/products/{wine}"), &bruno).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.sell(&bruno, &wine, 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, listed) = app.get("/api/products", &bruno).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_sales_export_csv() {
    let app = app().await;
    let token = app.owner("ana@adega.test").await;
    let wine = app.product(&token, "Malbec", 10, 1250).await;
    app.sell(&token, &wine, 2).await;

    let request = Request::builder()
        .uri("/api/sales/export.csv")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, headers, bytes) = app.raw(request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
    assert!(headers["content-disposition"].to_str().unwrap().contains("sales-"));
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));

    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Sale ID;Date;Customer;Product"));
    assert!(lines[1].contains(";Malbec;2;12,50;25,00;"));
}

// =============================================================================
// Catalog, stock, deliveries, customers
// =============================================================================

#[tokio::test]
async fn test_image_upload_validates_before_writing() {
    let app = app().await;
    let token = app.owner("ana@adega.test").await;
    let wine = app.product(&token, "Malbec", 5, 4990).await;
    let uri = format!("/api/products/{wine}/image");

    let upload = |content_type: &str, data: &[u8]| {
        let (header, body) = multipart(content_type, data);
        Request::builder()
            .method(Method::POST)
            .uri(&uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, header)
            .body(Body::from(body))
            .unwrap()
    };

    let (status, _, bytes) = app.raw(upload("application/pdf", b"%PDF-1.7")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "INVALID_IMAGE");

    let (status, _, _) = app.raw(upload("image/jpeg", PNG)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(files_under(app.uploads.path()), 0);

    let (status, _, bytes) = app.raw(upload("image/png", PNG)).await;
    assert_eq!(status, StatusCode::OK);
    let product: Value = serde_json::from_slice(&bytes).unwrap();
    let url = product["image_url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/") && url.ends_with(".png"));
    assert_eq!(files_under(app.uploads.path()), 1);

    let (_, stored) = app.get(&format!("/api/products/{wine}"), &token).await;
    assert_eq!(stored["image_url"], url);
}

#[tokio::test]
async fn test_stock_adjustment_and_low_stock() {
    let app = app().await;
    let token = app.owner("ana@adega.test").await;
    let wine = app.product(&token, "Malbec", 10, 4990).await;

    let (status, movement) = app
        .post(
            "/api/stock/adjustments",
            &token,
            json!({ "product_id": wine, "movement_type": "loss", "quantity": 9, "reason": "Broken box" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(movement["new_stock"], 1);

    let (_, low) = app.get("/api/products/low-stock", &token).await;
    assert_eq!(low[0]["id"], wine.as_str());

    let (status, body) = app
        .post(
            "/api/stock/adjustments",
            &token,
            json!({ "product_id": wine, "movement_type": "in", "quantity": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/products/{wine}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, active) = app.get("/api/products", &token).await;
    assert!(active.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_delivery_status_chain() {
    let app = app().await;
    let token = app.owner("ana@adega.test").await;
    let wine = app.product(&token, "Malbec", 5, 4990).await;
    let (_, receipt) = app.sell(&token, &wine, 1).await;

    let (status, delivery) = app
        .post(
            "/api/deliveries",
            &token,
            json!({
                "sale_id": receipt["sale"]["id"],
                "recipient_name": "Maria",
                "street": "Rua Augusta",
                "number": "1500",
                "city": "São Paulo",
                "fee_cents": 800
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{delivery}");
    let status_uri = format!("/api/deliveries/{}/status", delivery["id"].as_str().unwrap());

    let (status, body) = app.post(&status_uri, &token, json!({ "status": "delivered" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_DELIVERY_TRANSITION");

    for step in ["preparing", "en_route", "delivered"] {
        let (status, moved) = app.post(&status_uri, &token, json!({ "status": step })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(moved["status"], step);
    }

    let (_, done) = app.get("/api/deliveries?status=delivered", &token).await;
    assert!(!done[0]["delivered_at"].is_null());
}

#[tokio::test]
async fn test_customer_birthday_link() {
    let app = app().await;
    let token = app.owner("ana@adega.test").await;

    let (status, customer) = app
        .post(
            "/api/customers",
            &token,
            json!({ "name": "Maria Oliveira", "phone": "(11) 98765-4321", "birth_date": "1988-03-14" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = customer["id"].as_str().unwrap();

    let (_, march) = app.get("/api/customers/birthdays?month=3", &token).await;
    assert_eq!(march.as_array().unwrap().len(), 1);

    let (status, body) = app.get("/api/customers/birthdays?month=13", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, link) = app
        .get(&format!("/api/customers/{id}/birthday-link"), &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let url = link["url"].as_str().unwrap();
    assert!(url.starts_with("https://wa.me/5511987654321?text="));
    assert!(link["message"].as_str().unwrap().contains("Maria"));
}
