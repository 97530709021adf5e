//! API tests: the router driven in-process over the memory store

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Local, NaiveDate};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use bookstock_server::{
    api,
    models::BookStock,
    repository::{
        memory::{LibraryData, MemoryLibraryStore},
        Repository,
    },
    services::Services,
    AppConfig, AppState,
};

struct TestLibrary {
    app: Router,
    available: Uuid,
    overdue: Uuid,
    ann: Uuid,
    bob: Uuid,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn test_library() -> TestLibrary {
    let mut data = LibraryData::default();
    let author = data.add_author("Octavia E. Butler");
    let kindred = data.add_book(author, "Kindred", None);
    let dawn = data.add_book(author, "Dawn", None);
    let ann = data.add_borrower("Ann", "ann@example.org");
    let bob = data.add_borrower("Bob", "bob@example.org");

    let available = data.add_book_stock(kindred);
    let mut late = BookStock::new(dawn);
    late.lend_to(bob, today() - Duration::days(10));
    let overdue = data.insert_book_stock(late);

    let repository = Repository::new(MemoryLibraryStore::with_data(data));
    let state = AppState::new(AppConfig::default(), Services::new(repository));

    TestLibrary {
        app: api::create_router(state),
        available,
        overdue,
        ann,
        bob,
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(format!("/api/v1{}", uri));
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response")
    };
    (status, body)
}

#[tokio::test]
async fn test_health_check() {
    let lib = test_library();

    let (status, body) = send(&lib.app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&lib.app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_lend_then_return() {
    let lib = test_library();
    let due = (today() + Duration::days(7)).format("%Y-%m-%d").to_string();

    let (status, body) = send(
        &lib.app,
        Method::PATCH,
        &format!("/catalogue/{}/loan", lib.available),
        Some(json!({ "borrower_id": lib.ann, "loan_end_date": due })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book_stock_id"], lib.available.to_string());
    assert_eq!(body["loan_end_date"], due);
    assert_eq!(body["borrower_id"], lib.ann.to_string());

    let (status, body) = send(
        &lib.app,
        Method::POST,
        &format!("/catalogue/{}/loan/return", lib.available),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["loan_end_date"].is_null());
    assert!(body["borrower_id"].is_null());

    let (_, fines) = send(&lib.app, Method::GET, "/fines", None).await;
    assert_eq!(fines.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_overdue_return_creates_fine() {
    let lib = test_library();

    let (status, _) = send(
        &lib.app,
        Method::PATCH,
        &format!("/catalogue/{}/loan", lib.overdue),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fines) = send(&lib.app, Method::GET, "/fines", None).await;
    let fines = fines.as_array().expect("fines should be a list");
    assert_eq!(fines.len(), 1);
    assert_eq!(fines[0]["borrower_id"], lib.bob.to_string());
    assert_eq!(fines[0]["active"], true);
}

#[tokio::test]
async fn test_error_status_codes() {
    let lib = test_library();
    let yesterday = (today() - Duration::days(1)).format("%Y-%m-%d").to_string();

    let (status, body) = send(
        &lib.app,
        Method::PATCH,
        &format!("/catalogue/{}/loan", lib.available),
        Some(json!({ "borrower_id": lib.ann, "loan_end_date": yesterday })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (status, _) = send(
        &lib.app,
        Method::POST,
        &format!("/catalogue/{}/loan/return", lib.available),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &lib.app,
        Method::GET,
        &format!("/catalogue/{}/reservations/{}", lib.available, lib.ann),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reservation_queue() {
    let lib = test_library();

    for borrower in [lib.ann, lib.bob] {
        let (status, body) = send(
            &lib.app,
            Method::POST,
            "/reservations",
            Some(json!({ "book_stock_id": lib.overdue, "borrower_id": borrower })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["id"].is_string());
    }

    let (status, head) = send(
        &lib.app,
        Method::GET,
        &format!("/catalogue/{}/reservations/{}", lib.overdue, lib.ann),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(head["queue_number"], 0);
    assert!(head["expected_available_on"].is_string());

    let (_, second) = send(
        &lib.app,
        Method::GET,
        &format!("/catalogue/{}/reservations/{}", lib.overdue, lib.bob),
        None,
    )
    .await;
    assert_eq!(second["queue_number"], 1);
    assert!(second["expected_available_on"].is_null());

    // Returning on behalf of Ann fulfils her reservation; Bob moves up
    let (status, _) = send(
        &lib.app,
        Method::POST,
        &format!("/catalogue/{}/loan/return", lib.overdue),
        Some(json!({ "borrower_id": lib.ann })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, reservations) = send(&lib.app, Method::GET, "/reservations", None).await;
    let reservations = reservations.as_array().expect("reservations should be a list");
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0]["borrower_id"], lib.bob.to_string());
    assert_eq!(reservations[0]["queue_number"], 0);
}

#[tokio::test]
async fn test_return_with_undecodable_body_changes_nothing() {
    let lib = test_library();

    let (status, _) = send(
        &lib.app,
        Method::POST,
        "/reservations",
        Some(json!({ "book_stock_id": lib.overdue, "borrower_id": lib.ann })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &lib.app,
        Method::POST,
        &format!("/catalogue/{}/loan/return", lib.overdue),
        Some(json!({ "borrower_id": "not-a-uuid" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadValue");

    let (_, catalogue) = send(&lib.app, Method::GET, "/catalogue", None).await;
    let copy = catalogue
        .as_array()
        .and_then(|entries| entries.iter().find(|e| e["id"] == lib.overdue.to_string()))
        .expect("overdue copy should be listed");
    assert_eq!(copy["on_loan_to"]["id"], lib.bob.to_string());

    let (_, fines) = send(&lib.app, Method::GET, "/fines", None).await;
    assert_eq!(fines.as_array().map(Vec::len), Some(0));

    let (_, reservations) = send(&lib.app, Method::GET, "/reservations", None).await;
    let reservations = reservations.as_array().expect("reservations should be a list");
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0]["borrower_id"], lib.ann.to_string());
    assert_eq!(reservations[0]["queue_number"], 0);
}

#[tokio::test]
async fn test_catalogue_listings() {
    let lib = test_library();

    let (status, catalogue) = send(&lib.app, Method::GET, "/catalogue", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(catalogue.as_array().map(Vec::len), Some(2));

    let (_, on_loan) = send(&lib.app, Method::GET, "/catalogue/on-loan", None).await;
    let on_loan = on_loan.as_array().expect("on-loan should be a list");
    assert_eq!(on_loan.len(), 1);
    assert_eq!(on_loan[0]["borrower"]["id"], lib.bob.to_string());
    assert_eq!(on_loan[0]["book_names"], json!(["Dawn"]));
}

#[tokio::test]
async fn test_add_fine_for_unknown_borrower() {
    let lib = test_library();

    let (status, _) = send(
        &lib.app,
        Method::POST,
        "/fines",
        Some(json!({ "borrower_id": Uuid::new_v4(), "book_stock_id": lib.available })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Smoke test against a running server
#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_live_server_catalogue() {
    let client = reqwest::Client::new();

    let response = client
        .get("http://localhost:8080/api/v1/catalogue")
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}
