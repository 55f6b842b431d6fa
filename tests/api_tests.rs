//! API integration tests
//!
//! Each test spawns the full router on an ephemeral port and drives it over
//! HTTP like a real client.

use std::sync::Arc;

use reqwest::Client;
use serde_json::{json, Value};

use circula_server::{
    api,
    config::AppConfig,
    engine::{clock::SystemClock, Engine},
    services::{notify::LogNotifier, Services},
    AppState,
};

async fn spawn_server() -> String {
    let config = AppConfig::default();
    let clock = Arc::new(SystemClock);
    let engine = Arc::new(Engine::new(clock.clone()));
    let services = Services::new(
        engine,
        Arc::new(LogNotifier),
        clock,
        config.circulation.clone(),
    );
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server crashed");
    });

    format!("http://{}/api/v1", addr)
}

/// Helper: create a title and return its id
async fn create_title(client: &Client, base: &str, name: &str, copies: u32) -> i64 {
    let response = client
        .post(format!("{}/titles", base))
        .json(&json!({ "name": name, "total_copies": copies }))
        .send()
        .await
        .expect("Failed to create title");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse title");
    body["id"].as_i64().expect("No title id")
}

#[tokio::test]
async fn test_health_check() {
    let base = spawn_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let base = spawn_server().await;
    let client = Client::new();

    // The docs live beside /api/v1, not under it
    let url = base.replace("/api/v1", "/api-docs/openapi.json");
    let response = client.get(url).send().await.expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["info"]["title"], "Circula API");
}

#[tokio::test]
async fn test_full_borrow_reserve_promote_cycle() {
    // One copy, two users: the return promotes the waiter.
    let base = spawn_server().await;
    let client = Client::new();
    let title_id = create_title(&client, &base, "Dune", 1).await;

    // U1 submits and is approved
    let response = client
        .post(format!("{}/borrows", base))
        .json(&json!({ "user_id": 1, "title_id": title_id }))
        .send()
        .await
        .expect("Failed to submit borrow");
    assert_eq!(response.status(), 201);
    let borrow: Value = response.json().await.expect("Failed to parse borrow");
    let borrow_id = borrow["id"].as_i64().expect("No borrow id");
    assert_eq!(borrow["status"], "Pending");

    let response = client
        .post(format!("{}/borrows/{}/approve", base, borrow_id))
        .json(&json!({ "approver_id": 99 }))
        .send()
        .await
        .expect("Failed to approve borrow");
    assert!(response.status().is_success());
    let approved: Value = response.json().await.expect("Failed to parse approval");
    assert_eq!(approved["status"], "Active");

    let title: Value = client
        .get(format!("{}/titles/{}", base, title_id))
        .send()
        .await
        .expect("Failed to get title")
        .json()
        .await
        .expect("Failed to parse title");
    assert_eq!(title["available_copies"], 0);

    // U2 is turned away with the reservation-offer error code
    let response = client
        .post(format!("{}/borrows", base))
        .json(&json!({ "user_id": 2, "title_id": title_id }))
        .send()
        .await
        .expect("Failed to submit borrow");
    assert_eq!(response.status(), 409);
    let error: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(error["error"], "NoCopyAvailable");

    // U2 reserves instead
    let response = client
        .post(format!("{}/reservations", base))
        .json(&json!({ "user_id": 2, "title_id": title_id }))
        .send()
        .await
        .expect("Failed to reserve");
    assert_eq!(response.status(), 201);
    let reservation: Value = response.json().await.expect("Failed to parse reservation");
    let reservation_id = reservation["id"].as_i64().expect("No reservation id");

    // U1 returns; the queue holds the copy for U2
    let response = client
        .post(format!("{}/borrows/{}/return", base, borrow_id))
        .send()
        .await
        .expect("Failed to return");
    assert!(response.status().is_success());

    let queue: Value = client
        .get(format!("{}/titles/{}/reservations", base, title_id))
        .send()
        .await
        .expect("Failed to get queue")
        .json()
        .await
        .expect("Failed to parse queue");
    assert_eq!(queue[0]["status"], "FulfilledPendingApproval");

    // Librarian approves: U2 now has an active loan, availability stays 0
    let response = client
        .post(format!("{}/reservations/{}/approve", base, reservation_id))
        .json(&json!({ "approver_id": 99 }))
        .send()
        .await
        .expect("Failed to approve reservation");
    assert!(response.status().is_success());
    let outcome: Value = response.json().await.expect("Failed to parse outcome");
    assert_eq!(outcome["reservation"]["status"], "Approved");
    assert_eq!(outcome["borrow_request"]["status"], "Active");
    assert_eq!(outcome["borrow_request"]["user_id"], 2);

    let title: Value = client
        .get(format!("{}/titles/{}", base, title_id))
        .send()
        .await
        .expect("Failed to get title")
        .json()
        .await
        .expect("Failed to parse title");
    assert_eq!(title["available_copies"], 0);
}

#[tokio::test]
async fn test_rejected_reservation_releases_the_copy() {
    // Rejecting the only waiter leaves the copy free.
    let base = spawn_server().await;
    let client = Client::new();
    let title_id = create_title(&client, &base, "Hyperion", 1).await;

    let borrow: Value = client
        .post(format!("{}/borrows", base))
        .json(&json!({ "user_id": 1, "title_id": title_id }))
        .send()
        .await
        .expect("Failed to submit")
        .json()
        .await
        .expect("Failed to parse");
    let borrow_id = borrow["id"].as_i64().unwrap();
    client
        .post(format!("{}/borrows/{}/approve", base, borrow_id))
        .json(&json!({ "approver_id": 99 }))
        .send()
        .await
        .expect("Failed to approve");

    let reservation: Value = client
        .post(format!("{}/reservations", base))
        .json(&json!({ "user_id": 2, "title_id": title_id }))
        .send()
        .await
        .expect("Failed to reserve")
        .json()
        .await
        .expect("Failed to parse");
    let reservation_id = reservation["id"].as_i64().unwrap();

    client
        .post(format!("{}/borrows/{}/return", base, borrow_id))
        .send()
        .await
        .expect("Failed to return");

    // Rejection without a reason is a 400
    let response = client
        .post(format!("{}/reservations/{}/reject", base, reservation_id))
        .json(&json!({ "approver_id": 99, "reason": "" }))
        .send()
        .await
        .expect("Failed to send reject");
    assert_eq!(response.status(), 400);
    let error: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(error["error"], "ReasonRequired");

    let response = client
        .post(format!("{}/reservations/{}/reject", base, reservation_id))
        .json(&json!({ "approver_id": 99, "reason": "no ID shown" }))
        .send()
        .await
        .expect("Failed to reject");
    assert!(response.status().is_success());
    let rejected: Value = response.json().await.expect("Failed to parse rejection");
    assert_eq!(rejected["status"], "Rejected");

    // No other waiter: the copy is free again
    let title: Value = client
        .get(format!("{}/titles/{}", base, title_id))
        .send()
        .await
        .expect("Failed to get title")
        .json()
        .await
        .expect("Failed to parse title");
    assert_eq!(title["available_copies"], 1);
}

#[tokio::test]
async fn test_copy_reduction_below_loans_is_rejected() {
    let base = spawn_server().await;
    let client = Client::new();
    let title_id = create_title(&client, &base, "Solaris", 3).await;

    for user_id in 1..=2 {
        let borrow: Value = client
            .post(format!("{}/borrows", base))
            .json(&json!({ "user_id": user_id, "title_id": title_id }))
            .send()
            .await
            .expect("Failed to submit")
            .json()
            .await
            .expect("Failed to parse");
        client
            .post(format!("{}/borrows/{}/approve", base, borrow["id"].as_i64().unwrap()))
            .json(&json!({ "approver_id": 99 }))
            .send()
            .await
            .expect("Failed to approve");
    }

    let response = client
        .put(format!("{}/titles/{}/copies", base, title_id))
        .json(&json!({ "new_total": 1 }))
        .send()
        .await
        .expect("Failed to adjust");
    assert_eq!(response.status(), 422);
    let error: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(error["error"], "InvalidAdjustment");
}

#[tokio::test]
async fn test_user_loans_and_audit_trail() {
    let base = spawn_server().await;
    let client = Client::new();
    let title_id = create_title(&client, &base, "Foundation", 2).await;

    let borrow: Value = client
        .post(format!("{}/borrows", base))
        .json(&json!({ "user_id": 7, "title_id": title_id }))
        .send()
        .await
        .expect("Failed to submit")
        .json()
        .await
        .expect("Failed to parse");
    client
        .post(format!("{}/borrows/{}/approve", base, borrow["id"].as_i64().unwrap()))
        .json(&json!({ "approver_id": 99 }))
        .send()
        .await
        .expect("Failed to approve");

    let loans: Value = client
        .get(format!("{}/users/7/loans", base))
        .send()
        .await
        .expect("Failed to get loans")
        .json()
        .await
        .expect("Failed to parse loans");
    assert_eq!(loans.as_array().unwrap().len(), 1);
    assert_eq!(loans[0]["is_overdue"], false);

    let audit: Value = client
        .get(format!("{}/audit?limit=10", base))
        .send()
        .await
        .expect("Failed to get audit")
        .json()
        .await
        .expect("Failed to parse audit");
    let actions: Vec<&str> = audit
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    // Newest first
    assert_eq!(actions, vec!["borrow.approve", "borrow.submit", "title.create"]);
}

#[tokio::test]
async fn test_unknown_ids_return_404() {
    let base = spawn_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/borrows/123456789", base))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
    let error: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(error["error"], "UnknownEntity");
}
