//! API integration tests
//!
//! Run against a live server with a migrated database containing user 1:
//! `cargo test --test api_tests -- --ignored`

use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use gearguard_server::models::user::UserClaims;

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Mint a bearer token the way the identity provider does
fn auth_token() -> String {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "change-this-secret-in-production".to_string());
    let now = Utc::now();
    UserClaims {
        sub: "admin".to_string(),
        user_id: 1,
        name: "Admin".to_string(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    }
    .create_token(&secret)
    .expect("Failed to create token")
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

async fn create_team(client: &Client, token: &str) -> Value {
    let response = client
        .post(format!("{}/teams", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "name": unique("Team"), "description": "Integration test team" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse team")
}

async fn create_equipment(client: &Client, token: &str, team_id: i64) -> Value {
    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(token)
        .json(&json!({
            "name": "Test press",
            "serial_number": unique("SN"),
            "category": "machinery",
            "department": "production",
            "location": "Hall A",
            "maintenance_team_id": team_id
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse equipment")
}

async fn create_request(client: &Client, token: &str, equipment_id: i64) -> Value {
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(token)
        .json(&json!({ "equipment_id": equipment_id, "subject": "Oil leak", "priority": "high" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.expect("Failed to parse request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_ready_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/requests", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_request_inherits_equipment_team_and_logs_creation() {
    let client = Client::new();
    let token = auth_token();

    let team = create_team(&client, &token).await;
    let equipment = create_equipment(&client, &token, team["id"].as_i64().unwrap()).await;
    let request = create_request(&client, &token, equipment["id"].as_i64().unwrap()).await;

    assert_eq!(request["stage"], "new");
    assert_eq!(request["maintenance_team_id"], team["id"]);
    assert!(request["completed_date"].is_null());

    let detail: Value = client
        .get(format!("{}/requests/{}", BASE_URL, request["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse detail");
    assert_eq!(detail["logs"][0]["action"], "Request created");
    assert_eq!(detail["logs"][0]["notes"], "Initial request: Oil leak");
}

#[tokio::test]
#[ignore]
async fn test_stage_change_flow() {
    let client = Client::new();
    let token = auth_token();

    let team = create_team(&client, &token).await;
    let equipment = create_equipment(&client, &token, team["id"].as_i64().unwrap()).await;
    let request = create_request(&client, &token, equipment["id"].as_i64().unwrap()).await;
    let stage_url = format!("{}/requests/{}/stage", BASE_URL, request["id"]);

    // Unknown stage
    let response = client
        .post(&stage_url)
        .bearer_auth(&token)
        .json(&json!({ "stage": "bogus_stage" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "status": "error", "message": "Invalid stage" }));

    // Wrong method
    let response = client
        .get(&stage_url)
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    // Start work: the caller gets assigned
    let response = client
        .post(&stage_url)
        .bearer_auth(&token)
        .json(&json!({ "stage": "in_progress" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "success");
    assert_eq!(body["new_stage"], "in_progress");

    let detail: Value = client
        .get(format!("{}/requests/{}", BASE_URL, request["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse detail");
    assert_eq!(detail["request"]["assigned_to_id"], 1);
    assert_eq!(detail["logs"][0]["action"], "Stage changed");
    assert_eq!(detail["logs"][0]["notes"], "From new to in_progress");

    // Scrap: equipment is scrapped with it
    let response = client
        .post(&stage_url)
        .bearer_auth(&token)
        .json(&json!({ "stage": "scrap" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let equipment_detail: Value = client
        .get(format!("{}/equipment/{}", BASE_URL, equipment["id"]))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse equipment");
    assert_eq!(equipment_detail["equipment"]["is_scrapped"], true);
    assert!(equipment_detail["equipment"]["scrapped_date"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_serial_number_conflicts() {
    let client = Client::new();
    let token = auth_token();
    let serial = unique("DUP");
    let body = json!({
        "name": "Laptop",
        "serial_number": serial,
        "category": "computer",
        "department": "it",
        "location": "Office 2"
    });

    let first = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_missing_team_is_not_found() {
    let client = Client::new();
    let token = auth_token();

    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Orphan drill",
            "serial_number": unique("SN"),
            "category": "machinery",
            "department": "production",
            "location": "Hall B",
            "maintenance_team_id": 999_999
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let team = create_team(&client, &token).await;
    let equipment = create_equipment(&client, &token, team["id"].as_i64().unwrap()).await;
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "equipment_id": equipment["id"],
            "subject": "Noisy bearing",
            "maintenance_team_id": 999_999
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_reporting_shape() {
    let client = Client::new();
    let token = auth_token();

    let body: Value = client
        .get(format!("{}/reporting", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(body["monthly_trend"].as_array().map(Vec::len), Some(6));
    assert_eq!(body["requests_by_priority"].as_array().map(Vec::len), Some(4));
    assert!(body["total_requests"].is_i64());
}

#[tokio::test]
#[ignore]
async fn test_kanban_columns_in_stage_order() {
    let client = Client::new();
    let token = auth_token();

    let text = client
        .get(format!("{}/kanban", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .text()
        .await
        .expect("Failed to read response");

    let positions: Vec<usize> = ["\"new\"", "\"in_progress\"", "\"repaired\"", "\"scrap\""]
        .iter()
        .map(|key| text.find(key).expect("missing column"))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}
