mod common;

use common::{authed_client, spawn_app};
use reqwest::{Client, StatusCode};

#[tokio::test]
async fn test_register_and_login() {
    let app = spawn_app().await;
    let client = Client::new();

    let payload = serde_json::json!({
        "username": "new_user",
        "password": "Secret15"
    });

    let response = client
        .post(format!("{}/api/register", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/api/login", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let app = spawn_app().await;
    let client = Client::new();

    let payload = serde_json::json!({
        "username": "admin",
        "password": "Secret15"
    });

    let response = client
        .post(format!("{}/api/register", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = spawn_app().await;
    let client = Client::new();

    let payload = serde_json::json!({
        "username": "user",
        "password": "not-the-password"
    });

    let response = client
        .post(format!("{}/api/login", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_listing_without_token_is_unauthorized() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/dish", app.address))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{}/api/menu_card", app.address))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_user_token_cannot_reach_admin_routes() {
    let app = spawn_app().await;
    let client = authed_client(&app.address, "user").await;

    let payload = serde_json::json!({
        "name": "Sneaky card",
        "description": "should not exist"
    });

    let response = client
        .post(format!("{}/api/admin/menu_card", app.address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_token_passes_user_gated_reads() {
    let app = spawn_app().await;
    let client = authed_client(&app.address, "admin").await;

    let response = client
        .get(format!("{}/api/dish", app.address))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    assert_eq!(body, serde_json::Value::Array(vec![]));
}
