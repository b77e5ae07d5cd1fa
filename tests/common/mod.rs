use reqwest::{header, Client, StatusCode};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;

use rust_menucards::api::create_api_router;
use rust_menucards::entities::{primary_setup, setup_schema};

pub struct TestApp {
    pub address: String,
    pub db: Arc<DatabaseConnection>,
}

/// Fresh in-memory database plus a server on an ephemeral port. One pooled
/// connection, otherwise each checkout would see its own empty database.
pub async fn spawn_app() -> TestApp {
    std::env::set_var("SECRET", "integration-test-secret");

    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory database");
    setup_schema(&db).await;

    let shared_db = Arc::new(db);
    primary_setup(shared_db.clone()).await;

    let app = create_api_router(shared_db.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = format!(
        "http://{}",
        listener.local_addr().expect("Failed to read local addr")
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server crashed");
    });

    TestApp {
        address,
        db: shared_db,
    }
}

pub async fn login(client: &Client, address: &str, username: &str) -> String {
    let payload = serde_json::json!({
        "username": username,
        "password": "Secret15"
    });

    let response = client
        .post(format!("{address}/api/login"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login response");
    body["token"]
        .as_str()
        .expect("Login response without token")
        .to_owned()
}

/// Client that sends `Authorization: Bearer <token>` on every request.
pub async fn authed_client(address: &str, username: &str) -> Client {
    let token = login(&Client::new(), address, username).await;

    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {token}"))
            .expect("Failed to build auth header"),
    );
    Client::builder()
        .default_headers(headers)
        .build()
        .expect("Failed to build client")
}
