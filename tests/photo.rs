mod common;

use common::{authed_client, spawn_app};
use reqwest::multipart;
use reqwest::StatusCode;
use serde_json::json;

// Tiny but valid PNG header, good enough to round-trip as bytes.
const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52,
];

fn upload_dir() -> String {
    let dir = std::env::temp_dir().join("rust-menucards-test-uploads");
    std::env::set_var("UPLOAD_DIR", &dir);
    dir.to_str().expect("Temp dir is not valid UTF-8").to_owned()
}

async fn create_dish(client: &reqwest::Client, address: &str) -> i64 {
    let response = client
        .post(format!("{address}/api/admin/dish"))
        .json(&json!({
            "name": "Photogenic dish",
            "price": "15.00",
            "prep_time": "00:12:00"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    body["id"].as_i64().expect("Dish id missing")
}

#[tokio::test]
async fn test_photo_upload_and_download() {
    upload_dir();
    let app = spawn_app().await;
    let client = authed_client(&app.address, "admin").await;
    let id = create_dish(&client, &app.address).await;

    let part = multipart::Part::bytes(PNG_BYTES.to_vec())
        .file_name("dish.png")
        .mime_str("image/png")
        .expect("Failed to build multipart part");
    let form = multipart::Form::new().part("photo", part);

    let response = client
        .post(format!("{}/api/admin/dish/{}/photo", app.address, id))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    // the photo endpoint is public, no token needed
    let response = reqwest::Client::new()
        .get(format!("{}/api/dish/{}/photo", app.address, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .expect("Missing content type"),
        "image/png"
    );
    let bytes = response.bytes().await.expect("Failed to read photo bytes");
    assert_eq!(bytes.as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn test_photo_upload_rejects_unsupported_content_type() {
    upload_dir();
    let app = spawn_app().await;
    let client = authed_client(&app.address, "admin").await;
    let id = create_dish(&client, &app.address).await;

    let part = multipart::Part::bytes(b"GIF89a".to_vec())
        .file_name("dish.gif")
        .mime_str("image/gif")
        .expect("Failed to build multipart part");
    let form = multipart::Form::new().part("photo", part);

    let response = client
        .post(format!("{}/api/admin/dish/{}/photo", app.address, id))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_photo_of_dish_without_one_is_not_found() {
    upload_dir();
    let app = spawn_app().await;
    let client = authed_client(&app.address, "admin").await;
    let id = create_dish(&client, &app.address).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/dish/{}/photo", app.address, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
