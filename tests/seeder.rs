mod common;

use common::{authed_client, spawn_app};
use reqwest::StatusCode;
use serde_json::json;

use rust_menucards::seeder::{seed_db, EXAMPLE_VEGAN_DISHES};

#[tokio::test]
async fn test_seeded_cards_and_dishes() {
    let app = spawn_app().await;
    seed_db(&app.db).await.expect("Failed to seed database");
    let client = authed_client(&app.address, "admin").await;

    let response = client
        .get(format!("{}/api/menu_card?ordering=name", app.address))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let cards = body.as_array().expect("Card listing is not an array");
    assert_eq!(cards.len(), 3);

    let names: Vec<&str> = cards
        .iter()
        .map(|card| card["name"].as_str().expect("Card without name"))
        .collect();
    assert_eq!(names, vec!["Cheese card", "Protein", "Vegan card"]);
    for card in cards {
        assert_eq!(card["dishes_num"], json!(4));
    }

    let response = client
        .get(format!("{}/api/dish?food_type=12", app.address))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse response JSON");
    let dishes = body.as_array().expect("Dish listing is not an array");
    assert_eq!(dishes.len(), EXAMPLE_VEGAN_DISHES.len());
    for dish in dishes {
        let name = dish["name"].as_str().expect("Dish without name");
        assert!(EXAMPLE_VEGAN_DISHES.contains(&name));
        assert_eq!(dish["menu_card"], json!("Vegan card"));
    }
}
