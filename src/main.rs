use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;

use rust_menucards::api::create_api_router;
use rust_menucards::entities::{primary_setup, setup_schema};
use rust_menucards::seeder::seed_db;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db: DatabaseConnection = Database::connect(&database_url)
        .await
        .expect("Failed to connect to the database");
    setup_schema(&db).await;

    let shared_db = Arc::new(db);

    primary_setup(shared_db.clone()).await;

    if std::env::var("SEED_DB").as_deref() == Ok("1") {
        seed_db(&shared_db).await.expect("Failed to seed database");
    }

    let app = create_api_router(shared_db);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("Failed to bind 0.0.0.0:3000");
    println!("Running at {:?}", listener);
    axum::serve(listener, app).await.expect("Server error");
}
