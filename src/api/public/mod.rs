pub mod auth;
pub mod photo;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use auth::auth_router;
use photo::photo_router;

pub fn public_api_router(db: Arc<DatabaseConnection>) -> Router {
    let auth_router = auth_router(db.clone());
    let photo_router = photo_router(db.clone());

    Router::new()
        .nest("/", auth_router)
        .nest("/", photo_router)
}
