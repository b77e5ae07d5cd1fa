pub mod dish;
pub mod menu_card;
pub mod photo;

use axum::{middleware::from_fn_with_state, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::entities::user::Role;
use crate::middleware::auth::{auth_middleware, AuthState};
use dish::admin_dish_router;
use menu_card::admin_menu_card_router;
use photo::admin_photo_router;

pub fn admin_api_router(db: Arc<DatabaseConnection>) -> Router {
    let admin_menu_card_router = admin_menu_card_router(db.clone());
    let admin_dish_router = admin_dish_router(db.clone());
    let admin_photo_router = admin_photo_router(db.clone());

    Router::new()
        .nest("/", admin_menu_card_router)
        .nest("/", admin_dish_router)
        .nest("/", admin_photo_router)
        .layer(from_fn_with_state(
            AuthState {
                db: db.clone(),
                role: Role::Admin,
            },
            auth_middleware,
        ))
}
