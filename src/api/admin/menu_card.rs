use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::dish::{self, Entity as DishEntity, FoodType};
use crate::entities::menu_card::{self, Entity as MenuCardEntity};
use crate::middleware::logging::{to_response, ApiError};
use crate::serializers::{parse_prep_time, MenuCardResponse, PREP_TIME_REGEX};

//ROUTERS
pub fn admin_menu_card_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/menu_card", post(create_menu_card))
        .route(
            "/menu_card/:id",
            patch(patch_menu_card).delete(delete_menu_card),
        )
        .layer(Extension(db))
}

//ROUTES

// A card and its embedded dishes are created in one transaction; any dish
// failure rolls the card back as well.
async fn create_menu_card(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateMenuCard>,
) -> Response {
    if let Err(errors) = payload.validate() {
        return to_response(
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Validation failed",
                    "details": errors
                })),
            ),
            Err(ApiError::ValidationFail(errors.to_string())),
        );
    }

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::TransactionCreationFailed),
            );
        }
    };

    let new_card = menu_card::ActiveModel {
        name: Set(payload.name),
        description: Set(payload.description),
        ..Default::default()
    };

    let card = match new_card.insert(&txn).await {
        Ok(card) => card,
        Err(err) => {
            let _ = txn.rollback().await;
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            );
        }
    };

    let mut dishes = Vec::with_capacity(payload.dishes.len());
    for embedded in payload.dishes {
        let prep_time = match parse_prep_time(&embedded.prep_time) {
            Some(prep_time) => prep_time,
            None => {
                let _ = txn.rollback().await;
                let tmp = format!("Invalid prep_time for dish '{}'", embedded.name);
                return to_response(
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": tmp
                        })),
                    ),
                    Err(ApiError::ValidationFail(tmp)),
                );
            }
        };

        let new_dish = dish::ActiveModel {
            name: Set(embedded.name),
            description: Set(embedded.description),
            price: Set(embedded.price),
            prep_time: Set(prep_time),
            food_type: Set(embedded.food_type.unwrap_or_default()),
            menu_card_id: Set(Some(card.id)),
            ..Default::default()
        };

        match new_dish.insert(&txn).await {
            Ok(dish) => dishes.push(dish),
            Err(err) => {
                let _ = txn.rollback().await;
                return to_response(
                    (
                        StatusCode::CONFLICT,
                        Json(json!({
                            "error": "Dish names must be unique within a menu card"
                        })),
                    ),
                    Err(ApiError::UniqueViolation(err.to_string())),
                );
            }
        }
    }

    match txn.commit().await {
        Ok(_) => to_response(
            (
                StatusCode::CREATED,
                Json(MenuCardResponse::new(card, dishes)),
            ),
            Ok(()),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

async fn patch_menu_card(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchMenuCard>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::TransactionCreationFailed),
            );
        }
    };

    match MenuCardEntity::find_by_id(id).one(&txn).await {
        Ok(Some(card)) => {
            let mut card: menu_card::ActiveModel = card.into();

            if let Some(name) = payload.name {
                card.name = Set(name);
            }

            if let Some(description) = payload.description {
                card.description = Set(Some(description));
            }

            // modified is stamped by the entity's before_save hook
            match card.update(&txn).await {
                Ok(_) => match txn.commit().await {
                    Ok(_) => to_response(
                        (
                            StatusCode::OK,
                            Json(json!({
                                "message": "Resource patched successfully."
                            })),
                        ),
                        Ok(()),
                    ),
                    Err(err) => to_response(
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "error": "Internal server error"
                            })),
                        ),
                        Err(ApiError::DbError(err.to_string())),
                    ),
                },
                Err(err) => {
                    let _ = txn.rollback().await;
                    to_response(
                        (
                            StatusCode::BAD_REQUEST,
                            Json(json!({
                                "error": "Failed to patch this resource"
                            })),
                        ),
                        Err(ApiError::DbError(err.to_string())),
                    )
                }
            }
        }
        Ok(None) => to_response(
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No menu card with {} id was found.", id)
                })),
            ),
            Err(ApiError::General(format!("No menu card with {id} id"))),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

// Deleting a card orphans its dishes instead of cascading: their
// back-reference is cleared in the same transaction.
async fn delete_menu_card(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::TransactionCreationFailed),
            );
        }
    };

    match MenuCardEntity::find_by_id(id).one(&txn).await {
        Ok(Some(card)) => {
            let nullify = DishEntity::update_many()
                .col_expr(dish::Column::MenuCardId, Expr::value(sea_orm::Value::Int(None)))
                .filter(dish::Column::MenuCardId.eq(card.id))
                .exec(&txn)
                .await;

            if let Err(err) = nullify {
                let _ = txn.rollback().await;
                return to_response(
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "error": "Failed to detach dishes from this menu card"
                        })),
                    ),
                    Err(ApiError::DbError(err.to_string())),
                );
            }

            let card: menu_card::ActiveModel = card.into();
            match card.delete(&txn).await {
                Ok(_) => match txn.commit().await {
                    Ok(_) => to_response(
                        (
                            StatusCode::OK,
                            Json(json!({
                                "message": "Resource deleted successfully."
                            })),
                        ),
                        Ok(()),
                    ),
                    Err(err) => to_response(
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "error": "Internal server error"
                            })),
                        ),
                        Err(ApiError::DbError(err.to_string())),
                    ),
                },
                Err(err) => {
                    let _ = txn.rollback().await;
                    to_response(
                        (
                            StatusCode::BAD_REQUEST,
                            Json(json!({
                                "error": "Failed to delete this resource"
                            })),
                        ),
                        Err(ApiError::DbError(err.to_string())),
                    )
                }
            }
        }
        Ok(None) => to_response(
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No menu card with {} id was found.", id)
                })),
            ),
            Err(ApiError::General(format!("No menu card with {id} id"))),
        ),
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

//Structs
#[derive(Deserialize, Validate, Clone, Debug)]
struct CreateMenuCard {
    #[validate(length(min = 1))]
    name: String,
    description: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    dishes: Vec<EmbeddedDish>,
}

#[derive(Deserialize, Validate, Clone, Debug)]
struct EmbeddedDish {
    #[validate(length(min = 1, max = 100))]
    name: String,
    description: Option<String>,
    price: Decimal,
    #[validate(regex(path = *PREP_TIME_REGEX))]
    prep_time: String,
    food_type: Option<FoodType>,
}

#[derive(Deserialize, Clone, Debug)]
struct PatchMenuCard {
    name: Option<String>,
    description: Option<String>,
}
