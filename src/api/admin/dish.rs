use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::dish::{self, Entity as DishEntity, FoodType};
use crate::entities::menu_card::Entity as MenuCardEntity;
use crate::middleware::logging::{to_response, ApiError};
use crate::serializers::{de_opt_id, parse_prep_time, DishResponse, PREP_TIME_REGEX};

//ROUTERS
pub fn admin_dish_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/dish", post(create_dish))
        .route("/dish/:id", patch(patch_dish).delete(delete_dish))
        .layer(Extension(db))
}

//ROUTES
async fn create_dish(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateDish>,
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

    let card = match payload.menu_card {
        Some(card_id) => match MenuCardEntity::find_by_id(card_id).one(&txn).await {
            Ok(Some(card)) => Some(card),
            Ok(None) => {
                let _ = txn.rollback().await;
                let tmp = format!("No menu card with {card_id} id was found");
                return to_response(
                    (
                        StatusCode::NOT_FOUND,
                        Json(json!({
                            "error": tmp
                        })),
                    ),
                    Err(ApiError::General(tmp)),
                );
            }
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
        },
        None => None,
    };

    let prep_time = match parse_prep_time(&payload.prep_time) {
        Some(prep_time) => prep_time,
        None => {
            let _ = txn.rollback().await;
            let tmp = "Invalid prep_time, expected HH:MM:SS".to_string();
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
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        prep_time: Set(prep_time),
        food_type: Set(payload.food_type.unwrap_or_default()),
        menu_card_id: Set(card.as_ref().map(|card| card.id)),
        ..Default::default()
    };

    match new_dish.insert(&txn).await {
        Ok(created) => match txn.commit().await {
            Ok(_) => to_response(
                (
                    StatusCode::CREATED,
                    Json(DishResponse::new(created, card.map(|card| card.name))),
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
                    StatusCode::CONFLICT,
                    Json(json!({
                        "error": "Dish with this name already exists on this menu card"
                    })),
                ),
                Err(ApiError::UniqueViolation(err.to_string())),
            )
        }
    }
}

async fn patch_dish(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchDish>,
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

    match DishEntity::find_by_id(id).one(&txn).await {
        Ok(Some(dish)) => {
            let mut dish: dish::ActiveModel = dish.into();

            if let Some(name) = payload.name {
                if name.is_empty() || name.len() > 100 {
                    let tmp = "Dish name must be 1 to 100 characters".to_string();
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
                dish.name = Set(name);
            }

            if let Some(description) = payload.description {
                dish.description = Set(Some(description));
            }

            if let Some(price) = payload.price {
                dish.price = Set(price);
            }

            if let Some(prep_time) = payload.prep_time {
                match parse_prep_time(&prep_time) {
                    Some(prep_time) => dish.prep_time = Set(prep_time),
                    None => {
                        let tmp = "Invalid prep_time, expected HH:MM:SS".to_string();
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
                }
            }

            if let Some(food_type) = payload.food_type {
                dish.food_type = Set(food_type);
            }

            if let Some(card_id) = payload.menu_card {
                match MenuCardEntity::find_by_id(card_id).one(&txn).await {
                    Ok(Some(_)) => dish.menu_card_id = Set(Some(card_id)),
                    Ok(None) => {
                        let tmp = format!("No menu card with {card_id} id was found");
                        return to_response(
                            (
                                StatusCode::NOT_FOUND,
                                Json(json!({
                                    "error": tmp
                                })),
                            ),
                            Err(ApiError::General(tmp)),
                        );
                    }
                    Err(err) => {
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
                }
            }

            // modified is stamped by the entity's before_save hook
            match dish.update(&txn).await {
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
                            StatusCode::CONFLICT,
                            Json(json!({
                                "error": "Dish with this name already exists on this menu card"
                            })),
                        ),
                        Err(ApiError::UniqueViolation(err.to_string())),
                    )
                }
            }
        }
        Ok(None) => to_response(
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No dish with {} id was found.", id)
                })),
            ),
            Err(ApiError::General(format!("No dish with {id} id"))),
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

async fn delete_dish(
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

    match DishEntity::find_by_id(id).one(&txn).await {
        Ok(Some(dish)) => {
            let dish: dish::ActiveModel = dish.into();
            match dish.delete(&txn).await {
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
                    "error": format!("No dish with {} id was found.", id)
                })),
            ),
            Err(ApiError::General(format!("No dish with {id} id"))),
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
struct CreateDish {
    #[validate(length(min = 1, max = 100))]
    name: String,
    description: Option<String>,
    price: Decimal,
    #[validate(regex(path = *PREP_TIME_REGEX))]
    prep_time: String,
    food_type: Option<FoodType>,
    #[serde(default, deserialize_with = "de_opt_id")]
    menu_card: Option<i32>,
}

#[derive(Deserialize, Clone, Debug)]
struct PatchDish {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    prep_time: Option<String>,
    food_type: Option<FoodType>,
    #[serde(default, deserialize_with = "de_opt_id")]
    menu_card: Option<i32>,
}
