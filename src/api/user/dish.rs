use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use std::sync::Arc;

use crate::entities::dish::{self, Entity as DishEntity, FoodType};
use crate::entities::menu_card::Entity as MenuCardEntity;
use crate::serializers::{parse_field_list, serialize_with_projection, DishResponse};

pub fn dish_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/dish", get(get_dishes))
        .route("/dish/:id", get(get_dish))
        .layer(Extension(db))
}

async fn get_dishes(
    Query(params): Query<DishesQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
                .into_response();
        }
    };

    let mut half_result = DishEntity::find().find_also_related(MenuCardEntity);

    if let Some(code) = params.food_type {
        match FoodType::from_i16(code) {
            Some(food_type) => {
                half_result = half_result.filter(dish::Column::FoodType.eq(food_type));
            }
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": format!("Unknown food type code: {}", code)
                    })),
                )
                    .into_response();
            }
        }
    }

    if let Some(card_id) = params.menu_card {
        half_result = half_result.filter(dish::Column::MenuCardId.eq(card_id));
    }

    if let Some(min) = params.min {
        half_result = half_result.filter(dish::Column::Price.gte(min));
    }

    if let Some(max) = params.max {
        half_result = half_result.filter(dish::Column::Price.lte(max));
    }

    let (column, order) = dish_ordering(params.ordering.as_deref());
    let result = half_result
        .order_by(column, order)
        // id tiebreak keeps ties in insertion order
        .order_by_asc(dish::Column::Id)
        .all(&txn)
        .await;

    match result {
        Ok(rows) => {
            let fields = parse_field_list(params.fields.as_deref());
            let exclude = parse_field_list(params.exclude.as_deref());
            let response: Vec<Value> = rows
                .into_iter()
                .map(|(dish, card)| {
                    let response = DishResponse::new(dish, card.map(|card| card.name));
                    serialize_with_projection(&response, fields.as_ref(), exclude.as_ref())
                })
                .collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

async fn get_dish(
    Query(params): Query<DishQuery>,
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
                .into_response();
        }
    };

    let result = DishEntity::find_by_id(id)
        .find_also_related(MenuCardEntity)
        .one(&txn)
        .await;

    match result {
        Ok(Some((dish, card))) => {
            let fields = parse_field_list(params.fields.as_deref());
            let exclude = parse_field_list(params.exclude.as_deref());
            let response = DishResponse::new(dish, card.map(|card| card.name));
            (
                StatusCode::OK,
                Json(serialize_with_projection(
                    &response,
                    fields.as_ref(),
                    exclude.as_ref(),
                )),
            )
                .into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No dish with {} id was found.", id)
            })),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error."
            })),
        )
            .into_response(),
    }
}

// `ordering` takes a field name, `-` prefix for descending; unknown names
// fall back to id.
fn dish_ordering(raw: Option<&str>) -> (dish::Column, Order) {
    let raw = raw.unwrap_or("id");
    let (field, order) = match raw.strip_prefix('-') {
        Some(field) => (field, Order::Desc),
        None => (raw, Order::Asc),
    };
    let column = match field {
        "name" => dish::Column::Name,
        "price" => dish::Column::Price,
        "prep_time" => dish::Column::PrepTime,
        "food_type" => dish::Column::FoodType,
        "created" => dish::Column::Created,
        "modified" => dish::Column::Modified,
        _ => dish::Column::Id,
    };
    (column, order)
}

#[derive(Deserialize)]
struct DishesQuery {
    ordering: Option<String>,
    fields: Option<String>,
    exclude: Option<String>,
    food_type: Option<i16>,
    menu_card: Option<i32>,
    min: Option<Decimal>,
    max: Option<Decimal>,
}

#[derive(Deserialize)]
struct DishQuery {
    fields: Option<String>,
    exclude: Option<String>,
}
