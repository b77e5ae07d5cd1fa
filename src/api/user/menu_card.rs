use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, Order, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::dish::{self, Entity as DishEntity};
use crate::entities::menu_card::{self, Entity as MenuCardEntity};
use crate::serializers::{parse_field_list, serialize_with_projection, MenuCardResponse};

pub fn menu_card_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/menu_card", get(get_menu_cards))
        .route("/menu_card/:id", get(get_menu_card))
        .layer(Extension(db))
}

async fn get_menu_cards(
    Query(params): Query<MenuCardsQuery>,
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

    let mut half_result = MenuCardEntity::find();

    if let Some(name) = params.name {
        half_result = half_result.filter(menu_card::Column::Name.eq(name));
    }

    let (column, order) = card_ordering(params.ordering.as_deref());
    let cards = match half_result
        .order_by(column, order)
        .order_by_asc(menu_card::Column::Id)
        .all(&txn)
        .await
    {
        Ok(cards) => cards,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            )
                .into_response();
        }
    };

    let card_ids: Vec<i32> = cards.iter().map(|card| card.id).collect();
    let dishes = match DishEntity::find()
        .filter(dish::Column::MenuCardId.is_in(card_ids))
        .order_by_asc(dish::Column::Id)
        .all(&txn)
        .await
    {
        Ok(dishes) => dishes,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error."
                })),
            )
                .into_response();
        }
    };

    let mut dishes_by_card: HashMap<i32, Vec<dish::Model>> = HashMap::new();
    for dish in dishes {
        if let Some(card_id) = dish.menu_card_id {
            dishes_by_card.entry(card_id).or_default().push(dish);
        }
    }

    let fields = parse_field_list(params.fields.as_deref());
    let exclude = parse_field_list(params.exclude.as_deref());
    let response: Vec<Value> = cards
        .into_iter()
        .map(|card| {
            let card_dishes = dishes_by_card.remove(&card.id).unwrap_or_default();
            let response = MenuCardResponse::new(card, card_dishes);
            serialize_with_projection(&response, fields.as_ref(), exclude.as_ref())
        })
        .collect();

    (StatusCode::OK, Json(response)).into_response()
}

async fn get_menu_card(
    Query(params): Query<MenuCardQuery>,
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

    match MenuCardEntity::find_by_id(id).one(&txn).await {
        Ok(Some(card)) => {
            let dishes = match card
                .find_related(DishEntity)
                .order_by_asc(dish::Column::Id)
                .all(&txn)
                .await
            {
                Ok(dishes) => dishes,
                Err(_) => {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "error": "Internal server error."
                        })),
                    )
                        .into_response();
                }
            };
            let fields = parse_field_list(params.fields.as_deref());
            let exclude = parse_field_list(params.exclude.as_deref());
            let response = MenuCardResponse::new(card, dishes);
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
                "error": format!("No menu card with {} id was found.", id)
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

fn card_ordering(raw: Option<&str>) -> (menu_card::Column, Order) {
    let raw = raw.unwrap_or("id");
    let (field, order) = match raw.strip_prefix('-') {
        Some(field) => (field, Order::Desc),
        None => (raw, Order::Asc),
    };
    let column = match field {
        "name" => menu_card::Column::Name,
        "created" => menu_card::Column::Created,
        "modified" => menu_card::Column::Modified,
        _ => menu_card::Column::Id,
    };
    (column, order)
}

#[derive(Deserialize)]
struct MenuCardsQuery {
    ordering: Option<String>,
    fields: Option<String>,
    exclude: Option<String>,
    name: Option<String>,
}

#[derive(Deserialize)]
struct MenuCardQuery {
    fields: Option<String>,
    exclude: Option<String>,
}
