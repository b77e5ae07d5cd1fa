//! JSON representations of the persisted entities, plus the call-time
//! field projection used by every list/retrieve endpoint.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::entities::dish::{self, FoodType};
use crate::entities::menu_card;

pub static PREP_TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+):([0-5]\d):([0-5]\d)$").unwrap());

/// `HH:MM:SS` to whole seconds. Hours are unbounded, minutes/seconds are not.
pub fn parse_prep_time(raw: &str) -> Option<i32> {
    let caps = PREP_TIME_REGEX.captures(raw)?;
    let hours: i64 = caps[1].parse().ok()?;
    let minutes: i64 = caps[2].parse().ok()?;
    let seconds: i64 = caps[3].parse().ok()?;
    i32::try_from(hours * 3600 + minutes * 60 + seconds).ok()
}

pub fn format_prep_time(total: i32) -> String {
    let total = total.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

#[derive(Serialize, Clone, Debug)]
pub struct DishResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub prep_time: String,
    pub food_type: FoodType,
    pub photo: Option<String>,
    pub created: chrono::DateTime<chrono::Utc>,
    pub modified: chrono::DateTime<chrono::Utc>,
    /// Name of the owning card, not its id. Null when the dish is unlinked.
    pub menu_card: Option<String>,
}

impl DishResponse {
    pub fn new(dish: dish::Model, menu_card: Option<String>) -> DishResponse {
        DishResponse {
            id: dish.id,
            name: dish.name,
            description: dish.description,
            price: dish.price,
            prep_time: format_prep_time(dish.prep_time),
            food_type: dish.food_type,
            photo: dish.photo,
            created: dish.created,
            modified: dish.modified,
            menu_card,
        }
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct MenuCardResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub dishes: Vec<DishResponse>,
    /// Derived, never persisted.
    pub dishes_num: usize,
    pub created: chrono::DateTime<chrono::Utc>,
    pub modified: chrono::DateTime<chrono::Utc>,
}

impl MenuCardResponse {
    pub fn new(card: menu_card::Model, dishes: Vec<dish::Model>) -> MenuCardResponse {
        let dishes: Vec<DishResponse> = dishes
            .into_iter()
            .map(|dish| DishResponse::new(dish, Some(card.name.clone())))
            .collect();
        MenuCardResponse {
            id: card.id,
            name: card.name,
            description: card.description,
            dishes_num: dishes.len(),
            dishes,
            created: card.created,
            modified: card.modified,
        }
    }
}

pub fn parse_field_list(raw: Option<&str>) -> Option<HashSet<String>> {
    raw.map(|raw| {
        raw.split(',')
            .map(|field| field.trim().to_owned())
            .filter(|field| !field.is_empty())
            .collect()
    })
}

/// Keeps only the requested fields. The allow-list wins when both are given.
pub fn project(
    value: Value,
    fields: Option<&HashSet<String>>,
    exclude: Option<&HashSet<String>>,
) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| match (fields, exclude) {
                    (Some(fields), _) => fields.contains(key),
                    (None, Some(exclude)) => !exclude.contains(key),
                    (None, None) => true,
                })
                .collect(),
        ),
        other => other,
    }
}

pub fn serialize_with_projection<T: Serialize>(
    item: &T,
    fields: Option<&HashSet<String>>,
    exclude: Option<&HashSet<String>>,
) -> Value {
    project(
        serde_json::to_value(item).unwrap_or(Value::Null),
        fields,
        exclude,
    )
}

/// Ids arrive as numbers or numeric strings depending on the client.
pub fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(i32),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Num(id)) => Ok(Some(id)),
        Some(RawId::Text(raw)) => raw.parse::<i32>().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_dish(menu_card_id: Option<i32>) -> dish::Model {
        dish::Model {
            id: 7,
            name: "Good Food".to_owned(),
            description: Some("100% beef".to_owned()),
            price: Decimal::new(10012, 2),
            prep_time: 912,
            food_type: FoodType::Meat,
            photo: None,
            created: chrono::Utc::now(),
            modified: chrono::Utc::now(),
            menu_card_id,
        }
    }

    #[test]
    fn prep_time_parses_and_formats() {
        assert_eq!(parse_prep_time("00:15:12"), Some(912));
        assert_eq!(parse_prep_time("01:00:00"), Some(3600));
        assert_eq!(format_prep_time(912), "00:15:12");
        assert_eq!(format_prep_time(3661), "01:01:01");
    }

    #[test]
    fn prep_time_rejects_malformed_input() {
        assert_eq!(parse_prep_time("15:12"), None);
        assert_eq!(parse_prep_time("00:72:00"), None);
        assert_eq!(parse_prep_time("quick"), None);
        assert_eq!(parse_prep_time(""), None);
    }

    #[test]
    fn dish_without_card_serializes_null_menu_card() {
        let value = serde_json::to_value(DishResponse::new(sample_dish(None), None)).unwrap();
        assert_eq!(value["menu_card"], Value::Null);
        assert_eq!(value["price"], json!("100.12"));
        assert_eq!(value["prep_time"], json!("00:15:12"));
        assert_eq!(value["food_type"], json!(10));
    }

    #[test]
    fn menu_card_response_counts_its_dishes() {
        let card = menu_card::Model {
            id: 1,
            name: "Best Menu!".to_owned(),
            description: None,
            created: chrono::Utc::now(),
            modified: chrono::Utc::now(),
        };
        let response = MenuCardResponse::new(card, vec![sample_dish(Some(1))]);
        assert_eq!(response.dishes_num, 1);
        assert_eq!(response.dishes[0].menu_card.as_deref(), Some("Best Menu!"));
    }

    #[test]
    fn projection_allow_list_wins_over_deny_list() {
        let fields = parse_field_list(Some("name, price"));
        let exclude = parse_field_list(Some("name"));
        let value = project(
            json!({"id": 1, "name": "Falafel wrap", "price": "9.99"}),
            fields.as_ref(),
            exclude.as_ref(),
        );
        assert_eq!(value, json!({"name": "Falafel wrap", "price": "9.99"}));
    }

    #[test]
    fn projection_deny_list_applies_without_allow_list() {
        let exclude = parse_field_list(Some("description"));
        let value = project(
            json!({"id": 1, "description": "x"}),
            None,
            exclude.as_ref(),
        );
        assert_eq!(value, json!({"id": 1}));
    }

    #[test]
    fn projection_without_lists_keeps_everything() {
        let value = json!({"id": 1, "name": "n"});
        assert_eq!(project(value.clone(), None, None), value);
    }
}
