use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::entities::menu_card::Entity as MenuCard;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "dishes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    /// Preparation time in whole seconds; `HH:MM:SS` on the wire.
    pub prep_time: i32,
    pub food_type: FoodType,
    #[sea_orm(nullable)]
    pub photo: Option<String>,
    pub created: DateTimeUtc,
    pub modified: DateTimeUtc,
    #[sea_orm(nullable)]
    pub menu_card_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "MenuCard",
        from = "crate::entities::dish::Column::MenuCardId",
        to = "crate::entities::menu_card::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull",
    )]
    MenuCard,
}

impl Related<MenuCard> for Entity {
    fn to() -> RelationDef {
        Relation::MenuCard.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now();
        if insert {
            self.created = Set(now);
        }
        self.modified = Set(now);
        Ok(self)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
pub enum FoodType {
    #[sea_orm(num_value = 10)]
    Meat,
    #[sea_orm(num_value = 11)]
    Vegetarian,
    #[sea_orm(num_value = 12)]
    Vegan,
    #[sea_orm(num_value = 100)]
    Unknown,
}

impl FoodType {
    pub fn as_i16(self) -> i16 {
        match self {
            FoodType::Meat => 10,
            FoodType::Vegetarian => 11,
            FoodType::Vegan => 12,
            FoodType::Unknown => 100,
        }
    }

    pub fn from_i16(code: i16) -> Option<FoodType> {
        match code {
            10 => Some(FoodType::Meat),
            11 => Some(FoodType::Vegetarian),
            12 => Some(FoodType::Vegan),
            100 => Some(FoodType::Unknown),
            _ => None,
        }
    }
}

impl Default for FoodType {
    fn default() -> Self {
        FoodType::Meat
    }
}

impl FromStr for FoodType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.parse::<i16>().map_err(|_| ())?;
        FoodType::from_i16(code).ok_or(())
    }
}

impl Serialize for FoodType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i16(self.as_i16())
    }
}

// Clients coerced through form layers send "10" as well as 10.
impl<'de> Deserialize<'de> for FoodType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct FoodTypeVisitor;

        fn from_code<E: serde::de::Error>(code: i64) -> Result<FoodType, E> {
            i16::try_from(code)
                .ok()
                .and_then(FoodType::from_i16)
                .ok_or_else(|| E::custom(format!("unknown food type code: {code}")))
        }

        impl<'de> serde::de::Visitor<'de> for FoodTypeVisitor {
            type Value = FoodType;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a food type code (10, 11, 12 or 100) as a number or string")
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<FoodType, E> {
                from_code(v)
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<FoodType, E> {
                from_code(v as i64)
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<FoodType, E> {
                v.parse::<i64>()
                    .map_err(|_| E::custom(format!("invalid food type code: {v}")))
                    .and_then(from_code)
            }
        }

        deserializer.deserialize_any(FoodTypeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::FoodType;
    use serde_json::json;

    #[test]
    fn food_type_accepts_numbers_and_numeric_strings() {
        assert_eq!(
            serde_json::from_value::<FoodType>(json!(10)).unwrap(),
            FoodType::Meat
        );
        assert_eq!(
            serde_json::from_value::<FoodType>(json!("12")).unwrap(),
            FoodType::Vegan
        );
        assert!(serde_json::from_value::<FoodType>(json!(42)).is_err());
        assert!(serde_json::from_value::<FoodType>(json!("veggie")).is_err());
    }

    #[test]
    fn food_type_serializes_as_its_code() {
        assert_eq!(serde_json::to_value(FoodType::Unknown).unwrap(), json!(100));
    }

    #[test]
    fn food_type_defaults_to_meat() {
        assert_eq!(FoodType::default(), FoodType::Meat);
    }
}
