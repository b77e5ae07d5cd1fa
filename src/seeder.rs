//! Baseline menu data, mirroring the seed lists consumed by the tests.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DatabaseTransaction, DbErr, Set, TransactionTrait};

use crate::entities::dish::{self, FoodType};
use crate::entities::menu_card;

pub const EXAMPLE_MEAT_DISHES: [&str; 4] = [
    "Beef Wellington",
    "Roast chicken",
    "Pork schnitzel",
    "Lamb skewers",
];

pub const EXAMPLE_VEGETARIAN_DISHES: [&str; 4] = [
    "Cheese pierogi",
    "Margherita pizza",
    "Paneer curry",
    "Mushroom risotto",
];

pub const EXAMPLE_VEGAN_DISHES: [&str; 4] = [
    "Carrot soup",
    "Falafel wrap",
    "Grilled tofu",
    "Lentil stew",
];

pub async fn seed_db(db: &DatabaseConnection) -> Result<(), DbErr> {
    let txn = db.begin().await?;

    seed_card(
        &txn,
        "Protein",
        "meat and more meat",
        FoodType::Meat,
        &EXAMPLE_MEAT_DISHES,
    )
    .await?;
    seed_card(
        &txn,
        "Cheese card",
        "!MEAT",
        FoodType::Vegetarian,
        &EXAMPLE_VEGETARIAN_DISHES,
    )
    .await?;
    seed_card(
        &txn,
        "Vegan card",
        "for carrots lovers",
        FoodType::Vegan,
        &EXAMPLE_VEGAN_DISHES,
    )
    .await?;

    txn.commit().await
}

async fn seed_card(
    txn: &DatabaseTransaction,
    name: &str,
    description: &str,
    food_type: FoodType,
    dish_names: &[&str],
) -> Result<(), DbErr> {
    let card = menu_card::ActiveModel {
        name: Set(name.to_owned()),
        description: Set(Some(description.to_owned())),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    for (i, dish_name) in dish_names.iter().enumerate() {
        dish::ActiveModel {
            name: Set((*dish_name).to_owned()),
            description: Set(None),
            price: Set(Decimal::new(899 + i as i64 * 250, 2)),
            prep_time: Set(600 + i as i32 * 180),
            food_type: Set(food_type),
            photo: Set(None),
            menu_card_id: Set(Some(card.id)),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    Ok(())
}
