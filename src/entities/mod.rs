pub mod dish;
pub mod menu_card;
pub mod user;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Schema, Set, TransactionTrait};
use std::sync::Arc;

use crate::entities::{
    dish::Entity as Dish, menu_card::Entity as MenuCard, user::Entity as User,
};

pub async fn setup_schema(db: &DatabaseConnection) {
    let schema = Schema::new(db.get_database_backend());
    let create_menu_cards_table = schema.create_table_from_entity(MenuCard);
    let create_dishes_table = schema.create_table_from_entity(Dish);
    let create_users_table = schema.create_table_from_entity(User);

    db.execute(db.get_database_backend().build(&create_menu_cards_table))
        .await
        .expect("Failed to create menu_cards schema");
    db.execute(db.get_database_backend().build(&create_dishes_table))
        .await
        .expect("Failed to create dishes schema");
    db.execute(db.get_database_backend().build(&create_users_table))
        .await
        .expect("Failed to create users schema");

    // Dish names collide only within the same card; NULL cards stay exempt.
    let unique_dish_name = Index::create()
        .name("unique_dish_name")
        .table(Dish)
        .col(dish::Column::Name)
        .col(dish::Column::MenuCardId)
        .unique()
        .to_owned();
    db.execute(db.get_database_backend().build(&unique_dish_name))
        .await
        .expect("Failed to create unique_dish_name index");
}

pub async fn primary_setup(db: Arc<DatabaseConnection>) {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password("Secret15".as_bytes(), &salt)
        .expect("Failed to hash password")
        .to_string();

    let new_admin = user::ActiveModel {
        username: Set("admin".to_owned()),
        password: Set(password_hash.clone()),
        role: Set(user::Role::Admin),
        ..Default::default()
    };

    let new_user = user::ActiveModel {
        username: Set("user".to_owned()),
        password: Set(password_hash),
        role: Set(user::Role::User),
        ..Default::default()
    };

    match db.begin().await {
        Ok(txn) => {
            match user::Entity::insert_many([new_user, new_admin])
                .exec(&txn)
                .await
            {
                Ok(_) => match txn.commit().await {
                    Ok(_) => {}
                    Err(_) => {
                        panic!("Failed to run primary setup, but function was requested.");
                    }
                },
                Err(_) => {
                    let _ = txn.rollback().await;
                    panic!("Failed to run primary setup, but function was requested.");
                }
            }
        }
        Err(_) => {
            panic!("Failed to run primary setup, but function was requested.");
        }
    }
}
