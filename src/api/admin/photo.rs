use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    response::Response,
    routing::post,
    Json, Router,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::fs as tokio_fs;
use uuid::Uuid;

use crate::entities::dish::{self, Entity as DishEntity};
use crate::middleware::logging::{to_response, ApiError};

//ROUTERS
pub fn admin_photo_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/dish/:id/photo", post(upload_photo))
        .layer(Extension(db))
}

//ROUTES
async fn upload_photo(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    mut multipart: Multipart,
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

    let dish = match DishEntity::find_by_id(id).one(&txn).await {
        Ok(Some(dish)) => dish,
        Ok(None) => {
            let tmp = format!("No dish with {id} id was found");
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
    };

    match multipart.next_field().await.unwrap_or(None) {
        Some(field) => {
            let content_type = match field.content_type() {
                Some(content_type) => content_type.to_owned(),
                None => {
                    let tmp = "Content type is not set.";
                    return to_response(
                        (StatusCode::BAD_REQUEST, Json(json!({"error": tmp}))),
                        Err(ApiError::General(tmp.to_string())),
                    );
                }
            };

            let file_extension = match allowed_content_types().get(content_type.as_str()) {
                Some(&ext) => ext.to_owned(),
                None => {
                    let tmp = "Unsupported content type.";
                    return to_response(
                        (StatusCode::BAD_REQUEST, Json(json!({"error": tmp}))),
                        Err(ApiError::General(tmp.to_string())),
                    );
                }
            };

            let data = match field.bytes().await {
                Ok(data) => data,
                Err(err) => {
                    return to_response(
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "error": "Failed to read file bytes."
                            })),
                        ),
                        Err(ApiError::General(format!("Multipart error: {err}"))),
                    );
                }
            };

            if data.len() > file_size_limit() {
                let tmp = "Payload too large";
                return to_response(
                    (
                        StatusCode::PAYLOAD_TOO_LARGE,
                        Json(json!({
                            "error": tmp
                        })),
                    ),
                    Err(ApiError::General(tmp.to_string())),
                );
            }

            let file_name = format!("{}.{}", Uuid::new_v4(), file_extension);
            let dir = upload_dir();
            if let Err(err) = tokio_fs::create_dir_all(&dir).await {
                return to_response(
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "error": "Failed to upload file to the server"
                        })),
                    ),
                    Err(ApiError::General(err.to_string())),
                );
            }
            if let Err(err) = tokio_fs::write(format!("{dir}/{file_name}"), data).await {
                return to_response(
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "error": "Failed to upload file to the server"
                        })),
                    ),
                    Err(ApiError::General(err.to_string())),
                );
            }

            let mut dish: dish::ActiveModel = dish.into();
            dish.photo = Set(Some(file_name));

            match dish.update(&txn).await {
                Ok(_) => match txn.commit().await {
                    Ok(_) => to_response(
                        (
                            StatusCode::CREATED,
                            Json(json!({
                                "message": "File uploaded successfully."
                            })),
                        ),
                        Ok(()),
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
                },
                Err(err) => {
                    let _ = txn.rollback().await;
                    to_response(
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "error": "Failed to attach photo to this dish"
                            })),
                        ),
                        Err(ApiError::DbError(err.to_string())),
                    )
                }
            }
        }
        None => {
            let tmp = "No file field in multipart body";
            to_response(
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": tmp
                    })),
                ),
                Err(ApiError::General(tmp.to_string())),
            )
        }
    }
}

//utils
fn allowed_content_types() -> HashMap<&'static str, &'static str> {
    HashMap::from([("image/jpeg", "jpg"), ("image/png", "png")])
}

fn upload_dir() -> String {
    std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_owned())
}

fn file_size_limit() -> usize {
    std::env::var("FILE_SIZE_LIMIT")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(5 * 1024 * 1024)
}
