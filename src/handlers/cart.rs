use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::CartItemView;
use crate::domain::ports::CartRepository;
use crate::errors::AppError;
use crate::infrastructure::cart_repo::DieselCartRepository;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub session_id: String,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub session_id: String,
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    /// Current product price, not a purchase-time snapshot.
    pub price: String,
    pub image: String,
    pub stock: i32,
}

impl From<CartItemView> for CartItemResponse {
    fn from(item: CartItemView) -> Self {
        CartItemResponse {
            id: item.id,
            session_id: item.session_id,
            product_id: item.product_id,
            quantity: item.quantity,
            name: item.name,
            price: item.price.to_string(),
            image: item.image,
            stock: item.stock,
        }
    }
}

/// GET /api/cart/{id}
///
/// Cart contents for a session, denormalized with current product data.
#[utoipa::path(
    get,
    path = "/api/cart/{id}",
    params(
        ("id" = String, Path, description = "Opaque session identifier"),
    ),
    responses(
        (status = 200, description = "Cart lines for the session", body = [CartItemResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let repo = DieselCartRepository::new(pool.get_ref().clone());
    let items = web::block(move || repo.get_cart(&session_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(
        items
            .into_iter()
            .map(CartItemResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /api/cart
///
/// Adds a product to the session's cart, merging with an existing line for
/// the same product.
#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Item added or merged"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn add_cart_item(
    pool: web::Data<DbPool>,
    body: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let repo = DieselCartRepository::new(pool.get_ref().clone());
    web::block(move || repo.add_item(&body.session_id, body.product_id, body.quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// PUT /api/cart/{id}
///
/// Overwrites a cart line's quantity. No lower bound is enforced; callers
/// remove lines instead of zeroing them.
#[utoipa::path(
    put,
    path = "/api/cart/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart item UUID"),
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Quantity updated"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn update_cart_item(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    let quantity = body.into_inner().quantity;
    let repo = DieselCartRepository::new(pool.get_ref().clone());
    web::block(move || repo.update_item(item_id, quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// DELETE /api/cart/{id}
#[utoipa::path(
    delete,
    path = "/api/cart/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart item UUID"),
    ),
    responses(
        (status = 200, description = "Line removed (no-op when absent)"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn remove_cart_item(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let item_id = path.into_inner();
    let repo = DieselCartRepository::new(pool.get_ref().clone());
    web::block(move || repo.remove_item(item_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

/// DELETE /api/cart/session/{session_id}
#[utoipa::path(
    delete,
    path = "/api/cart/session/{session_id}",
    params(
        ("session_id" = String, Path, description = "Opaque session identifier"),
    ),
    responses(
        (status = 200, description = "Cart cleared"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "cart"
)]
pub async fn clear_cart(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let repo = DieselCartRepository::new(pool.get_ref().clone());
    web::block(move || repo.clear_cart(&session_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
