use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::order::OrderView;
use crate::domain::ports::{OrderRepository, PaymentGateway};
use crate::errors::AppError;
use crate::infrastructure::order_repo::DieselOrderRepository;

const INTENT_STATUS_SUCCEEDED: &str = "succeeded";

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub session_id: String,
    /// Client-declared total; advisory only. The stored total is recomputed
    /// from the cart server-side.
    pub total: f64,
    pub shipping_address: Value,
    pub payment_intent_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price captured at purchase time.
    pub price: String,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub total: String,
    pub status: String,
    pub payment_intent_id: String,
    pub shipping_address: Value,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            total: order.total.to_string(),
            status: order.status,
            payment_intent_id: order.payment_intent_id,
            shipping_address: order.shipping_address,
            created_at: order.created_at.to_rfc3339(),
            items: order
                .items
                .into_iter()
                .map(|item| OrderItemResponse {
                    id: item.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price.to_string(),
                    name: item.name,
                    image: item.image,
                })
                .collect(),
        }
    }
}

/// POST /api/orders
///
/// Checkout completion. The client-reported payment intent is verified with
/// the gateway first; the cart snapshot, stock decrements and cart clearing
/// then commit in a single database transaction.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Empty cart or unconfirmed payment"),
        (status = 502, description = "Payment provider failure"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    pool: web::Data<DbPool>,
    gateway: web::Data<dyn PaymentGateway>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let CreateOrderRequest {
        session_id,
        total,
        shipping_address,
        payment_intent_id,
    } = body.into_inner();

    // Never trust the client's "payment succeeded" claim: ask the gateway.
    let intent = gateway.retrieve_intent(&payment_intent_id).await?;
    if intent.status != INTENT_STATUS_SUCCEEDED {
        return Err(AppError::BadRequest(format!(
            "Payment intent {} is not completed (status: {})",
            payment_intent_id, intent.status
        )));
    }

    let declared_total = BigDecimal::try_from(total)
        .map_err(|e| AppError::BadRequest(format!("Invalid total '{}': {}", total, e)))?;

    let repo = DieselOrderRepository::new(pool.get_ref().clone());
    let order_id = web::block(move || {
        repo.create_from_cart(
            &session_id,
            declared_total,
            shipping_address,
            &payment_intent_id,
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CreateOrderResponse {
        success: true,
        order_id,
    }))
}

/// GET /api/orders/{id}
///
/// Returns the order together with its items.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let repo = DieselOrderRepository::new(pool.get_ref().clone());
    let order = web::block(move || repo.find_by_id(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match order {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound),
    }
}
