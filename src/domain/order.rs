use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price captured at purchase time, decoupled from the live product.
    pub price: BigDecimal,
    pub name: String,
    pub image: String,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub total: BigDecimal,
    pub status: String,
    pub payment_intent_id: String,
    pub shipping_address: Value,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}
