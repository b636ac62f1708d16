use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::cart::CartItemView;
use crate::domain::catalog::ProductView;
use crate::schema::{cart_items, order_items, orders, products};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub image: String,
    pub category: String,
    pub stock: i32,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub image: String,
    pub category: String,
    pub stock: i32,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductView {
    fn from(row: ProductRow) -> Self {
        ProductView {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            image: row.image,
            category: row.category,
            stock: row.stock,
            featured: row.featured,
            created_at: row.created_at,
        }
    }
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = cart_items)]
#[diesel(belongs_to(ProductRow, foreign_key = product_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemRow {
    pub id: Uuid,
    pub session_id: String,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = cart_items)]
pub struct NewCartItemRow {
    pub id: Uuid,
    pub session_id: String,
    pub product_id: Uuid,
    pub quantity: i32,
}

impl CartItemRow {
    /// Join product listing data onto a cart row.
    pub fn into_view(self, name: String, price: BigDecimal, image: String, stock: i32) -> CartItemView {
        CartItemView {
            id: self.id,
            session_id: self.session_id,
            product_id: self.product_id,
            quantity: self.quantity,
            name,
            price,
            image,
            stock,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub total: BigDecimal,
    pub status: String,
    pub payment_intent_id: String,
    pub shipping_address: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub total: BigDecimal,
    pub status: String,
    pub payment_intent_id: String,
    pub shipping_address: Value,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
}
