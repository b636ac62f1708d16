use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ProductView {
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
