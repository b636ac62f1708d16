use bigdecimal::BigDecimal;
use uuid::Uuid;

/// A cart line joined with the owning product's current listing data.
///
/// `price` and `stock` reflect the live product row at read time; nothing
/// here is a purchase-time snapshot.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: Uuid,
    pub session_id: String,
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub price: BigDecimal,
    pub image: String,
    pub stock: i32,
}
