use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde_json::Value;
use uuid::Uuid;

use super::cart::CartItemView;
use super::catalog::ProductView;
use super::errors::DomainError;
use super::order::OrderView;
use super::payment::PaymentIntentView;

pub trait CatalogRepository: Send + Sync + 'static {
    /// All products, featured first, then newest first.
    fn list(&self) -> Result<Vec<ProductView>, DomainError>;
    fn list_featured(&self) -> Result<Vec<ProductView>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<ProductView>, DomainError>;
    /// Exact, case-sensitive category match.
    fn list_by_category(&self, category: &str) -> Result<Vec<ProductView>, DomainError>;
}

pub trait CartRepository: Send + Sync + 'static {
    fn get_cart(&self, session_id: &str) -> Result<Vec<CartItemView>, DomainError>;
    /// Upsert: inserts a new line or increments the existing one for this
    /// (session, product) pair in a single conditional write.
    fn add_item(&self, session_id: &str, product_id: Uuid, quantity: i32)
        -> Result<(), DomainError>;
    fn update_item(&self, item_id: Uuid, quantity: i32) -> Result<(), DomainError>;
    fn remove_item(&self, item_id: Uuid) -> Result<(), DomainError>;
    fn clear_cart(&self, session_id: &str) -> Result<(), DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Checkout completion: snapshots the session's cart into an order inside
    /// one transaction. The declared total is advisory only; the stored total
    /// is recomputed from the cart.
    fn create_from_cart(
        &self,
        session_id: &str,
        declared_total: BigDecimal,
        shipping_address: Value,
        payment_intent_id: &str,
    ) -> Result<Uuid, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// `amount` is in major currency units; adapters convert to the
    /// provider's minor-unit integer representation.
    async fn create_intent(
        &self,
        amount: BigDecimal,
        currency: &str,
    ) -> Result<PaymentIntentView, DomainError>;
    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntentView, DomainError>;
}
