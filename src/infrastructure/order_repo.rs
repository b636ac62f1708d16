use bigdecimal::BigDecimal;
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderItemView, OrderView};
use crate::domain::ports::OrderRepository;
use crate::schema::{cart_items, order_items, orders, products};

use super::models::{CartItemRow, NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};

const STATUS_COMPLETED: &str = "completed";

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create_from_cart(
        &self,
        session_id: &str,
        declared_total: BigDecimal,
        shipping_address: Value,
        payment_intent_id: &str,
    ) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Load the cart joined with current prices. FOR UPDATE locks the
            //    involved cart and product rows so concurrent checkouts touching
            //    the same products serialize on the store's row locks.
            let lines: Vec<(CartItemRow, BigDecimal)> = cart_items::table
                .inner_join(products::table)
                .filter(cart_items::session_id.eq(session_id))
                .select((CartItemRow::as_select(), products::price))
                .for_update()
                .load(conn)?;

            if lines.is_empty() {
                return Err(DomainError::EmptyCart);
            }

            // 2. The stored total is recomputed from the cart; the declared
            //    total is never trusted.
            let total = lines.iter().fold(BigDecimal::from(0), |acc, (item, price)| {
                acc + price * BigDecimal::from(item.quantity)
            });
            if total != declared_total {
                log::warn!(
                    "Declared total {} differs from recomputed total {} for session {}",
                    declared_total,
                    total,
                    session_id
                );
            }

            // 3. Insert the order.
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    total,
                    status: STATUS_COMPLETED.to_string(),
                    payment_intent_id: payment_intent_id.to_string(),
                    shipping_address,
                })
                .execute(conn)?;

            // 4. Snapshot each cart line into an order item at its current price.
            let new_items: Vec<NewOrderItemRow> = lines
                .iter()
                .map(|(item, price)| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: price.clone(),
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_items)
                .execute(conn)?;

            // 5. Decrement stock. No floor: an oversold product goes negative.
            for (item, _) in &lines {
                diesel::update(products::table.find(item.product_id))
                    .set(products::stock.eq(products::stock - item.quantity))
                    .execute(conn)?;
            }

            // 6. Empty the cart for this session.
            diesel::delete(cart_items::table.filter(cart_items::session_id.eq(session_id)))
                .execute(conn)?;

            Ok(order_id)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items: Vec<(OrderItemRow, String, String)> = order_items::table
            .inner_join(products::table)
            .filter(order_items::order_id.eq(order.id))
            .select((OrderItemRow::as_select(), products::name, products::image))
            .load(&mut conn)?;

        Ok(Some(OrderView {
            id: order.id,
            total: order.total,
            status: order.status,
            payment_intent_id: order.payment_intent_id,
            shipping_address: order.shipping_address,
            created_at: order.created_at,
            items: items
                .into_iter()
                .map(|(item, name, image)| OrderItemView {
                    id: item.id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                    price: item.price,
                    name,
                    image,
                })
                .collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use diesel::prelude::*;
    use serde_json::json;
    use uuid::Uuid;

    use super::DieselOrderRepository;
    use crate::domain::errors::DomainError;
    use crate::domain::ports::{CartRepository, OrderRepository};
    use crate::infrastructure::cart_repo::DieselCartRepository;
    use crate::infrastructure::models::NewCartItemRow;
    use crate::schema::{cart_items, orders, products};
    use crate::test_support::{insert_product, setup_db};

    fn session() -> String {
        format!("session_{}", Uuid::new_v4())
    }

    fn address() -> serde_json::Value {
        json!({"line1": "1 Main St", "city": "Springfield", "zip": "12345"})
    }

    fn decimal(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn stock_of(pool: &crate::db::DbPool, product: Uuid) -> i32 {
        let mut conn = pool.get().expect("Failed to get connection");
        products::table
            .find(product)
            .select(products::stock)
            .first(&mut conn)
            .expect("stock query failed")
    }

    fn orders_for_intent(pool: &crate::db::DbPool, intent: &str) -> i64 {
        let mut conn = pool.get().expect("Failed to get connection");
        orders::table
            .filter(orders::payment_intent_id.eq(intent))
            .count()
            .get_result(&mut conn)
            .expect("count query failed")
    }

    #[tokio::test]
    async fn empty_cart_fails_and_persists_nothing() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool.clone());
        let intent = format!("pi_{}", Uuid::new_v4().simple());

        let result = repo.create_from_cart(&session(), decimal("10.00"), address(), &intent);

        assert!(matches!(result, Err(DomainError::EmptyCart)));
        assert_eq!(orders_for_intent(&pool, &intent), 0);
    }

    #[tokio::test]
    async fn checkout_snapshots_cart_decrements_stock_and_clears_session() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());

        let product_a = insert_product(&pool, "Product A", "10.00", "test-order", 5, false, 0);
        let product_b = insert_product(&pool, "Product B", "5.00", "test-order", 1, false, 0);
        let session = session();

        carts.add_item(&session, product_a, 2).expect("add failed");
        carts.add_item(&session, product_b, 1).expect("add failed");

        // A wildly wrong declared total must not be stored.
        let order_id = repo
            .create_from_cart(&session, decimal("999.00"), address(), "pi_snapshot")
            .expect("create failed");

        let order = repo
            .find_by_id(order_id)
            .expect("find failed")
            .expect("order should exist");

        assert_eq!(order.total, decimal("25.00"));
        assert_eq!(order.status, "completed");
        assert_eq!(order.payment_intent_id, "pi_snapshot");
        assert_eq!(order.items.len(), 2);

        let item_a = order
            .items
            .iter()
            .find(|i| i.product_id == product_a)
            .expect("item for product A");
        assert_eq!(item_a.quantity, 2);
        assert_eq!(item_a.price, decimal("10.00"));

        assert_eq!(stock_of(&pool, product_a), 3);
        assert_eq!(stock_of(&pool, product_b), 0);
        assert!(carts.get_cart(&session).expect("get_cart failed").is_empty());
    }

    #[tokio::test]
    async fn order_items_keep_purchase_time_price_after_repricing() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());

        let product = insert_product(&pool, "Repriced", "10.00", "test-order", 5, false, 0);
        let session = session();
        carts.add_item(&session, product, 1).expect("add failed");

        let order_id = repo
            .create_from_cart(&session, decimal("10.00"), address(), "pi_reprice")
            .expect("create failed");

        let mut conn = pool.get().expect("Failed to get connection");
        diesel::update(products::table.find(product))
            .set(products::price.eq(decimal("99.99")))
            .execute(&mut conn)
            .expect("price update failed");

        let order = repo
            .find_by_id(order_id)
            .expect("find failed")
            .expect("order should exist");
        assert_eq!(order.items[0].price, decimal("10.00"));
        assert_eq!(order.total, decimal("10.00"));
    }

    #[tokio::test]
    async fn failed_checkout_rolls_back_order_stock_and_cart() {
        let (_container, pool) = setup_db().await;
        let carts = DieselCartRepository::new(pool.clone());
        let repo = DieselOrderRepository::new(pool.clone());

        let good = insert_product(&pool, "Good", "10.00", "test-order", 5, false, 0);
        let bad = insert_product(&pool, "Bad", "5.00", "test-order", 5, false, 0);
        let session = session();

        carts.add_item(&session, good, 2).expect("add failed");
        // A zero-quantity line violates the order_items check constraint midway
        // through the transaction, after the order row is already inserted.
        let mut conn = pool.get().expect("Failed to get connection");
        diesel::insert_into(cart_items::table)
            .values(&NewCartItemRow {
                id: Uuid::new_v4(),
                session_id: session.clone(),
                product_id: bad,
                quantity: 0,
            })
            .execute(&mut conn)
            .expect("insert failed");

        let intent = format!("pi_{}", Uuid::new_v4().simple());
        let result = repo.create_from_cart(&session, decimal("20.00"), address(), &intent);

        assert!(matches!(result, Err(DomainError::Internal(_))));
        assert_eq!(orders_for_intent(&pool, &intent), 0);
        assert_eq!(stock_of(&pool, good), 5);
        assert_eq!(carts.get_cart(&session).expect("get_cart failed").len(), 2);
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_id() {
        let (_container, pool) = setup_db().await;
        let repo = DieselOrderRepository::new(pool);

        let result = repo
            .find_by_id(Uuid::new_v4())
            .expect("find should not error");

        assert!(result.is_none());
    }
}
