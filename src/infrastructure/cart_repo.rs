use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel::upsert::excluded;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::CartItemView;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::{cart_items, products};

use super::models::{CartItemRow, NewCartItemRow};

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CartRepository for DieselCartRepository {
    fn get_cart(&self, session_id: &str) -> Result<Vec<CartItemView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<(CartItemRow, String, BigDecimal, String, i32)> = cart_items::table
            .inner_join(products::table)
            .filter(cart_items::session_id.eq(session_id))
            .select((
                CartItemRow::as_select(),
                products::name,
                products::price,
                products::image,
                products::stock,
            ))
            .order(cart_items::created_at.asc())
            .load(&mut conn)?;
        Ok(rows
            .into_iter()
            .map(|(item, name, price, image, stock)| item.into_view(name, price, image, stock))
            .collect())
    }

    fn add_item(
        &self,
        session_id: &str,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        // Single conditional write keyed on (session_id, product_id): a repeat
        // add increments the existing line instead of inserting a duplicate,
        // and concurrent adds cannot lose updates.
        diesel::insert_into(cart_items::table)
            .values(&NewCartItemRow {
                id: Uuid::new_v4(),
                session_id: session_id.to_string(),
                product_id,
                quantity,
            })
            .on_conflict((cart_items::session_id, cart_items::product_id))
            .do_update()
            .set(cart_items::quantity.eq(cart_items::quantity + excluded(cart_items::quantity)))
            .execute(&mut conn)?;
        Ok(())
    }

    fn update_item(&self, item_id: Uuid, quantity: i32) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::update(cart_items::table.find(item_id))
            .set(cart_items::quantity.eq(quantity))
            .execute(&mut conn)?;
        Ok(())
    }

    fn remove_item(&self, item_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::delete(cart_items::table.find(item_id)).execute(&mut conn)?;
        Ok(())
    }

    fn clear_cart(&self, session_id: &str) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::delete(cart_items::table.filter(cart_items::session_id.eq(session_id)))
            .execute(&mut conn)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use diesel::prelude::*;
    use uuid::Uuid;

    use super::DieselCartRepository;
    use crate::domain::ports::CartRepository;
    use crate::schema::products;
    use crate::test_support::{insert_product, setup_db};

    fn session() -> String {
        format!("session_{}", Uuid::new_v4())
    }

    #[tokio::test]
    async fn repeated_adds_merge_into_one_line() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let product = insert_product(&pool, "Merge Me", "9.99", "test-cart", 50, false, 0);
        let session = session();

        repo.add_item(&session, product, 2).expect("first add failed");
        repo.add_item(&session, product, 3).expect("second add failed");

        let cart = repo.get_cart(&session).expect("get_cart failed");
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].quantity, 5);
        assert_eq!(cart[0].product_id, product);
    }

    #[tokio::test]
    async fn concurrent_adds_merge_into_one_line() {
        let (_container, pool) = setup_db().await;
        let product = insert_product(&pool, "Concurrent", "9.99", "test-cart", 50, false, 0);
        let session = session();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            let session = session.clone();
            handles.push(std::thread::spawn(move || {
                let repo = DieselCartRepository::new(pool);
                repo.add_item(&session, product, 1).expect("add failed");
            }));
        }
        for handle in handles {
            handle.join().expect("add thread panicked");
        }

        let repo = DieselCartRepository::new(pool);
        let cart = repo.get_cart(&session).expect("get_cart failed");
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].quantity, 8);
    }

    #[tokio::test]
    async fn remove_after_add_restores_prior_state() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let kept = insert_product(&pool, "Kept", "5.00", "test-cart", 50, false, 0);
        let removed = insert_product(&pool, "Removed", "5.00", "test-cart", 50, false, 0);
        let session = session();

        repo.add_item(&session, kept, 1).expect("add failed");
        let before = repo.get_cart(&session).expect("get_cart failed");

        repo.add_item(&session, removed, 2).expect("add failed");
        let added = repo
            .get_cart(&session)
            .expect("get_cart failed")
            .into_iter()
            .find(|l| l.product_id == removed)
            .expect("added line present");
        repo.remove_item(added.id).expect("remove failed");

        let after = repo.get_cart(&session).expect("get_cart failed");
        assert_eq!(after.len(), before.len());
        assert_eq!(after[0].id, before[0].id);
        assert_eq!(after[0].quantity, before[0].quantity);
    }

    #[tokio::test]
    async fn update_overwrites_quantity_and_tolerates_unknown_ids() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let product = insert_product(&pool, "Overwrite", "5.00", "test-cart", 50, false, 0);
        let session = session();

        repo.add_item(&session, product, 1).expect("add failed");
        let line = repo.get_cart(&session).expect("get_cart failed").remove(0);

        repo.update_item(line.id, 7).expect("update failed");
        let cart = repo.get_cart(&session).expect("get_cart failed");
        assert_eq!(cart[0].quantity, 7);

        // Unknown ids are a no-op, not an error.
        repo.update_item(Uuid::new_v4(), 3).expect("update of unknown id failed");
        repo.remove_item(Uuid::new_v4()).expect("remove of unknown id failed");
    }

    #[tokio::test]
    async fn clear_cart_removes_all_lines_for_session_only() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let product_a = insert_product(&pool, "A", "5.00", "test-cart", 50, false, 0);
        let product_b = insert_product(&pool, "B", "5.00", "test-cart", 50, false, 0);
        let mine = session();
        let other = session();

        repo.add_item(&mine, product_a, 1).expect("add failed");
        repo.add_item(&mine, product_b, 1).expect("add failed");
        repo.add_item(&other, product_a, 1).expect("add failed");

        repo.clear_cart(&mine).expect("clear failed");

        assert!(repo.get_cart(&mine).expect("get_cart failed").is_empty());
        assert_eq!(repo.get_cart(&other).expect("get_cart failed").len(), 1);
    }

    #[tokio::test]
    async fn cart_lines_show_current_product_price() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCartRepository::new(pool.clone());
        let product = insert_product(&pool, "Repriced", "10.00", "test-cart", 50, false, 0);
        let session = session();

        repo.add_item(&session, product, 1).expect("add failed");

        let mut conn = pool.get().expect("Failed to get connection");
        diesel::update(products::table.find(product))
            .set(products::price.eq(BigDecimal::from_str("12.50").expect("valid decimal")))
            .execute(&mut conn)
            .expect("price update failed");

        let cart = repo.get_cart(&session).expect("get_cart failed");
        assert_eq!(cart[0].price, BigDecimal::from_str("12.50").unwrap());
    }
}
