use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::ProductView;
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::schema::products;

use super::models::ProductRow;

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for DieselCatalogRepository {
    fn list(&self) -> Result<Vec<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .select(ProductRow::as_select())
            .order((products::featured.desc(), products::created_at.desc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(ProductView::from).collect())
    }

    fn list_featured(&self) -> Result<Vec<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::featured.eq(true))
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(ProductView::from).collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(ProductView::from))
    }

    fn list_by_category(&self, category: &str) -> Result<Vec<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .filter(products::category.eq(category))
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(ProductView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::DieselCatalogRepository;
    use crate::domain::ports::CatalogRepository;
    use crate::test_support::{insert_product, setup_db};

    #[tokio::test]
    async fn list_puts_featured_first_then_newest() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool.clone());

        let older_featured =
            insert_product(&pool, "Older Featured", "10.00", "test-ordering", 5, true, 300);
        let newer_featured =
            insert_product(&pool, "Newer Featured", "10.00", "test-ordering", 5, true, 100);
        let newer_plain =
            insert_product(&pool, "Newer Plain", "10.00", "test-ordering", 5, false, 50);

        let list = repo.list().expect("list failed");

        let last_featured = list
            .iter()
            .rposition(|p| p.featured)
            .expect("featured products present");
        let first_plain = list
            .iter()
            .position(|p| !p.featured)
            .expect("non-featured products present");
        assert!(
            last_featured < first_plain,
            "every featured product must precede every non-featured one"
        );

        let pos = |id: Uuid| list.iter().position(|p| p.id == id).expect("product listed");
        assert!(pos(newer_featured) < pos(older_featured));
        assert!(pos(newer_featured) < pos(newer_plain));
    }

    #[tokio::test]
    async fn list_featured_returns_only_featured() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool.clone());

        let featured = insert_product(&pool, "Featured", "12.00", "test-featured", 5, true, 0);
        let plain = insert_product(&pool, "Plain", "12.00", "test-featured", 5, false, 0);

        let list = repo.list_featured().expect("list_featured failed");

        assert!(list.iter().all(|p| p.featured));
        assert!(list.iter().any(|p| p.id == featured));
        assert!(list.iter().all(|p| p.id != plain));
    }

    #[tokio::test]
    async fn category_match_is_exact_and_case_sensitive() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool.clone());

        let lower = insert_product(&pool, "Lower", "8.00", "test-greens", 5, false, 0);
        insert_product(&pool, "Upper", "8.00", "Test-Greens", 5, false, 0);

        let list = repo
            .list_by_category("test-greens")
            .expect("list_by_category failed");

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, lower);
    }

    #[tokio::test]
    async fn find_by_id_returns_none_for_unknown_id() {
        let (_container, pool) = setup_db().await;
        let repo = DieselCatalogRepository::new(pool);

        let result = repo
            .find_by_id(Uuid::new_v4())
            .expect("find should not error");

        assert!(result.is_none());
    }
}
