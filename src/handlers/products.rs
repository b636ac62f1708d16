use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::catalog::ProductView;
use crate::domain::ports::CatalogRepository;
use crate::errors::AppError;
use crate::infrastructure::catalog_repo::DieselCatalogRepository;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "49.99"
    pub price: String,
    pub image: String,
    pub category: String,
    pub stock: i32,
    pub featured: bool,
    pub created_at: String,
}

impl From<ProductView> for ProductResponse {
    fn from(p: ProductView) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price.to_string(),
            image: p.image,
            category: p.category,
            stock: p.stock,
            featured: p.featured,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

fn to_responses(products: Vec<ProductView>) -> Vec<ProductResponse> {
    products.into_iter().map(ProductResponse::from).collect()
}

/// GET /api/products
///
/// Full catalog, featured products first, then newest first.
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let repo = DieselCatalogRepository::new(pool.get_ref().clone());
    let products = web::block(move || repo.list())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(to_responses(products)))
}

/// GET /api/products/featured
#[utoipa::path(
    get,
    path = "/api/products/featured",
    responses(
        (status = 200, description = "Featured products, newest first", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_featured_products(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    let repo = DieselCatalogRepository::new(pool.get_ref().clone());
    let products = web::block(move || repo.list_featured())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(to_responses(products)))
}

/// GET /api/products/category/{category}
///
/// Exact, case-sensitive category match.
#[utoipa::path(
    get,
    path = "/api/products/category/{category}",
    params(
        ("category" = String, Path, description = "Category label, matched against stored casing"),
    ),
    responses(
        (status = 200, description = "Products in the category", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products_by_category(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let category = path.into_inner();
    let repo = DieselCatalogRepository::new(pool.get_ref().clone());
    let products = web::block(move || repo.list_by_category(&category))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(to_responses(products)))
}

/// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn get_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let repo = DieselCatalogRepository::new(pool.get_ref().clone());
    let product = web::block(move || repo.find_by_id(product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    match product {
        Some(product) => Ok(HttpResponse::Ok().json(ProductResponse::from(product))),
        None => Err(AppError::NotFound),
    }
}
