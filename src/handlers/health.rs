use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;

use crate::db::DbPool;

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service liveness and store reachability"),
    ),
    tag = "health"
)]
pub async fn health(pool: web::Data<DbPool>) -> HttpResponse {
    let pool = pool.get_ref().clone();
    let database = match web::block(move || pool.get().map(|_| ())).await {
        Ok(Ok(())) => "connected",
        _ => "unreachable",
    };
    let status = if database == "connected" { "ok" } else { "degraded" };
    HttpResponse::Ok().json(json!({
        "status": status,
        "timestamp": Utc::now().to_rfc3339(),
        "database": database,
    }))
}

/// GET /
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "message": "Storefront API Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "products": "/api/products",
            "featured": "/api/products/featured",
            "docs": "/swagger-ui/"
        }
    }))
}
