pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

#[cfg(test)]
pub mod test_support;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::ports::PaymentGateway;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool
        .get()
        .expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::products::list_products,
        handlers::products::list_featured_products,
        handlers::products::list_products_by_category,
        handlers::products::get_product,
        handlers::cart::get_cart,
        handlers::cart::add_cart_item,
        handlers::cart::update_cart_item,
        handlers::cart::remove_cart_item,
        handlers::cart::clear_cart,
        handlers::payments::create_payment_intent,
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::health::health,
    ),
    components(schemas(
        handlers::products::ProductResponse,
        handlers::cart::AddCartItemRequest,
        handlers::cart::UpdateCartItemRequest,
        handlers::cart::CartItemResponse,
        handlers::payments::CreatePaymentIntentRequest,
        handlers::payments::CreatePaymentIntentResponse,
        handlers::orders::CreateOrderRequest,
        handlers::orders::CreateOrderResponse,
        handlers::orders::OrderItemResponse,
        handlers::orders::OrderResponse,
    )),
    tags(
        (name = "products", description = "Catalog browsing"),
        (name = "cart", description = "Session-scoped shopping cart"),
        (name = "payments", description = "Payment intent brokering"),
        (name = "orders", description = "Checkout completion"),
        (name = "health", description = "Service liveness"),
    )
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    gateway: Arc<dyn PaymentGateway>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let gateway: web::Data<dyn PaymentGateway> = web::Data::from(gateway);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(gateway.clone())
            .wrap(Logger::default())
            .route("/", web::get().to(handlers::health::index))
            .route("/health", web::get().to(handlers::health::health))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/products")
                            .route("", web::get().to(handlers::products::list_products))
                            .route(
                                "/featured",
                                web::get().to(handlers::products::list_featured_products),
                            )
                            .route(
                                "/category/{category}",
                                web::get().to(handlers::products::list_products_by_category),
                            )
                            .route("/{id}", web::get().to(handlers::products::get_product)),
                    )
                    .service(
                        web::scope("/cart")
                            .service(
                                web::resource("")
                                    .route(web::post().to(handlers::cart::add_cart_item)),
                            )
                            .service(
                                web::resource("/session/{session_id}")
                                    .route(web::delete().to(handlers::cart::clear_cart)),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(handlers::cart::get_cart))
                                    .route(web::put().to(handlers::cart::update_cart_item))
                                    .route(web::delete().to(handlers::cart::remove_cart_item)),
                            ),
                    )
                    .route(
                        "/create-payment-intent",
                        web::post().to(handlers::payments::create_payment_intent),
                    )
                    .service(
                        web::scope("/orders")
                            .route("", web::post().to(handlers::orders::create_order))
                            .route("/{id}", web::get().to(handlers::orders::get_order)),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
