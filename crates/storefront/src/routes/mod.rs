//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (DB probe)
//!
//! # Auth
//! POST /auth/register               - Create account, send verification code
//! POST /auth/verify-email           - Consume code, issue session cookie
//! POST /auth/resend-verification    - Re-issue code for unverified accounts
//! POST /auth/login                  - Password login, issue session cookie
//! POST /auth/logout                 - Delete session, clear cookie
//! GET  /auth/me                     - Current customer (requires auth)
//!
//! # Cart (requires auth)
//! GET    /cart                      - Get (or lazily create) the cart
//! POST   /cart                      - Add an item
//! DELETE /cart                      - Clear all items
//! PATCH  /cart/items/{product_id}   - Update line quantity (0 removes)
//! DELETE /cart/items/{product_id}   - Remove a line
//! POST   /cart/validate             - Re-check stock without mutating
//!
//! # Wishlist (requires auth)
//! GET    /wishlist                  - Get (or lazily create) the wishlist
//! POST   /wishlist                  - Save a product (idempotent)
//! PUT    /wishlist                  - Set visibility (public/private)
//! PUT    /wishlist/{product_id}     - Partial item update
//! DELETE /wishlist/{product_id}     - Remove an entry
//!
//! # Orders (requires auth)
//! GET   /orders                     - Paginated history + stats
//! GET   /orders/{id}                - Single order (ownership-scoped)
//! PATCH /orders/{id}/status         - Status change (customers: cancel)
//!
//! # Catalog (public)
//! GET /products/{id}                - Product detail
//! GET /stores/{slug}                - Store profile
//! ```
//!
//! Every response body follows `{"success": bool, "message"?: string, ...}`.

pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod stores;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router, behind the strict rate limiter.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/verify-email", post(auth::verify_email))
        .route("/resend-verification", post(auth::resend_verification))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .layer(auth_rate_limiter())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cart::show).post(cart::add_item).delete(cart::clear),
        )
        .route(
            "/items/{product_id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
        .route("/validate", post(cart::validate))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(wishlist::show)
                .post(wishlist::add_item)
                .put(wishlist::set_visibility),
        )
        .route(
            "/{product_id}",
            put(wishlist::update_item).delete(wishlist::remove_item),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", patch(orders::update_status))
}

/// Create all routes for the storefront API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/orders", order_routes())
        .route("/products/{id}", get(products::show))
        .route("/stores/{slug}", get(stores::show))
}
