//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (catalog)
//! GET  /health                 - Health check
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! GET  /cart/panel             - Cart panel (fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/add               - Add product (returns add button, triggers cart-updated)
//! POST /cart/increment         - One more unit (returns cart panel)
//! POST /cart/decrement         - One less unit (returns cart panel)
//! POST /cart/remove            - Remove line (returns cart panel)
//!
//! # Checkout (HTMX fragments)
//! POST /checkout               - Open order summary
//! POST /checkout/confirm       - Place order, clear cart, show banner
//! POST /checkout/cancel        - Close order summary
//! ```

pub mod cart;
pub mod checkout;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/panel", get(cart::panel))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/remove", post(cart::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::begin))
        .route("/confirm", post(checkout::confirm))
        .route("/cancel", post(checkout::cancel))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout confirmation
        .nest("/checkout", checkout_routes())
}
