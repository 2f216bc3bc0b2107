//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutation re-renders the whole cart panel so the header total, line
//! totals and checkout button stay consistent. The cart-session id is stored
//! in the cookie session and mapped to an in-memory cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;
use verdant_core::{CartIntent, CartLineItem};

use crate::config::StorefrontConfig;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::session_keys;
use crate::routes::home::ProductView;
use crate::services::{CartHandle, CartSession};
use crate::state::AppState;

/// Extra time before the client re-fetches the panel to drop the banner.
const BANNER_REFRESH_SLACK_MS: u64 = 250;

/// HTMX event fired after any cart mutation.
pub const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub grand_total: String,
    pub item_count: u32,
    pub can_checkout: bool,
    pub confirming: bool,
    pub checkout_success: bool,
    pub banner_refresh_ms: u64,
    pub continue_shopping_url: String,
}

impl CartView {
    /// The view of a visitor who has no cart yet.
    #[must_use]
    pub fn empty(config: &StorefrontConfig) -> Self {
        Self {
            items: Vec::new(),
            grand_total: "$0.00".to_string(),
            item_count: 0,
            can_checkout: false,
            confirming: false,
            checkout_success: false,
            banner_refresh_ms: banner_refresh_ms(config),
            continue_shopping_url: config.continue_shopping_url.clone(),
        }
    }

    /// Snapshot a cart session for rendering.
    #[must_use]
    pub fn from_session(session: &CartSession, config: &StorefrontConfig) -> Self {
        let cart = session.cart();
        let checkout = session.checkout();

        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            grand_total: cart.grand_total().to_string(),
            item_count: cart.total_quantity(),
            can_checkout: cart.can_checkout(),
            confirming: checkout.is_confirming(),
            checkout_success: checkout.success_banner(),
            banner_refresh_ms: banner_refresh_ms(config),
            continue_shopping_url: config.continue_shopping_url.clone(),
        }
    }

    /// Whether a line with this name is in the cart.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.name == name)
    }
}

impl From<&CartLineItem> for CartItemView {
    fn from(item: &CartLineItem) -> Self {
        Self {
            name: item.name.clone(),
            image: item.image.clone(),
            quantity: item.quantity(),
            price: item.cost.to_string(),
            line_price: item.line_total().to_string(),
        }
    }
}

fn banner_refresh_ms(config: &StorefrontConfig) -> u64 {
    u64::try_from(config.checkout_banner.as_millis())
        .unwrap_or(u64::MAX)
        .saturating_add(BANNER_REFRESH_SLACK_MS)
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart-session id from the cookie session.
async fn get_cart_session_id(session: &Session) -> Option<Uuid> {
    session
        .get::<Uuid>(session_keys::CART_SESSION_ID)
        .await
        .ok()
        .flatten()
}

/// The visitor's cart, if they already have one.
pub(crate) async fn existing_cart(state: &AppState, session: &Session) -> Option<CartHandle> {
    let id = get_cart_session_id(session).await?;
    state.carts().get(id).await
}

/// The visitor's cart, created (along with its session id) if needed.
pub(crate) async fn current_cart(state: &AppState, session: &Session) -> Result<CartHandle> {
    let id = match get_cart_session_id(session).await {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4();
            session.insert(session_keys::CART_SESSION_ID, id).await?;
            id
        }
    };
    Ok(state.carts().get_or_create(id).await)
}

/// Render the visitor's cart without creating one.
pub(crate) async fn load_cart_view(state: &AppState, session: &Session) -> CartView {
    match existing_cart(state, session).await {
        Some(cart) => CartView::from_session(&*cart.lock().await, state.config()),
        None => CartView::empty(state.config()),
    }
}

/// Render a cart handle.
pub(crate) async fn render_cart_view(state: &AppState, cart: &CartHandle) -> CartView {
    CartView::from_session(&*cart.lock().await, state.config())
}

/// Cart panel response carrying the `cart-updated` trigger.
pub(crate) fn updated_panel(cart: CartView) -> Response {
    (
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartPanelTemplate { cart },
    )
        .into_response()
}

// =============================================================================
// Forms & Templates
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub handle: String,
}

/// Form naming a cart line.
#[derive(Debug, Deserialize)]
pub struct CartItemForm {
    pub name: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub cart_count: u32,
}

/// Cart panel fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel.html")]
pub struct CartPanelTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Add-to-cart button fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/add_button.html")]
pub struct AddButtonTemplate {
    pub product: ProductView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = load_cart_view(&state, &session).await;
    CartShowTemplate {
        cart_count: cart.item_count,
        cart,
    }
}

/// Cart panel fragment (HTMX).
///
/// Polled after the success banner's timeout to drop the banner.
#[instrument(skip(state, session))]
pub async fn panel(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    CartPanelTemplate {
        cart: load_cart_view(&state, &session).await,
    }
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let count = match existing_cart(&state, &session).await {
        Some(cart) => cart.lock().await.cart().total_quantity(),
        None => 0,
    };

    CartCountTemplate { count }
}

/// Add a catalog product to the cart (HTMX).
///
/// Returns the disabled "Added to Cart" button and triggers a badge refresh.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .find(&form.handle)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.handle)))?;

    let cart = current_cart(&state, &session).await?;
    cart.dispatch(CartIntent::AddItem(product.line_item()))
        .await?;

    add_breadcrumb("cart", "Added item", Some(&[("name", product.name.as_str())]));
    tracing::info!(name = %product.name, "Item added to cart");

    let product = ProductView::from_product(product, true);
    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        AddButtonTemplate { product },
    )
        .into_response())
}

/// One more unit of a line (HTMX).
///
/// Like the other line handlers, a visitor without a cart gets the empty
/// panel and no session is created.
#[instrument(skip(state, session))]
pub async fn increment(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CartItemForm>,
) -> Result<Response> {
    let Some(cart) = existing_cart(&state, &session).await else {
        return Ok(updated_panel(CartView::empty(state.config())));
    };
    cart.update_item(&form.name, CartIntent::increment).await?;
    Ok(updated_panel(render_cart_view(&state, &cart).await))
}

/// One less unit of a line; the line goes away at zero (HTMX).
#[instrument(skip(state, session))]
pub async fn decrement(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CartItemForm>,
) -> Result<Response> {
    let Some(cart) = existing_cart(&state, &session).await else {
        return Ok(updated_panel(CartView::empty(state.config())));
    };
    cart.update_item(&form.name, CartIntent::decrement).await?;
    Ok(updated_panel(render_cart_view(&state, &cart).await))
}

/// Remove a line (HTMX). Removing an absent line is a no-op.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CartItemForm>,
) -> Result<Response> {
    let Some(cart) = existing_cart(&state, &session).await else {
        return Ok(updated_panel(CartView::empty(state.config())));
    };
    add_breadcrumb("cart", "Removed item", Some(&[("name", form.name.as_str())]));
    cart.dispatch(CartIntent::RemoveItem { name: form.name })
        .await?;
    Ok(updated_panel(render_cart_view(&state, &cart).await))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;
    use std::time::Duration;

    use verdant_core::Price;

    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig::from_lookup(|_| None).unwrap()
    }

    #[test]
    fn test_empty_view() {
        let view = CartView::empty(&config());
        assert!(view.items.is_empty());
        assert_eq!(view.grand_total, "$0.00");
        assert!(!view.can_checkout);
        assert_eq!(view.continue_shopping_url, "/");
        assert_eq!(view.banner_refresh_ms, 3000 + BANNER_REFRESH_SLACK_MS);
    }

    #[test]
    fn test_item_view_formats_prices() {
        let item = CartLineItem::new("Rose", "/rose.svg", Price::parse("$15").unwrap())
            .with_quantity(NonZeroU32::new(3).unwrap());
        let view = CartItemView::from(&item);
        assert_eq!(view.price, "$15.00");
        assert_eq!(view.line_price, "$45.00");
        assert_eq!(view.quantity, 3);
    }

    #[test]
    fn test_banner_refresh_follows_config() {
        let mut config = config();
        config.checkout_banner = Duration::from_millis(100);
        assert_eq!(banner_refresh_ms(&config), 100 + BANNER_REFRESH_SLACK_MS);
    }

    #[test]
    fn test_empty_panel_renders_disabled_checkout() {
        let html = CartPanelTemplate {
            cart: CartView::empty(&config()),
        }
        .render()
        .unwrap();
        assert!(html.contains("Total Cart Amount: $0.00"));
        assert!(html.contains("disabled"));
        assert!(!html.contains("Order Summary"));
    }
}
