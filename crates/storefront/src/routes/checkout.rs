//! Checkout route handlers.
//!
//! Checkout is a confirmation step layered over the cart panel: `begin` opens
//! the order summary, `confirm` places the order (clearing the cart and
//! showing the success banner), `cancel` closes the summary.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;
use verdant_core::CheckoutError;

use crate::error::{Result, add_breadcrumb};
use crate::routes::cart::{
    CartPanelTemplate, CartView, existing_cart, render_cart_view, updated_panel,
};
use crate::state::AppState;

/// Open the order summary (HTMX).
#[instrument(skip(state, session))]
pub async fn begin(State(state): State<AppState>, session: Session) -> Result<Response> {
    let cart = existing_cart(&state, &session)
        .await
        .ok_or(CheckoutError::EmptyCart)?;

    cart.begin_checkout().await?;
    add_breadcrumb("checkout", "Opened order summary", None);

    let view = render_cart_view(&state, &cart).await;
    Ok(CartPanelTemplate { cart: view }.into_response())
}

/// Place the order (HTMX).
#[instrument(skip(state, session))]
pub async fn confirm(State(state): State<AppState>, session: Session) -> Result<Response> {
    let cart = existing_cart(&state, &session)
        .await
        .ok_or(CheckoutError::NotConfirming)?;

    cart.confirm_checkout().await?;
    add_breadcrumb("checkout", "Confirmed order", None);

    Ok(updated_panel(render_cart_view(&state, &cart).await))
}

/// Close the order summary without placing the order (HTMX).
#[instrument(skip(state, session))]
pub async fn cancel(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let view = match existing_cart(&state, &session).await {
        Some(cart) => {
            cart.cancel_checkout().await;
            render_cart_view(&state, &cart).await
        }
        None => CartView::empty(state.config()),
    };

    CartPanelTemplate { cart: view }
}
