//! Per-visitor cart state.
//!
//! Each visitor's session cookie maps to a cart-session id; the store keeps
//! the matching [`CartSession`] in memory behind a mutex. Idle sessions are
//! evicted by `moka`, and dropping a session cancels its banner timer.
//!
//! Handlers never touch the [`Cart`] directly: they go through
//! [`CartHandle`], which applies [`CartIntent`]s and checkout transitions.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info};
use uuid::Uuid;
use verdant_core::{Cart, CartError, CartIntent, CartLineItem, CheckoutError, CheckoutState};

use super::banner::BannerTimer;
use crate::config::StorefrontConfig;

/// Cart and checkout state of one visitor.
#[derive(Debug, Default)]
pub struct CartSession {
    cart: Cart,
    checkout: CheckoutState,
    banner: Option<BannerTimer>,
}

impl CartSession {
    /// The visitor's cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Checkout overlay and banner flags.
    #[must_use]
    pub const fn checkout(&self) -> &CheckoutState {
        &self.checkout
    }

    /// Whether a banner dismissal is still scheduled.
    #[must_use]
    pub fn has_pending_banner(&self) -> bool {
        self.banner.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    fn dispatch(&mut self, intent: CartIntent) -> Result<(), CartError> {
        debug!(intent = intent.kind(), "Dispatching cart intent");
        self.cart.dispatch(intent)?;
        self.checkout.cart_changed(&self.cart);
        Ok(())
    }

    pub(super) fn dismiss_banner(&mut self) {
        self.checkout.dismiss_banner();
    }
}

/// Shared, lockable reference to one visitor's [`CartSession`].
#[derive(Clone)]
pub struct CartHandle {
    id: Uuid,
    session: Arc<Mutex<CartSession>>,
    banner_after: Duration,
}

impl CartHandle {
    fn new(id: Uuid, banner_after: Duration) -> Self {
        Self {
            id,
            session: Arc::new(Mutex::new(CartSession::default())),
            banner_after,
        }
    }

    /// Cart-session id stored in the visitor's cookie session.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Lock the session for reading.
    pub async fn lock(&self) -> MutexGuard<'_, CartSession> {
        self.session.lock().await
    }

    /// Apply an intent.
    ///
    /// # Errors
    ///
    /// Propagates the cart transition error.
    pub async fn dispatch(&self, intent: CartIntent) -> Result<(), CartError> {
        self.session.lock().await.dispatch(intent)
    }

    /// Build an intent from the line named `name` and apply it.
    ///
    /// A missing line is tolerated: the request is logged and ignored, and
    /// `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// Propagates the cart transition error.
    pub async fn update_item(
        &self,
        name: &str,
        build: impl FnOnce(&CartLineItem) -> CartIntent,
    ) -> Result<bool, CartError> {
        let mut session = self.session.lock().await;
        let Some(item) = session.cart.get(name) else {
            debug!(name, "Ignoring update for item not in cart");
            return Ok(false);
        };
        let intent = build(item);
        session.dispatch(intent)?;
        Ok(true)
    }

    /// Open the order summary.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty cart.
    pub async fn begin_checkout(&self) -> Result<(), CheckoutError> {
        let mut session = self.session.lock().await;
        let CartSession { cart, checkout, .. } = &mut *session;
        checkout.begin(cart)
    }

    /// Confirm the open order: clear the cart, raise the success banner and
    /// schedule its dismissal. Any earlier pending dismissal is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotConfirming`] if no order summary is open,
    /// or [`CheckoutError::EmptyCart`] if the cart was emptied behind it.
    pub async fn confirm_checkout(&self) -> Result<(), CheckoutError> {
        let mut session = self.session.lock().await;
        let CartSession { cart, checkout, .. } = &mut *session;
        let intent = checkout.confirm(cart)?;
        let items = session.cart.len();
        if let Err(e) = session.dispatch(intent) {
            error!(error = %e, "Failed to clear cart on checkout");
        }
        session.banner = Some(BannerTimer::schedule(
            Arc::downgrade(&self.session),
            self.banner_after,
        ));
        info!(cart_session = %self.id, items, "Checkout confirmed");
        Ok(())
    }

    /// Close the order summary without placing the order.
    pub async fn cancel_checkout(&self) {
        self.session.lock().await.checkout.cancel();
    }
}

/// In-memory store of cart sessions, cheaply cloneable.
#[derive(Clone)]
pub struct CartStore {
    sessions: Cache<Uuid, CartHandle>,
    banner_after: Duration,
}

impl CartStore {
    /// Create a store.
    ///
    /// # Arguments
    ///
    /// * `max_capacity` - Maximum number of live cart sessions
    /// * `idle` - Time without access after which a session is discarded
    /// * `banner_after` - Success banner lifetime
    #[must_use]
    pub fn new(max_capacity: u64, idle: Duration, banner_after: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(idle)
            .eviction_listener(|id, _handle, cause| {
                debug!(cart_session = %id, ?cause, "Cart session evicted");
            })
            .build();

        Self {
            sessions,
            banner_after,
        }
    }

    /// Create a store from the storefront configuration.
    #[must_use]
    pub fn from_config(config: &StorefrontConfig) -> Self {
        Self::new(
            config.max_cart_sessions,
            config.session_idle,
            config.checkout_banner,
        )
    }

    /// Look up an existing session.
    pub async fn get(&self, id: Uuid) -> Option<CartHandle> {
        self.sessions.get(&id).await
    }

    /// Look up a session, creating an empty one if needed.
    pub async fn get_or_create(&self, id: Uuid) -> CartHandle {
        let banner_after = self.banner_after;
        self.sessions
            .get_with(id, async move {
                debug!(cart_session = %id, "Creating cart session");
                CartHandle::new(id, banner_after)
            })
            .await
    }

    /// Drop a session immediately.
    pub async fn discard(&self, id: Uuid) {
        self.sessions.invalidate(&id).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use verdant_core::Price;

    use super::*;

    const BANNER: Duration = Duration::from_millis(3000);

    fn store() -> CartStore {
        CartStore::new(100, Duration::from_secs(3600), BANNER)
    }

    fn line(name: &str, cost: &str) -> CartLineItem {
        CartLineItem::new(name, "", Price::parse(cost).unwrap())
    }

    async fn flowers(handle: &CartHandle) {
        for _ in 0..3 {
            handle
                .dispatch(CartIntent::AddItem(line("Rose", "$15")))
                .await
                .unwrap();
        }
        for _ in 0..2 {
            handle
                .dispatch(CartIntent::AddItem(line("Tulip", "$10")))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let store = store();
        let id = Uuid::new_v4();

        let first = store.get_or_create(id).await;
        first
            .dispatch(CartIntent::AddItem(line("Rose", "$15")))
            .await
            .unwrap();

        let second = store.get(id).await.unwrap();
        assert_eq!(second.lock().await.cart().len(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_session() {
        assert!(store().get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_discard() {
        let store = store();
        let id = Uuid::new_v4();
        store.get_or_create(id).await;
        store.discard(id).await;
        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_update_item_tolerates_missing_line() {
        let handle = store().get_or_create(Uuid::new_v4()).await;
        let applied = handle
            .update_item("Orchid", CartIntent::increment)
            .await
            .unwrap();
        assert!(!applied);
    }

    #[tokio::test]
    async fn test_update_item_decrement_scenario() {
        let handle = store().get_or_create(Uuid::new_v4()).await;
        flowers(&handle).await;
        assert_eq!(
            handle.lock().await.cart().grand_total().to_string(),
            "$65.00"
        );

        for _ in 0..2 {
            assert!(handle
                .update_item("Tulip", CartIntent::decrement)
                .await
                .unwrap());
        }

        let session = handle.lock().await;
        assert!(!session.cart().contains("Tulip"));
        assert_eq!(session.cart().grand_total().to_string(), "$45.00");
    }

    #[tokio::test]
    async fn test_begin_checkout_requires_items() {
        let handle = store().get_or_create(Uuid::new_v4()).await;
        assert_eq!(
            handle.begin_checkout().await,
            Err(CheckoutError::EmptyCart)
        );
    }

    #[tokio::test]
    async fn test_cancel_checkout_keeps_cart() {
        let handle = store().get_or_create(Uuid::new_v4()).await;
        flowers(&handle).await;
        handle.begin_checkout().await.unwrap();
        handle.cancel_checkout().await;

        let session = handle.lock().await;
        assert!(!session.checkout().is_confirming());
        assert!(!session.checkout().success_banner());
        assert_eq!(session.cart().len(), 2);
    }

    #[tokio::test]
    async fn test_confirm_without_summary_fails() {
        let handle = store().get_or_create(Uuid::new_v4()).await;
        flowers(&handle).await;
        assert_eq!(
            handle.confirm_checkout().await,
            Err(CheckoutError::NotConfirming)
        );
        assert_eq!(handle.lock().await.cart().len(), 2);
    }

    #[tokio::test]
    async fn test_emptying_cart_closes_summary() {
        let handle = store().get_or_create(Uuid::new_v4()).await;
        flowers(&handle).await;
        handle.begin_checkout().await.unwrap();

        handle
            .update_item("Tulip", CartIntent::decrement)
            .await
            .unwrap();
        assert!(handle.lock().await.checkout().is_confirming());

        handle
            .dispatch(CartIntent::RemoveItem {
                name: "Rose".to_string(),
            })
            .await
            .unwrap();
        handle
            .update_item("Tulip", CartIntent::decrement)
            .await
            .unwrap();

        {
            let session = handle.lock().await;
            assert!(session.cart().is_empty());
            assert!(!session.checkout().is_confirming());
        }
        assert_eq!(
            handle.confirm_checkout().await,
            Err(CheckoutError::NotConfirming)
        );
        let session = handle.lock().await;
        assert!(!session.checkout().success_banner());
        assert!(!session.has_pending_banner());
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_clears_cart_and_banner_expires() {
        let handle = store().get_or_create(Uuid::new_v4()).await;
        flowers(&handle).await;
        handle.begin_checkout().await.unwrap();
        handle.confirm_checkout().await.unwrap();

        {
            let session = handle.lock().await;
            assert!(session.cart().is_empty());
            assert!(session.cart().grand_total().is_zero());
            assert!(session.checkout().success_banner());
            assert!(!session.checkout().is_confirming());
        }

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert!(handle.lock().await.checkout().success_banner());

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        let session = handle.lock().await;
        assert!(!session.checkout().success_banner());
        assert!(!session.has_pending_banner());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_confirmation_restarts_banner_timer() {
        let handle = store().get_or_create(Uuid::new_v4()).await;
        flowers(&handle).await;
        handle.begin_checkout().await.unwrap();
        handle.confirm_checkout().await.unwrap();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        flowers(&handle).await;
        handle.begin_checkout().await.unwrap();
        handle.confirm_checkout().await.unwrap();

        // The first timer would have fired at 3000ms.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(handle.lock().await.checkout().success_banner());

        tokio::time::sleep(Duration::from_millis(1600)).await;
        tokio::task::yield_now().await;
        assert!(!handle.lock().await.checkout().success_banner());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_session_cancels_banner_timer() {
        let handle = CartHandle::new(Uuid::new_v4(), BANNER);
        flowers(&handle).await;
        handle.begin_checkout().await.unwrap();
        handle.confirm_checkout().await.unwrap();
        assert!(handle.lock().await.has_pending_banner());

        let weak = Arc::downgrade(&handle.session);
        drop(handle);
        assert!(weak.upgrade().is_none());

        // Nothing is left to act on the disposed session.
        tokio::time::sleep(BANNER * 2).await;
        assert!(weak.upgrade().is_none());
    }
}
