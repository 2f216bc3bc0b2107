//! Auto-hide timer for the checkout success banner.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use super::cart_session::CartSession;

/// A scheduled banner dismissal.
///
/// The task holds only a weak reference to its session, and the task is
/// aborted when the timer is dropped. Replacing a session's timer or dropping
/// the session therefore cancels any pending dismissal.
#[derive(Debug)]
pub struct BannerTimer {
    handle: JoinHandle<()>,
}

impl BannerTimer {
    /// Hide the banner of `session` after `after` has elapsed.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn schedule(session: Weak<Mutex<CartSession>>, after: Duration) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;

            let Some(session) = session.upgrade() else {
                debug!("Cart session dropped before banner timeout");
                return;
            };
            session.lock().await.dismiss_banner();
            debug!("Checkout banner dismissed");
        });

        Self { handle }
    }

    /// Whether the dismissal already ran (or was aborted).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for BannerTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
