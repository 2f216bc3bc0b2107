//! Session middleware configuration.
//!
//! Sets up cookie sessions using tower-sessions. The session only carries the
//! visitor's cart-session id; the cart itself lives in the
//! [`CartStore`](crate::services::CartStore).
//!
//! Session records are kept in a bounded moka cache so abandoned sessions are
//! evicted instead of accumulating.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::{
    Expiry, SessionManagerLayer, SessionStore,
    cookie::time::OffsetDateTime,
    session::{Id, Record},
    session_store,
};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "verdant_session";

/// In-memory session store with a size cap and idle expiry.
#[derive(Debug, Clone)]
pub struct MokaSessionStore {
    records: Cache<Id, Record>,
}

impl MokaSessionStore {
    /// Create a store holding at most `max_capacity` records, each dropped
    /// after `idle` without access.
    #[must_use]
    pub fn new(max_capacity: u64, idle: Duration) -> Self {
        Self {
            records: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_idle(idle)
                .build(),
        }
    }
}

#[async_trait]
impl SessionStore for MokaSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.records.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.records.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let Some(record) = self.records.get(session_id).await else {
            return Ok(None);
        };
        if record.expiry_date <= OffsetDateTime::now_utc() {
            self.records.invalidate(session_id).await;
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.invalidate(session_id).await;
        Ok(())
    }
}

/// Create the session layer.
///
/// Sessions expire after the same idle period as cart sessions, and the
/// store holds no more records than there may be cart sessions.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaSessionStore> {
    let idle_seconds = i64::try_from(config.session_idle.as_secs()).unwrap_or(i64::MAX);
    let store = MokaSessionStore::new(config.max_cart_sessions, config.session_idle);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(idle_seconds),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use tower_sessions::cookie::time::Duration as CookieDuration;

    use super::*;

    fn record(expires_in: CookieDuration) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::default(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    fn store() -> MokaSessionStore {
        MokaSessionStore::new(100, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_create_then_load() {
        let store = store();
        let mut record = record(CookieDuration::hours(1));
        store.create(&mut record).await.unwrap();

        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, record.id);
    }

    #[tokio::test]
    async fn test_expired_record_is_dropped() {
        let store = store();
        let mut record = record(CookieDuration::seconds(-1));
        store.create(&mut record).await.unwrap();

        assert!(store.load(&record.id).await.unwrap().is_none());
        assert!(!store.records.contains_key(&record.id));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store();
        let mut record = record(CookieDuration::hours(1));
        store.create(&mut record).await.unwrap();

        store.delete(&record.id).await.unwrap();
        assert!(store.load(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_is_bounded() {
        let store = MokaSessionStore::new(5, Duration::from_secs(3600));
        for _ in 0..50 {
            let mut record = record(CookieDuration::hours(1));
            store.create(&mut record).await.unwrap();
        }

        store.records.run_pending_tasks().await;
        assert!(store.records.entry_count() <= 5);
    }
}
