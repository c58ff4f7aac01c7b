//! Session-scoped key/value store for wizard drafts.
//!
//! Lifetime: a session exists from `create` until the student restarts the
//! wizard (`clear`) or it sits idle longer than the configured TTL and the
//! sweeper evicts it. Writes to an unknown session are refused. The in-memory
//! implementation does not survive a process restart; nothing else in the
//! service depends on these values.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Field name the essay draft is cached under.
pub const ESSAY_KEY: &str = "user_essay";

/// A cached field and when it was last written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
    pub value: String,
    pub saved_at: DateTime<Utc>,
}

/// Injectable session storage. Carried in `AppState` as `Arc<dyn SessionStore>`
/// so an external store can replace the in-memory map.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Registers a new, empty session.
    async fn create(&self, session: Uuid) -> Result<()>;

    /// `None` when the session is unknown or the key was never written.
    async fn get(&self, session: Uuid, key: &str) -> Result<Option<StoredValue>>;

    /// Writes a field and returns its save time, or `None` if the session
    /// does not exist (never created, cleared, or expired).
    async fn put(&self, session: Uuid, key: &str, value: String)
        -> Result<Option<DateTime<Utc>>>;

    /// Drops the session and every key held for it. Returns whether it existed.
    async fn clear(&self, session: Uuid) -> Result<bool>;

    /// Evicts sessions untouched for longer than `max_idle`. Returns how many.
    async fn evict_idle(&self, max_idle: Duration) -> Result<usize>;
}

struct SessionEntry {
    fields: HashMap<String, StoredValue>,
    last_touched: Instant,
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: Uuid) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session,
            SessionEntry {
                fields: HashMap::new(),
                last_touched: Instant::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, session: Uuid, key: &str) -> Result<Option<StoredValue>> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.get_mut(&session).and_then(|entry| {
            entry.last_touched = Instant::now();
            entry.fields.get(key).cloned()
        }))
    }

    async fn put(
        &self,
        session: Uuid,
        key: &str,
        value: String,
    ) -> Result<Option<DateTime<Utc>>> {
        let mut sessions = self.sessions.write().await;
        let Some(entry) = sessions.get_mut(&session) else {
            return Ok(None);
        };

        let saved_at = Utc::now();
        entry.last_touched = Instant::now();
        entry
            .fields
            .insert(key.to_string(), StoredValue { value, saved_at });
        Ok(Some(saved_at))
    }

    async fn clear(&self, session: Uuid) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(&session).is_some())
    }

    async fn evict_idle(&self, max_idle: Duration) -> Result<usize> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_touched.elapsed() <= max_idle);
        Ok(before - sessions.len())
    }
}

/// Spawns the background task that evicts idle sessions every `every`.
pub fn spawn_idle_sweeper(
    store: Arc<dyn SessionStore>,
    max_idle: Duration,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.evict_idle(max_idle).await {
                Ok(0) => debug!("Session sweep: nothing idle"),
                Ok(evicted) => info!("Session sweep evicted {evicted} idle sessions"),
                Err(e) => warn!("Session sweep failed: {e:#}"),
            }
        }
    })
}
