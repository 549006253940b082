//! Caching of resolved identifiers
//!
//! Resolution is the expensive half of discovery, so consumers can plug a
//! store behind the engine. Entries carry an absolute expiry; an expired
//! entry is a miss and is evicted lazily on the read that finds it.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use openid_core::DiscoveryInfo;

/// Async trait for discovery caches keyed by normalized identifier
#[async_trait]
pub trait DiscoveryStore: Send + Sync {
    /// Returns the cached resolution, or None on miss or expiry.
    async fn get(&self, identifier: &str) -> Option<DiscoveryInfo>;

    /// Stores a resolution for `ttl` from now, replacing any prior entry.
    async fn put(&self, identifier: &str, info: DiscoveryInfo, ttl: Duration);

    /// Drops a cached resolution.
    async fn remove(&self, identifier: &str);
}

/// In-process store backed by a concurrent map
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, (DiscoveryInfo, DateTime<Utc>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DiscoveryStore for MemoryStore {
    async fn get(&self, identifier: &str) -> Option<DiscoveryInfo> {
        let expired = match self.entries.get(identifier) {
            Some(entry) => {
                let (info, expires_at) = entry.value();
                if *expires_at > Utc::now() {
                    return Some(info.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            debug!(identifier, "evicting expired discovery cache entry");
            self.entries.remove(identifier);
        }
        None
    }

    async fn put(&self, identifier: &str, info: DiscoveryInfo, ttl: Duration) {
        // TTLs beyond the representable range clamp to "never expires".
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries
            .insert(identifier.to_string(), (info, expires_at));
    }

    async fn remove(&self, identifier: &str) {
        self.entries.remove(identifier);
    }
}
