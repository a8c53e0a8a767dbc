//! Replay cache for client-supplied idempotency keys.
//!
//! The first request under a key runs and its response is stored; repeats
//! inside the TTL get the stored response back without running again.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::IdempotencyConfig;
use crate::error::{AttestError, Result};

/// Default replay window.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Identity used when the caller is not known.
pub const ANONYMOUS: &str = "anonymous";

/// Identifies one logical request: an operation scope, the caller, and the
/// caller's token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey {
    scope: String,
    identity: String,
    token: String,
}

impl IdempotencyKey {
    /// Builds a key. A blank `identity` becomes [`ANONYMOUS`].
    ///
    /// # Errors
    ///
    /// Returns `AttestError::InvalidInput` if `token` is blank.
    pub fn new(scope: impl Into<String>, identity: impl Into<String>, token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AttestError::invalid_input("Missing Idempotency-Key"));
        }
        let identity = identity.into();
        let identity = if identity.trim().is_empty() {
            ANONYMOUS.to_string()
        } else {
            identity
        };
        Ok(Self {
            scope: scope.into(),
            identity,
            token: token.to_string(),
        })
    }

    /// The flat key the cache stores under.
    pub fn storage_key(&self) -> String {
        format!("idempotency:{}:{}:{}", self.scope, self.identity, self.token)
    }
}

/// A stored response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdempotencyEntry {
    /// Status code of the original response.
    pub status: u16,
    /// Body of the original response.
    pub body: serde_json::Value,
}

/// Whether [`IdempotencyCache::replay_or_run`] ran the operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Replay {
    /// A stored response was returned.
    Hit(IdempotencyEntry),
    /// The operation ran and its response was stored.
    Fresh(IdempotencyEntry),
}

impl Replay {
    /// The response, whichever way it was produced.
    pub fn entry(&self) -> &IdempotencyEntry {
        match self {
            Replay::Hit(entry) | Replay::Fresh(entry) => entry,
        }
    }

    /// True if the stored response was replayed.
    pub fn is_hit(&self) -> bool {
        matches!(self, Replay::Hit(_))
    }
}

#[derive(Debug, Clone)]
struct Slot {
    entry: IdempotencyEntry,
    expires_at: Instant,
}

/// In-memory idempotency cache with a fixed TTL.
///
/// Clones share the same entries.
#[derive(Debug, Clone)]
pub struct IdempotencyCache {
    entries: Arc<DashMap<String, Slot>>,
    ttl: Duration,
}

impl Default for IdempotencyCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl IdempotencyCache {
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Creates an empty cache with the configured TTL.
    pub fn from_config(config: &IdempotencyConfig) -> Self {
        Self::new(config.ttl())
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the live entry for `key`, dropping it if it has expired.
    pub fn get(&self, key: &IdempotencyKey) -> Option<IdempotencyEntry> {
        let storage_key = key.storage_key();
        let now = Instant::now();
        if let Some(slot) = self.entries.get(&storage_key) {
            if now <= slot.expires_at {
                return Some(slot.entry.clone());
            }
        }
        self.entries.remove_if(&storage_key, |_, slot| now > slot.expires_at);
        None
    }

    /// Stores `entry` under `key`, replacing any previous entry.
    pub fn set(&self, key: &IdempotencyKey, entry: IdempotencyEntry) {
        let slot = Slot {
            entry,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.insert(key.storage_key(), slot);
    }

    /// Replays the stored response for `key`, or runs `operation` and stores
    /// what it returns.
    ///
    /// Concurrent first requests under the same key may both run.
    pub async fn replay_or_run<F, Fut>(&self, key: &IdempotencyKey, operation: F) -> Replay
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = IdempotencyEntry>,
    {
        if let Some(entry) = self.get(key) {
            log::debug!("Replaying stored response for {}", key.storage_key());
            return Replay::Hit(entry);
        }
        let entry = operation().await;
        self.set(key, entry.clone());
        Replay::Fresh(entry)
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, slot| now <= slot.expires_at);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            log::debug!("Purged {} expired idempotency entries", removed);
        }
        removed
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
