//! Snapshot Cache
//!
//! Holds the most recently published market snapshot together with the time
//! it was computed. The pair is stored as one `Arc` and replaced in a single
//! swap, so a reader sees either the previous pair or the next one.
//!
//! # States
//!
//! - **Cold**: nothing published yet
//! - **Warm**: a snapshot and its timestamp are present

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::snapshot::MarketSnapshot;

/// A published snapshot and the time it was computed.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSnapshot {
    /// The snapshot.
    pub snapshot: MarketSnapshot,
    /// When the snapshot was computed.
    pub last_updated: DateTime<Utc>,
}

impl CachedSnapshot {
    /// Age of the entry at `now`. Entries stamped in the future have zero age.
    #[must_use]
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_updated).to_std().unwrap_or(Duration::ZERO)
    }

    /// Whether the entry is younger than `max_age` at `now`.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age_at(now) < max_age
    }
}

/// Consistent view of the cache at one instant.
#[derive(Debug, Clone, Default)]
pub struct CacheView {
    entry: Option<Arc<CachedSnapshot>>,
}

impl CacheView {
    /// Whether a snapshot has been published.
    #[must_use]
    pub const fn is_warm(&self) -> bool {
        self.entry.is_some()
    }

    /// The published snapshot, if warm.
    #[must_use]
    pub fn snapshot(&self) -> Option<&MarketSnapshot> {
        self.entry.as_deref().map(|e| &e.snapshot)
    }

    /// Publication time, if warm.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.entry.as_deref().map(|e| e.last_updated)
    }

    /// The published entry, if warm.
    #[must_use]
    pub fn entry(&self) -> Option<&Arc<CachedSnapshot>> {
        self.entry.as_ref()
    }

    /// Whether the cache is warm and younger than `max_age` at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.entry
            .as_deref()
            .is_some_and(|e| e.is_fresh_at(now, max_age))
    }

    /// The entry if warm and younger than `max_age` at `now`.
    ///
    /// Returns `None` when cold or stale (`now - last_updated >= max_age`).
    #[must_use]
    pub fn fresh_entry(&self, now: DateTime<Utc>, max_age: Duration) -> Option<Arc<CachedSnapshot>> {
        self.is_fresh(now, max_age)
            .then(|| self.entry.clone())
            .flatten()
    }
}

/// Process-wide snapshot cache. One writer (the refresh loop), many readers.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    entry: RwLock<Option<Arc<CachedSnapshot>>>,
}

/// Shared cache handle.
pub type SharedSnapshotCache = Arc<SnapshotCache>;

impl SnapshotCache {
    /// Create a cold cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the current state.
    #[must_use]
    pub fn read(&self) -> CacheView {
        CacheView {
            entry: self.entry.read().clone(),
        }
    }

    /// Publish a snapshot and its timestamp as one unit.
    pub fn publish(&self, snapshot: MarketSnapshot, last_updated: DateTime<Utc>) {
        let entry = Arc::new(CachedSnapshot {
            snapshot,
            last_updated,
        });
        *self.entry.write() = Some(entry);
    }

    /// Whether a snapshot has been published.
    #[must_use]
    pub fn is_warm(&self) -> bool {
        self.entry.read().is_some()
    }
}
