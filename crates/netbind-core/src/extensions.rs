// ── Extension capability cache ──
//
// Which optional capabilities the network service has loaded, refreshed at
// most once per sync interval. Readers see an immutable snapshot; a
// refresh swaps in a new one wholesale (last write wins).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use tracing::debug;

use crate::error::CoreError;
use crate::model::Extension;
use crate::remote::NetworkService;

/// Port binding: ports carry `binding:host_id` / `binding:vif_type`.
pub const PORT_BINDING_EXT: &str = "binding";
/// QoS: ports accept an `rxtx_factor`.
pub const QOS_EXT: &str = "nvp-qos";

/// Time source for cache expiry.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug)]
struct Snapshot {
    /// Keyed by extension name.
    extensions: HashMap<String, Extension>,
    fetched_at: Instant,
}

impl Snapshot {
    fn contains(&self, name: &str) -> bool {
        self.extensions.contains_key(name) || self.extensions.values().any(|e| e.alias == name)
    }
}

#[derive(Debug)]
pub struct ExtensionCache {
    interval: Duration,
    clock: Arc<dyn Clock>,
    snapshot: ArcSwapOption<Snapshot>,
}

impl ExtensionCache {
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, Arc::new(SystemClock))
    }

    pub fn with_clock(interval: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            interval,
            clock,
            snapshot: ArcSwapOption::empty(),
        }
    }

    /// Whether the cache was never filled or is older than the interval.
    pub fn is_stale(&self) -> bool {
        match self.snapshot.load().as_ref() {
            None => true,
            Some(snap) => self.clock.now().duration_since(snap.fetched_at) >= self.interval,
        }
    }

    /// Re-query the service if the cache is stale. Failures propagate and
    /// leave the previous snapshot in place.
    pub async fn ensure_fresh(&self, api: &dyn NetworkService) -> Result<(), CoreError> {
        if self.is_stale() {
            self.refresh(api).await?;
        }
        Ok(())
    }

    /// Unconditionally re-query the service.
    pub async fn refresh(&self, api: &dyn NetworkService) -> Result<(), CoreError> {
        let listed = api.list_extensions().await?;
        debug!(count = listed.len(), "refreshed extension cache");
        let extensions = listed.into_iter().map(|e| (e.name.clone(), e)).collect();
        self.snapshot.store(Some(Arc::new(Snapshot {
            extensions,
            fetched_at: self.clock.now(),
        })));
        Ok(())
    }

    /// Answer from the current snapshot without touching the service.
    /// `name` matches either an extension's name or its alias.
    pub fn has(&self, name: &str) -> bool {
        self.snapshot
            .load()
            .as_ref()
            .is_some_and(|snap| snap.contains(name))
    }

    /// Like [`has`](Self::has), after a freshness check.
    pub async fn has_refreshed(
        &self,
        name: &str,
        api: &dyn NetworkService,
    ) -> Result<bool, CoreError> {
        self.ensure_fresh(api).await?;
        Ok(self.has(name))
    }

    /// Names of the cached extensions, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .snapshot
            .load()
            .as_ref()
            .map(|snap| snap.extensions.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }
}
