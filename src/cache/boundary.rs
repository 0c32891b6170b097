//! Cache Boundary Module
//!
//! A consumer-facing unit of work: wraps a producer with a cache key and
//! options, and decides when the producer runs based on revalidation triggers
//! (mount, dependency change, focus, reconnect).
//!
//! # States
//! - `Loading`: nothing displayable yet, production in progress or pending
//! - `Resolved`: content is displayable and was fresh when last read
//! - `Stale`: last-good content is displayed while a new value is produced
//! - `Error`: the last production failed, the store was left untouched

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::{CacheInfo, SharedCache, Ttl};
use crate::error::CacheError;

static NEXT_BOUNDARY_ID: AtomicU64 = AtomicU64::new(1);

fn next_boundary_key() -> String {
    format!("boundary-{}", NEXT_BOUNDARY_ID.fetch_add(1, Ordering::Relaxed))
}

// == Cache Options ==
/// Per-boundary cache options.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheOptions {
    /// How long a produced value stays fresh (default 5 minutes)
    pub duration: Ttl,
    /// Explicit key; one is generated per boundary when absent
    pub key: Option<String>,
    /// Tags attached to every write
    pub tags: HashSet<String>,
    pub revalidate_on_focus: bool,
    pub revalidate_on_reconnect: bool,
    pub revalidate_on_mount: bool,
    pub show_stale_while_revalidating: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            duration: Ttl::default(),
            key: None,
            tags: HashSet::new(),
            revalidate_on_focus: false,
            revalidate_on_reconnect: false,
            revalidate_on_mount: false,
            show_stale_while_revalidating: false,
        }
    }
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: Ttl) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn revalidate_on_focus(mut self, enabled: bool) -> Self {
        self.revalidate_on_focus = enabled;
        self
    }

    pub fn revalidate_on_reconnect(mut self, enabled: bool) -> Self {
        self.revalidate_on_reconnect = enabled;
        self
    }

    pub fn revalidate_on_mount(mut self, enabled: bool) -> Self {
        self.revalidate_on_mount = enabled;
        self
    }

    pub fn show_stale_while_revalidating(mut self, enabled: bool) -> Self {
        self.show_stale_while_revalidating = enabled;
        self
    }
}

// == Boundary State ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryState {
    Loading,
    Resolved,
    Stale,
    Error,
}

/// What a boundary currently has to show.
#[derive(Debug, PartialEq)]
pub enum BoundaryView<'a, T> {
    /// Loading: render the fallback
    Fallback,
    /// Resolved or stale: render the cached content
    Content(&'a T),
    /// Production failed: render the error fallback
    ErrorFallback(&'a str),
}

// == Cache Boundary ==
/// Memoizes one producer under one key in a shared cache.
///
/// The boundary never holds the cache lock while the producer runs: it reads,
/// releases, awaits the producer, then re-acquires the lock only to commit.
/// Dropping a trigger future mid-production abandons the producer and commits
/// nothing. Concurrent boundaries on the same key may each run their producer;
/// the last commit wins.
pub struct CacheBoundary<T, F> {
    cache: SharedCache<T>,
    key: String,
    options: CacheOptions,
    producer: F,
    state: watch::Sender<BoundaryState>,
    content: Option<T>,
    error: Option<String>,
    mounted: bool,
    dependencies: Option<u64>,
    on_revalidate: Option<Box<dyn Fn(&T) + Send + Sync>>,
}

impl<T, F, Fut> CacheBoundary<T, F>
where
    T: Clone,
    F: Fn() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    // == Constructor ==
    /// Creates a boundary and derives its initial state from the store:
    /// `Loading` without an entry, otherwise `Resolved` or `Stale`.
    pub async fn new(cache: SharedCache<T>, options: CacheOptions, producer: F) -> Self {
        let key = options.key.clone().unwrap_or_else(next_boundary_key);
        let existing = cache.write().await.lookup(&key);

        let (initial, content) = match existing {
            None => (BoundaryState::Loading, None),
            Some(entry) if entry.is_stale() => (BoundaryState::Stale, Some(entry.value)),
            Some(entry) => (BoundaryState::Resolved, Some(entry.value)),
        };
        debug!("Boundary '{}' created in state {:?}", key, initial);

        Self {
            cache,
            key,
            options,
            producer,
            state: watch::Sender::new(initial),
            content,
            error: None,
            mounted: false,
            dependencies: None,
            on_revalidate: None,
        }
    }

    // == Mount ==
    /// Activates the boundary.
    ///
    /// Produces when the key has no entry, or always when
    /// `revalidate_on_mount` is set.
    pub async fn mount(&mut self) -> BoundaryState {
        self.mounted = true;

        let exists = self.cache.read().await.contains(&self.key);
        if !exists || self.options.revalidate_on_mount {
            self.revalidate().await;
        }
        self.state()
    }

    // == Unmount ==
    /// Tears the boundary down; later triggers are ignored.
    /// The store entry is left in place.
    pub fn unmount(&mut self) {
        self.mounted = false;
        debug!("Boundary '{}' unmounted", self.key);
    }

    // == Dependency Change ==
    /// Reports the caller's current dependency list.
    ///
    /// The first report only records the fingerprint. Every later report that
    /// differs from the previous one forces a revalidation, fresh entry or not.
    /// Returns whether the producer ran.
    pub async fn dependencies_changed<D: Hash + ?Sized>(&mut self, dependencies: &D) -> bool {
        let mut hasher = DefaultHasher::new();
        dependencies.hash(&mut hasher);
        let fingerprint = hasher.finish();

        let previous = self.dependencies.replace(fingerprint);
        match previous {
            Some(previous) if previous != fingerprint && self.mounted => {
                debug!("Boundary '{}' dependencies changed", self.key);
                self.revalidate().await;
                true
            }
            _ => false,
        }
    }

    // == Focus ==
    /// Window regained focus: revalidates only a stale entry.
    pub async fn focus(&mut self) -> bool {
        if !self.options.revalidate_on_focus {
            return false;
        }
        self.revalidate_if_stale("focus").await
    }

    // == Reconnect ==
    /// Network came back: revalidates only a stale entry.
    pub async fn reconnect(&mut self) -> bool {
        if !self.options.revalidate_on_reconnect {
            return false;
        }
        self.revalidate_if_stale("reconnect").await
    }

    // == Revalidate ==
    /// Runs the producer now.
    ///
    /// With `show_stale_while_revalidating` and an existing entry the boundary
    /// moves to `Stale` and keeps its content visible, otherwise to `Loading`.
    pub async fn revalidate(&mut self) -> BoundaryState {
        if !self.mounted {
            return self.state();
        }

        let exists = self.cache.read().await.contains(&self.key);
        if self.options.show_stale_while_revalidating && exists {
            self.state.send_replace(BoundaryState::Stale);
        } else {
            self.state.send_replace(BoundaryState::Loading);
        }

        self.produce().await;
        self.state()
    }

    async fn revalidate_if_stale(&mut self, trigger: &str) -> bool {
        if !self.mounted {
            return false;
        }

        let stale = self
            .cache
            .write()
            .await
            .lookup(&self.key)
            .is_some_and(|entry| entry.is_stale());
        if !stale {
            debug!("Boundary '{}' ignored {}: entry fresh or absent", self.key, trigger);
            return false;
        }

        info!("Boundary '{}' revalidating on {}", self.key, trigger);
        self.revalidate().await;
        true
    }

    // Runs the producer with no lock held, then commits under the write lock.
    async fn produce(&mut self) {
        match (self.producer)().await {
            Ok(value) => {
                {
                    let mut store = self.cache.write().await;
                    let populated = store.contains(&self.key);
                    store.set(
                        self.key.clone(),
                        value.clone(),
                        self.options.duration,
                        self.options.tags.clone(),
                    );
                    if populated {
                        store.record_revalidation();
                    }
                }

                self.content = Some(value);
                self.error = None;
                self.state.send_replace(BoundaryState::Resolved);
                debug!("Boundary '{}' resolved", self.key);

                if let (Some(hook), Some(content)) = (&self.on_revalidate, &self.content) {
                    hook(content);
                }
            }
            Err(err) => {
                let err = CacheError::producer(err);
                warn!("Boundary '{}' failed: {}", self.key, err);
                self.error = Some(err.to_string());
                self.state.send_replace(BoundaryState::Error);
            }
        }
    }
}

impl<T, F> CacheBoundary<T, F> {
    /// Registers a callback run with the new content after every successful
    /// commit. Use [`CacheBoundary::subscribe`] to observe every state instead.
    pub fn on_revalidate(mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_revalidate = Some(Box::new(hook));
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    pub fn state(&self) -> BoundaryState {
        *self.state.borrow()
    }

    /// Watches state transitions, including the intermediate `Loading` or
    /// `Stale` state while the producer runs.
    pub fn subscribe(&self) -> watch::Receiver<BoundaryState> {
        self.state.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Last successfully produced (or initially cached) content.
    ///
    /// Survives a failed production.
    pub fn content(&self) -> Option<&T> {
        self.content.as_ref()
    }

    /// Message of the last failed production, cleared on success.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // == View ==
    pub fn view(&self) -> BoundaryView<'_, T> {
        match (self.state(), &self.content) {
            (BoundaryState::Error, _) => {
                BoundaryView::ErrorFallback(self.error.as_deref().unwrap_or_default())
            }
            (BoundaryState::Loading, _) | (_, None) => BoundaryView::Fallback,
            (_, Some(content)) => BoundaryView::Content(content),
        }
    }

    /// Store-side view of this boundary's key.
    pub async fn info(&self) -> CacheInfo {
        self.cache.read().await.info(&self.key)
    }

    /// Milliseconds since the store entry was last written.
    pub async fn age_ms(&self) -> Option<u64> {
        self.cache
            .read()
            .await
            .get(&self.key)
            .map(|entry| entry.age_ms())
    }
}
