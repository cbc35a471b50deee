// ── Paginated collection store ──
//
// Ordered in-memory sequence for one resource and filter, backed by the
// per-user cache. Lifecycle:
//
//   Empty ──initialize──▶ Idle (hydrated)          cache hit
//   Empty ──initialize──▶ Loading ──▶ Idle(hasMore) cache miss
//   Idle(hasMore) ──load_next_page──▶ Loading ──▶ Idle(...)
//   Idle(!hasMore) is terminal until reset_for_filter.
//
// The state mutex is never held across an await. A fetch records the
// store generation when it starts; resets, discards and close bump or
// flag it so late results are dropped instead of applied.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::backend::{Backend, PageQuery};
use crate::cache::{self, CacheKey, LocalCache};
use crate::error::CoreError;
use crate::model::CategoryId;
use crate::notify::NotificationKind;
use crate::session::Session;

use super::PageItem;
use super::page::{CachedPage, PageState};
use super::stream::{SequenceStream, StoreSnapshot};

/// What a load or initialize call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Served from the cache without a network call.
    Hydrated { items: usize },
    /// A page was fetched and merged.
    Loaded { appended: usize, exhausted: bool },
    /// Another fetch is already running; nothing was sent.
    InFlight,
    /// The server has no more pages; nothing was sent.
    Exhausted,
    /// Already initialized for this filter.
    Ready,
    /// The store was closed, or reset while the fetch was in flight; the
    /// result was discarded.
    Discarded,
}

#[derive(Debug)]
struct Inner<T> {
    filter: Option<CategoryId>,
    /// `None` until the first hydration or successful fetch.
    state: Option<PageState<T>>,
    loading: bool,
    initialized: bool,
    generation: u64,
    closed: bool,
    staged: Vec<T>,
    /// Session epoch the state belongs to.
    epoch: u64,
}

impl<T> Default for Inner<T> {
    fn default() -> Self {
        Self {
            filter: None,
            state: None,
            loading: false,
            initialized: false,
            generation: 0,
            closed: false,
            staged: Vec::new(),
            epoch: 0,
        }
    }
}

pub struct PaginatedStore<T: PageItem> {
    backend: Arc<dyn Backend>,
    session: Session,
    page_size: u32,
    inner: Mutex<Inner<T>>,
    snapshot: watch::Sender<Arc<StoreSnapshot<T>>>,
}

impl<T: PageItem> PaginatedStore<T> {
    pub fn new(backend: Arc<dyn Backend>, session: Session, page_size: u32) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(StoreSnapshot::default()));
        Self {
            backend,
            session,
            page_size: page_size.max(1),
            inner: Mutex::new(Inner::default()),
            snapshot,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Hydrate from the cache for `filter`, or fetch the first page.
    ///
    /// A second call with the same filter is a no-op; a different filter
    /// behaves like [`reset_for_filter`](Self::reset_for_filter).
    pub async fn initialize(&self, filter: Option<CategoryId>) -> Result<LoadOutcome, CoreError> {
        let filter_changed = {
            let mut inner = self.lock();
            if inner.closed {
                return Ok(LoadOutcome::Discarded);
            }
            if inner.initialized {
                if inner.filter != filter {
                    true
                } else if inner.state.is_some() || inner.loading {
                    return Ok(LoadOutcome::Ready);
                } else {
                    // A failed bootstrap left nothing behind; retry it.
                    false
                }
            } else {
                inner.initialized = true;
                inner.filter = filter;
                if let Some(items) = self.hydrate(&mut inner) {
                    self.publish(&inner);
                    return Ok(LoadOutcome::Hydrated { items });
                }
                false
            }
        };
        if filter_changed {
            return self.reset_for_filter(filter).await;
        }
        self.load_next_page().await
    }

    /// Fetch the page at the cursor and append unseen items.
    ///
    /// Sends nothing while a fetch is in flight or once the server has
    /// reported its last page. On failure the cursor stays put, a
    /// notification is emitted, and the error is returned.
    pub async fn load_next_page(&self) -> Result<LoadOutcome, CoreError> {
        let (query, generation) = {
            let mut inner = self.lock();
            if inner.closed {
                return Ok(LoadOutcome::Discarded);
            }
            if inner.loading {
                return Ok(LoadOutcome::InFlight);
            }
            if inner.state.as_ref().is_some_and(|s| !s.has_more) {
                return Ok(LoadOutcome::Exhausted);
            }
            inner.loading = true;
            inner.initialized = true;
            let page = inner.state.as_ref().map_or(0, |s| s.next_page);
            self.publish(&inner);
            (
                PageQuery::new(page, self.page_size).with_category(inner.filter),
                inner.generation,
            )
        };

        debug!(resource = %T::RESOURCE, page = query.page, category = ?query.category, "loading page");
        let result = T::fetch_page(self.backend.as_ref(), query).await;

        let mut inner = self.lock();
        if inner.closed || inner.generation != generation {
            debug!(resource = %T::RESOURCE, page = query.page, "discarding stale page");
            return Ok(LoadOutcome::Discarded);
        }
        inner.loading = false;

        match result {
            Ok(items) => {
                let received = items.len();
                let state = inner.state.get_or_insert_with(PageState::default);
                let appended = state.merge_page(items);
                state.next_page = query.page + 1;
                if received < usize::try_from(query.size).unwrap_or(usize::MAX) {
                    state.has_more = false;
                }
                let exhausted = !state.has_more;
                self.persist(&inner);
                self.publish(&inner);
                debug!(resource = %T::RESOURCE, received, appended, exhausted, "page loaded");
                Ok(LoadOutcome::Loaded { appended, exhausted })
            }
            Err(err) => {
                self.publish(&inner);
                drop(inner);
                warn!(resource = %T::RESOURCE, page = query.page, error = %err, "page load failed");
                self.session
                    .notifier()
                    .failure(NotificationKind::LoadFailed, &err);
                self.session.observe(&err);
                Err(err)
            }
        }
    }

    /// Drop the sequence and cursor, switch to `filter`, then hydrate from
    /// that filter's cache entry or fetch its first page.
    ///
    /// The only way back from `has_more == false`.
    pub async fn reset_for_filter(
        &self,
        filter: Option<CategoryId>,
    ) -> Result<LoadOutcome, CoreError> {
        {
            let mut inner = self.lock();
            if inner.closed {
                return Ok(LoadOutcome::Discarded);
            }
            Self::clear_memory(&mut inner);
            inner.initialized = true;
            inner.filter = filter;
            debug!(resource = %T::RESOURCE, ?filter, "resetting for filter");
            if let Some(items) = self.hydrate(&mut inner) {
                self.publish(&inner);
                return Ok(LoadOutcome::Hydrated { items });
            }
            self.publish(&inner);
        }
        self.load_next_page().await
    }

    /// Forget the in-memory sequence. The cache is left alone.
    pub fn discard(&self) {
        let mut inner = self.lock();
        Self::clear_memory(&mut inner);
        inner.initialized = false;
        inner.filter = None;
        self.publish(&inner);
    }

    /// Forget the in-memory sequence and every cached variant of it.
    pub fn invalidate(&self) {
        let mut inner = self.lock();
        Self::clear_memory(&mut inner);
        inner.initialized = false;
        if let Some(base) = self.key_for(None) {
            let cache = self.session.cache();
            for key in cache.keys() {
                if base.covers(&key) {
                    cache.remove(&key);
                }
            }
        }
        self.publish(&inner);
    }

    /// Stop accepting results. In-flight fetches finish but are ignored.
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        inner.loading = false;
        self.publish(&inner);
    }

    // ── Item mutations ───────────────────────────────────────────────

    /// Apply `f` to every copy of `id`: the in-memory sequence and every
    /// cached filter variant. Returns whether anything matched.
    pub fn patch_item<F>(&self, id: T::Id, f: F) -> bool
    where
        F: Fn(&mut T),
    {
        self.mutate_everywhere(|state| state.patch(id, &f))
    }

    /// Remove `id` from the in-memory sequence and every cached variant.
    pub fn remove_item(&self, id: T::Id) -> bool {
        self.mutate_everywhere(|state| state.remove(id))
    }

    /// Put `item` at the head of the sequence.
    ///
    /// Skipped when the store has neither memory nor cache state: its
    /// first fetch will bring the authoritative copy.
    pub fn prepend_item(&self, item: T) -> bool {
        let mut inner = self.lock();
        if let Some(state) = inner.state.as_mut() {
            state.prepend(item);
            self.persist(&inner);
            self.publish(&inner);
            return true;
        }
        drop(inner);

        let Some(key) = self.key_for(None) else {
            return false;
        };
        let cache = self.session.cache();
        let Some(mut state) = self.read_cached(cache.as_ref(), key.as_str()) else {
            return false;
        };
        state.prepend(item);
        cache::write_json(cache.as_ref(), key.as_str(), &state);
        true
    }

    fn mutate_everywhere<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&mut PageState<T>) -> bool,
    {
        let mut inner = self.lock();
        let mut hit = false;
        let current = self.key_for(inner.filter);

        let memory_hit = inner.state.as_mut().is_some_and(&mut f);
        if memory_hit {
            self.persist(&inner);
            self.publish(&inner);
            hit = true;
        }
        let memory_owns_current = inner.state.is_some();
        drop(inner);

        let Some(base) = self.key_for(None) else {
            return hit;
        };
        let cache = self.session.cache();
        for key in cache.keys() {
            if !base.covers(&key) {
                continue;
            }
            if memory_owns_current && current.as_ref().is_some_and(|c| c.as_str() == key) {
                continue;
            }
            if let Some(mut state) = self.read_cached(cache.as_ref(), &key) {
                if f(&mut state) {
                    cache::write_json(cache.as_ref(), &key, &state);
                    hit = true;
                }
            }
        }
        hit
    }

    // ── New items ────────────────────────────────────────────────────

    /// Re-fetch the first page and stage items the sequence lacks.
    /// Returns how many items are staged.
    pub async fn check_for_new(&self) -> Result<usize, CoreError> {
        let (query, generation) = {
            let mut inner = self.lock();
            if inner.closed || inner.loading || inner.state.is_none() {
                return Ok(inner.staged.len());
            }
            inner.loading = true;
            self.publish(&inner);
            (
                PageQuery::new(0, self.page_size).with_category(inner.filter),
                inner.generation,
            )
        };

        let result = T::fetch_page(self.backend.as_ref(), query).await;

        let mut inner = self.lock();
        if inner.closed || inner.generation != generation {
            return Ok(0);
        }
        inner.loading = false;

        match result {
            Ok(items) => {
                let fresh: Vec<T> = items
                    .into_iter()
                    .filter(|item| {
                        let id = item.id();
                        !inner.state.as_ref().is_some_and(|s| s.contains(id))
                            && !inner.staged.iter().any(|s| s.id() == id)
                    })
                    .collect();
                let added = fresh.len();
                inner.staged.extend(fresh);
                let staged = inner.staged.len();
                self.publish(&inner);
                drop(inner);
                if added > 0 {
                    self.session.notifier().info(
                        NotificationKind::NewEvents,
                        format!("{staged} new {} available", T::RESOURCE),
                    );
                }
                Ok(staged)
            }
            Err(err) => {
                self.publish(&inner);
                drop(inner);
                warn!(resource = %T::RESOURCE, error = %err, "new-item check failed");
                self.session.observe(&err);
                Err(err)
            }
        }
    }

    /// Merge staged items at the head of the sequence, in server order.
    pub fn show_new(&self) -> usize {
        let mut inner = self.lock();
        let staged = std::mem::take(&mut inner.staged);
        let Some(state) = inner.state.as_mut() else {
            return 0;
        };
        let fresh: Vec<T> = staged
            .into_iter()
            .filter(|item| !state.contains(item.id()))
            .collect();
        let shown = fresh.len();
        for item in fresh.into_iter().rev() {
            state.prepend(item);
        }
        self.persist(&inner);
        self.publish(&inner);
        shown
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<StoreSnapshot<T>> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> SequenceStream<T> {
        SequenceStream::new(self.snapshot.subscribe())
    }

    pub fn items(&self) -> Vec<T> {
        self.lock()
            .state
            .as_ref()
            .map(|s| s.items.clone())
            .unwrap_or_default()
    }

    /// Look up `id` in memory, falling back to this filter's cache entry.
    pub fn find(&self, id: T::Id) -> Option<T> {
        self.find_where(|e| e.id() == id)
    }

    /// First item matching `pred`, in memory or in this filter's cache entry.
    pub fn find_where<P: Fn(&T) -> bool>(&self, pred: P) -> Option<T> {
        let inner = self.lock();
        if let Some(state) = inner.state.as_ref() {
            return state.items.iter().find(|e| pred(e)).cloned();
        }
        let key = self.key_for(inner.filter)?;
        drop(inner);
        self.read_cached(self.session.cache().as_ref(), key.as_str())?
            .items
            .into_iter()
            .find(|e| pred(e))
    }

    pub fn filter(&self) -> Option<CategoryId> {
        self.lock().filter
    }

    pub fn has_more(&self) -> bool {
        self.lock().state.as_ref().is_none_or(|s| s.has_more)
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Lock the state, first dropping anything left over from an earlier
    /// session.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let epoch = self.session.epoch();
        if inner.epoch != epoch {
            debug!(resource = %T::RESOURCE, "session changed; dropping in-memory state");
            Self::clear_memory(&mut inner);
            inner.initialized = false;
            inner.filter = None;
            inner.epoch = epoch;
        }
        inner
    }

    fn clear_memory(inner: &mut Inner<T>) {
        inner.generation += 1;
        inner.state = None;
        inner.loading = false;
        inner.staged.clear();
    }

    fn key_for(&self, filter: Option<CategoryId>) -> Option<CacheKey> {
        let user = self.session.user_key()?;
        Some(CacheKey::collection(T::RESOURCE, &user, filter))
    }

    fn read_cached(&self, cache: &dyn LocalCache, key: &str) -> Option<PageState<T>> {
        cache::read_json::<CachedPage<T>>(cache, key)?.into_state(self.page_size)
    }

    /// Adopt this filter's cache entry. Returns the item count on a hit.
    fn hydrate(&self, inner: &mut Inner<T>) -> Option<usize> {
        let key = self.key_for(inner.filter)?;
        let state = self.read_cached(self.session.cache().as_ref(), key.as_str())?;
        let items = state.items.len();
        debug!(resource = %T::RESOURCE, key = %key, items, "hydrated from cache");
        inner.state = Some(state);
        Some(items)
    }

    fn persist(&self, inner: &Inner<T>) {
        let (Some(state), Some(key)) = (inner.state.as_ref(), self.key_for(inner.filter)) else {
            return;
        };
        cache::write_json(self.session.cache().as_ref(), key.as_str(), state);
    }

    fn publish(&self, inner: &Inner<T>) {
        let snapshot = StoreSnapshot {
            items: inner
                .state
                .as_ref()
                .map(|s| s.items.clone())
                .unwrap_or_default(),
            filter: inner.filter,
            next_page: inner.state.as_ref().map_or(0, |s| s.next_page),
            has_more: inner.state.as_ref().is_none_or(|s| s.has_more),
            loading: inner.loading,
            staged: inner.staged.len(),
        };
        self.snapshot.send_replace(Arc::new(snapshot));
    }
}

impl<T: PageItem> std::fmt::Debug for PaginatedStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("PaginatedStore")
            .field("resource", &T::RESOURCE)
            .field("items", &snapshot.items.len())
            .field("has_more", &snapshot.has_more)
            .field("loading", &snapshot.loading)
            .finish_non_exhaustive()
    }
}
