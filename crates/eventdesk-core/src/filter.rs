// ── Category filter controller ──
//
// Holds the selected category for the events list and owns the category
// catalog. Changing the filter is the only path that resets the events
// store, and so the only way past a terminal "no more pages".

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::backend::Backend;
use crate::cache::{self, CacheKey, Resource};
use crate::error::CoreError;
use crate::model::{Category, CategoryId};
use crate::notify::NotificationKind;
use crate::session::Session;
use crate::store::{EventsStore, LoadOutcome};

pub struct CategoryFilter {
    backend: Arc<dyn Backend>,
    session: Session,
    events: Arc<EventsStore>,
    selected: Mutex<Option<CategoryId>>,
}

impl CategoryFilter {
    pub fn new(backend: Arc<dyn Backend>, session: Session, events: Arc<EventsStore>) -> Self {
        Self {
            backend,
            session,
            events,
            selected: Mutex::new(None),
        }
    }

    pub fn selected(&self) -> Option<CategoryId> {
        *self.selected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Select `category` (`None` for all events).
    ///
    /// Returns `None` when the selection did not change; otherwise the
    /// outcome of resetting the events store.
    pub async fn set_filter(
        &self,
        category: Option<CategoryId>,
    ) -> Result<Option<LoadOutcome>, CoreError> {
        {
            let mut selected = self.selected.lock().unwrap_or_else(PoisonError::into_inner);
            if *selected == category && self.events.filter() == category {
                return Ok(None);
            }
            *selected = category;
        }
        debug!(?category, "category filter changed");
        self.events.reset_for_filter(category).await.map(Some)
    }

    /// All categories. Served from the cache when a non-empty list is
    /// cached for this user; an empty cached list is refetched.
    pub async fn categories(&self) -> Result<Vec<Category>, CoreError> {
        let key = self
            .session
            .user_key()
            .map(|user| CacheKey::collection(Resource::Categories, &user, None));

        if let Some(key) = &key {
            let cached: Option<Vec<Category>> =
                cache::read_json(self.session.cache().as_ref(), key.as_str());
            if let Some(categories) = cached.filter(|c| !c.is_empty()) {
                debug!(count = categories.len(), "categories served from cache");
                return Ok(categories);
            }
        }

        match self.backend.fetch_categories().await {
            Ok(categories) => {
                if let Some(key) = &key {
                    cache::write_json(self.session.cache().as_ref(), key.as_str(), &categories);
                }
                Ok(categories)
            }
            Err(err) => {
                warn!(error = %err, "category load failed");
                self.session
                    .notifier()
                    .failure(NotificationKind::LoadFailed, &err);
                self.session.observe(&err);
                Err(err)
            }
        }
    }

    /// Resolve a category by case-insensitive title or numeric id.
    pub async fn resolve(&self, query: &str) -> Result<CategoryId, CoreError> {
        if let Ok(id) = query.parse::<CategoryId>() {
            return Ok(id);
        }
        self.categories()
            .await?
            .into_iter()
            .find(|c| c.title.eq_ignore_ascii_case(query.trim()))
            .map(|c| c.id)
            .ok_or_else(|| CoreError::not_found("category", query))
    }

    /// Forget the selection without touching the store.
    pub(crate) fn clear(&self) {
        *self.selected.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
