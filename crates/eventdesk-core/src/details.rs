// ── Event detail cache ──
//
// Typed view over `event-details-{id}` entries and their companion
// `event-details-{id}-timestamp` (epoch milliseconds of the last write).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::cache::{self, CacheKey, key::parse_event_details_key};
use crate::error::CoreError;
use crate::model::{EventDetails, EventId};
use crate::notify::NotificationKind;
use crate::session::Session;

#[derive(Clone)]
pub struct EventDetailCache {
    backend: Arc<dyn Backend>,
    session: Session,
}

impl EventDetailCache {
    pub fn new(backend: Arc<dyn Backend>, session: Session) -> Self {
        Self { backend, session }
    }

    /// Cached copy only; never touches the network.
    pub fn read(&self, id: EventId) -> Option<EventDetails> {
        let key = CacheKey::event_details(id);
        cache::read_json(self.session.cache().as_ref(), key.as_str())
    }

    /// When the cached copy of `id` was last written.
    pub fn cached_at(&self, id: EventId) -> Option<DateTime<Utc>> {
        let key = CacheKey::event_details_timestamp(id);
        let millis: i64 = cache::read_json(self.session.cache().as_ref(), key.as_str())?;
        DateTime::from_timestamp_millis(millis)
    }

    /// Cache-first open of the detail view.
    pub async fn open(&self, id: EventId) -> Result<EventDetails, CoreError> {
        if let Some(details) = self.read(id) {
            debug!(event = %id, "event details served from cache");
            return Ok(details);
        }
        self.refresh(id).await
    }

    /// Fetch `id` from the backend and overwrite the cached copy.
    pub async fn refresh(&self, id: EventId) -> Result<EventDetails, CoreError> {
        match self.backend.fetch_event_details(id).await {
            Ok(details) => {
                self.write(&details);
                Ok(details)
            }
            Err(err) => {
                warn!(event = %id, error = %err, "event details load failed");
                self.session
                    .notifier()
                    .failure(NotificationKind::LoadFailed, &err);
                self.session.observe(&err);
                Err(err)
            }
        }
    }

    pub fn write(&self, details: &EventDetails) {
        let cache = self.session.cache();
        let key = CacheKey::event_details(details.id);
        cache::write_json(cache.as_ref(), key.as_str(), details);
        let stamp = CacheKey::event_details_timestamp(details.id);
        cache::write_json(cache.as_ref(), stamp.as_str(), &Utc::now().timestamp_millis());
    }

    /// Mutate the cached copy of `id`, if one is open. The timestamp keeps
    /// recording the last fetch.
    pub fn patch<F: FnOnce(&mut EventDetails)>(&self, id: EventId, f: F) -> bool {
        let Some(mut details) = self.read(id) else {
            return false;
        };
        f(&mut details);
        let key = CacheKey::event_details(id);
        cache::write_json(self.session.cache().as_ref(), key.as_str(), &details);
        true
    }

    pub fn remove(&self, id: EventId) {
        let cache = self.session.cache();
        cache.remove(CacheKey::event_details(id).as_str());
        cache.remove(CacheKey::event_details_timestamp(id).as_str());
    }

    /// Ids with a cached detail entry.
    pub fn cached_ids(&self) -> Vec<EventId> {
        self.session
            .cache()
            .keys_with_prefix("event-details-")
            .iter()
            .filter_map(|k| parse_event_details_key(k))
            .collect()
    }
}
