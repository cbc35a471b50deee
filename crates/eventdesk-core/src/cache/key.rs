// ── Cache key derivation ──
//
// Every key the client writes is built here. Collection keys are
// partitioned by user and, for filtered views, by category:
//
//   home-page-events-ada@example.com
//   home-page-events-ada@example.com-category-5
//   user-bookings-ada@example.com
//   event-details-42            (+ event-details-42-timestamp)

use std::fmt;

use strum::{Display, EnumIter, IntoStaticStr};

use crate::model::{CategoryId, EventId};

/// Cached per-user collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum Resource {
    #[strum(serialize = "home-page-events")]
    Events,
    #[strum(serialize = "user-bookings")]
    Bookings,
    #[strum(serialize = "home-page-categories")]
    Categories,
    #[strum(serialize = "admin-dashboard")]
    AdminDashboard,
}

const CATEGORY_INFIX: &str = "-category-";
const DETAILS_PREFIX: &str = "event-details-";
const TIMESTAMP_SUFFIX: &str = "-timestamp";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// `{resource}-{user}[-category-{id}]`
    pub fn collection(resource: Resource, user: &str, category: Option<CategoryId>) -> Self {
        match category {
            Some(id) => Self(format!("{resource}-{user}{CATEGORY_INFIX}{id}")),
            None => Self(format!("{resource}-{user}")),
        }
    }

    /// `event-details-{id}`
    pub fn event_details(id: EventId) -> Self {
        Self(format!("{DETAILS_PREFIX}{id}"))
    }

    /// `event-details-{id}-timestamp`
    pub fn event_details_timestamp(id: EventId) -> Self {
        Self(format!("{DETAILS_PREFIX}{id}{TIMESTAMP_SUFFIX}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `key` is this unfiltered collection key or one of its
    /// per-category variants.
    pub fn covers(&self, key: &str) -> bool {
        key == self.0
            || key
                .strip_prefix(self.0.as_str())
                .is_some_and(|rest| rest.starts_with(CATEGORY_INFIX))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Event id of an `event-details-{id}` key. Timestamp companions and
/// other keys yield `None`.
pub fn parse_event_details_key(key: &str) -> Option<EventId> {
    key.strip_prefix(DETAILS_PREFIX)?.parse().ok()
}
