// ── Paginated stores ──
//
// `PaginatedStore<T>` is generic over the item type; `PageItem` ties an
// item to its cache resource and its page endpoint.

mod page;
mod paginated;
mod stream;

use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::backend::{Backend, BackendResult, PageQuery};
use crate::cache::Resource;
use crate::model::{AdminEvent, Booking, BookingId, EventId, EventSummary};

pub use page::PageState;
pub use paginated::{LoadOutcome, PaginatedStore};
pub use stream::{SequenceStream, SnapshotWatchStream, StoreSnapshot};

pub type EventsStore = PaginatedStore<EventSummary>;
pub type BookingsStore = PaginatedStore<Booking>;
pub type DashboardStore = PaginatedStore<AdminEvent>;

pub trait PageItem: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Id: Copy + Eq + Hash + Debug + Send + Sync;

    const RESOURCE: Resource;

    fn id(&self) -> Self::Id;

    fn fetch_page(backend: &dyn Backend, query: PageQuery) -> BackendResult<'_, Vec<Self>>;

    /// Whether this freshly fetched item replaces `existing` in place.
    fn supersedes(&self, _existing: &Self) -> bool {
        false
    }
}

impl PageItem for EventSummary {
    type Id = EventId;

    const RESOURCE: Resource = Resource::Events;

    fn id(&self) -> EventId {
        self.id
    }

    fn fetch_page(backend: &dyn Backend, query: PageQuery) -> BackendResult<'_, Vec<Self>> {
        backend.fetch_events(query)
    }
}

impl PageItem for Booking {
    type Id = BookingId;

    const RESOURCE: Resource = Resource::Bookings;

    fn id(&self) -> BookingId {
        self.id
    }

    fn fetch_page(backend: &dyn Backend, query: PageQuery) -> BackendResult<'_, Vec<Self>> {
        backend.fetch_bookings(PageQuery::new(query.page, query.size))
    }

    /// A server record replaces the local placeholder for the same event.
    fn supersedes(&self, existing: &Self) -> bool {
        !self.is_local() && existing.is_local() && existing.event.id == self.event.id
    }
}

impl PageItem for AdminEvent {
    type Id = EventId;

    const RESOURCE: Resource = Resource::AdminDashboard;

    fn id(&self) -> EventId {
        self.id
    }

    fn fetch_page(backend: &dyn Backend, query: PageQuery) -> BackendResult<'_, Vec<Self>> {
        backend.fetch_admin_dashboard(PageQuery::new(query.page, query.size))
    }
}
