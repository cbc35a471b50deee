//! Client-side state and cache synchronization for the eventdesk booking
//! service.
//!
//! - **[`EventDesk`]**: facade wiring every component below to one
//!   backend, one cache and one session.
//!
//! - **[`PaginatedStore<T>`]**: infinite-scroll sequence for events,
//!   bookings and the admin dashboard: cursor and exhaustion tracking,
//!   de-duplicated appends, persistence of every mutation, and discarding
//!   of results that land after a reset or close.
//!
//! - **[`BookingCoordinator`]**: confirm-then-apply booking and
//!   cancellation, propagating `booked` across the events list, open
//!   detail entries and the bookings list.
//!
//! - **[`LocalCache`]**: per-user key/value storage with an in-memory
//!   and a session-directory implementation.
//!
//! - **[`Session`]**: signed-in identity; wipes the cache at every
//!   session boundary.

pub mod admin;
pub mod backend;
pub mod cache;
pub mod client;
pub mod config;
pub mod convert;
pub mod coordinator;
pub mod details;
pub mod error;
pub mod filter;
pub mod model;
pub mod notify;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use admin::{AdminService, parse_event_date, validate_draft};
pub use backend::{Backend, BackendResult, PageQuery};
pub use cache::{CacheKey, LocalCache, MemoryCache, Resource, SessionDirCache};
pub use client::EventDesk;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use coordinator::BookingCoordinator;
pub use details::EventDetailCache;
pub use error::{CoreError, ErrorKind};
pub use filter::CategoryFilter;
pub use notify::{Level, Notification, NotificationKind, Notifier};
pub use session::{Session, SessionState};
pub use store::{
    BookingsStore, DashboardStore, EventsStore, LoadOutcome, PageItem, PaginatedStore,
    SequenceStream, StoreSnapshot,
};

pub use model::{
    AdminEvent, Attendee, AuthTokens, Booking, BookingId, Category, CategoryId, EventDetails,
    EventDraft, EventId, EventSummary, ImageUpload, Registration, Role, UserIdentity,
};
