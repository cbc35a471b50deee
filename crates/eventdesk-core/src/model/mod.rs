// ── Domain model ──
//
// Canonical client-side types. Wire DTOs from `eventdesk_api` are
// converted into these in `crate::convert`; cached values are these types
// serialized as camelCase JSON.

pub mod account;
pub mod admin;
pub mod booking;
pub mod event;
pub mod ids;

pub use account::{AuthTokens, Registration, Role, UserIdentity};
pub use admin::{AdminEvent, Attendee, EventDraft};
pub use booking::Booking;
pub use event::{Category, EventDetails, EventSummary};
pub use ids::{BookingId, CategoryId, EventId};

pub use eventdesk_api::ImageUpload;
