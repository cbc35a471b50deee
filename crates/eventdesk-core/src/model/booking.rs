use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::event::EventDetails;
use super::ids::BookingId;

/// The signed-in user's reservation of one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    /// Snapshot of the event at booking time.
    pub event: EventDetails,
    #[serde(default)]
    pub booking_date: String,
}

impl Booking {
    /// A booking the backend confirmed without echoing a record.
    ///
    /// The id is a negative placeholder derived from `now`; the next
    /// bookings fetch carrying the same event replaces it.
    pub fn local(event: EventDetails, now: DateTime<Local>) -> Self {
        Self {
            id: BookingId::local(now.timestamp_millis()),
            event: event.with_booked(true),
            booking_date: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    pub fn is_local(&self) -> bool {
        self.id.is_local()
    }
}
