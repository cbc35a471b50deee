// ── Administrator-side event records ──

use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, EventId};

/// A user holding a booking, as listed on the admin event page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
}

impl Attendee {
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {last}", self.first_name),
            _ => self.first_name.clone(),
        }
    }
}

/// Dashboard row and admin detail view of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEvent {
    pub id: EventId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub agenda: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    pub date: String,
    #[serde(default)]
    pub venue: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Only populated by the single-event endpoint.
    #[serde(default)]
    pub attendees: Option<Vec<Attendee>>,
    #[serde(default)]
    pub number_of_bookings: Option<u32>,
}

/// Admin create/update form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub agenda: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// `YYYY-MM-DDTHH:MM` (seconds and RFC 3339 offsets are accepted too).
    pub date: String,
    pub venue: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: String,
}

impl From<&AdminEvent> for EventDraft {
    /// Prefill an edit form from an existing event.
    fn from(event: &AdminEvent) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            agenda: event.agenda.clone().unwrap_or_default(),
            category_id: event.category,
            date: event.date.clone(),
            venue: event.venue.clone(),
            price: event.price,
            image_url: event.image_url.clone().unwrap_or_default(),
        }
    }
}
