// ── Events and categories ──

use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, EventId};

/// List-card variant of an event, as shown on the home page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub date: String,
    pub price: f64,
    /// Whether the signed-in user holds a booking for this event.
    #[serde(default)]
    pub booked: bool,
}

/// Full event record, as shown on the detail page and embedded in bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub id: EventId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub agenda: String,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub date: String,
    #[serde(default)]
    pub venue: String,
    pub price: f64,
    #[serde(default)]
    pub booked: bool,
}

impl EventDetails {
    #[must_use]
    pub fn with_booked(mut self, booked: bool) -> Self {
        self.booked = booked;
        self
    }
}

impl From<&EventSummary> for EventDetails {
    /// Summaries carry no agenda or venue; both come out empty.
    fn from(summary: &EventSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.title.clone(),
            description: summary.description.clone(),
            agenda: String::new(),
            category_id: summary.category_id,
            category_name: summary.category.clone(),
            image_url: summary.image_url.clone(),
            date: summary.date.clone(),
            venue: String::new(),
            price: summary.price,
            booked: summary.booked,
        }
    }
}

impl From<&EventDetails> for EventSummary {
    fn from(details: &EventDetails) -> Self {
        Self {
            id: details.id,
            title: details.name.clone(),
            description: details.description.clone(),
            category_id: details.category_id,
            category: details.category_name.clone(),
            image_url: details.image_url.clone(),
            date: details.date.clone(),
            price: details.price,
            booked: details.booked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
}
