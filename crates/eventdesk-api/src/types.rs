// Wire types for the booking REST API.
//
// Field names follow the backend's camelCase JSON. Nullable columns are
// `Option` or `#[serde(default)]` so partially populated rows still decode.

use serde::{Deserialize, Serialize};

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
}

/// Token pair returned by `/auth/login` and `/auth/refresh`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtAuthResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

// ── Events ───────────────────────────────────────────────────────────

/// Row of `GET /user/homepage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummaryDto {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub booked: bool,
}

/// Body of `GET /user/event/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailsDto {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub agenda: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub booked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: i64,
    pub title: String,
}

// ── Bookings ─────────────────────────────────────────────────────────

/// Row of `GET /user/bookings`. The backend also echoes one of these from
/// `POST /user/book-event/{id}` on newer deployments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: i64,
    pub event: EventDetailsDto,
    #[serde(default)]
    pub booking_date: String,
}

// ── Admin ────────────────────────────────────────────────────────────

/// Row of `GET /admin/dashboard` and body of `GET /admin/event/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEventDto {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub agenda: Option<String>,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub users: Option<Vec<UserDto>>,
    #[serde(default)]
    pub number_of_bookings: Option<u32>,
}

/// Body of `POST /admin/control-panel` and `PUT /admin/control-panel/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub agenda: String,
    pub category_id: Option<i64>,
    pub date: String,
    pub venue: String,
    pub price: f64,
    pub image_url: String,
}

/// A file destined for `POST /admin/events/{id}/upload-image`.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
