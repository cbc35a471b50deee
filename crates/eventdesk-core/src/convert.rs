// ── API-to-domain type conversions ──
//
// Bridges raw `eventdesk_api` wire types into `crate::model` types and
// back for request bodies. Missing optional text is normalized to empty
// strings where the domain type has no use for `None`.

use eventdesk_api::{
    AdminEventDto, BookingDto, CategoryDto, EventDetailsDto, EventRequest, EventSummaryDto,
    JwtAuthResponse, SignUpRequest, UserDto,
};
use secrecy::{ExposeSecret, SecretString};

use crate::model::{
    AdminEvent, Attendee, AuthTokens, Booking, BookingId, Category, CategoryId, EventDetails,
    EventDraft, EventId, EventSummary, Registration,
};

/// Blank strings from the backend mean "no value".
fn non_blank(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// ── Events ───────────────────────────────────────────────────────────

impl From<EventSummaryDto> for EventSummary {
    fn from(dto: EventSummaryDto) -> Self {
        Self {
            id: EventId(dto.id),
            title: dto.title,
            description: dto.description,
            category_id: dto.category_id.map(CategoryId),
            category: non_blank(dto.category),
            image_url: non_blank(dto.image_url),
            date: dto.date,
            price: dto.price,
            booked: dto.booked,
        }
    }
}

impl From<EventDetailsDto> for EventDetails {
    fn from(dto: EventDetailsDto) -> Self {
        Self {
            id: EventId(dto.id),
            name: dto.name,
            description: dto.description,
            agenda: dto.agenda.unwrap_or_default(),
            category_id: dto.category_id.map(CategoryId),
            category_name: non_blank(dto.category_name),
            image_url: non_blank(dto.image_url),
            date: dto.date,
            venue: dto.venue,
            price: dto.price,
            booked: dto.booked,
        }
    }
}

impl From<CategoryDto> for Category {
    fn from(dto: CategoryDto) -> Self {
        Self {
            id: CategoryId(dto.id),
            title: dto.title,
        }
    }
}

// ── Bookings ─────────────────────────────────────────────────────────

impl From<BookingDto> for Booking {
    fn from(dto: BookingDto) -> Self {
        // Anything in the bookings list is, by definition, booked.
        let event = EventDetails::from(dto.event).with_booked(true);
        Self {
            id: BookingId(dto.id),
            event,
            booking_date: dto.booking_date,
        }
    }
}

// ── Admin ────────────────────────────────────────────────────────────

impl From<UserDto> for Attendee {
    fn from(dto: UserDto) -> Self {
        Self {
            id: dto.id,
            first_name: dto.first_name,
            last_name: non_blank(dto.last_name),
            email: dto.email,
        }
    }
}

impl From<AdminEventDto> for AdminEvent {
    fn from(dto: AdminEventDto) -> Self {
        Self {
            id: EventId(dto.id),
            name: dto.name,
            description: dto.description,
            agenda: non_blank(dto.agenda),
            category: dto.category.map(CategoryId),
            date: dto.date,
            venue: dto.venue,
            price: dto.price,
            image_url: non_blank(dto.image_url),
            attendees: dto
                .users
                .map(|users| users.into_iter().map(Attendee::from).collect()),
            number_of_bookings: dto.number_of_bookings,
        }
    }
}

/// Request body for create (`id = None`) and update.
pub(crate) fn event_request(id: Option<EventId>, draft: &EventDraft) -> EventRequest {
    EventRequest {
        id: id.map(EventId::get),
        name: draft.name.trim().to_owned(),
        description: draft.description.trim().to_owned(),
        agenda: draft.agenda.trim().to_owned(),
        category_id: draft.category_id.map(CategoryId::get),
        date: draft.date.trim().to_owned(),
        venue: draft.venue.trim().to_owned(),
        price: draft.price,
        image_url: draft.image_url.trim().to_owned(),
    }
}

// ── Accounts ─────────────────────────────────────────────────────────

impl From<JwtAuthResponse> for AuthTokens {
    fn from(resp: JwtAuthResponse) -> Self {
        let refresh_token = if resp.refresh_token.is_empty() {
            None
        } else {
            Some(SecretString::from(resp.refresh_token))
        };
        Self {
            access_token: SecretString::from(resp.access_token),
            refresh_token,
        }
    }
}

pub(crate) fn sign_up_request(registration: &Registration) -> SignUpRequest {
    SignUpRequest {
        first_name: registration.first_name.trim().to_owned(),
        last_name: non_blank(registration.last_name.clone()),
        email: registration.email.trim().to_owned(),
        password: registration.password.expose_secret().to_owned(),
    }
}
