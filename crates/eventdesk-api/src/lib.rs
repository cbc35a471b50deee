// eventdesk-api: Async Rust client for the eventdesk booking REST API

pub mod account;
pub mod admin;
pub mod auth;
pub mod bookings;
pub mod client;
pub mod error;
pub mod events;
pub mod transport;
pub mod types;

pub use auth::{Claims, Role, decode_claims};
pub use client::ApiClient;
pub use error::Error;
pub use transport::TransportConfig;
pub use types::{
    AdminEventDto, BookingDto, CategoryDto, EventDetailsDto, EventRequest, EventSummaryDto,
    ImageUpload, JwtAuthResponse, SignInRequest, SignUpRequest, UserDto,
};
