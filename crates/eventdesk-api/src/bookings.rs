// Booking endpoints for the signed-in user.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::BookingDto;

impl ApiClient {
    /// `POST /user/book-event/{id}`
    ///
    /// Older backends answer with an empty body or a plain message; newer
    /// ones echo the created booking. Returns the booking when the body
    /// decodes as one.
    pub async fn book_event(&self, event_id: i64) -> Result<Option<BookingDto>, Error> {
        let body = self.post_empty(&format!("user/book-event/{event_id}")).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<BookingDto>(&body) {
            Ok(booking) => Ok(Some(booking)),
            Err(e) => {
                debug!(error = %e, "book-event response is not a booking; ignoring body");
                Ok(None)
            }
        }
    }

    /// `DELETE /user/cancel-booking/{id}`
    pub async fn cancel_booking(&self, booking_id: i64) -> Result<(), Error> {
        self.delete(&format!("user/cancel-booking/{booking_id}"))
            .await
    }

    /// `GET /user/bookings?page&size`
    pub async fn user_bookings(&self, page: u32, size: u32) -> Result<Vec<BookingDto>, Error> {
        let params = [("page", page.to_string()), ("size", size.to_string())];
        self.get_with_params("user/bookings", &params).await
    }
}
