//! Booking handlers.

use tabled::Tabled;

use eventdesk_core::{Booking, BookingId, EventId};

use crate::cli::{CancelArgs, GlobalOpts, PageArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct BookingRow {
    #[tabled(rename = "Booking")]
    id: String,
    #[tabled(rename = "Event")]
    event_id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Venue")]
    venue: String,
    #[tabled(rename = "Price")]
    price: String,
}

impl From<&Booking> for BookingRow {
    fn from(b: &Booking) -> Self {
        Self {
            // placeholders have no server id yet
            id: if b.is_local() {
                "pending".into()
            } else {
                b.id.to_string()
            },
            event_id: b.event.id.to_string(),
            title: b.event.name.clone(),
            date: util::format_date(&b.event.date),
            venue: b.event.venue.clone(),
            price: util::format_price(b.event.price),
        }
    }
}

pub async fn book(ctx: &Context, event: EventId, global: &GlobalOpts) -> Result<(), CliError> {
    ctx.require_user()?;
    let details = ctx.desk.coordinator().book_event(event).await?;
    output::status(
        &format!("Booked \"{}\" ({})", details.name, util::format_date(&details.date)),
        global.quiet,
    );
    Ok(())
}

pub async fn cancel(ctx: &Context, args: CancelArgs, global: &GlobalOpts) -> Result<(), CliError> {
    ctx.require_user()?;
    let coordinator = ctx.desk.coordinator();

    match (args.booking, args.event_id, args.event) {
        (Some(booking), Some(event), _) => {
            if !util::confirm(&format!("Cancel booking {booking}?"), global.yes)? {
                return Ok(());
            }
            coordinator
                .cancel_booking(BookingId(booking), EventId(event))
                .await?;
        }
        (None, _, Some(event)) => {
            if !util::confirm(
                &format!("Cancel your booking for event {event}?"),
                global.yes,
            )? {
                return Ok(());
            }
            coordinator.cancel_event(EventId(event)).await?;
        }
        _ => {
            return Err(CliError::Validation {
                field: "event".into(),
                reason: "pass an event ID, or --booking with --event-id".into(),
            });
        }
    }

    output::status("Booking cancelled", global.quiet);
    Ok(())
}

pub async fn list(ctx: &Context, args: &PageArgs, global: &GlobalOpts) -> Result<(), CliError> {
    ctx.require_user()?;
    let bookings = ctx.desk.bookings();
    util::page_through(bookings, None, args).await?;

    let snapshot = bookings.snapshot();
    let out = output::render_list(&global.format(), &snapshot.items, |x| BookingRow::from(x), |b| {
        b.id.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
