// ── Cross-store mutation coordinator ──
//
// A booking or cancellation touches every view holding the event: the
// events list (all cached filter variants), the open detail entry, and
// the bookings list. The remote call always completes first; local state
// is only touched after the backend confirms.

use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::backend::{Backend, PageQuery};
use crate::details::EventDetailCache;
use crate::error::CoreError;
use crate::model::{Booking, BookingId, EventDetails, EventId};
use crate::notify::NotificationKind;
use crate::session::Session;
use crate::store::{BookingsStore, EventsStore};

/// Upper bound on pages scanned when resolving a placeholder booking id.
const RECONCILE_MAX_PAGES: u32 = 50;

pub struct BookingCoordinator {
    backend: Arc<dyn Backend>,
    session: Session,
    events: Arc<EventsStore>,
    bookings: Arc<BookingsStore>,
    details: EventDetailCache,
}

impl BookingCoordinator {
    pub fn new(
        backend: Arc<dyn Backend>,
        session: Session,
        events: Arc<EventsStore>,
        bookings: Arc<BookingsStore>,
        details: EventDetailCache,
    ) -> Self {
        Self {
            backend,
            session,
            events,
            bookings,
            details,
        }
    }

    /// Book `id` and propagate `booked = true` to every cached view.
    ///
    /// Returns the event as it now stands. On failure nothing local is
    /// touched and the error is returned.
    pub async fn book_event(&self, id: EventId) -> Result<EventDetails, CoreError> {
        self.session.require_user()?;
        let snapshot = self.event_snapshot(id).await?;

        let echoed = match self.backend.book_event(id).await {
            Ok(echoed) => echoed,
            Err(err) => return Err(self.fail(NotificationKind::BookingFailed, err)),
        };

        let event = snapshot.with_booked(true);
        self.events.patch_item(id, |e| e.booked = true);
        self.details.patch(id, |d| d.booked = true);

        let booking = match echoed {
            Some(mut booking) => {
                booking.event.booked = true;
                booking
            }
            None => Booking::local(event.clone(), Local::now()),
        };
        debug!(booking = %booking.id, local = booking.is_local(), "recording booking");
        if !self.bookings.prepend_item(booking) {
            debug!("bookings not loaded yet; next fetch will include the booking");
        }

        info!(event = %id, "event booked");
        self.session
            .notifier()
            .success(NotificationKind::Booked, format!("Booked \"{}\"", event.name));
        Ok(event)
    }

    /// Cancel `booking_id` and propagate `booked = false` for `event_id`.
    ///
    /// A placeholder id is first resolved against the backend's bookings.
    pub async fn cancel_booking(
        &self,
        booking_id: BookingId,
        event_id: EventId,
    ) -> Result<(), CoreError> {
        self.session.require_user()?;

        let remote_id = if booking_id.is_local() {
            match self.reconcile(event_id).await {
                Ok(id) => id,
                Err(err) => return Err(self.fail(NotificationKind::CancellationFailed, err)),
            }
        } else {
            booking_id
        };

        if let Err(err) = self.backend.cancel_booking(remote_id).await {
            return Err(self.fail(NotificationKind::CancellationFailed, err));
        }

        self.bookings.remove_item(booking_id);
        if remote_id != booking_id {
            self.bookings.remove_item(remote_id);
        }
        self.events.patch_item(event_id, |e| e.booked = false);
        self.details.patch(event_id, |d| d.booked = false);

        info!(booking = %remote_id, event = %event_id, "booking cancelled");
        self.session
            .notifier()
            .success(NotificationKind::Cancelled, "Booking cancelled");
        Ok(())
    }

    /// Cancel whatever booking the user holds for `event_id`.
    pub async fn cancel_event(&self, event_id: EventId) -> Result<(), CoreError> {
        let booking_id = match self.bookings.find_where(|b| b.event.id == event_id) {
            Some(booking) => booking.id,
            None => match self.reconcile(event_id).await {
                Ok(id) => id,
                Err(err) => return Err(self.fail(NotificationKind::CancellationFailed, err)),
            },
        };
        self.cancel_booking(booking_id, event_id).await
    }

    /// Best local picture of `id`: open detail entry, then the events
    /// list, then the backend.
    async fn event_snapshot(&self, id: EventId) -> Result<EventDetails, CoreError> {
        if let Some(details) = self.details.read(id) {
            return Ok(details);
        }
        if let Some(summary) = self.events.find(id) {
            return Ok(EventDetails::from(&summary));
        }
        // Nothing has been booked yet, so this is a load failure.
        match self.backend.fetch_event_details(id).await {
            Ok(details) => Ok(details),
            Err(err) => Err(self.fail(NotificationKind::LoadFailed, err)),
        }
    }

    /// Server-assigned booking id for the user's booking of `event_id`.
    async fn reconcile(&self, event_id: EventId) -> Result<BookingId, CoreError> {
        let size = self.bookings.page_size();
        for page in 0..RECONCILE_MAX_PAGES {
            let rows = self
                .backend
                .fetch_bookings(PageQuery::new(page, size))
                .await?;
            let exhausted = rows.len() < usize::try_from(size).unwrap_or(usize::MAX);
            if let Some(found) = rows.into_iter().find(|b| b.event.id == event_id) {
                debug!(event = %event_id, booking = %found.id, "placeholder booking reconciled");
                return Ok(found.id);
            }
            if exhausted {
                break;
            }
        }
        Err(CoreError::not_found("booking", format!("for event {event_id}")))
    }

    fn fail(&self, kind: NotificationKind, err: CoreError) -> CoreError {
        warn!(%kind, error = %err, "booking mutation failed");
        self.session.notifier().failure(kind, &err);
        self.session.observe(&err);
        err
    }
}

