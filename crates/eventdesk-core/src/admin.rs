// ── Admin service ──
//
// Event management for administrators. Drafts are validated locally and a
// `ValidationFailed` error never reaches the network. Every successful
// mutation invalidates the dashboard so its next view refetches.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::details::EventDetailCache;
use crate::error::CoreError;
use crate::model::{AdminEvent, EventDraft, EventId, ImageUpload};
use crate::notify::NotificationKind;
use crate::session::Session;
use crate::store::{DashboardStore, EventsStore};

const DATE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse the date formats the admin form and the backend produce.
///
/// RFC 3339 values are converted to local time; a bare date means
/// midnight local time.
pub fn parse_event_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Some(dt) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Check a draft against the form rules, relative to `now`.
pub fn validate_draft(draft: &EventDraft, now: NaiveDateTime) -> Result<(), CoreError> {
    for (field, value) in [
        ("name", &draft.name),
        ("description", &draft.description),
        ("venue", &draft.venue),
    ] {
        if value.trim().is_empty() {
            return Err(CoreError::validation(field, "is required"));
        }
    }

    if draft.date.trim().is_empty() {
        return Err(CoreError::validation("date", "is required"));
    }
    let Some(date) = parse_event_date(&draft.date) else {
        return Err(CoreError::validation(
            "date",
            format!("'{}' is not a date (expected YYYY-MM-DDTHH:MM)", draft.date),
        ));
    };
    if date <= now {
        return Err(CoreError::validation("date", "must be in the future"));
    }

    if !draft.price.is_finite() || draft.price < 0.0 {
        return Err(CoreError::validation("price", "must not be negative"));
    }
    Ok(())
}

pub struct AdminService {
    backend: Arc<dyn Backend>,
    session: Session,
    dashboard: Arc<DashboardStore>,
    events: Arc<EventsStore>,
    details: EventDetailCache,
}

impl AdminService {
    pub fn new(
        backend: Arc<dyn Backend>,
        session: Session,
        dashboard: Arc<DashboardStore>,
        events: Arc<EventsStore>,
        details: EventDetailCache,
    ) -> Self {
        Self {
            backend,
            session,
            dashboard,
            events,
            details,
        }
    }

    pub fn dashboard(&self) -> &Arc<DashboardStore> {
        &self.dashboard
    }

    /// Admin view of one event, including attendees.
    pub async fn event(&self, id: EventId) -> Result<AdminEvent, CoreError> {
        self.require_admin()?;
        self.backend
            .fetch_admin_event(id)
            .await
            .map_err(|err| self.observe(err))
    }

    pub async fn create_event(&self, draft: &EventDraft) -> Result<(), CoreError> {
        validate_draft(draft, Local::now().naive_local())?;
        self.require_admin()?;

        self.backend
            .create_event(draft)
            .await
            .map_err(|err| self.fail(err))?;

        info!(name = %draft.name, "event created");
        self.after_mutation();
        // A new event may belong on the home page too.
        self.events.invalidate();
        self.session
            .notifier()
            .success(NotificationKind::EventSaved, format!("Created \"{}\"", draft.name));
        Ok(())
    }

    pub async fn update_event(&self, id: EventId, draft: &EventDraft) -> Result<(), CoreError> {
        validate_draft(draft, Local::now().naive_local())?;
        self.require_admin()?;

        self.backend
            .update_event(id, draft)
            .await
            .map_err(|err| self.fail(err))?;

        info!(event = %id, "event updated");
        self.after_mutation();
        self.details.remove(id);
        self.events.invalidate();
        self.session
            .notifier()
            .success(NotificationKind::EventSaved, format!("Updated \"{}\"", draft.name));
        Ok(())
    }

    pub async fn delete_event(&self, id: EventId) -> Result<(), CoreError> {
        self.require_admin()?;

        self.backend
            .delete_event(id)
            .await
            .map_err(|err| self.fail(err))?;

        info!(event = %id, "event deleted");
        self.after_mutation();
        self.details.remove(id);
        self.events.remove_item(id);
        self.session
            .notifier()
            .success(NotificationKind::EventDeleted, "Event deleted");
        Ok(())
    }

    /// Upload an image for `id`, then re-fetch the event and return its
    /// new image URL.
    pub async fn upload_image(
        &self,
        id: EventId,
        upload: ImageUpload,
    ) -> Result<Option<String>, CoreError> {
        if !upload.content_type.starts_with("image/") {
            return Err(CoreError::validation(
                "file",
                format!("expected an image, got {}", upload.content_type),
            ));
        }
        if upload.bytes.is_empty() {
            return Err(CoreError::validation("file", "is empty"));
        }
        self.require_admin()?;

        debug!(event = %id, file = %upload.file_name, bytes = upload.bytes.len(), "uploading image");
        self.backend
            .upload_event_image(id, upload)
            .await
            .map_err(|err| self.fail(err))?;

        self.after_mutation();
        self.details.remove(id);
        self.session
            .notifier()
            .success(NotificationKind::ImageUploaded, "Image uploaded");

        let refreshed = self
            .backend
            .fetch_admin_event(id)
            .await
            .map_err(|err| self.observe(err))?;
        if let Some(url) = refreshed.image_url.clone() {
            self.events.patch_item(id, |e| e.image_url = Some(url.clone()));
        }
        Ok(refreshed.image_url)
    }

    fn require_admin(&self) -> Result<(), CoreError> {
        let user = self.session.require_user()?;
        if user.is_admin() {
            Ok(())
        } else {
            Err(CoreError::Forbidden {
                message: "administrator role required".into(),
            })
        }
    }

    fn after_mutation(&self) {
        self.dashboard.invalidate();
    }

    fn observe(&self, err: CoreError) -> CoreError {
        self.session.observe(&err);
        err
    }

    fn fail(&self, err: CoreError) -> CoreError {
        warn!(error = %err, "admin mutation failed");
        self.session
            .notifier()
            .failure(NotificationKind::EventSaved, &err);
        self.observe(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn now() -> NaiveDateTime {
        parse_event_date("2030-01-01T12:00").unwrap()
    }

    fn draft() -> EventDraft {
        EventDraft {
            name: "Summit".into(),
            description: "Yearly summit".into(),
            agenda: String::new(),
            category_id: None,
            date: "2030-06-01T09:30".into(),
            venue: "Hall B".into(),
            price: 15.0,
            image_url: String::new(),
        }
    }

    fn field_of(err: &CoreError) -> &str {
        match err {
            CoreError::ValidationFailed { field, .. } => field,
            _ => "",
        }
    }

    #[test]
    fn valid_draft_passes() {
        validate_draft(&draft(), now()).unwrap();
    }

    #[test]
    fn blank_required_fields_fail() {
        let mut d = draft();
        d.venue = "   ".into();
        let err = validate_draft(&d, now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(field_of(&err), "venue");
    }

    #[test]
    fn past_date_fails() {
        let mut d = draft();
        d.date = "2029-12-31T23:59".into();
        assert_eq!(field_of(&validate_draft(&d, now()).unwrap_err()), "date");
    }

    #[test]
    fn unparseable_date_fails() {
        let mut d = draft();
        d.date = "next tuesday".into();
        assert_eq!(field_of(&validate_draft(&d, now()).unwrap_err()), "date");
    }

    #[test]
    fn negative_price_fails() {
        let mut d = draft();
        d.price = -1.0;
        assert_eq!(field_of(&validate_draft(&d, now()).unwrap_err()), "price");
    }

    #[test]
    fn accepted_date_shapes() {
        assert!(parse_event_date("2030-06-01").is_some());
        assert!(parse_event_date("2030-06-01T09:30:15").is_some());
        assert!(parse_event_date("2030-06-01T09:30:00Z").is_some());
        assert!(parse_event_date("06/01/2030").is_none());
    }
}
