//! Administrator event management handlers.

use std::path::Path;

use tabled::Tabled;

use eventdesk_core::{AdminEvent, Attendee, CategoryId, EventDraft, EventId, ImageUpload};

use crate::cli::{AdminArgs, AdminCommand, EventFields, GlobalOpts};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row definitions ───────────────────────────────────────────

#[derive(Tabled)]
struct DashboardRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Venue")]
    venue: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Bookings")]
    bookings: String,
}

impl From<&AdminEvent> for DashboardRow {
    fn from(e: &AdminEvent) -> Self {
        Self {
            id: e.id.to_string(),
            name: e.name.clone(),
            date: util::format_date(&e.date),
            venue: e.venue.clone(),
            price: util::format_price(e.price),
            bookings: e
                .number_of_bookings
                .map_or_else(|| "-".into(), |n| n.to_string()),
        }
    }
}

#[derive(Tabled)]
struct AttendeeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
}

impl From<&Attendee> for AttendeeRow {
    fn from(a: &Attendee) -> Self {
        Self {
            id: a.id.to_string(),
            name: a.display_name(),
            email: a.email.clone(),
        }
    }
}

fn detail(e: &AdminEvent) -> String {
    let attendees = e.attendees.as_deref().unwrap_or_default();
    let mut out = output::detail_lines(&[
        ("id", e.id.to_string()),
        ("name", e.name.clone()),
        (
            "category",
            e.category.map(|c| c.to_string()).unwrap_or_default(),
        ),
        ("date", util::format_date(&e.date)),
        ("venue", e.venue.clone()),
        ("price", util::format_price(e.price)),
        ("image", e.image_url.clone().unwrap_or_default()),
        ("attendees", attendees.len().to_string()),
    ]);
    if !attendees.is_empty() {
        let rows: Vec<AttendeeRow> = attendees.iter().map(AttendeeRow::from).collect();
        out.push_str("\n\n");
        out.push_str(&output::render_table(&rows));
    }
    out
}

// ── Draft assembly ──────────────────────────────────────────────────

/// Start from `--from-file` (or `base`), then apply individual flags.
fn build_draft(fields: EventFields, base: EventDraft) -> Result<EventDraft, CliError> {
    let mut draft = match &fields.from_file {
        Some(path) => util::read_json_file(path)?,
        None => base,
    };
    if let Some(v) = fields.name {
        draft.name = v;
    }
    if let Some(v) = fields.description {
        draft.description = v;
    }
    if let Some(v) = fields.agenda {
        draft.agenda = v;
    }
    if let Some(v) = fields.category {
        draft.category_id = Some(CategoryId(v));
    }
    if let Some(v) = fields.date {
        draft.date = v;
    }
    if let Some(v) = fields.venue {
        draft.venue = v;
    }
    if let Some(v) = fields.price {
        draft.price = v;
    }
    Ok(draft)
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn read_upload(path: &Path) -> Result<ImageUpload, CliError> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map_or_else(|| "upload".into(), |n| n.to_string_lossy().into_owned());
    Ok(ImageUpload {
        file_name,
        content_type: content_type_for(path).into(),
        bytes,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: AdminArgs, global: &GlobalOpts) -> Result<(), CliError> {
    ctx.require_user()?;
    let admin = ctx.desk.admin();
    let fmt = global.format();

    match args.command {
        AdminCommand::Dashboard(page) => {
            let dashboard = admin.dashboard();
            util::page_through(dashboard, None, &page).await?;
            let snapshot = dashboard.snapshot();
            let out = output::render_list(&fmt, &snapshot.items, |x| DashboardRow::from(x), |e| {
                e.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AdminCommand::Show { event } => {
            let event = admin.event(EventId(event)).await?;
            let out = output::render_single(&fmt, &event, detail, |e| e.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AdminCommand::Create(fields) => {
            let draft = build_draft(fields, EventDraft::default())?;
            admin.create_event(&draft).await?;
            output::status(&format!("Created \"{}\"", draft.name), global.quiet);
            Ok(())
        }

        AdminCommand::Update { event, fields } => {
            let id = EventId(event);
            let base = if fields.from_file.is_some() {
                EventDraft::default()
            } else {
                EventDraft::from(&admin.event(id).await?)
            };
            let draft = build_draft(fields, base)?;
            admin.update_event(id, &draft).await?;
            output::status(&format!("Updated event {id}"), global.quiet);
            Ok(())
        }

        AdminCommand::Delete { event } => {
            if !util::confirm(&format!("Delete event {event}?"), global.yes)? {
                return Ok(());
            }
            admin.delete_event(EventId(event)).await?;
            output::status(&format!("Deleted event {event}"), global.quiet);
            Ok(())
        }

        AdminCommand::UploadImage { event, file } => {
            let upload = read_upload(&file)?;
            let url = admin.upload_image(EventId(event), upload).await?;
            match url {
                Some(url) => output::print_output(&url, global.quiet),
                None => output::status("Image uploaded", global.quiet),
            }
            Ok(())
        }
    }
}
