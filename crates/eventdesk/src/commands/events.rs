//! Event browsing handlers.

use tabled::Tabled;

use eventdesk_core::{Category, EventDetails, EventId, EventSummary};

use crate::cli::{EventsArgs, EventsCommand, GlobalOpts};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row definitions ───────────────────────────────────────────

#[derive(Tabled)]
struct EventRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Booked")]
    booked: String,
}

impl From<&EventSummary> for EventRow {
    fn from(e: &EventSummary) -> Self {
        Self {
            id: e.id.to_string(),
            title: e.title.clone(),
            category: e.category.clone().unwrap_or_default(),
            date: util::format_date(&e.date),
            price: util::format_price(e.price),
            booked: util::yes_no(e.booked),
        }
    }
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
}

impl From<&Category> for CategoryRow {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id.to_string(),
            title: c.title.clone(),
        }
    }
}

fn detail(e: &EventDetails) -> String {
    let mut lines = vec![
        ("id", e.id.to_string()),
        ("name", e.name.clone()),
        (
            "category",
            e.category_name
                .clone()
                .or_else(|| e.category_id.map(|c| c.to_string()))
                .unwrap_or_default(),
        ),
        ("date", util::format_date(&e.date)),
        ("venue", e.venue.clone()),
        ("price", util::format_price(e.price)),
        ("booked", util::yes_no(e.booked)),
    ];
    if let Some(url) = &e.image_url {
        lines.push(("image", url.clone()));
    }
    let mut out = output::detail_lines(&lines);
    for (heading, body) in [("Description", &e.description), ("Agenda", &e.agenda)] {
        if !body.trim().is_empty() {
            out.push_str(&format!("\n\n{heading}\n{body}"));
        }
    }
    out
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: EventsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    ctx.require_user()?;
    let fmt = global.format();

    match args.command {
        EventsCommand::List { category, page } => {
            let filter = match category.as_deref() {
                Some(query) => Some(ctx.desk.filter().resolve(query).await?),
                None => None,
            };
            ctx.desk.filter().set_filter(filter).await?;

            let events = ctx.desk.events();
            util::page_through(events, filter, &page).await?;

            let snapshot = events.snapshot();
            let out = output::render_list(&fmt, &snapshot.items, |x| EventRow::from(x), |e| {
                e.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            if snapshot.has_more {
                output::status(
                    &format!(
                        "{} events loaded; pass --pages {} for more",
                        snapshot.items.len(),
                        snapshot.next_page + 1
                    ),
                    global.quiet,
                );
            }
            Ok(())
        }

        EventsCommand::Show { event, refresh } => {
            let id = EventId(event);
            let details = if refresh {
                ctx.desk.details().refresh(id).await?
            } else {
                ctx.desk.open_event(id).await?
            };
            let out = output::render_single(&fmt, &details, detail, |e| e.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EventsCommand::New { merge } => {
            let events = ctx.desk.events();
            events.initialize(None).await?;
            let staged = events.check_for_new().await?;
            if staged == 0 {
                output::status("No new events", global.quiet);
                return Ok(());
            }
            if merge {
                let shown = events.show_new();
                output::status(&format!("Merged {shown} new events"), global.quiet);
            } else {
                output::status(
                    &format!("{staged} new events available; rerun with --merge to add them"),
                    global.quiet,
                );
            }
            Ok(())
        }
    }
}

pub async fn categories(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    ctx.require_user()?;
    let categories = ctx.desk.filter().categories().await?;
    let out = output::render_list(&global.format(), &categories, |x| CategoryRow::from(x), |c| {
        c.id.to_string()
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
