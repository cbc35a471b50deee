//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use chrono::NaiveDateTime;
use secrecy::SecretString;

use eventdesk_core::{CategoryId, LoadOutcome, PageItem, PaginatedStore, parse_event_date};

use crate::cli::PageArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Use `provided` or prompt on the terminal without echo.
pub fn password(provided: Option<String>, prompt: &str) -> Result<SecretString, CliError> {
    let raw = match provided {
        Some(raw) => raw,
        None => rpassword::prompt_password(prompt)?,
    };
    Ok(SecretString::from(raw))
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Bring `store` to the page count `args` asks for.
///
/// Cached pages count toward the target, so repeated invocations continue
/// where the last one stopped.
pub async fn page_through<T: PageItem>(
    store: &PaginatedStore<T>,
    filter: Option<CategoryId>,
    args: &PageArgs,
) -> Result<(), CliError> {
    if args.refresh {
        store.invalidate();
    }
    store.initialize(filter).await?;

    let target = if args.all { u32::MAX } else { args.pages.max(1) };
    while store.has_more() && store.snapshot().next_page < target {
        match store.load_next_page().await? {
            LoadOutcome::Loaded { exhausted, .. } if !exhausted => {}
            _ => break,
        }
    }
    Ok(())
}

/// `Sat 01 Jun 2030 19:00`, or the raw value when it does not parse.
pub fn format_date(raw: &str) -> String {
    parse_event_date(raw).map_or_else(|| raw.to_owned(), |dt: NaiveDateTime| {
        dt.format("%a %d %b %Y %H:%M").to_string()
    })
}

pub fn format_price(price: f64) -> String {
    if price.abs() < f64::EPSILON {
        "free".into()
    } else {
        format!("{price:.2}")
    }
}

pub fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.into()
}
