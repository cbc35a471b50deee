//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod account;
pub mod admin;
pub mod bookings;
pub mod config_cmd;
pub mod events;
pub mod util;

use eventdesk_core::EventId;

use crate::cli::{Command, GlobalOpts};
use crate::config::Context;
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => account::login(ctx, args, global).await,
        Command::Logout => account::logout(ctx, global),
        Command::Register(args) => account::register(ctx, args, global).await,
        Command::Whoami => account::whoami(ctx, global),
        Command::Events(args) => events::handle(ctx, args, global).await,
        Command::Categories => events::categories(ctx, global).await,
        Command::Book { event } => bookings::book(ctx, EventId(event), global).await,
        Command::Cancel(args) => bookings::cancel(ctx, args, global).await,
        Command::Bookings(args) => bookings::list(ctx, &args, global).await,
        Command::Admin(args) => admin::handle(ctx, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command reached server dispatch".into(),
        )),
    }
}
