//! Clap derive structures for the `eventdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// eventdesk -- browse, book, and manage events from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "eventdesk",
    version,
    about = "Browse, book, and manage events from the command line",
    long_about = "A command-line client for the eventdesk booking service.\n\n\
        Responses are cached per profile and per user between invocations;\n\
        list commands continue from the cached cursor.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "EVENTDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 's', env = "EVENTDESK_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format [default: table, or `defaults.output` from config]
    #[arg(long, short = 'o', env = "EVENTDESK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "EVENTDESK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Keep tokens in a file instead of the system keyring
    #[arg(long, env = "EVENTDESK_NO_KEYRING", global = true)]
    pub no_keyring: bool,
}

impl GlobalOpts {
    pub fn format(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session tokens
    Login(LoginArgs),

    /// Sign out and wipe the cached session
    Logout,

    /// Create a new account
    Register(RegisterArgs),

    /// Show the signed-in account
    Whoami,

    /// Browse events
    #[command(alias = "ev")]
    Events(EventsArgs),

    /// List event categories
    #[command(alias = "cat")]
    Categories,

    /// Book an event
    Book {
        /// Event ID
        event: i64,
    },

    /// Cancel a booking
    Cancel(CancelArgs),

    /// List your bookings
    Bookings(PageArgs),

    /// Event management (administrators)
    Admin(AdminArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// How far to page through a list.
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Pages to have loaded after this call (cached pages count)
    #[arg(long, default_value = "1")]
    pub pages: u32,

    /// Load every remaining page
    #[arg(long, short = 'a', conflicts_with = "pages")]
    pub all: bool,

    /// Drop cached pages and start from the first page
    #[arg(long, short = 'r')]
    pub refresh: bool,
}

// ── Accounts ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (defaults to the profile's last login)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "EVENTDESK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// First name
    #[arg(long)]
    pub first_name: String,

    /// Last name
    #[arg(long)]
    pub last_name: Option<String>,

    /// Account email
    #[arg(long, short = 'e')]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "EVENTDESK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

// ── Events ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct EventsArgs {
    #[command(subcommand)]
    pub command: EventsCommand,
}

#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// List upcoming events
    #[command(alias = "ls")]
    List {
        /// Category ID or title
        #[arg(long, short = 'c')]
        category: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show one event
    #[command(alias = "get")]
    Show {
        /// Event ID
        event: i64,

        /// Bypass the cached copy
        #[arg(long, short = 'r')]
        refresh: bool,
    },

    /// Check for events published since the list was loaded
    New {
        /// Merge new events into the cached list
        #[arg(long)]
        merge: bool,
    },
}

#[derive(Debug, Args)]
pub struct CancelArgs {
    /// Event ID whose booking should be cancelled
    #[arg(required_unless_present = "booking")]
    pub event: Option<i64>,

    /// Booking ID (requires --event-id)
    #[arg(long, requires = "event_id")]
    pub booking: Option<i64>,

    /// Event the booking belongs to
    #[arg(long)]
    pub event_id: Option<i64>,
}

// ── Admin ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Events with their booking counts
    #[command(alias = "ls")]
    Dashboard(PageArgs),

    /// Show one event with its attendees
    Show {
        /// Event ID
        event: i64,
    },

    /// Create an event
    Create(EventFields),

    /// Update an event (unspecified fields keep their current value)
    Update {
        /// Event ID
        event: i64,

        #[command(flatten)]
        fields: EventFields,
    },

    /// Delete an event
    #[command(alias = "rm")]
    Delete {
        /// Event ID
        event: i64,
    },

    /// Upload an event image
    UploadImage {
        /// Event ID
        event: i64,

        /// Image file (png, jpg, gif, webp)
        file: PathBuf,
    },
}

/// Event form fields. `--from-file` supplies a JSON draft; flags override it.
#[derive(Debug, Args)]
pub struct EventFields {
    /// JSON file with the event draft
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub agenda: Option<String>,

    /// Category ID
    #[arg(long)]
    pub category: Option<i64>,

    /// Start time, YYYY-MM-DDTHH:MM
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub venue: Option<String>,

    #[arg(long)]
    pub price: Option<f64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Key: server, email, timeout, page_size
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
