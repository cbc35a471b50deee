mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, OutputFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        mut global,
        command,
    } = cli;
    let cfg = config::load_config_or_default();
    if global.output.is_none() {
        global.output = OutputFormat::from_str(&cfg.defaults.output, true).ok();
    }

    match command {
        // Config commands don't need a server connection
        Command::Config(args) => commands::config_cmd::handle(args, &global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "eventdesk", &mut std::io::stdout());
            Ok(())
        }

        // Everything else talks to the server through a profile session
        cmd => {
            let ctx = config::Context::open(&global, &cfg)?;
            tracing::debug!(profile = %ctx.profile_name, "dispatching command");

            let result = commands::dispatch(cmd, &ctx, &global).await;
            let finished = ctx.finish();
            result.map_err(|e| e.for_profile(&ctx.profile_name))?;
            finished
        }
    }
}
