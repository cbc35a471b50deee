//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::Input;

use eventdesk_config::Defaults;
use eventdesk_core::DEFAULT_BASE_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be a positive number".into(),
    })
}

fn describe(cfg: &Config) -> String {
    let mut out = output::detail_lines(&[
        ("file", config::config_path().display().to_string()),
        (
            "default profile",
            cfg.default_profile.clone().unwrap_or_else(|| "default".into()),
        ),
        ("output", cfg.defaults.output.clone()),
        ("timeout", format!("{}s", cfg.defaults.timeout)),
        ("page size", cfg.defaults.page_size.to_string()),
    ]);

    let mut names: Vec<&String> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        out.push_str(&format!("\n\n[{name}]\n"));
        out.push_str(&output::detail_lines(&[
            ("server", p.server.clone()),
            ("email", p.email.clone().unwrap_or_default()),
            (
                "timeout",
                p.timeout.map(|t| format!("{t}s")).unwrap_or_default(),
            ),
            (
                "page size",
                p.page_size.map(|s| s.to_string()).unwrap_or_default(),
            ),
        ]));
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("eventdesk configuration");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let server: String = Input::new()
                .with_prompt("Server API URL")
                .default(DEFAULT_BASE_URL.into())
                .interact_text()
                .map_err(prompt_err)?;

            let email: String = Input::new()
                .with_prompt("Account email (optional)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let profile = Profile {
                server,
                email: Some(email.trim().to_owned()).filter(|e| !e.is_empty()),
                timeout: None,
                page_size: None,
            };
            eventdesk_config::profile_to_client_config(&profile, &Defaults::default())?;

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);
            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                profiles,
                ..Config::default()
            };
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Next: eventdesk login");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.format(), &cfg, describe, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(Profile::local);

            match key.as_str() {
                "server" => profile.server = value,
                "email" => profile.email = Some(value).filter(|v| !v.is_empty()),
                "timeout" => profile.timeout = Some(parse_number("timeout", &value)?),
                "page_size" | "page-size" => {
                    let size: u32 = parse_number("page_size", &value)?;
                    if size == 0 {
                        return Err(CliError::Validation {
                            field: "page_size".into(),
                            reason: "must be at least 1".into(),
                        });
                    }
                    profile.page_size = Some(size);
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: server, email, timeout, page_size"
                        ),
                    });
                }
            }
            eventdesk_config::profile_to_client_config(profile, &cfg.defaults)?;

            config::save_config(&cfg)?;
            output::status(
                &format!("✓ Set {key} on profile '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                output::status(
                    "No profiles configured. Run: eventdesk config init",
                    global.quiet,
                );
            } else {
                let mut names: Vec<&String> = cfg.profiles.keys().collect();
                names.sort();
                let listing = names
                    .into_iter()
                    .map(|name| {
                        let marker = if name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                output::print_output(&listing, global.quiet);
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: config::available_profiles(),
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::status(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}
