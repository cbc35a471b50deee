//! Sign-in, sign-out, registration.

use dialoguer::Input;
use tracing::debug;

use eventdesk_core::Registration;

use crate::cli::{GlobalOpts, LoginArgs, RegisterArgs};
use crate::config::{self, Context};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn login(ctx: &Context, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let email = match args.email.or_else(|| ctx.profile.email.clone()) {
        Some(email) => email,
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(|e| CliError::Io(std::io::Error::other(e)))?,
    };
    let password = util::password(args.password, "Password: ")?;

    let (identity, tokens) = ctx.desk.sign_in(&email, &password).await?;
    ctx.tokens.save(&tokens)?;
    remember_email(ctx, &identity.email)?;

    output::status(
        &format!("Signed in as {} ({})", identity.email, identity.role),
        global.quiet,
    );
    Ok(())
}

pub fn logout(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    ctx.desk.sign_out();
    ctx.tokens.clear()?;
    output::status("Signed out; cached data removed", global.quiet);
    Ok(())
}

pub async fn register(
    ctx: &Context,
    args: RegisterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let registration = Registration {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        password: util::password(args.password, "Choose a password: ")?,
    };
    ctx.desk.register(&registration).await?;
    output::status(
        &format!(
            "Account created. Sign in with: eventdesk login -e {}",
            registration.email
        ),
        global.quiet,
    );
    Ok(())
}

pub fn whoami(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let identity = ctx.require_user()?;
    let out = output::render_single(
        &global.format(),
        &identity,
        |i| {
            output::detail_lines(&[
                ("email", i.email.clone()),
                ("role", i.role.to_string()),
                ("profile", ctx.profile_name.clone()),
                ("server", ctx.desk.config().base_url.to_string()),
            ])
        },
        |i| i.email.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Store the login email on a configured profile so the next login can
/// skip the prompt.
fn remember_email(ctx: &Context, email: &str) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    let Some(profile) = cfg.profiles.get_mut(&ctx.profile_name) else {
        return Ok(());
    };
    if profile.email.as_deref() == Some(email) {
        return Ok(());
    }
    profile.email = Some(email.to_owned());
    config::save_config(&cfg)?;
    debug!(profile = %ctx.profile_name, "remembered login email");
    Ok(())
}
