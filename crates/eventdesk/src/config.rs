//! CLI configuration: thin wrapper around `eventdesk_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--server,
//! --timeout, --no-keyring) and opens the per-profile session.

use std::sync::Arc;

use tracing::{debug, warn};

use eventdesk_core::{ClientConfig, CoreError, EventDesk, SessionDirCache, SessionState, UserIdentity};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use eventdesk_config::{
    Config, Profile, TokenStore, config_path, load_config_or_default, save_config, session_dir,
    token_path,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.profile_name(global.profile.as_deref())
}

/// Comma-separated profile names for error help text.
pub fn available_profiles() -> String {
    let mut names: Vec<String> = load_config_or_default().profiles.into_keys().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Translate the active profile + global flags into a `ClientConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    global: &GlobalOpts,
    config: &Config,
) -> Result<(String, Profile, ClientConfig), CliError> {
    let (name, mut profile) = config.resolve_profile(global.profile.as_deref())?;

    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let client = eventdesk_config::profile_to_client_config(&profile, &config.defaults)?;
    Ok((name, profile, client))
}

pub fn token_store(global: &GlobalOpts, profile_name: &str) -> TokenStore {
    if global.no_keyring {
        TokenStore::file_only(profile_name, token_path(profile_name))
    } else {
        TokenStore::for_profile(profile_name)
    }
}

// ── Session context ─────────────────────────────────────────────────

/// Everything a server-bound command needs.
pub struct Context {
    pub desk: EventDesk,
    pub profile_name: String,
    pub profile: Profile,
    pub tokens: TokenStore,
}

impl Context {
    /// Build the client for the active profile and resume any stored session.
    pub fn open(global: &GlobalOpts, config: &Config) -> Result<Self, CliError> {
        let (profile_name, profile, client) = resolve_profile(global, config)?;
        let cache = SessionDirCache::open(session_dir(&profile_name))?;
        let desk = EventDesk::new(client, Arc::new(cache))?;
        let tokens = token_store(global, &profile_name);

        if let Some(saved) = tokens.load()? {
            match desk.resume(saved) {
                Ok(identity) => debug!(user = %identity.email, "resumed stored session"),
                Err(CoreError::SessionExpired) => {
                    warn!(profile = %profile_name, "stored session expired; discarding tokens");
                    tokens.clear()?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self {
            desk,
            profile_name,
            profile,
            tokens,
        })
    }

    /// The signed-in user, or a `NotSignedIn` error naming this profile.
    pub fn require_user(&self) -> Result<UserIdentity, CliError> {
        self.desk
            .session()
            .require_user()
            .map_err(|e| CliError::from(e).for_profile(&self.profile_name))
    }

    /// Drop stored tokens if the backend ended the session mid-command.
    pub fn finish(&self) -> Result<(), CliError> {
        self.desk.close();
        if self.desk.session().state() == SessionState::Expired {
            self.tokens.clear()?;
        }
        Ok(())
    }
}
