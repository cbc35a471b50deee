//! Shared configuration for eventdesk tools.
//!
//! TOML profiles, environment overrides, token storage (keyring with a
//! plaintext file fallback), and translation to
//! `eventdesk_core::ClientConfig`. The CLI adds flag-aware wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use eventdesk_core::{AuthTokens, ClientConfig, DEFAULT_BASE_URL};

const KEYRING_SERVICE: &str = "eventdesk";
const ENV_PREFIX: &str = "EVENTDESK_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("stored tokens are unreadable: {0}")]
    TokenFile(#[from] toml::de::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Events and bookings per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    eventdesk_core::config::DEFAULT_PAGE_SIZE
}

/// A named backend profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// API root, e.g. "https://events.example.com/api/v1".
    pub server: String,

    /// Account last signed in with; prefills the login prompt.
    pub email: Option<String>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override page size.
    pub page_size: Option<u32>,
}

impl Profile {
    /// Profile for a backend on this machine.
    pub fn local() -> Self {
        Self {
            server: DEFAULT_BASE_URL.into(),
            email: None,
            timeout: None,
            page_size: None,
        }
    }
}

impl Config {
    /// Name of the profile to use: explicit, then configured default,
    /// then `"default"`.
    pub fn profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// Look up a profile. An unconfigured `"default"` profile falls back to
    /// the local backend so a fresh install works without a config file.
    pub fn resolve_profile(&self, explicit: Option<&str>) -> Result<(String, Profile), ConfigError> {
        let name = self.profile_name(explicit);
        if let Some(profile) = self.profiles.get(&name) {
            return Ok((name, profile.clone()));
        }
        if name == "default" {
            return Ok((name, Profile::local()));
        }
        Err(ConfigError::UnknownProfile { name })
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "eventdesk", "eventdesk")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("eventdesk");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding the per-profile response cache.
pub fn session_dir(profile_name: &str) -> PathBuf {
    project_dirs()
        .map_or_else(|| dirs_fallback().join("cache"), |dirs| dirs.cache_dir().to_path_buf())
        .join("sessions")
        .join(profile_name)
}

/// Fallback token file used when no keyring is available.
pub fn token_path(profile_name: &str) -> PathBuf {
    project_dirs()
        .map_or_else(|| dirs_fallback().join("data"), |dirs| dirs.data_dir().to_path_buf())
        .join("tokens")
        .join(format!("{profile_name}.toml"))
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file at `path`, then `EVENTDESK_` variables
/// (`EVENTDESK_DEFAULTS__TIMEOUT=5` sets `defaults.timeout`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ClientConfig` from a profile, falling back to `defaults`.
pub fn profile_to_client_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let url: url::Url = profile.server.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {}", profile.server),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "server".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }

    let config = ClientConfig::new(url.as_str()).map_err(|e| ConfigError::Validation {
        field: "server".into(),
        reason: e.to_string(),
    })?;

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    let page_size = profile.page_size.unwrap_or(defaults.page_size);

    Ok(config.with_timeout(timeout).with_page_size(page_size))
}

// ── Token storage ───────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct StoredTokens {
    access_token: String,
    refresh_token: Option<String>,
}

/// Where a profile's tokens live between invocations.
///
/// The system keyring is tried first; when it is unavailable the tokens
/// go to a plaintext file readable only by the current user.
#[derive(Debug, Clone)]
pub struct TokenStore {
    profile: String,
    file: PathBuf,
    use_keyring: bool,
}

impl TokenStore {
    pub fn for_profile(profile_name: &str) -> Self {
        Self {
            profile: profile_name.to_owned(),
            file: token_path(profile_name),
            use_keyring: true,
        }
    }

    /// Store that never touches the keyring.
    pub fn file_only(profile_name: &str, file: impl Into<PathBuf>) -> Self {
        Self {
            profile: profile_name.to_owned(),
            file: file.into(),
            use_keyring: false,
        }
    }

    pub fn save(&self, tokens: &AuthTokens) -> Result<(), ConfigError> {
        if self.use_keyring {
            match self.save_to_keyring(tokens) {
                Ok(()) => {
                    debug!(profile = %self.profile, "tokens stored in keyring");
                    // Drop any plaintext copy left by an earlier keyring outage.
                    self.remove_file()?;
                    return Ok(());
                }
                Err(e) => warn!(error = %e, "keyring unavailable; storing tokens in file"),
            }
        }
        self.save_to_file(tokens)
    }

    pub fn load(&self) -> Result<Option<AuthTokens>, ConfigError> {
        if self.use_keyring {
            if let Some(tokens) = self.load_from_keyring() {
                return Ok(Some(tokens));
            }
        }
        self.load_from_file()
    }

    /// Forget the profile's tokens.
    ///
    /// Fails if a keyring credential could not be deleted and is still
    /// readable, since `load` would resume it on the next run.
    pub fn clear(&self) -> Result<(), ConfigError> {
        if self.use_keyring {
            for slot in ["access-token", "refresh-token"] {
                let entry = match self.entry(slot) {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(error = %e, slot, "keyring unavailable; nothing to delete");
                        continue;
                    }
                };
                if let Err(e) = ignore_missing(entry.delete_credential()) {
                    if entry.get_password().is_ok() {
                        return Err(e.into());
                    }
                    warn!(error = %e, slot, "keyring delete failed; credential is gone");
                }
            }
        }
        self.remove_file()
    }

    fn entry(&self, slot: &str) -> keyring::Result<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, &format!("{}/{slot}", self.profile))
    }

    fn save_to_keyring(&self, tokens: &AuthTokens) -> keyring::Result<()> {
        self.entry("access-token")?
            .set_password(tokens.access_token.expose_secret())?;
        let refresh = self.entry("refresh-token")?;
        match &tokens.refresh_token {
            Some(token) => refresh.set_password(token.expose_secret())?,
            None => ignore_missing(refresh.delete_credential())?,
        }
        Ok(())
    }

    fn load_from_keyring(&self) -> Option<AuthTokens> {
        let access = self.entry("access-token").ok()?.get_password().ok()?;
        let refresh = self
            .entry("refresh-token")
            .ok()
            .and_then(|e| e.get_password().ok());
        Some(AuthTokens {
            access_token: SecretString::from(access),
            refresh_token: refresh.map(SecretString::from),
        })
    }

    fn save_to_file(&self, tokens: &AuthTokens) -> Result<(), ConfigError> {
        if let Some(parent) = self.file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredTokens {
            access_token: tokens.access_token.expose_secret().to_owned(),
            refresh_token: tokens
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().to_owned()),
        };
        std::fs::write(&self.file, toml::to_string(&stored)?)?;
        restrict_permissions(&self.file)?;
        Ok(())
    }

    fn load_from_file(&self) -> Result<Option<AuthTokens>, ConfigError> {
        let raw = match std::fs::read_to_string(&self.file) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredTokens = toml::from_str(&raw)?;
        Ok(Some(AuthTokens {
            access_token: SecretString::from(stored.access_token),
            refresh_token: stored.refresh_token.map(SecretString::from),
        }))
    }

    fn remove_file(&self) -> Result<(), ConfigError> {
        match std::fs::remove_file(&self.file) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// A credential that was never stored counts as deleted.
fn ignore_missing(result: keyring::Result<()>) -> keyring::Result<()> {
    match result {
        Err(keyring::Error::NoEntry) => Ok(()),
        other => other,
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
