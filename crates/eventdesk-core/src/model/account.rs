// ── Accounts and session identity ──

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Role {
    User,
    Admin,
}

impl From<eventdesk_api::Role> for Role {
    fn from(role: eventdesk_api::Role) -> Self {
        match role {
            eventdesk_api::Role::User => Self::User,
            eventdesk_api::Role::Admin => Self::Admin,
        }
    }
}

/// Who is signed in. `email` is the cache-partitioning key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    pub email: String,
    pub role: Role,
}

impl UserIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Bearer credentials for one session.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
}

impl AuthTokens {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::from(access_token.into()),
            refresh_token: None,
        }
    }
}

/// Sign-up form.
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: SecretString,
}

impl Registration {
    /// Form rules checked before the request is sent.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.first_name.trim().is_empty() {
            return Err(CoreError::validation("first name", "is required"));
        }
        if !looks_like_email(self.email.trim()) {
            return Err(CoreError::validation("email", "is not a valid address"));
        }
        if self.password.expose_secret().chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::validation(
                "password",
                format!("must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        Ok(())
    }
}

/// `local@domain.tld`, no whitespace.
fn looks_like_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !raw.chars().any(char::is_whitespace)
        && domain
            .rsplit_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(email: &str, password: &str) -> Registration {
        Registration {
            first_name: "Ada".into(),
            last_name: None,
            email: email.into(),
            password: SecretString::from(password.to_owned()),
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(registration("ada@example.com", "correct-horse").validate().is_ok());
    }

    #[test]
    fn rejects_bad_email_and_short_password() {
        assert!(registration("ada.example.com", "correct-horse").validate().is_err());
        assert!(registration("ada@localhost", "correct-horse").validate().is_err());
        assert!(registration("ada@example.com", "short").validate().is_err());
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("admin".parse::<Role>().ok(), Some(Role::Admin));
        assert_eq!(Role::User.to_string(), "USER");
    }
}
