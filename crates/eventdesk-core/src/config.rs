// ── Runtime client configuration ──
//
// Describes *where* the booking service lives and how pages are sized.
// Never touches disk: the CLI builds a `ClientConfig` from its profile
// and hands it in.

use std::time::Duration;

use url::Url;

use crate::error::CoreError;

/// Base URL used when no profile overrides it.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Page size for the events and bookings stores.
pub const DEFAULT_PAGE_SIZE: u32 = 9;

/// Page size for the admin dashboard.
pub const DEFAULT_ADMIN_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `http://localhost:8080/api/v1`.
    pub base_url: Url,
    /// HTTP request timeout.
    pub timeout: Duration,
    pub page_size: u32,
    pub admin_page_size: u32,
}

impl ClientConfig {
    /// Config pointing at `base_url` with default timeout and page sizes.
    pub fn new(base_url: &str) -> Result<Self, CoreError> {
        let base_url = Url::parse(base_url).map_err(|e| CoreError::Config {
            message: format!("invalid base URL '{base_url}': {e}"),
        })?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
            admin_page_size: DEFAULT_ADMIN_PAGE_SIZE,
        })
    }

    /// Config for the local development backend.
    pub fn local() -> Result<Self, CoreError> {
        Self::new(DEFAULT_BASE_URL)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size.max(1);
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn local_config_uses_defaults() {
        let config = ClientConfig::local().unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/api/v1");
        assert_eq!(config.page_size, 9);
        assert_eq!(config.admin_page_size, 10);
    }

    #[test]
    fn rejects_garbage_url() {
        assert!(ClientConfig::new("not a url").is_err());
    }

    #[test]
    fn page_size_never_zero() {
        let config = ClientConfig::local().unwrap().with_page_size(0);
        assert_eq!(config.page_size, 1);
    }
}
