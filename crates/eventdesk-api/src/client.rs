// Booking API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer-token injection,
// and status-to-error mapping. Endpoint groups (events, bookings, admin,
// account) are implemented as inherent methods in separate files to keep
// this module focused on transport mechanics.

use std::sync::{PoisonError, RwLock};

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Error body shape produced by the backend's exception handler.
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Async client for the booking REST API.
///
/// All paths are relative to the API root (e.g. `http://localhost:8080/api/v1/`).
/// A bearer token, once set, is attached to every request.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for the given API root.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            token: RwLock::new(None),
        })
    }

    /// Ensure the base URL ends with `/` so relative joins keep its path.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The API root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Bearer token ─────────────────────────────────────────────────

    /// Set (or clear) the bearer token attached to subsequent requests.
    pub fn set_token(&self, token: Option<SecretString>) {
        debug!(present = token.is_some(), "updating bearer token");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Whether a bearer token is currently configured.
    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"user/homepage"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.authorize(self.http.get(url)).send().await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self
            .authorize(self.http.get(url))
            .query(params)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authorize(self.http.post(url)).json(body).send().await?;
        self.handle_response(resp).await
    }

    /// POST with no body; returns the raw response text (possibly empty).
    pub(crate) async fn post_empty(&self, path: &str) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authorize(self.http.post(url)).send().await?;
        self.handle_text(resp).await
    }

    pub(crate) async fn post_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authorize(self.http.post(url)).json(body).send().await?;
        self.handle_text(resp).await.map(drop)
    }

    pub(crate) async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url} (multipart)");

        let resp = self
            .authorize(self.http.post(url))
            .multipart(form)
            .send()
            .await?;
        self.handle_text(resp).await.map(drop)
    }

    pub(crate) async fn put_no_response<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.authorize(self.http.put(url)).json(body).send().await?;
        self.handle_text(resp).await.map(drop)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.authorize(self.http.delete(url)).send().await?;
        self.handle_text(resp).await.map(drop)
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let body = self.handle_text(resp).await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    async fn handle_text(&self, resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            trace!(status = status.as_u16(), len = body.len(), "response body received");
            Ok(body)
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Error::Unauthorized {
                status: status.as_u16(),
            };
        }
        if status == StatusCode::NOT_FOUND {
            return Error::NotFound {
                path: resp.url().path().to_owned(),
            };
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| err.message.or(err.error))
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}
