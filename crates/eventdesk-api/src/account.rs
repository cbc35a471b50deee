// Account endpoints: login, registration, token refresh.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::types::{JwtAuthResponse, SignInRequest, SignUpRequest};

impl ApiClient {
    /// `POST /auth/login`
    ///
    /// Does not install the returned token; callers decide when the
    /// session starts.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<JwtAuthResponse, Error> {
        let request = SignInRequest {
            email: email.to_owned(),
            password: password.expose_secret().to_owned(),
        };
        debug!(email, "logging in");
        self.post("auth/login", &request)
            .await
            .map_err(Self::as_auth_failure)
    }

    /// `POST /auth/register`
    pub async fn register(&self, request: &SignUpRequest) -> Result<(), Error> {
        debug!(email = %request.email, "registering account");
        self.post_no_response("auth/register", request)
            .await
            .map_err(Self::as_auth_failure)
    }

    /// `POST /auth/refresh`
    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<JwtAuthResponse, Error> {
        let body = serde_json::json!({ "refreshToken": refresh_token.expose_secret() });
        self.post("auth/refresh", &body).await
    }

    /// Credential rejections on the auth endpoints are login failures,
    /// not an expired session.
    fn as_auth_failure(err: Error) -> Error {
        match err {
            Error::Unauthorized { status } => Error::Authentication {
                message: format!("credentials rejected (HTTP {status})"),
            },
            Error::Api { message, .. } => Error::Authentication { message },
            other => other,
        }
    }
}
