// Account endpoints
//
// Login exchanges credentials for a session token; the token then
// authenticates `/account` (as a bearer token) and logout.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{ApiClient, Authorization};
use crate::error::Error;
use crate::models::{Account, LoginRequest, LoginResponse, LogoutRequest, LogoutResponse};

impl ApiClient {
    /// Exchange credentials for a session token.
    ///
    /// `POST /account/login` with `{"username", "password"}`
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, Error> {
        let url = self.endpoint(&["account", "login"])?;
        debug!(username, "logging in");
        self.post(
            url,
            &LoginRequest {
                username,
                password: password.expose_secret(),
            },
        )
        .await
    }

    /// Invalidate a session token.
    ///
    /// `POST /account/logout` with `{"token"}`
    pub async fn logout(&self, token: &str) -> Result<LogoutResponse, Error> {
        let url = self.endpoint(&["account", "logout"])?;
        debug!("logging out");
        self.post(url, &LogoutRequest { token }).await
    }

    /// Fetch the account behind a token.
    ///
    /// `GET /account` with `Authorization: Bearer <token>`
    pub async fn account(&self, token: &str) -> Result<Account, Error> {
        let url = self.endpoint(&["account"])?;
        self.get(url, Authorization::Bearer(token)).await
    }
}
